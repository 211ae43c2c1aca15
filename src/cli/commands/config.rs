//! Config command implementation.

use crate::core::config::Config;
use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::Path;

/// Configuration operations.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Validate the configuration file.
    Validate,
    /// Print the configuration with defaults filled in.
    Show {
        /// Output format (toml, json).
        #[arg(long, default_value = "toml")]
        format: String,
    },
}

/// Run the config command against `config_path`, or the default path.
pub fn run_config(args: ConfigArgs, config_path: Option<&Path>) -> Result<()> {
    let path = config_path.unwrap_or(Path::new(super::DEFAULT_CONFIG_PATH));
    match args.command {
        ConfigCommand::Validate => validate_config(path),
        ConfigCommand::Show { format } => show_config(path, &format),
    }
}

fn validate_config(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("Config file not found: {:?}", path);
    }

    let config = Config::from_file(path)?;
    println!("✓ Configuration is valid");
    println!("  partitions: {}", config.node.partition_count);
    println!("  inbox capacity: {}", config.node.inbox_capacity);
    println!("  log level: {}", config.telemetry.log_level);
    Ok(())
}

fn show_config(path: &Path, format: &str) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("Config file not found: {:?}", path);
    }

    let config = Config::from_file(path)?;
    println!("{}", render_config(&config, format)?);
    Ok(())
}

fn render_config(config: &Config, format: &str) -> Result<String> {
    match format {
        "json" => Ok(serde_json::to_string_pretty(config)?),
        "toml" => Ok(toml::to_string_pretty(config)?),
        other => anyhow::bail!("unsupported format: {} (expected toml or json)", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_toml_includes_defaults() {
        let rendered = render_config(&Config::default(), "toml").unwrap();
        assert!(rendered.contains("[node]"));
        assert!(rendered.contains("partition_count = 8"));
        assert!(rendered.contains("[telemetry]"));
    }

    #[test]
    fn test_render_json() {
        let rendered = render_config(&Config::default(), "json").unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["node"]["inbox_capacity"], 1024);
        assert_eq!(value["telemetry"]["log_level"], "info");
    }

    #[test]
    fn test_render_unknown_format() {
        assert!(render_config(&Config::default(), "yaml").is_err());
    }
}
