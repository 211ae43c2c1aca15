//! partkv - unified CLI entrypoint.
//!
//! Usage:
//!   partkv start --config config/partkv.toml
//!   partkv config validate --config config/partkv.toml
//!   partkv console --partition 0

use anyhow::Result;
use clap::Parser;
use partkv::cli::commands::{run_config, run_console, run_start};
use partkv::cli::{Cli, Commands};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.map(PathBuf::from);

    match cli.command {
        Commands::Start(args) => run_start(args, config_path.as_deref(), cli.log_level).await,
        Commands::Config(args) => run_config(args, config_path.as_deref()),
        Commands::Console(args) => run_console(args, config_path.as_deref(), cli.log_level).await,
    }
}
