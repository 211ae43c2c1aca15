//! Command-line interface.

pub mod commands;

use clap::{Parser, Subcommand};

/// partkv - partitioned key-value and publish/subscribe runtime.
#[derive(Parser, Debug)]
#[command(name = "partkv")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path.
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the node and its partitions.
    Start(commands::StartArgs),
    /// Configuration operations.
    Config(commands::ConfigArgs),
    /// Interactive console against a single partition.
    Console(commands::ConsoleArgs),
}
