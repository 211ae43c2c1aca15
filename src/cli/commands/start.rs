//! Start command implementation.

use super::{init_tracing, load_config};
use crate::core::config::ConfigOverrides;
use crate::core::runtime::Runtime;
use anyhow::Result;
use clap::Args;
use std::path::Path;

/// Start the partkv node.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Override node.partition_count.
    #[arg(long)]
    pub partitions: Option<u32>,
}

/// Run the start command.
pub async fn run_start(
    args: StartArgs,
    config_path: Option<&Path>,
    log_level: Option<String>,
) -> Result<()> {
    let overrides = ConfigOverrides {
        log_level,
        partition_count: args.partitions,
    };
    let config = load_config(config_path, &overrides)?;
    init_tracing(&config.telemetry.log_level);

    let mut runtime = Runtime::new(config)?;
    runtime.run().await
}
