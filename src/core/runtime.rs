//! Node runtime orchestration.
//!
//! The runtime starts the configured partitions, waits for a shutdown signal
//! and stops every partition on the way out.

use crate::core::config::Config;
use crate::partition::{PartitionConfig, PartitionTable};
use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Component health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentHealth {
    /// Component is starting.
    Starting,
    /// Component is healthy and operational.
    Healthy,
    /// Component has failed.
    Failed,
    /// Component is stopping.
    Stopping,
    /// Component has stopped.
    Stopped,
}

/// Health status of the runtime.
#[derive(Debug, Clone)]
pub struct RuntimeHealth {
    /// Partition table health.
    pub partitions: ComponentHealth,
}

impl Default for RuntimeHealth {
    fn default() -> Self {
        Self {
            partitions: ComponentHealth::Starting,
        }
    }
}

impl RuntimeHealth {
    /// Check if the runtime is ready to serve commands.
    pub fn is_ready(&self) -> bool {
        self.partitions == ComponentHealth::Healthy
    }
}

/// partkv runtime holding the node's partitions.
pub struct Runtime {
    /// Configuration.
    config: Arc<Config>,

    /// Running partitions.
    partitions: Arc<PartitionTable>,

    /// Runtime health status.
    health: RuntimeHealth,

    /// Whether the runtime is running.
    running: Arc<AtomicBool>,

    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,

    /// Shutdown signal receiver.
    shutdown_rx: watch::Receiver<bool>,
}

impl Runtime {
    /// Create a new runtime with the given configuration.
    pub fn new(config: Config) -> Result<Self> {
        config.validate().context("invalid configuration")?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            config: Arc::new(config),
            partitions: Arc::new(PartitionTable::new()),
            health: RuntimeHealth::default(),
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the partition table.
    pub fn partitions(&self) -> &Arc<PartitionTable> {
        &self.partitions
    }

    /// Get the current health status.
    pub fn health(&self) -> &RuntimeHealth {
        &self.health
    }

    /// Check if the runtime is ready to serve commands.
    pub fn is_ready(&self) -> bool {
        self.health.is_ready()
    }

    /// Check if the runtime is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Start partitions `0..node.partition_count`.
    pub async fn start(&mut self) -> Result<()> {
        let count = self.config.node.partition_count;
        tracing::info!(partitions = count, "starting partkv runtime");

        let partition_config = PartitionConfig::from(&self.config.node);
        for index in 0..count {
            if let Err(e) = self.partitions.start(index, &partition_config) {
                self.health.partitions = ComponentHealth::Failed;
                tracing::error!(partition = index, error = %e, "partition failed to start");
                self.partitions.stop_all().await;
                return Err(e).with_context(|| format!("failed to start partition {index}"));
            }
        }

        self.health.partitions = ComponentHealth::Healthy;
        self.running.store(true, Ordering::Release);
        tracing::info!("partkv runtime started");
        Ok(())
    }

    /// Trigger graceful shutdown.
    pub fn shutdown(&self) {
        tracing::info!("shutdown requested");
        let _ = self.shutdown_tx.send(true);
    }

    /// Wait for shutdown signal.
    pub async fn wait_for_shutdown(&self) {
        let mut rx = self.shutdown_rx.clone();
        while !*rx.borrow() {
            if rx.changed().await.is_err() {
                break;
            }
        }
    }

    /// Run the runtime until ctrl-c or a shutdown request.
    pub async fn run(&mut self) -> Result<()> {
        self.start().await?;

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!("shutdown signal received (SIGINT)");
            }
            _ = self.wait_for_shutdown() => {
                tracing::info!("shutdown requested by component");
            }
        }

        self.stop().await
    }

    /// Stop every partition.
    pub async fn stop(&mut self) -> Result<()> {
        tracing::info!("stopping partkv runtime");
        self.running.store(false, Ordering::Release);
        let _ = self.shutdown_tx.send(true);

        self.health.partitions = ComponentHealth::Stopping;
        self.partitions.stop_all().await;
        self.health.partitions = ComponentHealth::Stopped;

        tracing::info!("partkv runtime stopped");
        Ok(())
    }
}
