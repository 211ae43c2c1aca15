//! Partition runtime.
//!
//! A partition is an independent shard of the key space and the topic space,
//! processed by one serialization domain. This module contains:
//! - [`store`] - Key-value table
//! - [`channel`] - Pub/sub channel and subscriber identities
//! - [`registry`] - Topic → channel registry
//! - [`tracker`] - Subscriber → topics reverse index for crash cleanup
//! - [`command`] - Typed requests, commands and replies
//! - [`dispatcher`] - Partition state and command execution
//! - [`handle`] - Partition task and lifecycle entry points
//! - [`handoff`] - Data-migration hooks
//! - [`table`] - Node-local partition table

pub mod channel;
pub mod command;
pub mod dispatcher;
pub mod handle;
pub mod handoff;
pub mod registry;
pub mod store;
pub mod table;
pub mod tracker;

use crate::core::config::NodeConfig;

pub use channel::{Delivery, Subscriber, SubscriberId, SubscriberInbox};
pub use command::{Command, Reply, Request};
pub use dispatcher::PartitionState;
pub use handle::PartitionHandle;
pub use handoff::HandoffEntry;
pub use table::PartitionTable;

/// Partition identifier assigned by the coordination layer.
pub type PartitionIndex = u32;

/// Settings for a single partition task.
#[derive(Debug, Clone)]
pub struct PartitionConfig {
    /// Capacity of the partition's inbox.
    pub inbox_capacity: usize,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            inbox_capacity: 1024,
        }
    }
}

impl From<&NodeConfig> for PartitionConfig {
    fn from(node: &NodeConfig) -> Self {
        Self {
            inbox_capacity: node.inbox_capacity,
        }
    }
}

/// Statistics for a partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionStats {
    /// Partition index.
    pub index: PartitionIndex,
    /// Number of key-value entries.
    pub keys: usize,
    /// Number of channels, including those with no subscribers.
    pub channels: usize,
    /// Number of subscribers holding at least one topic.
    pub tracked_subscribers: usize,
    /// Commands executed since start.
    pub commands_executed: u64,
    /// Termination monitors spawned since start.
    pub monitors_started: u64,
}
