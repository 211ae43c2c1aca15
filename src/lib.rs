//! partkv - single-partition key-value and publish/subscribe runtime.
//!
//! partkv is the local runtime of one partition: a serialized command
//! processor that maintains a key-value table and a topic-keyed pub/sub
//! registry, and that cleans up subscriptions when a subscriber terminates
//! without warning. Placement, routing, membership and handoff belong to an
//! external coordination layer, which talks to partitions only through the
//! lifecycle and dispatch entry points exposed here.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   Coordination layer (external)                 │
//! │        placement │ routing │ membership │ handoff               │
//! └─────────────────────────────────────────────────────────────────┘
//!                                  │ start / dispatch / stop / delete
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 PartitionHandle (one task each)                 │
//! │        inbox: commands + termination notifications              │
//! └─────────────────────────────────────────────────────────────────┘
//!                                  │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        PartitionState                           │
//! │    KvStore │ ChannelRegistry │ SubscriberTracker                │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Module Organization
//!
//! ## Core
//! - [`core::config`] - Configuration parsing and validation
//! - [`core::runtime`] - Node runtime orchestration
//! - [`core::error`] - Error types
//!
//! ## Partition
//! - [`partition::store`] - Key-value table
//! - [`partition::channel`] - Channels and subscriber identities
//! - [`partition::registry`] - Topic → channel registry
//! - [`partition::tracker`] - Subscriber → topics reverse index
//! - [`partition::command`] - Requests, commands and replies
//! - [`partition::dispatcher`] - Partition state machine
//! - [`partition::handle`] - Partition task and lifecycle
//! - [`partition::handoff`] - Data-migration hooks
//! - [`partition::table`] - Node-local partition table
//!
//! ## CLI
//! - [`cli::commands`] - CLI command implementations
//!
//! # Key Invariants
//!
//! - Commands and termination notifications for one partition are applied
//!   strictly one at a time.
//! - A subscriber is in a channel's set iff the channel's topic is in the
//!   subscriber's tracked set.
//! - At most one channel exists per topic per partition; channels live as
//!   long as the partition.

// Core infrastructure
pub mod core;

// Partition runtime
pub mod partition;

// CLI
pub mod cli;

// Re-exports for convenience
pub use self::core::{config, error, runtime};
pub use partition::{
    channel, command, dispatcher, handle, handoff, registry, store, table, tracker,
};
