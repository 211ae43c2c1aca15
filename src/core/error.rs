//! Error types for partition commands and lifecycle.
//!
//! Absence is not an error: GET of a missing key and DEL of a missing key
//! return distinguished empty results instead of failing. Everything here is
//! surfaced to the caller as a typed result and never crashes a partition.

use bytes::Bytes;
use thiserror::Error;

use crate::partition::PartitionIndex;

/// Common partkv error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartkvError {
    /// UNSUBSCRIBE on a topic that has no live channel in this partition.
    #[error("NotSubscribed: no channel for topic {}", display_bytes(.topic))]
    NotSubscribed { topic: Bytes },

    /// Unrecognized command name, or a known name with the wrong arguments.
    #[error("UnknownCommand: {command} ({} args)", .args.len())]
    UnknownCommand { command: String, args: Vec<Bytes> },

    /// The partition task is no longer running.
    #[error("partition {index} is stopped")]
    PartitionStopped { index: PartitionIndex },

    /// No partition with this index is running on the node.
    #[error("partition {index} not found")]
    PartitionNotFound { index: PartitionIndex },

    /// A partition with this index is already running on the node.
    #[error("partition {index} already started")]
    PartitionExists { index: PartitionIndex },
}

impl PartkvError {
    /// Create a NotSubscribed error.
    pub fn not_subscribed(topic: impl Into<Bytes>) -> Self {
        Self::NotSubscribed {
            topic: topic.into(),
        }
    }

    /// Create an UnknownCommand error.
    pub fn unknown_command(command: impl Into<String>, args: Vec<Bytes>) -> Self {
        Self::UnknownCommand {
            command: command.into(),
            args,
        }
    }

    /// Check if this error was caused by the request itself rather than
    /// by the partition lifecycle.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotSubscribed { .. } | Self::UnknownCommand { .. }
        )
    }
}

/// Result type using PartkvError.
pub type PartkvResult<T> = Result<T, PartkvError>;

fn display_bytes(bytes: &Bytes) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
