//! Data-migration hooks.
//!
//! The coordination layer calls these when a partition moves between nodes.
//! They are placeholders: enumeration yields nothing and ingested entries are
//! discarded, so data does not survive a partition move. Pub/sub channels and
//! subscriptions are never part of a handoff.

use super::dispatcher::PartitionState;
use crate::core::error::PartkvResult;
use bytes::Bytes;

/// A key-value entry offered for transfer between nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffEntry {
    pub key: Bytes,
    pub value: Bytes,
}

impl PartitionState {
    /// Fold over the entries to hand off.
    ///
    /// Currently a pass-through: `acc` is returned untouched.
    pub fn fold_entries<A, F>(&self, acc: A, _fold: F) -> A
    where
        F: FnMut(A, HandoffEntry) -> A,
    {
        tracing::debug!(partition = self.index(), "handoff fold requested; nothing transferred");
        acc
    }

    /// Accept an entry handed off from another node.
    ///
    /// Currently discarded.
    pub fn ingest_entry(&mut self, entry: HandoffEntry) -> PartkvResult<()> {
        tracing::debug!(
            partition = self.index(),
            key_len = entry.key.len(),
            "handoff entry ignored"
        );
        Ok(())
    }
}
