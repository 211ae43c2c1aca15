//! Node-local partition table.
//!
//! The coordination layer decides which partitions live on this node; the
//! table only keeps their handles by index so commands can be delivered to
//! the right partition.

use super::channel::Subscriber;
use super::command::{Reply, Request};
use super::handle::PartitionHandle;
use super::{PartitionConfig, PartitionIndex};
use crate::core::error::{PartkvError, PartkvResult};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Running partitions on this node, indexed by partition.
#[derive(Debug, Default)]
pub struct PartitionTable {
    partitions: RwLock<HashMap<PartitionIndex, PartitionHandle>>,
}

impl PartitionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a partition and register its handle.
    pub fn start(
        &self,
        index: PartitionIndex,
        config: &PartitionConfig,
    ) -> PartkvResult<PartitionHandle> {
        let mut partitions = self.partitions.write();
        if partitions.contains_key(&index) {
            return Err(PartkvError::PartitionExists { index });
        }

        let handle = PartitionHandle::start(index, config);
        partitions.insert(index, handle.clone());
        Ok(handle)
    }

    /// Get the handle for a partition.
    pub fn get(&self, index: PartitionIndex) -> PartkvResult<PartitionHandle> {
        self.partitions
            .read()
            .get(&index)
            .cloned()
            .ok_or(PartkvError::PartitionNotFound { index })
    }

    /// Deliver a request to a partition.
    pub async fn dispatch(
        &self,
        index: PartitionIndex,
        request: Request,
        subscriber: &Subscriber,
    ) -> PartkvResult<Reply> {
        self.get(index)?.dispatch(request, subscriber).await
    }

    /// Stop a partition and remove it from the table.
    pub async fn stop(&self, index: PartitionIndex) -> PartkvResult<()> {
        let handle = self.take(index)?;
        handle.stop().await;
        Ok(())
    }

    /// Delete a partition's state, stop it and remove it from the table.
    pub async fn delete(&self, index: PartitionIndex) -> PartkvResult<()> {
        let handle = self.take(index)?;
        handle.delete().await
    }

    /// Stop every partition.
    pub async fn stop_all(&self) {
        let handles: Vec<PartitionHandle> = self.partitions.write().drain().map(|(_, h)| h).collect();
        for handle in handles {
            handle.stop().await;
        }
    }

    /// Indices of running partitions, in ascending order.
    pub fn indices(&self) -> Vec<PartitionIndex> {
        let mut indices: Vec<PartitionIndex> = self.partitions.read().keys().copied().collect();
        indices.sort_unstable();
        indices
    }

    /// Number of running partitions.
    pub fn len(&self) -> usize {
        self.partitions.read().len()
    }

    /// Check if no partition is running.
    pub fn is_empty(&self) -> bool {
        self.partitions.read().is_empty()
    }

    fn take(&self, index: PartitionIndex) -> PartkvResult<PartitionHandle> {
        self.partitions
            .write()
            .remove(&index)
            .ok_or(PartkvError::PartitionNotFound { index })
    }
}
