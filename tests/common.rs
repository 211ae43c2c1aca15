//! Common test utilities.
//!
//! This module contains shared helpers for integration tests.
//! Import with `mod common;` in test files.

#![allow(dead_code)]

use partkv::partition::{PartitionConfig, PartitionHandle, PartitionStats};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

/// Create a minimal valid configuration file.
pub fn create_minimal_config() -> NamedTempFile {
    write_config(
        r#"
[node]
partition_count = 2
"#,
    )
}

/// Create a configuration file with the given content.
pub fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write config");
    file
}

/// Start a partition with default settings.
pub fn start_partition(index: u32) -> PartitionHandle {
    PartitionHandle::start(index, &PartitionConfig::default())
}

/// Poll partition stats until `predicate` holds, or panic after ~1s.
pub async fn wait_for_stats<F>(handle: &PartitionHandle, predicate: F) -> PartitionStats
where
    F: Fn(&PartitionStats) -> bool,
{
    for _ in 0..200 {
        let stats = handle.stats().await.expect("partition stopped");
        if predicate(&stats) {
            return stats;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("partition stats never reached the expected state");
}
