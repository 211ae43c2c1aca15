//! In-memory key-value table.
//!
//! Keys and values are opaque byte strings. Overwrites are last-write-wins.

use bytes::Bytes;
use std::collections::HashMap;

/// Key-value table owned by one partition.
#[derive(Debug, Default)]
pub struct KvStore {
    /// key → value.
    entries: HashMap<Bytes, Bytes>,
}

impl KvStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a key.
    pub fn put(&mut self, key: Bytes, value: Bytes) {
        self.entries.insert(key, value);
    }

    /// Get a key's current value.
    pub fn get(&self, key: &[u8]) -> Option<&Bytes> {
        self.entries.get(key)
    }

    /// Delete a key.
    ///
    /// Returns the number of entries removed (0 or 1).
    pub fn delete(&mut self, key: &[u8]) -> u64 {
        u64::from(self.entries.remove(key).is_some())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
