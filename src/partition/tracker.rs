//! Reverse index from subscriber to subscribed topics.
//!
//! The tracker lets a terminated subscriber be removed from exactly the
//! channels it joined, in time proportional to its own subscription count.
//! It also owns the monitor task watching each tracked subscriber; a
//! subscriber is tracked (and monitored) while it holds at least one topic.

use super::channel::SubscriberId;
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use tokio::task::AbortHandle;

#[derive(Debug, Default)]
struct TrackedSubscriber {
    topics: HashSet<Bytes>,
    monitor: Option<AbortHandle>,
}

impl TrackedSubscriber {
    fn stop_monitor(&mut self) {
        if let Some(monitor) = self.monitor.take() {
            monitor.abort();
        }
    }
}

/// Subscriber → topic-set index for one partition.
#[derive(Debug, Default)]
pub struct SubscriberTracker {
    entries: HashMap<SubscriberId, TrackedSubscriber>,
}

impl SubscriberTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a subscriber holds a topic.
    ///
    /// Returns true if this is the subscriber's first tracked topic, meaning
    /// the caller must start monitoring it.
    pub fn track(&mut self, id: SubscriberId, topic: Bytes) -> bool {
        let first = !self.entries.contains_key(&id);
        self.entries.entry(id).or_default().topics.insert(topic);
        first
    }

    /// Attach the monitor task for a tracked subscriber.
    ///
    /// A monitor for an untracked subscriber is aborted immediately.
    pub fn set_monitor(&mut self, id: SubscriberId, monitor: AbortHandle) {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.stop_monitor();
                entry.monitor = Some(monitor);
            }
            None => monitor.abort(),
        }
    }

    /// Check if a subscriber currently has a monitor attached.
    pub fn is_monitored(&self, id: SubscriberId) -> bool {
        self.entries
            .get(&id)
            .is_some_and(|entry| entry.monitor.is_some())
    }

    /// Forget one topic for a subscriber.
    ///
    /// When the last topic goes, the entry is dropped and its monitor
    /// stopped. Returns true if the entry was dropped.
    pub fn untrack(&mut self, id: SubscriberId, topic: &[u8]) -> bool {
        let Some(entry) = self.entries.get_mut(&id) else {
            return false;
        };
        entry.topics.remove(topic);
        if !entry.topics.is_empty() {
            return false;
        }

        if let Some(mut entry) = self.entries.remove(&id) {
            entry.stop_monitor();
        }
        true
    }

    /// Drop a subscriber entirely, returning the topics it held.
    ///
    /// Unknown subscribers yield `None`.
    pub fn remove(&mut self, id: SubscriberId) -> Option<HashSet<Bytes>> {
        let mut entry = self.entries.remove(&id)?;
        entry.stop_monitor();
        Some(entry.topics)
    }

    /// Topics currently held by a subscriber.
    pub fn topics(&self, id: SubscriberId) -> Option<&HashSet<Bytes>> {
        self.entries.get(&id).map(|entry| &entry.topics)
    }

    /// Check if a subscriber is tracked.
    pub fn is_tracked(&self, id: SubscriberId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of tracked subscribers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no subscriber is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry and stop every monitor.
    pub fn clear(&mut self) {
        for entry in self.entries.values_mut() {
            entry.stop_monitor();
        }
        self.entries.clear();
    }
}

impl Drop for SubscriberTracker {
    fn drop(&mut self) {
        self.clear();
    }
}
