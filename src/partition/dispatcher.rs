//! Partition state and command execution.
//!
//! [`PartitionState`] owns the key-value store, channel registry and
//! subscriber tracker of one partition. It is driven by a single task (see
//! [`super::handle`]), so commands and termination notifications are applied
//! strictly one at a time and no locking is needed inside.
//!
//! Invariant: a subscriber is in channel C's set iff C's topic is in that
//! subscriber's tracked set.

use super::channel::{Subscriber, SubscriberId};
use super::command::{Command, Reply};
use super::handle::DownNotifier;
use super::registry::ChannelRegistry;
use super::store::KvStore;
use super::tracker::SubscriberTracker;
use super::{PartitionIndex, PartitionStats};
use crate::core::error::{PartkvError, PartkvResult};
use bytes::Bytes;

/// State of a single partition.
#[derive(Debug)]
pub struct PartitionState {
    index: PartitionIndex,
    store: KvStore,
    registry: ChannelRegistry,
    tracker: SubscriberTracker,
    /// Source of termination monitors; `None` disables monitoring.
    notifier: Option<DownNotifier>,
    commands_executed: u64,
    monitors_started: u64,
}

impl PartitionState {
    /// Create partition state without termination monitoring.
    ///
    /// Terminated subscribers are then only noticed by PUBLISH or by an
    /// explicit [`PartitionState::handle_down`].
    pub fn new(index: PartitionIndex) -> Self {
        Self {
            index,
            store: KvStore::new(),
            registry: ChannelRegistry::new(),
            tracker: SubscriberTracker::new(),
            notifier: None,
            commands_executed: 0,
            monitors_started: 0,
        }
    }

    /// Create partition state that monitors subscribers through `notifier`.
    pub(crate) fn with_notifier(index: PartitionIndex, notifier: DownNotifier) -> Self {
        Self {
            notifier: Some(notifier),
            ..Self::new(index)
        }
    }

    /// Get the partition index.
    pub fn index(&self) -> PartitionIndex {
        self.index
    }

    /// Execute one command on behalf of `subscriber`.
    pub fn execute(&mut self, command: Command, subscriber: &Subscriber) -> PartkvResult<Reply> {
        self.commands_executed += 1;
        tracing::trace!(
            partition = self.index,
            subscriber = %subscriber.id(),
            command = command.name(),
            "executing command"
        );

        match command {
            Command::Ping => Ok(Reply::Pong(self.index)),
            Command::Set { key, value } => {
                self.store.put(key, value);
                Ok(Reply::Ok)
            }
            Command::Get { key } => Ok(Reply::Value(self.store.get(&key).cloned())),
            Command::Del { key } => Ok(Reply::Deleted(self.store.delete(&key))),
            Command::Subscribe { topic } => {
                self.subscribe(topic, subscriber);
                Ok(Reply::NoReply)
            }
            Command::Unsubscribe { topic } => {
                self.unsubscribe(&topic, subscriber.id())?;
                Ok(Reply::Ok)
            }
            Command::Publish { topic, message } => {
                Ok(Reply::Published(self.publish(&topic, &message)))
            }
        }
    }

    fn subscribe(&mut self, topic: Bytes, subscriber: &Subscriber) {
        let id = subscriber.id();
        self.registry.get_or_create(&topic).subscribe(subscriber);

        if self.tracker.track(id, topic) {
            if let Some(ref notifier) = self.notifier {
                let monitor = notifier.watch(subscriber);
                self.tracker.set_monitor(id, monitor);
                self.monitors_started += 1;
                tracing::debug!(partition = self.index, subscriber = %id, "monitoring subscriber");
            }
        }
    }

    fn unsubscribe(&mut self, topic: &Bytes, id: SubscriberId) -> PartkvResult<()> {
        let channel = self
            .registry
            .get_existing_mut(topic)
            .ok_or_else(|| PartkvError::not_subscribed(topic.clone()))?;
        channel.unsubscribe(id);

        if self.tracker.untrack(id, topic) {
            tracing::debug!(partition = self.index, subscriber = %id, "subscriber no longer tracked");
        }
        Ok(())
    }

    fn publish(&mut self, topic: &Bytes, message: &Bytes) -> usize {
        let Some(channel) = self.registry.get_existing(topic) else {
            return 0;
        };
        let outcome = channel.broadcast(message);

        for id in outcome.terminated {
            self.handle_down(id);
        }
        outcome.delivered
    }

    /// Remove a terminated subscriber from every channel it joined.
    ///
    /// Runs in time proportional to the subscriber's own subscriptions.
    /// Unknown or already-removed subscribers are ignored. Returns the number
    /// of topics the subscriber was removed from.
    pub fn handle_down(&mut self, id: SubscriberId) -> usize {
        let Some(topics) = self.tracker.remove(id) else {
            tracing::trace!(partition = self.index, subscriber = %id, "down for untracked subscriber");
            return 0;
        };

        for topic in &topics {
            if let Some(channel) = self.registry.get_existing_mut(topic) {
                channel.unsubscribe(id);
            }
        }

        tracing::debug!(
            partition = self.index,
            subscriber = %id,
            topics = topics.len(),
            "terminated subscriber cleaned up"
        );
        topics.len()
    }

    /// Number of subscribers in a topic's channel, or `None` if the topic
    /// has no channel.
    pub fn subscriber_count(&self, topic: &[u8]) -> Option<usize> {
        self.registry
            .get_existing(topic)
            .map(|channel| channel.subscriber_count())
    }

    /// Check if a subscriber is tracked by this partition.
    pub fn is_tracked(&self, id: SubscriberId) -> bool {
        self.tracker.is_tracked(id)
    }

    /// Check if the key-value store and channel registry hold no entries.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty() && self.registry.is_empty()
    }

    /// Drop all entries, channels and subscriber monitors.
    pub fn clear(&mut self) {
        self.store.clear();
        self.registry.clear();
        self.tracker.clear();
    }

    /// Get statistics about the partition.
    pub fn stats(&self) -> PartitionStats {
        PartitionStats {
            index: self.index,
            keys: self.store.len(),
            channels: self.registry.len(),
            tracked_subscribers: self.tracker.len(),
            commands_executed: self.commands_executed,
            monitors_started: self.monitors_started,
        }
    }
}
