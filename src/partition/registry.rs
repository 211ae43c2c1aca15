//! Topic → channel registry.
//!
//! Channels are created on first use and are never removed while the
//! partition lives, even once their subscriber count reaches zero.
//!
//! Memory therefore grows with the number of distinct topics ever subscribed,
//! plus whatever each subscriber leaves unread in its unbounded delivery
//! queue (see [`super::channel`]).

use super::channel::Channel;
use bytes::Bytes;
use std::collections::HashMap;

/// Registry of the channels in one partition.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    channels: HashMap<Bytes, Channel>,
}

impl ChannelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the channel for a topic, creating an empty one if none exists.
    pub fn get_or_create(&mut self, topic: &Bytes) -> &mut Channel {
        self.channels
            .entry(topic.clone())
            .or_insert_with(|| {
                tracing::debug!(topic = %String::from_utf8_lossy(topic), "channel created");
                Channel::new(topic.clone())
            })
    }

    /// Look up an existing channel without creating one.
    pub fn get_existing(&self, topic: &[u8]) -> Option<&Channel> {
        self.channels.get(topic)
    }

    /// Mutable lookup of an existing channel.
    pub fn get_existing_mut(&mut self, topic: &[u8]) -> Option<&mut Channel> {
        self.channels.get_mut(topic)
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Check if the registry holds no channels.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Topics with a live channel.
    pub fn topics(&self) -> Vec<Bytes> {
        self.channels.keys().cloned().collect()
    }

    /// Drop every channel.
    pub fn clear(&mut self) {
        self.channels.clear();
    }
}
