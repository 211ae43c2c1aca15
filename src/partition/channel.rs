//! Pub/sub channel bound to a single topic.
//!
//! A [`Subscriber`] is a clonable handle to an external receiver. Messages
//! are pushed onto an unbounded queue, so broadcasting never waits on a slow
//! subscriber. The receiving half is a [`SubscriberInbox`]; dropping it is how
//! a subscriber terminates, and the partition observes that through
//! [`Subscriber::closed`].
//!
//! There is no back-pressure: a live subscriber that never reads keeps every
//! undelivered message in memory, and its queue grows with each publish until
//! the inbox is drained or dropped.

use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

static NEXT_SUBSCRIBER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique subscriber identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A message delivered to a subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Topic the message was published to.
    pub topic: Bytes,
    /// Published payload.
    pub message: Bytes,
}

/// Handle to a subscriber that can receive deliveries and be monitored for
/// termination.
///
/// The delivery queue is unbounded; memory held for a subscriber is bounded
/// only by how quickly its inbox is read.
#[derive(Debug, Clone)]
pub struct Subscriber {
    id: SubscriberId,
    tx: mpsc::UnboundedSender<Delivery>,
}

impl Subscriber {
    /// Create a new subscriber identity and its receiving inbox.
    pub fn new() -> (Self, SubscriberInbox) {
        let id = SubscriberId(NEXT_SUBSCRIBER_ID.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { id, tx }, SubscriberInbox { id, rx })
    }

    /// Get the subscriber identifier.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Check if the subscriber has terminated.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Wait until the subscriber terminates.
    pub async fn closed(&self) {
        self.tx.closed().await
    }

    /// Enqueue a delivery. Returns false if the subscriber has terminated.
    pub fn deliver(&self, delivery: Delivery) -> bool {
        self.tx.send(delivery).is_ok()
    }
}

/// Receiving side of a subscriber.
#[derive(Debug)]
pub struct SubscriberInbox {
    id: SubscriberId,
    rx: mpsc::UnboundedReceiver<Delivery>,
}

impl SubscriberInbox {
    /// Identifier of the subscriber that owns this inbox.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Receive the next delivery, or `None` once every handle is gone.
    pub async fn recv(&mut self) -> Option<Delivery> {
        self.rx.recv().await
    }

    /// Receive a delivery if one is already queued.
    pub fn try_recv(&mut self) -> Option<Delivery> {
        self.rx.try_recv().ok()
    }
}

/// Outcome of a broadcast.
#[derive(Debug, Default)]
pub struct BroadcastOutcome {
    /// Subscribers the message was enqueued for.
    pub delivered: usize,
    /// Subscribers found terminated; they were not counted.
    pub terminated: Vec<SubscriberId>,
}

/// A channel and its current subscriber set.
#[derive(Debug)]
pub struct Channel {
    topic: Bytes,
    subscribers: HashMap<SubscriberId, Subscriber>,
}

impl Channel {
    /// Create a channel with no subscribers.
    pub fn new(topic: Bytes) -> Self {
        Self {
            topic,
            subscribers: HashMap::new(),
        }
    }

    /// Get the channel topic.
    pub fn topic(&self) -> &Bytes {
        &self.topic
    }

    /// Add a subscriber. Returns false if it was already subscribed.
    pub fn subscribe(&mut self, subscriber: &Subscriber) -> bool {
        self.subscribers
            .insert(subscriber.id(), subscriber.clone())
            .is_none()
    }

    /// Remove a subscriber. Removing an absent subscriber is a no-op.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    /// Number of current subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Enqueue a message for every live subscriber.
    ///
    /// Terminated subscribers are reported back to the caller and left in
    /// place; removing them is the tracker's job.
    pub fn broadcast(&self, message: &Bytes) -> BroadcastOutcome {
        let mut outcome = BroadcastOutcome::default();

        for (id, subscriber) in &self.subscribers {
            let delivery = Delivery {
                topic: self.topic.clone(),
                message: message.clone(),
            };
            if subscriber.deliver(delivery) {
                outcome.delivered += 1;
            } else {
                outcome.terminated.push(*id);
            }
        }

        outcome
    }
}
