//! Typed partition commands and replies.
//!
//! Callers submit a [`Request`] (a command name plus an argument list). The
//! dispatcher parses it into a [`Command`]; anything that does not match a
//! known name and arity becomes `UnknownCommand`, carrying the original
//! name and arguments.

use super::PartitionIndex;
use crate::core::error::{PartkvError, PartkvResult};
use bytes::Bytes;

/// A command as submitted by the coordination layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Command name, matched ASCII case-insensitively.
    pub name: String,
    /// Positional arguments.
    pub args: Vec<Bytes>,
}

impl Request {
    /// Create a request from a name and arguments.
    pub fn new<I, A>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Bytes>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Liveness probe.
    pub fn ping() -> Self {
        Self::new("PING", Vec::<Bytes>::new())
    }

    pub fn set(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self::new("SET", [key.into(), value.into()])
    }

    pub fn get(key: impl Into<Bytes>) -> Self {
        Self::new("GET", [key.into()])
    }

    pub fn del(key: impl Into<Bytes>) -> Self {
        Self::new("DEL", [key.into()])
    }

    pub fn subscribe(topic: impl Into<Bytes>) -> Self {
        Self::new("SUBSCRIBE", [topic.into()])
    }

    pub fn unsubscribe(topic: impl Into<Bytes>) -> Self {
        Self::new("UNSUBSCRIBE", [topic.into()])
    }

    pub fn publish(topic: impl Into<Bytes>, message: impl Into<Bytes>) -> Self {
        Self::new("PUBLISH", [topic.into(), message.into()])
    }
}

/// A parsed partition command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Liveness probe; touches no state.
    Ping,
    /// Insert or overwrite a key.
    Set { key: Bytes, value: Bytes },
    /// Read a key.
    Get { key: Bytes },
    /// Remove a key.
    Del { key: Bytes },
    /// Join a topic's channel.
    Subscribe { topic: Bytes },
    /// Leave a topic's channel.
    Unsubscribe { topic: Bytes },
    /// Broadcast a message to a topic's subscribers.
    Publish { topic: Bytes, message: Bytes },
}

impl Command {
    /// Parse a request into a command.
    pub fn parse(request: Request) -> PartkvResult<Self> {
        let name = request.name.to_ascii_uppercase();
        let command = match (name.as_str(), request.args.as_slice()) {
            ("PING", []) => Self::Ping,
            ("SET", [key, value]) => Self::Set {
                key: key.clone(),
                value: value.clone(),
            },
            ("GET", [key]) => Self::Get { key: key.clone() },
            ("DEL", [key]) => Self::Del { key: key.clone() },
            ("SUBSCRIBE", [topic]) => Self::Subscribe {
                topic: topic.clone(),
            },
            ("UNSUBSCRIBE", [topic]) => Self::Unsubscribe {
                topic: topic.clone(),
            },
            ("PUBLISH", [topic, message]) => Self::Publish {
                topic: topic.clone(),
                message: message.clone(),
            },
            _ => return Err(PartkvError::unknown_command(request.name, request.args)),
        };
        Ok(command)
    }

    /// Check if the caller waits for a reply. SUBSCRIBE is fire-and-forget.
    pub fn expects_reply(&self) -> bool {
        !matches!(self, Self::Subscribe { .. })
    }

    /// Command name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ping => "PING",
            Self::Set { .. } => "SET",
            Self::Get { .. } => "GET",
            Self::Del { .. } => "DEL",
            Self::Subscribe { .. } => "SUBSCRIBE",
            Self::Unsubscribe { .. } => "UNSUBSCRIBE",
            Self::Publish { .. } => "PUBLISH",
        }
    }
}

/// Result of a successfully executed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Command succeeded with nothing to return.
    Ok,
    /// GET result; `None` marks an absent key.
    Value(Option<Bytes>),
    /// DEL result: number of entries removed (0 or 1).
    Deleted(u64),
    /// PUBLISH result: number of subscribers the message was enqueued for.
    Published(usize),
    /// PING result: the partition index.
    Pong(PartitionIndex),
    /// Fire-and-forget command; no reply is produced.
    NoReply,
}
