//! Partition task and lifecycle entry points.
//!
//! Each partition runs as one tokio task that owns its [`PartitionState`] and
//! drains a bounded inbox. Commands, termination notifications and lifecycle
//! requests all go through that inbox, which makes the task the partition's
//! single serialization point. Partitions share nothing, so any number of
//! them run in parallel.

use super::channel::{Subscriber, SubscriberId};
use super::command::{Command, Reply, Request};
use super::dispatcher::PartitionState;
use super::handoff::HandoffEntry;
use super::{PartitionConfig, PartitionIndex, PartitionStats};
use crate::core::error::{PartkvError, PartkvResult};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{AbortHandle, JoinHandle};

/// Messages accepted by a partition task.
pub(crate) enum PartitionMsg {
    Execute {
        command: Command,
        subscriber: Subscriber,
        reply: Option<oneshot::Sender<PartkvResult<Reply>>>,
    },
    Down(SubscriberId),
    IsEmpty(oneshot::Sender<bool>),
    Stats(oneshot::Sender<PartitionStats>),
    HandoffFold(oneshot::Sender<Vec<HandoffEntry>>),
    HandoffIngest {
        entry: HandoffEntry,
        reply: oneshot::Sender<PartkvResult<()>>,
    },
    Delete(oneshot::Sender<()>),
    Stop,
}

/// Spawns termination monitors that report back into a partition inbox.
///
/// Holds a weak sender, so outstanding monitors never keep a partition alive.
#[derive(Debug, Clone)]
pub(crate) struct DownNotifier {
    index: PartitionIndex,
    inbox: mpsc::WeakSender<PartitionMsg>,
}

impl DownNotifier {
    /// Start watching a subscriber. When it terminates, `Down` is enqueued.
    pub(crate) fn watch(&self, subscriber: &Subscriber) -> AbortHandle {
        let subscriber = subscriber.clone();
        let inbox = self.inbox.clone();
        let index = self.index;

        let task = tokio::spawn(async move {
            subscriber.closed().await;
            let id = subscriber.id();
            drop(subscriber);

            let Some(inbox) = inbox.upgrade() else {
                return;
            };
            if inbox.send(PartitionMsg::Down(id)).await.is_ok() {
                tracing::debug!(partition = index, subscriber = %id, "subscriber terminated");
            }
        });
        task.abort_handle()
    }
}

impl std::fmt::Debug for PartitionMsg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Execute { command, .. } => write!(f, "Execute({})", command.name()),
            Self::Down(id) => write!(f, "Down({id})"),
            Self::IsEmpty(_) => write!(f, "IsEmpty"),
            Self::Stats(_) => write!(f, "Stats"),
            Self::HandoffFold(_) => write!(f, "HandoffFold"),
            Self::HandoffIngest { .. } => write!(f, "HandoffIngest"),
            Self::Delete(_) => write!(f, "Delete"),
            Self::Stop => write!(f, "Stop"),
        }
    }
}

/// Handle to a running partition.
///
/// Cheap to clone; every clone talks to the same partition task.
#[derive(Debug, Clone)]
pub struct PartitionHandle {
    index: PartitionIndex,
    tx: mpsc::Sender<PartitionMsg>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl PartitionHandle {
    /// Start a partition task. Must be called inside a tokio runtime.
    pub fn start(index: PartitionIndex, config: &PartitionConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.inbox_capacity.max(1));
        let notifier = DownNotifier {
            index,
            inbox: tx.downgrade(),
        };
        let state = PartitionState::with_notifier(index, notifier);
        let task = tokio::spawn(run_partition(state, rx));

        Self {
            index,
            tx,
            task: Arc::new(Mutex::new(Some(task))),
        }
    }

    /// Get the partition index.
    pub fn index(&self) -> PartitionIndex {
        self.index
    }

    /// Check if the partition task has stopped accepting messages.
    pub fn is_stopped(&self) -> bool {
        self.tx.is_closed()
    }

    /// Submit a request on behalf of `subscriber`.
    ///
    /// SUBSCRIBE is enqueued without waiting for the partition and returns
    /// [`Reply::NoReply`]. Every other command waits for its result.
    pub async fn dispatch(&self, request: Request, subscriber: &Subscriber) -> PartkvResult<Reply> {
        let command = Command::parse(request)?;

        if !command.expects_reply() {
            self.send(PartitionMsg::Execute {
                command,
                subscriber: subscriber.clone(),
                reply: None,
            })
            .await?;
            return Ok(Reply::NoReply);
        }

        let (reply, rx) = oneshot::channel();
        self.send(PartitionMsg::Execute {
            command,
            subscriber: subscriber.clone(),
            reply: Some(reply),
        })
        .await?;
        rx.await.map_err(|_| self.stopped())?
    }

    /// Deliver a termination notification for a subscriber.
    ///
    /// Serialized with commands like any other message; unknown or repeated
    /// notifications are absorbed by the partition.
    pub async fn notify_down(&self, id: SubscriberId) -> PartkvResult<()> {
        self.send(PartitionMsg::Down(id)).await
    }

    /// Check if the partition's key-value store and channel registry are empty.
    pub async fn is_empty(&self) -> PartkvResult<bool> {
        self.request(PartitionMsg::IsEmpty).await
    }

    /// Get statistics about the partition.
    pub async fn stats(&self) -> PartkvResult<PartitionStats> {
        self.request(PartitionMsg::Stats).await
    }

    /// Enumerate entries for transfer to another node.
    pub async fn handoff_entries(&self) -> PartkvResult<Vec<HandoffEntry>> {
        self.request(PartitionMsg::HandoffFold).await
    }

    /// Offer an entry received from another node.
    pub async fn handoff_ingest(&self, entry: HandoffEntry) -> PartkvResult<()> {
        self.request(|reply| PartitionMsg::HandoffIngest { entry, reply })
            .await?
    }

    /// Stop the partition and wait for its task to finish.
    ///
    /// Messages already queued ahead of the stop are processed first.
    /// Stopping an already stopped partition is a no-op.
    pub async fn stop(&self) {
        if self.tx.send(PartitionMsg::Stop).await.is_err() {
            tracing::trace!(partition = self.index, "stop on stopped partition");
        }
        self.join().await;
    }

    /// Drop all partition state, then stop the partition.
    pub async fn delete(&self) -> PartkvResult<()> {
        self.request(PartitionMsg::Delete).await?;
        self.join().await;
        Ok(())
    }

    async fn join(&self) {
        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::error!(partition = self.index, error = %e, "partition task failed");
            }
        }
    }

    async fn send(&self, msg: PartitionMsg) -> PartkvResult<()> {
        self.tx.send(msg).await.map_err(|_| self.stopped())
    }

    async fn request<T>(
        &self,
        msg: impl FnOnce(oneshot::Sender<T>) -> PartitionMsg,
    ) -> PartkvResult<T> {
        let (reply, rx) = oneshot::channel();
        self.send(msg(reply)).await?;
        rx.await.map_err(|_| self.stopped())
    }

    fn stopped(&self) -> PartkvError {
        PartkvError::PartitionStopped { index: self.index }
    }
}

async fn run_partition(mut state: PartitionState, mut rx: mpsc::Receiver<PartitionMsg>) {
    let index = state.index();
    tracing::info!(partition = index, "partition started");

    while let Some(msg) = rx.recv().await {
        match msg {
            PartitionMsg::Execute {
                command,
                subscriber,
                reply,
            } => {
                let name = command.name();
                let result = state.execute(command, &subscriber);
                match reply {
                    Some(reply) => {
                        let _ = reply.send(result);
                    }
                    None => {
                        if let Err(e) = result {
                            tracing::warn!(partition = index, command = name, error = %e, "command failed");
                        }
                    }
                }
            }
            PartitionMsg::Down(id) => {
                state.handle_down(id);
            }
            PartitionMsg::IsEmpty(reply) => {
                let _ = reply.send(state.is_empty());
            }
            PartitionMsg::Stats(reply) => {
                let _ = reply.send(state.stats());
            }
            PartitionMsg::HandoffFold(reply) => {
                let entries = state.fold_entries(Vec::new(), |mut acc, entry| {
                    acc.push(entry);
                    acc
                });
                let _ = reply.send(entries);
            }
            PartitionMsg::HandoffIngest { entry, reply } => {
                let _ = reply.send(state.ingest_entry(entry));
            }
            PartitionMsg::Delete(reply) => {
                state.clear();
                tracing::info!(partition = index, "partition deleted");
                let _ = reply.send(());
                break;
            }
            PartitionMsg::Stop => break,
        }
    }

    rx.close();
    tracing::info!(partition = index, "partition stopped");
}
