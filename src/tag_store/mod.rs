//! Tag Store - authoritative owner of the tag set
//!
//! All reads and writes go through a single actor task that owns the
//! [`TagSet`]. Callers hold a cheap, cloneable [`TagStore`] handle and
//! exchange requests over an mpsc mailbox with oneshot replies, so every
//! operation is applied as if sequentially, in mailbox arrival order.

mod set;

use tokio::sync::{mpsc, oneshot};

use crate::error::StoreError;
use crate::types::Tag;

pub use set::TagSet;

/// Default mailbox capacity for the store actor
pub const DEFAULT_MAILBOX: usize = 256;

/// Request sent to the store actor.
enum TagCommand {
    Add {
        tags: Vec<Tag>,
        reply: oneshot::Sender<Vec<Tag>>,
    },
    Delete {
        tags: Vec<Tag>,
        reply: oneshot::Sender<Vec<Tag>>,
    },
    Retrieve {
        reply: oneshot::Sender<Vec<Tag>>,
    },
    Count {
        reply: oneshot::Sender<usize>,
    },
}

/// Handle to the tag store actor
#[derive(Clone)]
pub struct TagStore {
    tx: mpsc::Sender<TagCommand>,
}

impl TagStore {
    /// Spawn the store actor with the default mailbox capacity
    pub fn spawn() -> Self {
        Self::with_capacity(DEFAULT_MAILBOX)
    }

    /// Spawn the store actor with a custom mailbox capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        tokio::spawn(run_store(rx, TagSet::new()));
        Self { tx }
    }

    /// Insert tags not already present; returns the newly inserted ones
    pub async fn add_tags(&self, tags: Vec<Tag>) -> Result<Vec<Tag>, StoreError> {
        self.request(|reply| TagCommand::Add { tags, reply }).await
    }

    /// Remove tags matching by identity; returns the removed ones
    pub async fn delete_tags(&self, tags: Vec<Tag>) -> Result<Vec<Tag>, StoreError> {
        self.request(|reply| TagCommand::Delete { tags, reply }).await
    }

    /// Snapshot of all tags in insertion order
    pub async fn retrieve_tags(&self) -> Result<Vec<Tag>, StoreError> {
        self.request(|reply| TagCommand::Retrieve { reply }).await
    }

    /// Number of tags currently held
    pub async fn count(&self) -> Result<usize, StoreError> {
        self.request(|reply| TagCommand::Count { reply }).await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> TagCommand,
    ) -> Result<T, StoreError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(build(reply_tx))
            .await
            .map_err(|_| StoreError::Unavailable("mailbox closed"))?;
        reply_rx
            .await
            .map_err(|_| StoreError::Unavailable("reply dropped"))
    }
}

/// Actor loop: applies commands one at a time until every handle is dropped.
async fn run_store(mut rx: mpsc::Receiver<TagCommand>, mut set: TagSet) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            TagCommand::Add { tags, reply } => {
                let added = set.add(tags);
                tracing::debug!(added = added.len(), total = set.len(), "add tags");
                let _ = reply.send(added);
            }
            TagCommand::Delete { tags, reply } => {
                let removed = set.delete(tags);
                tracing::debug!(removed = removed.len(), total = set.len(), "delete tags");
                let _ = reply.send(removed);
            }
            TagCommand::Retrieve { reply } => {
                let _ = reply.send(set.snapshot());
            }
            TagCommand::Count { reply } => {
                let _ = reply.send(set.len());
            }
        }
    }
    tracing::debug!("tag store stopped");
}
