//! Connected client registry
//!
//! The set of live sessions is owned by a single actor task. Session loops
//! register and unregister through the [`ClientRegistry`] handle; the
//! broadcast hub only ever reads a snapshot.
//!
//! The mailbox is unbounded so that unregistering never has to wait, which
//! lets it run from `Drop` on every session exit path.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::error::{DeliveryError, RegistryError};

/// One connected client
///
/// Never mutated once registered.
#[derive(Clone, Debug)]
pub struct ClientSession {
    pub id: u64,
    /// Remote address of the peer
    pub peer: String,
    /// Unix timestamp of the upgrade
    pub connected_at: i64,
    outbound: mpsc::Sender<Arc<str>>,
}

impl ClientSession {
    pub fn new(id: u64, peer: impl Into<String>, outbound: mpsc::Sender<Arc<str>>) -> Self {
        Self {
            id,
            peer: peer.into(),
            connected_at: chrono::Utc::now().timestamp(),
            outbound,
        }
    }

    /// Queue a frame for this session's socket writer
    ///
    /// A full queue is waited on for up to `timeout`; frames are only lost
    /// when the writer is gone or has stopped draining altogether.
    pub async fn deliver(&self, frame: Arc<str>, timeout: Duration) -> Result<(), DeliveryError> {
        self.outbound
            .send_timeout(frame, timeout)
            .await
            .map_err(|e| match e {
                mpsc::error::SendTimeoutError::Timeout(_) => DeliveryError::TimedOut,
                mpsc::error::SendTimeoutError::Closed(_) => DeliveryError::Closed,
            })
    }
}

enum RegistryCommand {
    Register {
        session: ClientSession,
        reply: oneshot::Sender<usize>,
    },
    Unregister {
        id: u64,
        reply: Option<oneshot::Sender<bool>>,
    },
    Snapshot {
        reply: oneshot::Sender<Vec<ClientSession>>,
    },
}

/// Handle to the client registry actor
#[derive(Clone)]
pub struct ClientRegistry {
    tx: mpsc::UnboundedSender<RegistryCommand>,
    next_id: Arc<AtomicU64>,
}

impl ClientRegistry {
    /// Spawn the registry actor
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_registry(rx));
        Self {
            tx,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Allocate a session id; ids are never reused
    pub fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Add a session; returns the number of connected sessions
    pub async fn register(&self, session: ClientSession) -> Result<usize, RegistryError> {
        let (reply, rx) = oneshot::channel();
        self.send(RegistryCommand::Register { session, reply })?;
        rx.await.map_err(|_| RegistryError::Unavailable("reply dropped"))
    }

    /// Remove a session; returns whether it was registered
    pub async fn unregister(&self, id: u64) -> Result<bool, RegistryError> {
        let (reply, rx) = oneshot::channel();
        self.send(RegistryCommand::Unregister {
            id,
            reply: Some(reply),
        })?;
        rx.await.map_err(|_| RegistryError::Unavailable("reply dropped"))
    }

    /// Remove a session without waiting for the actor
    pub fn unregister_detached(&self, id: u64) {
        if self
            .send(RegistryCommand::Unregister { id, reply: None })
            .is_err()
        {
            tracing::debug!(session_id = id, "registry gone, skipping unregister");
        }
    }

    /// Current sessions, ordered by id
    pub async fn snapshot(&self) -> Result<Vec<ClientSession>, RegistryError> {
        let (reply, rx) = oneshot::channel();
        self.send(RegistryCommand::Snapshot { reply })?;
        rx.await.map_err(|_| RegistryError::Unavailable("reply dropped"))
    }

    /// Number of connected sessions
    pub async fn count(&self) -> Result<usize, RegistryError> {
        Ok(self.snapshot().await?.len())
    }

    fn send(&self, cmd: RegistryCommand) -> Result<(), RegistryError> {
        self.tx
            .send(cmd)
            .map_err(|_| RegistryError::Unavailable("mailbox closed"))
    }
}

async fn run_registry(mut rx: mpsc::UnboundedReceiver<RegistryCommand>) {
    let mut sessions: BTreeMap<u64, ClientSession> = BTreeMap::new();

    while let Some(cmd) = rx.recv().await {
        match cmd {
            RegistryCommand::Register { session, reply } => {
                let id = session.id;
                sessions.insert(id, session);
                tracing::debug!(session_id = id, clients = sessions.len(), "session registered");
                let _ = reply.send(sessions.len());
            }
            RegistryCommand::Unregister { id, reply } => {
                let removed = sessions.remove(&id);
                if let Some(session) = &removed {
                    tracing::debug!(
                        session_id = id,
                        peer = %session.peer,
                        clients = sessions.len(),
                        "session unregistered"
                    );
                }
                if let Some(reply) = reply {
                    let _ = reply.send(removed.is_some());
                }
            }
            RegistryCommand::Snapshot { reply } => {
                let _ = reply.send(sessions.values().cloned().collect());
            }
        }
    }
}
