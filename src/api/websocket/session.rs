//! Per-connection session loop
//!
//! A session moves through three phases:
//!
//! - **Connecting**: before [`SessionLoop::open`] returns. Nothing is registered.
//! - **Open**: a `SessionLoop` value exists; it is in the client registry and
//!   receives broadcasts.
//! - **Closed**: the value has been dropped. `Drop` unregisters the session,
//!   so every exit path (end of stream, receive error, close frame, task
//!   cancellation) leaves the registry clean.
//!
//! Requests from one session are handled strictly in the order received.

use std::fmt::Display;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;

use super::events::{ClientMessage, TagNotification, UpdateAction};
use super::registry::ClientSession;
use super::state::AppState;
use crate::error::RegistryError;
use crate::types::TagFields;
use crate::validation::parse_tags;

/// A frame received from the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Text or binary payload carrying one JSON message
    Frame(Vec<u8>),
    /// The peer asked to close the connection
    Close,
}

/// Result of handling one inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    Add,
    Delete,
    Retrieval,
    /// Malformed message, invalid tag, or nothing applied
    Error,
    /// Unrecognized `UpdateType`
    Ignored,
}

impl DispatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Delete => "delete",
            Self::Retrieval => "retrieval",
            Self::Error => "error",
            Self::Ignored => "ignored",
        }
    }
}

#[derive(Clone, Copy)]
enum TagOp {
    Add,
    Delete,
}

impl TagOp {
    fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Delete => "delete",
        }
    }
}

/// An open client session
pub struct SessionLoop {
    app: AppState,
    session: ClientSession,
}

impl SessionLoop {
    /// Register a new session for `peer`, whose frames go to `outbound`
    pub async fn open(
        app: AppState,
        peer: impl Into<String>,
        outbound: mpsc::Sender<Arc<str>>,
    ) -> Result<Self, RegistryError> {
        let session = ClientSession::new(app.registry.next_id(), peer, outbound);
        let clients = app.registry.register(session.clone()).await?;
        tracing::info!(
            session_id = session.id,
            peer = %session.peer,
            clients,
            "client connected"
        );
        Ok(Self { app, session })
    }

    /// Handle inbound frames until the peer closes or the transport fails
    pub async fn run<S, E>(self, mut inbound: S)
    where
        S: Stream<Item = Result<Inbound, E>> + Unpin,
        E: Display,
    {
        while let Some(next) = inbound.next().await {
            match next {
                Ok(Inbound::Frame(raw)) => {
                    let status = self.dispatch(&raw).await;
                    tracing::trace!(peer = %self.session.peer, status = status.as_str(), "handled message");
                }
                Ok(Inbound::Close) => {
                    tracing::debug!(peer = %self.session.peer, "client requested close");
                    return;
                }
                Err(e) => {
                    tracing::error!(peer = %self.session.peer, error = %e, "websocket disconnected");
                    return;
                }
            }
        }
        tracing::debug!(peer = %self.session.peer, "websocket stream ended");
    }

    /// Decode one message and apply it
    pub async fn dispatch(&self, raw: &[u8]) -> DispatchStatus {
        let message = match ClientMessage::decode(raw) {
            Ok(message) => message,
            Err(e) => {
                tracing::error!(peer = %self.session.peer, error = %e, "dropping message");
                return DispatchStatus::Error;
            }
        };

        match message.action() {
            UpdateAction::Add => self.apply(TagOp::Add, message.tag.unwrap_or_default()).await,
            UpdateAction::Delete => self.apply(TagOp::Delete, message.tag.unwrap_or_default()).await,
            UpdateAction::Retrieve => self.retrieve().await,
            UpdateAction::Unknown(update_type) => {
                tracing::warn!(peer = %self.session.peer, %update_type, "unknown UpdateType");
                DispatchStatus::Ignored
            }
        }
    }

    async fn apply(&self, op: TagOp, fields: TagFields) -> DispatchStatus {
        let batch = [fields];
        let tags = match parse_tags(&batch) {
            Ok(tags) => tags,
            Err(e) => {
                tracing::error!(
                    peer = %self.session.peer,
                    update_type = op.as_str(),
                    error = %e,
                    "invalid tag"
                );
                return DispatchStatus::Error;
            }
        };

        let result = match op {
            TagOp::Add => self.app.store.add_tags(tags).await,
            TagOp::Delete => self.app.store.delete_tags(tags).await,
        };
        let applied = match result {
            Ok(applied) => applied,
            Err(e) => {
                tracing::error!(update_type = op.as_str(), error = %e, "store request failed");
                return DispatchStatus::Error;
            }
        };

        // Notifications echo the tag exactly as the client sent it
        let [fields] = batch;
        if applied.is_empty() {
            tracing::error!(
                peer = %self.session.peer,
                update_type = op.as_str(),
                epc = %fields.epc,
                "failed"
            );
            self.reply(&TagNotification::error(fields)).await;
            return DispatchStatus::Error;
        }

        tracing::debug!(update_type = op.as_str(), epc = %fields.epc, "applied");
        let notification = match op {
            TagOp::Add => TagNotification::added(fields),
            TagOp::Delete => TagNotification::deleted(fields),
        };
        self.broadcast(&notification).await;

        match op {
            TagOp::Add => DispatchStatus::Add,
            TagOp::Delete => DispatchStatus::Delete,
        }
    }

    async fn retrieve(&self) -> DispatchStatus {
        let tags = match self.app.store.retrieve_tags().await {
            Ok(tags) => tags,
            Err(e) => {
                tracing::error!(error = %e, "store request failed");
                return DispatchStatus::Error;
            }
        };
        tracing::debug!(tags = tags.len(), "retrieve");

        let fields = tags.iter().map(|t| t.to_fields()).collect();
        self.broadcast(&TagNotification::retrieval(fields)).await;
        DispatchStatus::Retrieval
    }

    async fn broadcast(&self, notification: &TagNotification) {
        let frame = match notification.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(error = %e, "could not encode notification");
                return;
            }
        };
        if let Err(e) = self.app.hub.send(frame).await {
            tracing::error!(error = %e, "broadcast failed");
        }
    }

    /// Send to this session only
    async fn reply(&self, notification: &TagNotification) {
        let frame = match notification.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(error = %e, "could not encode notification");
                return;
            }
        };
        let timeout = self.app.hub.delivery_timeout();
        if let Err(e) = self.session.deliver(frame, timeout).await {
            tracing::warn!(peer = %self.session.peer, error = %e, "could not reply to client");
        }
    }
}

impl Drop for SessionLoop {
    fn drop(&mut self) {
        self.app.registry.unregister_detached(self.session.id);
        tracing::info!(
            session_id = self.session.id,
            peer = %self.session.peer,
            "client disconnected"
        );
    }
}
