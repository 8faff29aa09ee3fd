//! WebSocket application state

use crate::config::ServerConfig;
use crate::tag_store::TagStore;

use super::broadcaster::BroadcastHub;
use super::registry::ClientRegistry;

/// Shared application state for WebSocket connections
///
/// Only handles live here; the tag set and the session set are each owned
/// by their actor task.
#[derive(Clone)]
pub struct AppState {
    /// Tag store handle
    pub store: TagStore,

    /// Connected clients
    pub registry: ClientRegistry,

    /// Fan-out to every connected client
    pub hub: BroadcastHub,

    /// Per-session outbound queue size
    pub outbound_buffer: usize,
}

impl AppState {
    /// Spawn the store and registry actors
    pub fn new(config: &ServerConfig) -> Self {
        let registry = ClientRegistry::spawn();
        Self {
            store: TagStore::with_capacity(config.store_mailbox),
            hub: BroadcastHub::new(registry.clone(), config.delivery_timeout),
            registry,
            outbound_buffer: config.outbound_buffer,
        }
    }
}
