//! WebSocket module for real-time tag updates
//!
//! Provides the WebSocket endpoint at `/ws`. Every client can add, delete
//! and retrieve tags; every successful change is broadcast to all
//! connected clients.
//!
//! ## Components
//! - `registry`: actor owning the set of connected sessions
//! - `broadcaster`: fan-out over a registry snapshot
//! - `session`: per-connection receive/dispatch loop
//! - `handler`: axum upgrade and socket writer

pub mod broadcaster;
pub mod events;
pub mod handler;
pub mod registry;
pub mod session;
pub mod state;

pub use broadcaster::{BroadcastHub, BroadcastReport};
pub use events::{ClientMessage, TagNotification, UpdateAction};
pub use registry::{ClientRegistry, ClientSession};
pub use session::{DispatchStatus, Inbound, SessionLoop};
pub use state::AppState;
