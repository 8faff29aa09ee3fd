//! Tag Registry Server
//!
//! A real-time registry of RFID tags. Clients connect over WebSocket,
//! add, delete and retrieve tags, and every change is broadcast to all
//! connected clients.
//!
//! # Features
//!
//! - **Actor-owned state**: the tag set and the client set each live in a
//!   single task, reached only by request/response messages
//! - **Idempotent adds**: tags are deduplicated by `(EPC, PC bits)`
//! - **Fault-tolerant fan-out**: a dead client never blocks a broadcast
//! - **In-memory**: nothing is persisted across restarts
//!
//! # Modules
//!
//! - `types`: Tag records and their wire form
//! - `validation`: Parsing tag fields from strings
//! - `tag_store`: The tag store actor
//! - `api`: WebSocket sessions, broadcast, and read-only REST endpoints
//! - `server`: Listener and lifecycle
//! - `config`: Server configuration
//! - `error`: Error types
//!
//! # Example
//!
//! ```no_run
//! use tag_registry::{ServerConfig, TagServer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tag_registry::error::ServerError> {
//!     let server = TagServer::bind(ServerConfig::default()).await?;
//!     server.run().await
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod server;
pub mod tag_store;
pub mod types;
pub mod validation;

// Re-export commonly used items at crate root
pub use config::ServerConfig;
pub use server::TagServer;
pub use tag_store::TagStore;
pub use types::{Tag, TagFields, TagIdentity};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
