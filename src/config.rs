//! Server configuration

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::ServerError;
use crate::tag_store::DEFAULT_MAILBOX;

/// Default listen address
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Default per-session outbound queue size
pub const DEFAULT_OUTBOUND_BUFFER: usize = 64;

/// Default time a broadcast waits on one client's full outbound queue
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Runtime configuration for the tag server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (port 0 picks a free port)
    pub bind_addr: SocketAddr,

    /// Capacity of the tag store mailbox
    pub store_mailbox: usize,

    /// Frames queued per client before broadcasts start waiting on it
    pub outbound_buffer: usize,

    /// How long a broadcast waits on one client's full queue
    pub delivery_timeout: Duration,

    /// Log filter directive; `RUST_LOG` takes precedence
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            store_mailbox: DEFAULT_MAILBOX,
            outbound_buffer: DEFAULT_OUTBOUND_BUFFER,
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ServerConfig {
    /// Create a config listening on the given address
    pub fn with_bind(bind: &str) -> Result<Self, ServerError> {
        let bind_addr = bind
            .parse()
            .map_err(|e| ServerError::Config(format!("bind address {bind:?}: {e}")))?;
        Ok(Self {
            bind_addr,
            ..Default::default()
        })
    }

    /// Loopback config on an ephemeral port, for tests
    pub fn local() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            ..Default::default()
        }
    }

    /// Reject values that would make the server unusable
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.store_mailbox == 0 {
            return Err(ServerError::Config("store mailbox must be > 0".into()));
        }
        if self.outbound_buffer == 0 {
            return Err(ServerError::Config("outbound buffer must be > 0".into()));
        }
        if self.delivery_timeout.is_zero() {
            return Err(ServerError::Config("delivery timeout must be > 0".into()));
        }
        Ok(())
    }
}
