//! Tag Registry Server - Binary Entry Point
//!
//! ```bash
//! tag-server --bind 0.0.0.0:8080
//! TAG_SERVER_BIND=127.0.0.1:9000 RUST_LOG=debug tag-server
//! ```

use std::time::Duration;

use clap::Parser;
use tag_registry::config::{
    DEFAULT_BIND, DEFAULT_DELIVERY_TIMEOUT, DEFAULT_LOG_LEVEL, DEFAULT_OUTBOUND_BUFFER,
};
use tag_registry::error::ServerError;
use tag_registry::tag_store::DEFAULT_MAILBOX;
use tag_registry::{ServerConfig, TagServer};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Real-time RFID tag registry over WebSocket
#[derive(Parser, Debug)]
#[command(name = "tag-server")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, env = "TAG_SERVER_BIND", default_value = DEFAULT_BIND)]
    bind: String,

    /// Tag store mailbox capacity
    #[arg(long, env = "TAG_SERVER_STORE_MAILBOX", default_value_t = DEFAULT_MAILBOX)]
    store_mailbox: usize,

    /// Frames queued per client before broadcasts start waiting on it
    #[arg(long, env = "TAG_SERVER_OUTBOUND_BUFFER", default_value_t = DEFAULT_OUTBOUND_BUFFER)]
    outbound_buffer: usize,

    /// Milliseconds a broadcast waits on one client's full queue
    #[arg(
        long,
        env = "TAG_SERVER_DELIVERY_TIMEOUT_MS",
        default_value_t = DEFAULT_DELIVERY_TIMEOUT.as_millis() as u64
    )]
    delivery_timeout_ms: u64,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, env = "TAG_SERVER_LOG", default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let args = Args::parse();
    let config = ServerConfig {
        store_mailbox: args.store_mailbox,
        outbound_buffer: args.outbound_buffer,
        delivery_timeout: Duration::from_millis(args.delivery_timeout_ms),
        log_level: args.log_level,
        ..ServerConfig::with_bind(&args.bind)?
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    tracing::info!(version = tag_registry::VERSION, "tag server starting");

    let server = TagServer::bind(config).await?;
    server.run().await
}
