//! Tag server
//!
//! Binds the listener, spawns the store and registry actors, and serves the
//! HTTP/WebSocket router until shutdown.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::api::http::create_router;
use crate::api::websocket::state::AppState;
use crate::config::ServerConfig;
use crate::error::ServerError;

/// A bound tag server, ready to run
pub struct TagServer {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl TagServer {
    /// Validate the config, bind the listener and start the actors
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        config.validate()?;
        let listener = TcpListener::bind(config.bind_addr).await?;
        let state = Arc::new(AppState::new(&config));
        Ok(Self { listener, state })
    }

    /// Address actually bound (resolves port 0)
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Shared state, for in-process inspection
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Serve until Ctrl+C
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "could not listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutdown signal received");
        })
        .await
    }

    /// Serve until `shutdown` resolves
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = create_router(self.state);
        tracing::info!(addr = %self.listener.local_addr()?, "tag server listening");

        axum::serve(
            self.listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await?;

        tracing::info!("tag server stopped");
        Ok(())
    }
}
