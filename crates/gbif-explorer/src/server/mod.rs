//! Web server.
//!
//! Serves the search form, results pages, CSV export and a small JSON API.
//! Each search runs its whole import inside the request that submitted it.

pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;

use crate::client::GbifClient;
use crate::config::Config;
use crate::store::Database;

pub use routes::{AppState, create_router};

/// HTTP server for the explorer.
pub struct WebServer {
    state: AppState,
}

impl WebServer {
    /// Create a new server.
    #[must_use]
    pub fn new(db: Database, client: GbifClient, config: Config) -> Self {
        Self { state: AppState { db, client, config: Arc::new(config) } }
    }

    /// Router with all routes and layers attached.
    #[must_use]
    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    /// Serve until Ctrl+C.
    ///
    /// # Errors
    ///
    /// Returns error on server failure.
    pub async fn run(self, port: u16) -> anyhow::Result<()> {
        let router = self.router();
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        tracing::info!("HTTP server listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("HTTP server shut down");
        self.state.db.close().await;
        Ok(())
    }
}

impl std::fmt::Debug for WebServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebServer").field("client", &self.state.client).finish()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install CTRL+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
