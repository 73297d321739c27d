//! rehearse-server - HTTP API for sales role-play practice
//!
//! This crate owns the request boundary: it redacts incoming text, scores
//! conversations with the metrics engine, asks the model collaborators for
//! in-character replies and coaching feedback, and stores finished sessions.

mod error;
pub mod http;
mod state;
pub mod store;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

pub use error::{ErrorResponse, ServerError, ServerResult};
pub use http::create_router;
pub use state::AppState;
pub use store::{JsonlSessionStore, MemorySessionStore, SessionResult, SessionStore};

/// The main rehearse server
pub struct RehearseServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl RehearseServer {
    /// Create a server around prepared state
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the shared application state
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Run the server, binding to the configured address
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.clone(),
                source: e,
            })?;

        tracing::info!("rehearse server listening on {}", addr);

        let router = create_router(self.state);
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        tracing::info!("rehearse server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7810,
        }
    }
}

impl ServerConfig {
    /// Create a new ServerConfig with the specified host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Returns the socket address string (e.g., "127.0.0.1:7810")
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
