//! Rehearse serve command
//!
//! Runs the HTTP API with the effective configuration:
//! - redaction, scoring and role-play endpoints
//! - session results in a JSONL file (`storage.path`), or in a bounded
//!   in-memory map for development when no path is set

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use rehearse_core::{MetricsEngine, Redactor};
use rehearse_server::{
    AppState, JsonlSessionStore, MemorySessionStore, RehearseServer, SessionStore,
};
use tracing::{info, warn};

use crate::config::{ConfigLoader, RehearseConfig};

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides config)
    #[arg(long)]
    pub host: Option<String>,
}

/// Run the serve command
pub async fn run(args: ServeArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = ConfigLoader::load_with_override(config_path)?;
    apply_overrides(&mut config, &args);

    let state = build_state(config.clone())?;
    info!("Starting rehearse server on {}", config.server.addr());

    RehearseServer::new(config.server, state).run().await?;
    Ok(())
}

fn apply_overrides(config: &mut RehearseConfig, args: &ServeArgs) {
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
}

/// Validate configuration and wire the server state.
fn build_state(config: RehearseConfig) -> Result<AppState> {
    let engine = MetricsEngine::new(config.scoring)?;
    let redactor = Redactor::from_patterns(&config.redaction)?;

    if config.llm.api_key().is_none() {
        warn!(
            "{} is not set; role-play replies and feedback will use fallback text",
            config.llm.api_key_env
        );
    }
    let provider = Arc::new(config.llm.provider()?);

    let store: Arc<dyn SessionStore> = match &config.storage.path {
        Some(path) => {
            info!("Storing session results in {}", path.display());
            Arc::new(JsonlSessionStore::new(path))
        }
        None => {
            let store = MemorySessionStore::new();
            warn!(
                capacity = store.capacity(),
                "storage.path is not set; session results are kept in memory and lost on exit"
            );
            Arc::new(store)
        }
    };

    Ok(AppState::new(engine, redactor, provider, config.llm, store))
}
