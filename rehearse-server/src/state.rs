//! Shared application state for the rehearse server

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rehearse_core::{MetricsEngine, Redactor};
use rehearse_models::{FeedbackGenerator, LlmSettings, ModelProvider, RoleplayResponder};

use crate::store::{MemorySessionStore, SessionStore};

/// Shared application state accessible by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Scores conversations
    pub engine: Arc<MetricsEngine>,
    /// Redacts everything before it is stored or forwarded
    pub redactor: Arc<Redactor>,
    /// Voices the simulated buyer
    pub responder: Arc<RoleplayResponder>,
    /// Writes coaching notes when a session ends
    pub feedback: Arc<FeedbackGenerator>,
    /// Finished session results
    pub store: Arc<dyn SessionStore>,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Wire the LLM collaborators around one provider
    pub fn new(
        engine: MetricsEngine,
        redactor: Redactor,
        provider: Arc<dyn ModelProvider>,
        llm: LlmSettings,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let redactor = Arc::new(redactor);
        let responder = Arc::new(RoleplayResponder::new(
            Arc::clone(&provider),
            Arc::clone(&redactor),
            llm.clone(),
        ));
        let feedback = Arc::new(FeedbackGenerator::new(provider, Arc::clone(&redactor), llm));

        Self {
            engine: Arc::new(engine),
            redactor,
            responder,
            feedback,
            store,
            started_at: Utc::now(),
        }
    }

    /// Default engine, redactor and settings, in-memory storage
    pub fn with_provider(provider: Arc<dyn ModelProvider>) -> Self {
        Self::new(
            MetricsEngine::with_defaults(),
            Redactor::with_default_patterns(),
            provider,
            LlmSettings::default(),
            Arc::new(MemorySessionStore::new()),
        )
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
