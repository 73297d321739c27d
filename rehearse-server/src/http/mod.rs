//! HTTP server module

mod api;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub use api::{
    AnalyzeRequest, HealthResponse, NewSessionResponse, RedactRequest, RedactResponse,
    ReplyRequest, ReplyResponse,
};

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(api::health))
        .route("/api/redact", post(api::redact))
        .route("/api/analyze", post(api::analyze))
        .route("/api/roleplay/reply", post(api::roleplay_reply))
        .route("/api/sessions", post(api::create_session))
        .route("/api/sessions/:id", get(api::get_session))
        .route("/api/sessions/:id/end", post(api::end_session))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
