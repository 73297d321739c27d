//! REST API handlers
//!
//! Every handler redacts before anything leaves the process. Scoring reads
//! the original turns.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use rehearse_core::{MetricsRecord, RedactionCount, SessionId, parse_history, render_transcript};
use rehearse_models::Scenario;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

use crate::AppState;
use crate::error::{ServerError, ServerResult};
use crate::store::SessionResult;

/// Longest accepted session id.
const MAX_SESSION_ID_LEN: usize = 128;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Status of the server
    pub status: String,
    /// Server version
    pub version: String,
    /// Seconds since server started
    pub uptime_seconds: i64,
}

/// Health check endpoint
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RedactRequest {
    /// Anything but a string is echoed back untouched.
    pub text: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactResponse {
    pub redacted_text: serde_json::Value,
    pub redactions: Vec<RedactionCount>,
}

/// POST /api/redact
pub async fn redact(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RedactRequest>,
) -> Json<RedactResponse> {
    let response = match body.text {
        Some(serde_json::Value::String(text)) => {
            let result = state.redactor.redact_with_report(&text);
            RedactResponse {
                redacted_text: serde_json::Value::String(result.redacted_text),
                redactions: result.redactions,
            }
        }
        other => RedactResponse {
            redacted_text: other.unwrap_or_default(),
            redactions: Vec::new(),
        },
    };
    Json(response)
}

/// Transcript and/or history, as posted by the client.
///
/// Both fields are read leniently: a non-string `transcript` counts as
/// absent and a malformed `conversationHistory` degrades to the default
/// record, so neither rejects the request.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(deserialize_with = "lenient_string")]
    pub transcript: Option<String>,
    pub conversation_history: Option<serde_json::Value>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(text) => Ok(Some(text)),
        _ => Ok(None),
    }
}

/// POST /api/analyze
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AnalyzeRequest>,
) -> Json<MetricsRecord> {
    let record = state
        .engine
        .analyze_json(body.transcript.as_deref(), body.conversation_history.as_ref());
    debug!(
        words = record.word_count,
        turns = record.conversation_length,
        "analyzed conversation"
    );
    Json(record)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    #[serde(default)]
    pub scenario: Scenario,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
    #[serde(default)]
    pub conversation_history: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReplyResponse {
    pub reply: String,
}

/// POST /api/roleplay/reply
pub async fn roleplay_reply(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ReplyRequest>,
) -> ServerResult<Json<ReplyResponse>> {
    let message = match body.message.as_deref() {
        Some(message) if !message.trim().is_empty() => message,
        _ => {
            return Err(ServerError::InvalidRequest(
                "message must be a non-empty string".to_string(),
            ));
        }
    };
    let history = parse_history(body.conversation_history.as_ref()).unwrap_or_default();
    let reply = state
        .responder
        .reply(&body.scenario, message, &history)
        .await;
    Ok(Json(ReplyResponse { reply }))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSessionResponse {
    pub session_id: SessionId,
}

/// POST /api/sessions
pub async fn create_session() -> Json<NewSessionResponse> {
    Json(NewSessionResponse {
        session_id: SessionId::new(uuid::Uuid::now_v7().to_string()),
    })
}

fn session_id(raw: String) -> ServerResult<SessionId> {
    let valid = !raw.is_empty()
        && raw.len() <= MAX_SESSION_ID_LEN
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(SessionId::new(raw))
    } else {
        Err(ServerError::InvalidRequest(format!(
            "session id must be 1-{MAX_SESSION_ID_LEN} characters of [A-Za-z0-9._-]"
        )))
    }
}

/// POST /api/sessions/:id/end
///
/// Analyze, generate feedback, store, and return the result.
pub async fn end_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<AnalyzeRequest>,
) -> ServerResult<Json<SessionResult>> {
    let session_id = session_id(id)?;
    let parsed = parse_history(body.conversation_history.as_ref());
    let metrics = match &parsed {
        Some(turns) => state.engine.analyze(body.transcript.as_deref(), turns),
        None => MetricsRecord::default(),
    };
    let turns = parsed.unwrap_or_default();

    let feedback = state
        .feedback
        .generate(body.transcript.as_deref(), &turns, &metrics)
        .await;

    let redacted_transcript = if turns.is_empty() {
        state.redactor.redact(body.transcript.as_deref().unwrap_or_default())
    } else {
        render_transcript(&state.redactor.redact_turns(&turns))
    };

    let result = SessionResult {
        session_id,
        metrics,
        feedback,
        redacted_transcript,
        completed_at: Utc::now(),
    };
    state.store.save(&result).await?;

    info!(
        session = %result.session_id,
        overall = result.metrics.overall_effectiveness_score,
        "session completed"
    );
    Ok(Json(result))
}

/// GET /api/sessions/:id
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ServerResult<Json<SessionResult>> {
    let session_id = session_id(id)?;
    match state.store.get(&session_id).await? {
        Some(result) => Ok(Json(result)),
        None => {
            warn!(session = %session_id, "no stored result");
            Err(ServerError::SessionNotFound(session_id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_validation() {
        assert!(session_id("abc-123_x.y".to_string()).is_ok());
        assert!(session_id(String::new()).is_err());
        assert!(session_id("has space".to_string()).is_err());
        assert!(session_id("../etc".to_string()).is_err());
        assert!(session_id("a".repeat(MAX_SESSION_ID_LEN + 1)).is_err());
    }

    #[test]
    fn test_transcript_must_be_a_string_to_count() {
        let body: AnalyzeRequest = serde_json::from_value(serde_json::json!({
            "transcript": ["a"],
            "conversationHistory": null
        }))
        .unwrap();
        assert_eq!(body.transcript, None);

        let body: AnalyzeRequest =
            serde_json::from_value(serde_json::json!({ "transcript": "hi" })).unwrap();
        assert_eq!(body.transcript.as_deref(), Some("hi"));
    }
}
