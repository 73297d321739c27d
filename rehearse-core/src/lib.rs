//! rehearse-core - Transcript redaction and coaching metrics
//!
//! This crate provides the scoring core for sales role-play sessions:
//! - [`Redactor`] replaces PII with placeholder tokens
//! - [`MetricsEngine`] turns a conversation into a bounded [`MetricsRecord`]
//!
//! Both are pure and synchronous. They hold no mutable state, perform no I/O,
//! and can be shared across threads.
//!
//! No scoring vocabulary overlaps a placeholder token, but the name heuristic
//! can swallow capitalized product terms ("Google Ads"). Callers score the
//! original turns and redact what they store or forward.

pub mod error;
pub mod metrics;
pub mod redact;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use metrics::{
    MAX_SCORE, MIN_SCORE, MetricsEngine, ScoringConfig, SubScoreCurve, parse_history,
};
pub use redact::{
    CustomPattern, RedactionCategory, RedactionCount, RedactionPatterns, RedactionResult,
    Redactor, redact, redact_opt,
};
pub use types::{
    ConversationTurn, MetricsRecord, SessionId, Speaker, render_transcript, trainee_text,
};
