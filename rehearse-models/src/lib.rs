//! Language-model collaborators for rehearse.
//!
//! This crate provides:
//! - A provider trait for chat completions, with an OpenAI-compatible client
//! - The role-play responder that voices the simulated buyer
//! - The feedback generator that writes coaching notes after a session
//! - API key handling that keeps keys out of logs
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐   ┌──────────────────────┐
//! │  RoleplayResponder   │   │  FeedbackGenerator   │
//! └──────────┬───────────┘   └──────────┬───────────┘
//!            │  redacted messages       │
//!            ▼                          ▼
//! ┌─────────────────────────────────────────────────┐
//! │          Arc<dyn ModelProvider>                 │
//! │   (OpenAiCompatProvider, or a mock in tests)    │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! Both collaborators always return text. Model failures and timeouts turn
//! into fixed fallback strings and a `warn!` log.

mod error;

pub mod auth;
pub mod config;
pub mod feedback;
pub mod providers;
pub mod roleplay;

pub use auth::ApiKey;
pub use config::LlmSettings;
pub use error::{Error, Result};
pub use feedback::{FALLBACK_FEEDBACK, FeedbackGenerator};
pub use providers::{ModelProvider, OpenAiCompatProvider};
pub use roleplay::{CharacterProfile, FALLBACK_REPLY, NEUTRAL_REPLY, RoleplayResponder, Scenario};
