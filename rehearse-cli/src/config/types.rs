use std::path::PathBuf;

use rehearse_core::{CustomPattern, RedactionPatterns, ScoringConfig, SubScoreCurve};
use rehearse_models::LlmSettings;
use rehearse_server::ServerConfig;
use serde::{Deserialize, Serialize};

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawRehearseConfig {
    #[serde(default)]
    pub server: RawServerConfig,

    #[serde(default)]
    pub llm: RawLlmConfig,

    #[serde(default)]
    pub scoring: RawScoringConfig,

    #[serde(default)]
    pub redaction: RawRedactionConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// Server config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawLlmConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key_env: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub history_window: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawScoringConfig {
    pub filler_words: Option<Vec<String>>,
    pub discovery_keywords: Option<Vec<String>>,
    pub objection_phrases: Option<Vec<String>>,
    pub value_keywords: Option<Vec<String>>,
    pub domain_concepts: Option<Vec<String>>,
    pub discovery: Option<SubScoreCurve>,
    pub product_knowledge: Option<SubScoreCurve>,
    pub objection_handling: Option<SubScoreCurve>,
    pub business_value: Option<SubScoreCurve>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawRedactionConfig {
    pub extra_patterns: Option<Vec<CustomPattern>>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RehearseConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub redaction: RedactionPatterns,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// JSONL file for session results; in-memory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Default host for the rehearse server
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default port for the rehearse server
pub const DEFAULT_PORT: u16 = 7810;
