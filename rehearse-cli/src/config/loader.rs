use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use rehearse_core::{RedactionPatterns, ScoringConfig};
use rehearse_models::LlmSettings;
use rehearse_server::ServerConfig;
use tracing::debug;

use super::types::{
    DEFAULT_HOST, DEFAULT_PORT, RawLlmConfig, RawRedactionConfig, RawRehearseConfig,
    RawScoringConfig, RawServerConfig, RehearseConfig, StorageConfig,
};

/// Environment variable that relocates the project config directory
pub const PROJECT_CONFIG_DIR_ENV: &str = "REHEARSE_PROJECT_CONFIG_DIR";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<RehearseConfig> {
        let mut raw = RawRehearseConfig::default();

        // Layer 1: User config
        if let Some(user_path) = Self::user_config_path()
            && user_path.exists()
        {
            raw = Self::merge_raw(raw, Self::read_raw(&user_path)?);
        }

        // Layer 2: Project config
        let project_path = Self::project_config_path();
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(&project_path)?);
        }

        Ok(Self::finalize(raw))
    }

    /// Load from one explicit file, skipping the user and project layers
    pub fn load_from_path(path: &Path) -> Result<RehearseConfig> {
        let raw = Self::read_raw(path)?;
        Ok(Self::finalize(raw))
    }

    /// `--config <path>` when given, the layered files otherwise
    pub fn load_with_override(path: Option<&Path>) -> Result<RehearseConfig> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "rehearse").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with REHEARSE_PROJECT_CONFIG_DIR env var
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var(PROJECT_CONFIG_DIR_ENV) {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".rehearse/config.toml")
        }
    }

    fn read_raw(path: &Path) -> Result<RawRehearseConfig> {
        debug!("reading config from {}", path.display());
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawRehearseConfig, overlay: RawRehearseConfig) -> RawRehearseConfig {
        RawRehearseConfig {
            server: RawServerConfig {
                host: overlay.server.host.or(base.server.host),
                port: overlay.server.port.or(base.server.port),
            },
            llm: RawLlmConfig {
                base_url: overlay.llm.base_url.or(base.llm.base_url),
                model: overlay.llm.model.or(base.llm.model),
                api_key_env: overlay.llm.api_key_env.or(base.llm.api_key_env),
                timeout_seconds: overlay.llm.timeout_seconds.or(base.llm.timeout_seconds),
                temperature: overlay.llm.temperature.or(base.llm.temperature),
                max_tokens: overlay.llm.max_tokens.or(base.llm.max_tokens),
                history_window: overlay.llm.history_window.or(base.llm.history_window),
            },
            scoring: RawScoringConfig {
                filler_words: overlay.scoring.filler_words.or(base.scoring.filler_words),
                discovery_keywords: overlay
                    .scoring
                    .discovery_keywords
                    .or(base.scoring.discovery_keywords),
                objection_phrases: overlay
                    .scoring
                    .objection_phrases
                    .or(base.scoring.objection_phrases),
                value_keywords: overlay.scoring.value_keywords.or(base.scoring.value_keywords),
                domain_concepts: overlay
                    .scoring
                    .domain_concepts
                    .or(base.scoring.domain_concepts),
                discovery: overlay.scoring.discovery.or(base.scoring.discovery),
                product_knowledge: overlay
                    .scoring
                    .product_knowledge
                    .or(base.scoring.product_knowledge),
                objection_handling: overlay
                    .scoring
                    .objection_handling
                    .or(base.scoring.objection_handling),
                business_value: overlay.scoring.business_value.or(base.scoring.business_value),
            },
            redaction: RawRedactionConfig {
                extra_patterns: overlay
                    .redaction
                    .extra_patterns
                    .or(base.redaction.extra_patterns),
            },
            storage: StorageConfig {
                path: overlay.storage.path.or(base.storage.path),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawRehearseConfig) -> RehearseConfig {
        let llm_defaults = LlmSettings::default();
        let scoring_defaults = ScoringConfig::default();

        RehearseConfig {
            server: ServerConfig {
                host: raw.server.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: raw.server.port.unwrap_or(DEFAULT_PORT),
            },
            llm: LlmSettings {
                base_url: raw.llm.base_url.unwrap_or(llm_defaults.base_url),
                model: raw.llm.model.unwrap_or(llm_defaults.model),
                api_key_env: raw.llm.api_key_env.unwrap_or(llm_defaults.api_key_env),
                timeout_seconds: raw
                    .llm
                    .timeout_seconds
                    .unwrap_or(llm_defaults.timeout_seconds),
                temperature: raw.llm.temperature.unwrap_or(llm_defaults.temperature),
                max_tokens: raw.llm.max_tokens.unwrap_or(llm_defaults.max_tokens),
                history_window: raw.llm.history_window.unwrap_or(llm_defaults.history_window),
            },
            scoring: ScoringConfig {
                filler_words: raw
                    .scoring
                    .filler_words
                    .unwrap_or(scoring_defaults.filler_words),
                discovery_keywords: raw
                    .scoring
                    .discovery_keywords
                    .unwrap_or(scoring_defaults.discovery_keywords),
                objection_phrases: raw
                    .scoring
                    .objection_phrases
                    .unwrap_or(scoring_defaults.objection_phrases),
                value_keywords: raw
                    .scoring
                    .value_keywords
                    .unwrap_or(scoring_defaults.value_keywords),
                domain_concepts: raw
                    .scoring
                    .domain_concepts
                    .unwrap_or(scoring_defaults.domain_concepts),
                discovery: raw.scoring.discovery.unwrap_or(scoring_defaults.discovery),
                product_knowledge: raw
                    .scoring
                    .product_knowledge
                    .unwrap_or(scoring_defaults.product_knowledge),
                objection_handling: raw
                    .scoring
                    .objection_handling
                    .unwrap_or(scoring_defaults.objection_handling),
                business_value: raw
                    .scoring
                    .business_value
                    .unwrap_or(scoring_defaults.business_value),
            },
            redaction: RedactionPatterns {
                extra_patterns: raw.redaction.extra_patterns.unwrap_or_default(),
            },
            storage: raw.storage,
        }
    }
}
