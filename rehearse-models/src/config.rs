//! LLM connection settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::auth::ApiKey;
use crate::providers::{DEFAULT_BASE_URL, OpenAiCompatProvider};

/// The `[llm]` configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Base URL of a `/chat/completions` endpoint.
    pub base_url: String,
    /// Model ID sent with every request.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Per-call timeout.
    pub timeout_seconds: u64,
    /// Sampling temperature for role-play replies.
    pub temperature: f32,
    /// Maximum tokens per reply.
    pub max_tokens: u32,
    /// How many recent turns the role-play prompt carries.
    pub history_window: usize,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_seconds: 20,
            temperature: 0.8,
            max_tokens: 300,
            history_window: 10,
        }
    }
}

impl LlmSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }

    /// Read the API key from `api_key_env`, if set.
    pub fn api_key(&self) -> Option<ApiKey> {
        ApiKey::from_env(&self.api_key_env).ok()
    }

    /// Build the provider these settings describe.
    ///
    /// A missing key is not an error here: calls will fail and callers fall
    /// back to their fixed replies.
    pub fn provider(&self) -> Result<OpenAiCompatProvider> {
        OpenAiCompatProvider::with_timeout(&self.base_url, self.api_key(), self.timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = LlmSettings::default();
        assert_eq!(settings.base_url, "https://api.openai.com/v1");
        assert_eq!(settings.model, "gpt-4o-mini");
        assert_eq!(settings.api_key_env, "OPENAI_API_KEY");
        assert_eq!(settings.timeout(), Duration::from_secs(20));
        assert_eq!(settings.max_tokens, 300);
        assert_eq!(settings.history_window, 10);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let settings: LlmSettings =
            serde_json::from_str(r#"{"model": "llama3", "history_window": 4}"#).unwrap();
        assert_eq!(settings.model, "llama3");
        assert_eq!(settings.history_window, 4);
        assert_eq!(settings.timeout_seconds, 20);
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let settings = LlmSettings {
            timeout_seconds: 0,
            ..Default::default()
        };
        assert_eq!(settings.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn provider_builds_without_key() {
        let settings = LlmSettings {
            api_key_env: "REHEARSE_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            base_url: "http://localhost:11434/v1".to_string(),
            ..Default::default()
        };
        assert!(settings.api_key().is_none());
        let provider = settings.provider().unwrap();
        assert_eq!(provider.base_url(), "http://localhost:11434/v1");
    }
}
