//! Regex-based PII redaction
//!
//! Replaces sensitive substrings with fixed placeholder tokens. The five
//! built-in categories run first, in a fixed order, each over the whole
//! string; configured extra patterns run after them.
//!
//! The name category is a coarse heuristic (any two consecutive capitalized
//! words). It will hit phrases like "Google Ads" and miss lowercase or single
//! names.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{CoreError, CoreResult};
use crate::types::ConversationTurn;

const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b";
const PHONE_PATTERN: &str = r"(?:\+?1[-.\s]?)?(?:\(\d{3}\)|\b\d{3})[-.\s]?\d{3}[-.\s]?\d{4}\b";
const SSN_PATTERN: &str = r"\b\d{3}-?\d{2}-?\d{4}\b";
const CARD_PATTERN: &str = r"\b(?:\d{4}[-\s]?){3}\d{4}\b";
const NAME_PATTERN: &str = r"\b[A-Z][a-z]+\s+[A-Z][a-z]+\b";

static DEFAULT_REDACTOR: LazyLock<Redactor> = LazyLock::new(Redactor::with_default_patterns);

/// Redact `text` with the built-in categories.
pub fn redact(text: &str) -> String {
    DEFAULT_REDACTOR.redact(text)
}

/// Redact optional text; `None` is returned unchanged.
pub fn redact_opt(text: Option<&str>) -> Option<String> {
    text.map(redact)
}

/// Kind of sensitive data a placeholder stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactionCategory {
    Email,
    Phone,
    Ssn,
    Card,
    Name,
    /// A pattern supplied through configuration.
    Custom,
}

impl RedactionCategory {
    /// Built-in categories in application order.
    pub const BUILT_IN: [RedactionCategory; 5] = [
        RedactionCategory::Email,
        RedactionCategory::Phone,
        RedactionCategory::Ssn,
        RedactionCategory::Card,
        RedactionCategory::Name,
    ];

    /// Placeholder token for a built-in category.
    pub fn placeholder(&self) -> &'static str {
        match self {
            RedactionCategory::Email => "[EMAIL_REDACTED]",
            RedactionCategory::Phone => "[PHONE_REDACTED]",
            RedactionCategory::Ssn => "[SSN_REDACTED]",
            RedactionCategory::Card => "[CARD_REDACTED]",
            RedactionCategory::Name => "[NAME_REDACTED]",
            RedactionCategory::Custom => "[REDACTED]",
        }
    }

    fn pattern(&self) -> Option<&'static str> {
        match self {
            RedactionCategory::Email => Some(EMAIL_PATTERN),
            RedactionCategory::Phone => Some(PHONE_PATTERN),
            RedactionCategory::Ssn => Some(SSN_PATTERN),
            RedactionCategory::Card => Some(CARD_PATTERN),
            RedactionCategory::Name => Some(NAME_PATTERN),
            RedactionCategory::Custom => None,
        }
    }
}

/// A user-configured pattern and the token that replaces its matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomPattern {
    pub pattern: String,
    #[serde(default = "default_custom_placeholder")]
    pub placeholder: String,
}

fn default_custom_placeholder() -> String {
    RedactionCategory::Custom.placeholder().to_string()
}

/// Redaction configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactionPatterns {
    /// Patterns applied after the built-in categories.
    pub extra_patterns: Vec<CustomPattern>,
}

/// How many replacements one category made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionCount {
    pub category: RedactionCategory,
    pub placeholder: String,
    pub count: usize,
}

/// Redacted text plus what was replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactionResult {
    pub redacted_text: String,
    pub redactions: Vec<RedactionCount>,
}

impl RedactionResult {
    /// Total replacements across all categories.
    pub fn total(&self) -> usize {
        self.redactions.iter().map(|r| r.count).sum()
    }
}

/// A compiled pattern with its replacement token
#[derive(Debug, Clone)]
struct CompiledPattern {
    regex: Regex,
    category: RedactionCategory,
    placeholder: String,
}

impl CompiledPattern {
    fn compile(
        pattern: &str,
        category: RedactionCategory,
        placeholder: impl Into<String>,
    ) -> CoreResult<Self> {
        let regex = Regex::new(pattern).map_err(|e| CoreError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            regex,
            category,
            placeholder: placeholder.into(),
        })
    }

    fn built_in(category: RedactionCategory) -> Option<Self> {
        let pattern = category.pattern()?;
        Self::compile(pattern, category, category.placeholder()).ok()
    }
}

/// Regex-based PII redactor
///
/// Compile once and share; redaction takes `&self` and holds no state.
#[derive(Debug, Clone)]
pub struct Redactor {
    patterns: Vec<CompiledPattern>,
}

impl Redactor {
    /// Create a redactor with the five built-in categories.
    pub fn with_default_patterns() -> Self {
        let patterns = RedactionCategory::BUILT_IN
            .iter()
            .filter_map(|category| CompiledPattern::built_in(*category))
            .collect();
        Self { patterns }
    }

    /// Create a redactor with the built-in categories plus configured extras.
    ///
    /// Fails if any extra pattern does not compile.
    pub fn from_patterns(config: &RedactionPatterns) -> CoreResult<Self> {
        let mut redactor = Self::with_default_patterns();
        for extra in &config.extra_patterns {
            redactor.patterns.push(CompiledPattern::compile(
                &extra.pattern,
                RedactionCategory::Custom,
                extra.placeholder.clone(),
            )?);
        }
        Ok(redactor)
    }

    /// Get the number of compiled patterns
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Replace every match of every pattern.
    pub fn redact(&self, text: &str) -> String {
        let mut current = text.to_string();
        for pattern in &self.patterns {
            if pattern.regex.is_match(&current) {
                current = pattern
                    .regex
                    .replace_all(&current, NoExpand(&pattern.placeholder))
                    .into_owned();
            }
        }
        current
    }

    /// Redact and report how many replacements each category made.
    pub fn redact_with_report(&self, text: &str) -> RedactionResult {
        let mut current = text.to_string();
        let mut redactions = Vec::new();

        for pattern in &self.patterns {
            let count = pattern.regex.find_iter(&current).count();
            if count == 0 {
                continue;
            }
            current = pattern
                .regex
                .replace_all(&current, NoExpand(&pattern.placeholder))
                .into_owned();
            redactions.push(RedactionCount {
                category: pattern.category,
                placeholder: pattern.placeholder.clone(),
                count,
            });
        }

        trace!(
            replaced = redactions.iter().map(|r| r.count).sum::<usize>(),
            "redaction complete"
        );

        RedactionResult {
            redacted_text: current,
            redactions,
        }
    }

    /// Redact every turn's message. Speaker, order and timestamp are kept.
    pub fn redact_turns(&self, turns: &[ConversationTurn]) -> Vec<ConversationTurn> {
        turns
            .iter()
            .map(|turn| ConversationTurn {
                speaker: turn.speaker,
                message: self.redact(&turn.message),
                timestamp: turn.timestamp,
            })
            .collect()
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::with_default_patterns()
    }
}
