//! Conversation and metrics types.
//!
//! A conversation is an ordered sequence of [`ConversationTurn`]s. Order is the
//! order the caller supplied; nothing in this crate reorders or deduplicates
//! turns, and analysis never mutates its input.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// String wrapper for role-play session identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new session ID from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who said a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The person practicing the sales conversation.
    #[serde(alias = "salesperson", alias = "user")]
    Trainee,
    /// The simulated buyer persona.
    #[serde(alias = "customer", alias = "assistant", alias = "ai")]
    Counterpart,
}

impl Speaker {
    /// Label used when rendering a transcript.
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::Trainee => "Trainee",
            Speaker::Counterpart => "Counterpart",
        }
    }
}

/// One message in a role-play conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    pub speaker: Speaker,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ConversationTurn {
    /// Create a turn with no timestamp.
    pub fn new(speaker: Speaker, message: impl Into<String>) -> Self {
        Self {
            speaker,
            message: message.into(),
            timestamp: None,
        }
    }

    /// Create a trainee turn.
    pub fn trainee(message: impl Into<String>) -> Self {
        Self::new(Speaker::Trainee, message)
    }

    /// Create a counterpart turn.
    pub fn counterpart(message: impl Into<String>) -> Self {
        Self::new(Speaker::Counterpart, message)
    }

    /// Attach a timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn is_trainee(&self) -> bool {
        self.speaker == Speaker::Trainee
    }
}

/// Space-joined trainee messages, in conversation order.
pub fn trainee_text(history: &[ConversationTurn]) -> String {
    history
        .iter()
        .filter(|turn| turn.is_trainee())
        .map(|turn| turn.message.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a history as `Speaker: message` lines.
pub fn render_transcript(history: &[ConversationTurn]) -> String {
    history
        .iter()
        .map(|turn| format!("{}: {}", turn.speaker.label(), turn.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Coaching metrics for one analyzed conversation.
///
/// Produced by [`MetricsEngine::analyze`](crate::MetricsEngine::analyze).
/// All scores are bounded: `confidence_score` in 20..=100 (50 when there is
/// nothing to judge), `talk_time_ratio` in 0..=100, and every five-point
/// score in 1..=5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRecord {
    pub word_count: usize,
    pub sentence_count: usize,
    pub average_sentence_length: f64,
    pub filler_word_count: usize,
    pub confidence_score: u8,
    pub talk_time_ratio: u8,
    /// Total number of turns, both speakers.
    pub conversation_length: usize,
    pub trainee_turns: usize,
    pub discovery_questions_count: usize,
    pub objection_handling_count: usize,
    pub business_value_mentions: usize,
    pub concepts_recognized: BTreeSet<String>,
    pub discovery_score: u8,
    pub product_knowledge_score: u8,
    pub objection_handling_score: u8,
    pub business_value_score: u8,
    pub overall_effectiveness_score: u8,
}

impl MetricsRecord {
    /// Neutral value used for every five-point score when there is no input.
    pub const NEUTRAL_SCORE: u8 = 2;
    /// Confidence reported when there are no words to judge.
    pub const NEUTRAL_CONFIDENCE: u8 = 50;
    /// Talk-time ratio reported when there is no conversation.
    pub const NEUTRAL_TALK_TIME: u8 = 50;

    /// True when the record was computed from no words and no turns.
    ///
    /// Callers that need to distinguish "not enough data" from a low score
    /// should check this rather than the scores themselves.
    pub fn is_empty(&self) -> bool {
        self.word_count == 0 && self.conversation_length == 0
    }
}

impl Default for MetricsRecord {
    fn default() -> Self {
        Self {
            word_count: 0,
            sentence_count: 0,
            average_sentence_length: 0.0,
            filler_word_count: 0,
            confidence_score: Self::NEUTRAL_CONFIDENCE,
            talk_time_ratio: Self::NEUTRAL_TALK_TIME,
            conversation_length: 0,
            trainee_turns: 0,
            discovery_questions_count: 0,
            objection_handling_count: 0,
            business_value_mentions: 0,
            concepts_recognized: BTreeSet::new(),
            discovery_score: Self::NEUTRAL_SCORE,
            product_knowledge_score: Self::NEUTRAL_SCORE,
            objection_handling_score: Self::NEUTRAL_SCORE,
            business_value_score: Self::NEUTRAL_SCORE,
            overall_effectiveness_score: Self::NEUTRAL_SCORE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speaker_aliases_deserialize() {
        let turn: ConversationTurn =
            serde_json::from_str(r#"{"speaker":"salesperson","message":"hi"}"#).unwrap();
        assert_eq!(turn.speaker, Speaker::Trainee);

        let turn: ConversationTurn =
            serde_json::from_str(r#"{"speaker":"customer","message":"hello"}"#).unwrap();
        assert_eq!(turn.speaker, Speaker::Counterpart);
    }

    #[test]
    fn test_turn_timestamp_is_optional() {
        let turn = ConversationTurn::trainee("hi");
        let json = serde_json::to_string(&turn).unwrap();
        assert_eq!(json, r#"{"speaker":"trainee","message":"hi"}"#);
    }

    #[test]
    fn test_trainee_text_keeps_order_and_skips_counterpart() {
        let history = vec![
            ConversationTurn::trainee("first"),
            ConversationTurn::counterpart("ignored"),
            ConversationTurn::trainee("second"),
        ];
        assert_eq!(trainee_text(&history), "first second");
    }

    #[test]
    fn test_render_transcript_labels_speakers() {
        let history = vec![
            ConversationTurn::trainee("Hello"),
            ConversationTurn::counterpart("Who is this?"),
        ];
        assert_eq!(
            render_transcript(&history),
            "Trainee: Hello\nCounterpart: Who is this?"
        );
    }

    #[test]
    fn test_default_record_is_neutral() {
        let record = MetricsRecord::default();
        assert!(record.is_empty());
        assert_eq!(record.confidence_score, 50);
        assert_eq!(record.talk_time_ratio, 50);
        assert_eq!(record.overall_effectiveness_score, 2);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let json = serde_json::to_value(MetricsRecord::default()).unwrap();
        assert_eq!(json["confidenceScore"], 50);
        assert_eq!(json["discoveryQuestionsCount"], 0);
        assert!(json["conceptsRecognized"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_session_id_is_transparent() {
        let id = SessionId::from("abc-123");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""abc-123""#);
        assert_eq!(id.to_string(), "abc-123");
    }
}
