//! Qualitative coaching feedback.
//!
//! [`FeedbackGenerator`] sends the redacted conversation and its metrics to
//! the model with a coaching instruction. The scoring core never waits on
//! this: callers run it after analysis is done.

use std::sync::Arc;

use rehearse_core::{ConversationTurn, MetricsRecord, Redactor, render_transcript};
use tracing::{debug, warn};

use crate::config::LlmSettings;
use crate::providers::{ChatRequest, Message, ModelProvider};
use crate::{Error, Result};

/// Returned when feedback cannot be generated.
pub const FALLBACK_FEEDBACK: &str = "Feedback is unavailable right now. Review your metrics: \
     ask more discovery questions, tie features to business results, and cut filler words.";

/// Longest conversation excerpt sent to the model, in characters.
pub const MAX_TRANSCRIPT_CHARS: usize = 4000;

const COACH_PROMPT: &str = "You are an experienced sales coach reviewing a role-play between a \
     trainee selling online advertising and a simulated business owner. Give short, specific \
     feedback in three parts: what went well, what to improve, and one concrete next step. \
     Refer to the metrics where they help. Keep it under 150 words.";

/// Generates coaching feedback for a finished session.
pub struct FeedbackGenerator {
    provider: Arc<dyn ModelProvider>,
    redactor: Arc<Redactor>,
    settings: LlmSettings,
}

impl FeedbackGenerator {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        redactor: Arc<Redactor>,
        settings: LlmSettings,
    ) -> Self {
        Self {
            provider,
            redactor,
            settings,
        }
    }

    /// Redacted, truncated conversation text.
    ///
    /// Uses the rendered history when there is one, otherwise the bare
    /// transcript.
    pub fn conversation_excerpt(
        &self,
        transcript: Option<&str>,
        history: &[ConversationTurn],
    ) -> String {
        let text = if history.is_empty() {
            self.redactor.redact(transcript.unwrap_or_default())
        } else {
            render_transcript(&self.redactor.redact_turns(history))
        };
        truncate_chars(&text, MAX_TRANSCRIPT_CHARS).to_string()
    }

    pub fn build_request(
        &self,
        transcript: Option<&str>,
        history: &[ConversationTurn],
        metrics: &MetricsRecord,
    ) -> ChatRequest {
        let excerpt = self.conversation_excerpt(transcript, history);
        let user = format!(
            "Conversation:\n{excerpt}\n\nMetrics:\n{}",
            metrics_summary(metrics)
        );
        ChatRequest::new(
            &self.settings.model,
            vec![Message::system(COACH_PROMPT), Message::user(user)],
        )
        .temperature(0.7)
        .max_tokens(self.settings.max_tokens)
    }

    /// Feedback text, or [`FALLBACK_FEEDBACK`] on any failure.
    pub async fn generate(
        &self,
        transcript: Option<&str>,
        history: &[ConversationTurn],
        metrics: &MetricsRecord,
    ) -> String {
        if metrics.is_empty() {
            debug!("no conversation to review, using fallback feedback");
            return FALLBACK_FEEDBACK.to_string();
        }
        let request = self.build_request(transcript, history, metrics);
        match self.call(request).await {
            Ok(text) => text,
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "feedback call failed, using fallback");
                FALLBACK_FEEDBACK.to_string()
            }
        }
    }

    async fn call(&self, request: ChatRequest) -> Result<String> {
        let timeout = self.settings.timeout();
        let response = tokio::time::timeout(timeout, self.provider.chat(request))
            .await
            .map_err(|_| Error::Timeout(timeout.as_secs()))??;
        let text = response.content.trim();
        if text.is_empty() {
            return Err(Error::EmptyResponse);
        }
        Ok(text.to_string())
    }
}

fn metrics_summary(m: &MetricsRecord) -> String {
    let concepts = if m.concepts_recognized.is_empty() {
        "none".to_string()
    } else {
        m.concepts_recognized
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "- words: {}, filler words: {}, confidence: {}/100, talk time: {}%\n\
         - discovery questions: {} (score {}/5)\n\
         - product concepts: {} (score {}/5)\n\
         - objection handling: {} (score {}/5)\n\
         - business value mentions: {} (score {}/5)\n\
         - overall effectiveness: {}/5",
        m.word_count,
        m.filler_word_count,
        m.confidence_score,
        m.talk_time_ratio,
        m.discovery_questions_count,
        m.discovery_score,
        concepts,
        m.product_knowledge_score,
        m.objection_handling_count,
        m.objection_handling_score,
        m.business_value_mentions,
        m.business_value_score,
        m.overall_effectiveness_score,
    )
}

/// The first `max` characters of `text`.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
