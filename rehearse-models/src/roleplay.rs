//! In-character replies from the simulated buyer.
//!
//! [`RoleplayResponder`] turns a [`Scenario`] and the running conversation into
//! a chat request, asks the model for the counterpart's next line, and cleans
//! the answer. It always produces a reply: failures and timeouts yield
//! [`FALLBACK_REPLY`], and replies that slip into coaching voice are swapped
//! for [`NEUTRAL_REPLY`].

use std::sync::Arc;

use rehearse_core::{ConversationTurn, Redactor, Speaker};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::LlmSettings;
use crate::providers::{ChatRequest, Message, ModelProvider};
use crate::{Error, Result};

/// Returned when the model call fails or answers with nothing.
pub const FALLBACK_REPLY: &str =
    "Sorry, can you say that again? I'm not sure I follow how this helps my business.";

/// Substituted when the model breaks character to give sales advice.
pub const NEUTRAL_REPLY: &str = "Okay, but how exactly would that work for a business like mine?";

/// Phrases that only a coach or an assistant would say.
const INSTRUCTOR_PHRASES: &[&str] = &[
    "as a sales coach",
    "as your coach",
    "sales tip",
    "coaching tip",
    "you should ask",
    "try asking",
    "a good salesperson",
    "a good sales rep",
    "as an ai",
    "as a language model",
    "here's some feedback",
    "here is some feedback",
    "next time, try",
];

/// Speaker labels the model sometimes prefixes its line with.
const GENERIC_LABELS: &[&str] = &["counterpart", "customer", "buyer", "assistant", "prospect"];

/// The persona the counterpart plays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CharacterProfile {
    pub name: String,
    pub role: String,
    pub personality: String,
    pub background: String,
}

/// Role-play scenario metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Scenario {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub character: CharacterProfile,
    pub business_type: String,
    /// Objections the counterpart should raise when they fit.
    pub objections: Vec<String>,
}

impl Scenario {
    /// System prompt that puts the model in character.
    pub fn system_prompt(&self) -> String {
        let character = &self.character;
        let name = non_empty(&character.name, "the business owner");
        let mut prompt = format!(
            "You are {name}, {role} of a {business}. You are talking to a salesperson \
             who wants to sell you online advertising.\n",
            role = non_empty(&character.role, "the owner"),
            business = non_empty(&self.business_type, "small business"),
        );
        if !character.personality.trim().is_empty() {
            prompt.push_str(&format!("Personality: {}\n", character.personality.trim()));
        }
        if !character.background.trim().is_empty() {
            prompt.push_str(&format!("Background: {}\n", character.background.trim()));
        }
        let objections: Vec<&str> = self
            .objections
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .collect();
        if !objections.is_empty() {
            prompt.push_str("Concerns you may raise when they fit the conversation:\n");
            for objection in objections {
                prompt.push_str(&format!("- {objection}\n"));
            }
        }
        prompt.push_str(
            "Stay in character at all times. Be skeptical but fair, answer in one to three \
             short sentences, and never give the salesperson advice about how to sell. \
             Reply with your spoken words only, without a name label or quotes.",
        );
        prompt
    }
}

fn non_empty<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() { fallback } else { trimmed }
}

/// Produces the counterpart's next line.
pub struct RoleplayResponder {
    provider: Arc<dyn ModelProvider>,
    redactor: Arc<Redactor>,
    settings: LlmSettings,
}

impl RoleplayResponder {
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

    /// Build the chat request for the latest trainee `message`.
    ///
    /// Only the last `history_window` turns are carried, each redacted. When
    /// the history already ends with `message` as a trainee turn it is not
    /// appended a second time.
    pub fn build_request(
        &self,
        scenario: &Scenario,
        message: &str,
        history: &[ConversationTurn],
    ) -> ChatRequest {
        let window = self.settings.history_window;
        let recent = &history[history.len().saturating_sub(window)..];

        let mut messages = Vec::with_capacity(recent.len() + 2);
        messages.push(Message::system(scenario.system_prompt()));
        for turn in recent {
            let content = self.redactor.redact(&turn.message);
            messages.push(match turn.speaker {
                Speaker::Trainee => Message::user(content),
                Speaker::Counterpart => Message::assistant(content),
            });
        }
        let already_sent = recent
            .last()
            .is_some_and(|turn| turn.is_trainee() && turn.message.trim() == message.trim());
        if !already_sent {
            messages.push(Message::user(self.redactor.redact(message)));
        }

        ChatRequest::new(&self.settings.model, messages)
            .temperature(self.settings.temperature)
            .max_tokens(self.settings.max_tokens)
    }

    /// The counterpart's reply to `message`. Never fails.
    pub async fn reply(
        &self,
        scenario: &Scenario,
        message: &str,
        history: &[ConversationTurn],
    ) -> String {
        let request = self.build_request(scenario, message, history);
        match self.call(request).await {
            Ok(raw) => {
                let cleaned = clean_reply(&raw, &scenario.character.name);
                if cleaned.is_empty() {
                    warn!(provider = self.provider.name(), "empty role-play reply, using fallback");
                    FALLBACK_REPLY.to_string()
                } else if contains_instructor_voice(&cleaned) {
                    warn!(provider = self.provider.name(), "reply broke character, substituting");
                    NEUTRAL_REPLY.to_string()
                } else {
                    debug!(chars = cleaned.len(), "role-play reply ready");
                    cleaned
                }
            }
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "role-play call failed, using fallback");
                FALLBACK_REPLY.to_string()
            }
        }
    }

    async fn call(&self, request: ChatRequest) -> Result<String> {
        let timeout = self.settings.timeout();
        let response = tokio::time::timeout(timeout, self.provider.chat(request))
            .await
            .map_err(|_| Error::Timeout(timeout.as_secs()))??;
        Ok(response.content)
    }
}

/// True when `reply` contains a coaching or assistant phrase.
pub fn contains_instructor_voice(reply: &str) -> bool {
    let lowered = reply.to_lowercase();
    INSTRUCTOR_PHRASES.iter().any(|p| lowered.contains(p))
}

/// Trim, drop a leading speaker label, and strip surrounding quotes.
pub fn clean_reply(raw: &str, character_name: &str) -> String {
    let mut text = raw.trim();

    if let Some((label, rest)) = text.split_once(':') {
        let label = label.trim().trim_matches('*').trim();
        let is_name = !character_name.trim().is_empty()
            && label.eq_ignore_ascii_case(character_name.trim());
        let is_generic = GENERIC_LABELS.iter().any(|g| label.eq_ignore_ascii_case(g));
        if is_name || is_generic {
            text = rest.trim();
        }
    }

    const QUOTES: &[(char, char)] = &[('"', '"'), ('\u{201c}', '\u{201d}'), ('\'', '\'')];
    for (open, close) in QUOTES {
        if text.len() >= 2 && text.starts_with(*open) && text.ends_with(*close) {
            text = text[open.len_utf8()..text.len() - close.len_utf8()].trim();
            break;
        }
    }

    text.to_string()
}
