//! Conversation metrics engine.
//!
//! Deterministic keyword and ratio heuristics over the trainee's side of a
//! conversation. The engine holds only its (immutable) configuration, so one
//! instance can be shared across any number of threads.
//!
//! ```text
//! analyze(transcript, history)
//!     │
//!     ├─ history non-empty? → trainee messages, space-joined
//!     │                 else → transcript
//!     ├─ no words and no turns → MetricsRecord::default()
//!     ├─ tokens / sentences → word, filler, confidence, sentence length
//!     ├─ turn ratio (or word-count estimate) → talk time
//!     ├─ per utterance → discovery, objection handling, business value
//!     └─ counts → five-point scores → overall effectiveness
//! ```

mod config;

use std::collections::BTreeSet;

use serde::Deserialize;
use tracing::{debug, warn};

pub use config::{MAX_SCORE, MIN_SCORE, ScoringConfig, SubScoreCurve};

use crate::error::CoreResult;
use crate::types::{ConversationTurn, MetricsRecord, trainee_text};

const SENTENCE_TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Words per estimated talk-time percentage point when no turns are known.
const WORDS_PER_TALK_POINT: f64 = 4.0;
const MIN_ESTIMATED_TALK_TIME: f64 = 20.0;
const MAX_ESTIMATED_TALK_TIME: f64 = 80.0;

/// Computes [`MetricsRecord`]s from transcripts and turn histories.
#[derive(Debug, Clone)]
pub struct MetricsEngine {
    config: ScoringConfig,
}

impl MetricsEngine {
    /// Create an engine from a scoring configuration.
    ///
    /// Vocabularies are lower-cased; curve constants are validated.
    pub fn new(config: ScoringConfig) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self {
            config: config.normalized(),
        })
    }

    /// Create an engine with the default vocabularies and curves.
    pub fn with_defaults() -> Self {
        Self {
            config: ScoringConfig::default().normalized(),
        }
    }

    /// The (normalized) configuration in use.
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Analyze a conversation.
    ///
    /// When `history` has turns, only trainee messages are scored and
    /// `transcript` is ignored. Otherwise `transcript` is treated as the
    /// trainee's speech. Never fails; empty input yields
    /// [`MetricsRecord::default`].
    pub fn analyze(&self, transcript: Option<&str>, history: &[ConversationTurn]) -> MetricsRecord {
        let text = if history.is_empty() {
            transcript.unwrap_or_default().to_string()
        } else {
            trainee_text(history)
        };
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered.split_whitespace().collect();

        if words.is_empty() && history.is_empty() {
            debug!("no words and no turns, returning default metrics");
            return MetricsRecord::default();
        }

        let word_count = words.len();
        let sentence_count = lowered
            .split(SENTENCE_TERMINATORS)
            .filter(|fragment| !fragment.trim().is_empty())
            .count();
        let filler_word_count = self.count_fillers(&words);
        let confidence_score = confidence_score(filler_word_count, word_count);
        let average_sentence_length = average_sentence_length(word_count, sentence_count);

        let trainee_turns = history.iter().filter(|turn| turn.is_trainee()).count();
        let talk_time_ratio = talk_time_ratio(trainee_turns, history.len(), word_count);

        let concepts_recognized: BTreeSet<String> = self
            .config
            .domain_concepts
            .iter()
            .filter(|concept| lowered.contains(concept.as_str()))
            .cloned()
            .collect();

        let utterances = trainee_utterances(history, &lowered);
        let discovery_questions_count = utterances
            .iter()
            .filter(|u| u.contains('?') && contains_any(u, &self.config.discovery_keywords))
            .count();
        let objection_handling_count = utterances
            .iter()
            .filter(|u| contains_any(u, &self.config.objection_phrases))
            .count();
        let business_value_mentions = utterances
            .iter()
            .filter(|u| contains_any(u, &self.config.value_keywords))
            .count();

        let discovery_score = self.config.discovery.score(discovery_questions_count);
        let product_knowledge_score = self
            .config
            .product_knowledge
            .score(concepts_recognized.len());
        let objection_handling_score = self
            .config
            .objection_handling
            .score(objection_handling_count);
        let business_value_score = self.config.business_value.score(business_value_mentions);
        let overall_effectiveness_score = overall_score(&[
            discovery_score,
            product_knowledge_score,
            objection_handling_score,
            business_value_score,
        ]);

        debug!(
            word_count,
            filler_word_count,
            confidence_score,
            talk_time_ratio,
            discovery_questions_count,
            objection_handling_count,
            business_value_mentions,
            concepts = concepts_recognized.len(),
            overall_effectiveness_score,
            "conversation analyzed"
        );

        MetricsRecord {
            word_count,
            sentence_count,
            average_sentence_length,
            filler_word_count,
            confidence_score,
            talk_time_ratio,
            conversation_length: history.len(),
            trainee_turns,
            discovery_questions_count,
            objection_handling_count,
            business_value_mentions,
            concepts_recognized,
            discovery_score,
            product_knowledge_score,
            objection_handling_score,
            business_value_score,
            overall_effectiveness_score,
        }
    }

    /// Analyze loosely-typed input from a request boundary.
    ///
    /// `history` may be absent, `null`, or a JSON array of turns. Anything
    /// that does not convert into turns produces the default record.
    pub fn analyze_json(
        &self,
        transcript: Option<&str>,
        history: Option<&serde_json::Value>,
    ) -> MetricsRecord {
        match parse_history(history) {
            Some(turns) => self.analyze(transcript, &turns),
            None => MetricsRecord::default(),
        }
    }

    fn count_fillers(&self, words: &[&str]) -> usize {
        words
            .iter()
            .filter(|word| contains_any(word, &self.config.filler_words))
            .count()
    }
}

/// Convert a loosely-typed `conversationHistory` value into turns.
///
/// Absent or `null` is an empty history. Returns `None` (and logs) when the
/// value is present but not a list of turns.
pub fn parse_history(value: Option<&serde_json::Value>) -> Option<Vec<ConversationTurn>> {
    match value {
        None | Some(serde_json::Value::Null) => Some(Vec::new()),
        Some(value) => match Vec::<ConversationTurn>::deserialize(value) {
            Ok(turns) => Some(turns),
            Err(e) => {
                // serde messages may quote transcript text
                warn!(
                    line = e.line(),
                    column = e.column(),
                    "malformed conversation history"
                );
                None
            }
        },
    }
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn contains_any(text: &str, needles: &[String]) -> bool {
    needles.iter().any(|needle| text.contains(needle.as_str()))
}

/// `clamp(round(100 - 200 * fillers / words), 20, 100)`, or 50 with no words.
fn confidence_score(filler_word_count: usize, word_count: usize) -> u8 {
    if word_count == 0 {
        return MetricsRecord::NEUTRAL_CONFIDENCE;
    }
    let filler_ratio = filler_word_count as f64 / word_count as f64;
    (100.0 - filler_ratio * 200.0).round().clamp(20.0, 100.0) as u8
}

fn average_sentence_length(word_count: usize, sentence_count: usize) -> f64 {
    if sentence_count == 0 {
        return 0.0;
    }
    (word_count as f64 / sentence_count as f64 * 10.0).round() / 10.0
}

fn talk_time_ratio(trainee_turns: usize, total_turns: usize, word_count: usize) -> u8 {
    if total_turns > 0 {
        return (100.0 * trainee_turns as f64 / total_turns as f64).round() as u8;
    }
    if word_count == 0 {
        return MetricsRecord::NEUTRAL_TALK_TIME;
    }
    (word_count as f64 / WORDS_PER_TALK_POINT)
        .round()
        .clamp(MIN_ESTIMATED_TALK_TIME, MAX_ESTIMATED_TALK_TIME) as u8
}

fn overall_score(scores: &[u8]) -> u8 {
    if scores.is_empty() {
        return MetricsRecord::NEUTRAL_SCORE;
    }
    let sum: u32 = scores.iter().map(|s| u32::from(*s)).sum();
    let average = f64::from(sum) / scores.len() as f64;
    average.ceil().clamp(f64::from(MIN_SCORE), f64::from(MAX_SCORE)) as u8
}

/// Lower-cased units that per-turn counts run over.
///
/// With a history these are the trainee turns. A bare transcript has no turn
/// boundaries, so it is cut after each run of sentence terminators instead.
fn trainee_utterances(history: &[ConversationTurn], lowered_transcript: &str) -> Vec<String> {
    if !history.is_empty() {
        return history
            .iter()
            .filter(|turn| turn.is_trainee())
            .map(|turn| turn.message.to_lowercase())
            .collect();
    }

    let mut utterances = Vec::new();
    let mut current = String::new();
    let mut chars = lowered_transcript.chars().peekable();
    while let Some(c) = chars.next() {
        current.push(c);
        let ends_run = SENTENCE_TERMINATORS.contains(&c)
            && !chars
                .peek()
                .is_some_and(|next| SENTENCE_TERMINATORS.contains(next));
        if ends_run {
            push_utterance(&mut utterances, &mut current);
        }
    }
    push_utterance(&mut utterances, &mut current);
    utterances
}

fn push_utterance(utterances: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        utterances.push(trimmed.to_string());
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Speaker;

    fn engine() -> MetricsEngine {
        MetricsEngine::with_defaults()
    }

    #[test]
    fn test_empty_input_returns_default() {
        assert_eq!(engine().analyze(None, &[]), MetricsRecord::default());
        assert_eq!(engine().analyze(Some(""), &[]), MetricsRecord::default());
        assert_eq!(engine().analyze(Some("   \n"), &[]), MetricsRecord::default());
    }

    #[test]
    fn test_filler_heavy_turn() {
        let history = vec![ConversationTurn::trainee("Um, so, like, I uh think this is good")];
        let record = engine().analyze(None, &history);

        assert_eq!(record.word_count, 9);
        assert_eq!(record.filler_word_count, 3);
        assert_eq!(record.confidence_score, 33);
        assert_eq!(record.sentence_count, 1);
        assert_eq!(record.average_sentence_length, 9.0);
    }

    #[test]
    fn test_fillers_match_as_substrings() {
        // "likely" contains "like"; the vocabulary is deliberately permissive.
        let record = engine().analyze(Some("that is likely fine"), &[]);
        assert_eq!(record.filler_word_count, 1);
    }

    #[test]
    fn test_multi_word_filler_never_matches_a_token() {
        // Tokens are whitespace-split, so "you know" cannot occur inside one.
        let record = engine().analyze(Some("You know, we basically, you know, grow"), &[]);
        assert_eq!(record.word_count, 7);
        assert_eq!(record.filler_word_count, 1);
    }

    #[test]
    fn test_confidence_floor_is_twenty() {
        let record = engine().analyze(Some("um uh um uh"), &[]);
        assert_eq!(record.filler_word_count, 4);
        assert_eq!(record.confidence_score, 20);
    }

    #[test]
    fn test_clean_speech_has_full_confidence() {
        let record = engine().analyze(Some("We help bakers get more calls."), &[]);
        assert_eq!(record.filler_word_count, 0);
        assert_eq!(record.confidence_score, 100);
    }

    #[test]
    fn test_average_sentence_length_rounds_to_one_decimal() {
        let record = engine().analyze(Some("One two three. Four five! Six?"), &[]);
        assert_eq!(record.word_count, 6);
        assert_eq!(record.sentence_count, 3);
        assert_eq!(record.average_sentence_length, 2.0);

        let record = engine().analyze(Some("a b. c d. e f g..."), &[]);
        assert_eq!(record.sentence_count, 3);
        assert_eq!(record.average_sentence_length, 2.3);
    }

    #[test]
    fn test_discovery_question_detection() {
        let history = vec![ConversationTurn::trainee("What is your current budget for this?")];
        let record = engine().analyze(None, &history);

        assert_eq!(record.discovery_questions_count, 1);
        assert!(record.discovery_score >= 2);
    }

    #[test]
    fn test_discovery_requires_question_mark() {
        let history = vec![ConversationTurn::trainee("Tell me what your budget is.")];
        let record = engine().analyze(None, &history);
        assert_eq!(record.discovery_questions_count, 0);
    }

    #[test]
    fn test_counterpart_turns_are_not_scored() {
        let history = vec![
            ConversationTurn::trainee("Hello there."),
            ConversationTurn::counterpart("What is the ROI? I understand ads, um, like, basically."),
        ];
        let record = engine().analyze(None, &history);

        assert_eq!(record.filler_word_count, 0);
        assert_eq!(record.discovery_questions_count, 0);
        assert_eq!(record.objection_handling_count, 0);
        assert_eq!(record.business_value_mentions, 0);
        assert_eq!(record.word_count, 2);
    }

    #[test]
    fn test_history_takes_precedence_over_transcript() {
        let history = vec![ConversationTurn::trainee("Short answer.")];
        let record = engine().analyze(Some("um um um um um um"), &history);
        assert_eq!(record.word_count, 2);
        assert_eq!(record.filler_word_count, 0);
    }

    #[test]
    fn test_talk_time_from_turns() {
        let history = vec![
            ConversationTurn::trainee("Hi, I'm calling about your ads."),
            ConversationTurn::counterpart("Okay."),
            ConversationTurn::trainee("How are leads coming in today?"),
            ConversationTurn::counterpart("Word of mouth."),
        ];
        let record = engine().analyze(None, &history);
        assert_eq!(record.talk_time_ratio, 50);
        assert_eq!(record.conversation_length, 4);
        assert_eq!(record.trainee_turns, 2);
    }

    #[test]
    fn test_talk_time_rounds() {
        let history = vec![
            ConversationTurn::trainee("one"),
            ConversationTurn::trainee("two"),
            ConversationTurn::counterpart("three"),
        ];
        assert_eq!(engine().analyze(None, &history).talk_time_ratio, 67);
    }

    #[test]
    fn test_counterpart_only_history() {
        let history = vec![ConversationTurn::counterpart("Who is this?")];
        let record = engine().analyze(None, &history);

        assert_eq!(record.word_count, 0);
        assert_eq!(record.talk_time_ratio, 0);
        assert_eq!(record.confidence_score, 50);
        assert_eq!(record.conversation_length, 1);
        assert!(!record.is_empty());
    }

    #[test]
    fn test_talk_time_estimate_without_turns_is_clamped() {
        let short = engine().analyze(Some("hello"), &[]);
        assert_eq!(short.talk_time_ratio, 20);

        let long_text = "word ".repeat(1000);
        let long = engine().analyze(Some(&long_text), &[]);
        assert_eq!(long.talk_time_ratio, 80);

        let middle_text = "word ".repeat(200);
        let middle = engine().analyze(Some(&middle_text), &[]);
        assert_eq!(middle.talk_time_ratio, 50);
    }

    #[test]
    fn test_concepts_recognized_are_distinct() {
        let history = vec![
            ConversationTurn::trainee("Your Quality Score affects CPC."),
            ConversationTurn::trainee("A better quality score lowers cost per click."),
        ];
        let record = engine().analyze(None, &history);

        let expected: BTreeSet<String> = ["cost per click", "cpc", "quality score"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(record.concepts_recognized, expected);
        assert_eq!(record.product_knowledge_score, 4);
    }

    #[test]
    fn test_objection_and_value_counts_per_turn() {
        let history = vec![
            ConversationTurn::trainee("I understand. Let me explain how this improves results."),
            ConversationTurn::counterpart("It's too expensive."),
            ConversationTurn::trainee("That makes sense. For example, one client saw revenue growth."),
            ConversationTurn::trainee("Okay."),
        ];
        let record = engine().analyze(None, &history);

        assert_eq!(record.objection_handling_count, 2);
        assert_eq!(record.objection_handling_score, 4);
        assert_eq!(record.business_value_mentions, 2);
        assert_eq!(record.business_value_score, 3);
    }

    #[test]
    fn test_transcript_is_split_into_utterances() {
        let record = engine().analyze(
            Some("What are your goals?! How do you measure success? We grow sales."),
            &[],
        );
        assert_eq!(record.discovery_questions_count, 2);
        assert_eq!(record.business_value_mentions, 1);
    }

    #[test]
    fn test_overall_score_is_ceiling_of_average() {
        assert_eq!(overall_score(&[2, 2, 2, 2]), 2);
        assert_eq!(overall_score(&[2, 3, 2, 2]), 3);
        assert_eq!(overall_score(&[5, 5, 5, 4]), 5);
        assert_eq!(overall_score(&[1, 1, 1, 1]), 1);
    }

    #[test]
    fn test_analyze_json_malformed_history_returns_default() {
        let history = serde_json::json!([{ "speaker": "trainee" }]);
        let record = engine().analyze_json(Some("What is your budget?"), Some(&history));
        assert_eq!(record, MetricsRecord::default());

        let history = serde_json::json!({ "not": "a list" });
        assert_eq!(
            engine().analyze_json(None, Some(&history)),
            MetricsRecord::default()
        );
    }

    #[test]
    fn test_analyze_json_accepts_typed_history() {
        let history = serde_json::json!([
            { "speaker": "salesperson", "message": "What is your budget?" },
            { "speaker": "customer", "message": "Small." }
        ]);
        let record = engine().analyze_json(None, Some(&history));
        assert_eq!(record.discovery_questions_count, 1);
        assert_eq!(record.talk_time_ratio, 50);
    }

    #[test]
    fn test_analyze_json_null_history_uses_transcript() {
        let record = engine().analyze_json(Some("hello world"), Some(&serde_json::Value::Null));
        assert_eq!(record.word_count, 2);
    }

    #[test]
    fn test_parse_history_shapes() {
        assert_eq!(parse_history(None), Some(Vec::new()));
        assert_eq!(parse_history(Some(&serde_json::Value::Null)), Some(Vec::new()));
        assert_eq!(parse_history(Some(&serde_json::json!("nope"))), None);
        assert_eq!(
            parse_history(Some(&serde_json::json!([{ "speaker": "trainee" }]))),
            None
        );

        let turns = parse_history(Some(&serde_json::json!([
            { "speaker": "user", "message": "hi" }
        ])))
        .unwrap();
        assert_eq!(turns, vec![ConversationTurn::trainee("hi")]);
    }

    #[test]
    fn test_custom_vocabulary_is_lowercased() {
        let config = ScoringConfig {
            domain_concepts: vec!["CRM".to_string()],
            ..Default::default()
        };
        let engine = MetricsEngine::new(config).unwrap();
        let history = vec![ConversationTurn::new(Speaker::Trainee, "Our crm syncs leads.")];
        let record = engine.analyze(None, &history);
        assert!(record.concepts_recognized.contains("crm"));
    }
}
