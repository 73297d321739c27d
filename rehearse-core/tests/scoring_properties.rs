//! Integration tests for the scoring core.
//!
//! These tests exercise the public API end to end:
//! - Determinism and bounds over a spread of inputs
//! - Default record on empty input
//! - Confidence monotonicity in filler density
//! - Redaction coverage and idempotence

use rehearse_core::{
    ConversationTurn, MAX_SCORE, MIN_SCORE, MetricsEngine, MetricsRecord, Redactor, redact,
};

/// Helper to build an alternating history starting with the trainee.
fn alternating(messages: &[&str]) -> Vec<ConversationTurn> {
    messages
        .iter()
        .enumerate()
        .map(|(i, m)| {
            if i % 2 == 0 {
                ConversationTurn::trainee(*m)
            } else {
                ConversationTurn::counterpart(*m)
            }
        })
        .collect()
}

fn sample_histories() -> Vec<Vec<ConversationTurn>> {
    vec![
        vec![],
        alternating(&["Hi"]),
        alternating(&["Um, like, hi?", "Who is this?", "Uh, basically, I sell ads."]),
        alternating(&[
            "What are your goals for this year?",
            "More customers.",
            "I understand. Our search campaign improves ROI and lowers CPC.",
            "Sounds expensive.",
            "That makes sense. For example, one bakery doubled revenue.",
            "Hmm.",
            "How do you measure success today? What is your budget?",
        ]),
        vec![ConversationTurn::counterpart("Hello?")],
        vec![
            ConversationTurn::trainee("???"),
            ConversationTurn::trainee("..."),
            ConversationTurn::trainee(""),
        ],
    ]
}

fn assert_bounded(record: &MetricsRecord) {
    assert!((20..=100).contains(&record.confidence_score));
    assert!(record.talk_time_ratio <= 100);
    for score in [
        record.discovery_score,
        record.product_knowledge_score,
        record.objection_handling_score,
        record.business_value_score,
        record.overall_effectiveness_score,
    ] {
        assert!((MIN_SCORE..=MAX_SCORE).contains(&score), "score {score} out of range");
    }
}

#[test]
fn analysis_is_deterministic() {
    let engine = MetricsEngine::with_defaults();
    for history in sample_histories() {
        let first = engine.analyze(Some("fallback text, um, okay?"), &history);
        for _ in 0..3 {
            assert_eq!(engine.analyze(Some("fallback text, um, okay?"), &history), first);
        }
    }
}

#[test]
fn analysis_stays_in_bounds() {
    let engine = MetricsEngine::with_defaults();
    for history in sample_histories() {
        assert_bounded(&engine.analyze(None, &history));
    }
    for transcript in ["", "um", "um uh like", "What? Why? When? Where? How?"] {
        assert_bounded(&engine.analyze(Some(transcript), &[]));
    }
}

#[test]
fn empty_input_yields_neutral_defaults() {
    let engine = MetricsEngine::with_defaults();
    for record in [engine.analyze(None, &[]), engine.analyze(Some(""), &[])] {
        assert_eq!(record.word_count, 0);
        assert_eq!(record.filler_word_count, 0);
        assert_eq!(record.confidence_score, 50);
        assert_eq!(record.talk_time_ratio, 50);
        assert_eq!(record.discovery_score, 2);
        assert_eq!(record.product_knowledge_score, 2);
        assert_eq!(record.objection_handling_score, 2);
        assert_eq!(record.business_value_score, 2);
        assert_eq!(record.overall_effectiveness_score, 2);
        assert!(record.is_empty());
    }
}

#[test]
fn more_fillers_never_raise_confidence() {
    let engine = MetricsEngine::with_defaults();
    let length = 20;
    let mut previous = u8::MAX;
    for fillers in 0..=length {
        let words: Vec<&str> = (0..length)
            .map(|i| if i < fillers { "um" } else { "word" })
            .collect();
        let record = engine.analyze(Some(&words.join(" ")), &[]);
        assert_eq!(record.word_count, length);
        assert!(
            record.confidence_score <= previous,
            "confidence rose at {fillers} fillers"
        );
        previous = record.confidence_score;
    }
    assert_eq!(previous, 20);
}

#[test]
fn filler_heavy_scenario() {
    let engine = MetricsEngine::with_defaults();
    let history = vec![ConversationTurn::trainee("Um, so, like, I uh think this is good")];
    let record = engine.analyze(None, &history);
    assert!(record.filler_word_count >= 3);
    assert!(record.confidence_score < 80);
}

#[test]
fn discovery_question_scenario() {
    let engine = MetricsEngine::with_defaults();
    let history = vec![ConversationTurn::trainee("What is your current budget for this?")];
    let record = engine.analyze(None, &history);
    assert_eq!(record.discovery_questions_count, 1);
    assert!(record.discovery_score >= 2);
}

#[test]
fn alternating_four_turns_split_talk_time_evenly() {
    let engine = MetricsEngine::with_defaults();
    let history = alternating(&["Hello", "Hi", "How are you?", "Busy."]);
    assert_eq!(engine.analyze(None, &history).talk_time_ratio, 50);
}

#[test]
fn strong_conversation_scores_higher_than_weak_one() {
    let engine = MetricsEngine::with_defaults();
    let histories = sample_histories();
    let weak = engine.analyze(None, &histories[1]);
    let strong = engine.analyze(None, &histories[3]);

    assert!(strong.overall_effectiveness_score > weak.overall_effectiveness_score);
    assert_eq!(strong.discovery_questions_count, 2);
    assert!(strong.concepts_recognized.contains("search campaign"));
    assert!(strong.concepts_recognized.contains("cpc"));
}

#[test]
fn redaction_coverage_examples() {
    let email = redact("Contact me at jane.doe@example.com");
    assert!(email.contains("[EMAIL_REDACTED]"));
    assert!(!email.contains("jane.doe@example.com"));

    assert!(redact("Call 555-123-4567 now").contains("[PHONE_REDACTED]"));
    assert!(redact("SSN 123-45-6789").contains("[SSN_REDACTED]"));
}

#[test]
fn redaction_of_redacted_text_is_a_no_op() {
    let redactor = Redactor::with_default_patterns();
    let inputs = [
        "Mail jane@corp.io or call (555) 123-4567",
        "Card 4111-1111-1111-1111, SSN 123456789",
        "Met with Alice Johnson at the expo",
        "nothing sensitive here",
    ];
    for input in inputs {
        let once = redactor.redact(input);
        assert_eq!(redactor.redact(&once), once, "not idempotent for {input:?}");
    }
}

#[test]
fn placeholders_do_not_change_scores() {
    let engine = MetricsEngine::with_defaults();
    let raw = vec![ConversationTurn::trainee(
        "What is your budget? Email me at bob@shop.com and we can improve results.",
    )];
    let redacted = Redactor::default().redact_turns(&raw);

    let a = engine.analyze(None, &raw);
    let b = engine.analyze(None, &redacted);
    assert_eq!(a.discovery_questions_count, b.discovery_questions_count);
    assert_eq!(a.business_value_mentions, b.business_value_mentions);
    assert_eq!(a.filler_word_count, b.filler_word_count);
}
