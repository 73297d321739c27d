//! Score a conversation from a file or stdin.
//!
//! Input is `{ "transcript"?: string, "conversationHistory"?: [...] }` JSON.
//! Anything that is not a JSON object is scored as a bare transcript.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, ValueEnum};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use rehearse_core::{MetricsEngine, MetricsRecord};
use serde::Deserialize;
use tracing::debug;

use crate::commands::read_input;
use crate::config::ConfigLoader;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// JSON file to analyze (stdin when omitted or `-`)
    pub file: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AnalyzeInput {
    transcript: Option<serde_json::Value>,
    conversation_history: Option<serde_json::Value>,
}

pub fn run(args: AnalyzeArgs, config_path: Option<&Path>) -> Result<()> {
    let config = ConfigLoader::load_with_override(config_path)?;
    let engine = MetricsEngine::new(config.scoring)?;

    let input = read_input(args.file.as_deref())?;
    let record = analyze_input(&engine, &input);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
        OutputFormat::Table => println!("{}", metrics_table(&record)),
    }
    Ok(())
}

fn analyze_input(engine: &MetricsEngine, input: &str) -> MetricsRecord {
    match serde_json::from_str::<serde_json::Value>(input) {
        Ok(value @ serde_json::Value::Object(_)) => {
            let parsed: AnalyzeInput = serde_json::from_value(value).unwrap_or_default();
            engine.analyze_json(
                parsed.transcript.as_ref().and_then(serde_json::Value::as_str),
                parsed.conversation_history.as_ref(),
            )
        }
        _ => {
            debug!("input is not a JSON object, scoring as plain transcript");
            engine.analyze(Some(input), &[])
        }
    }
}

fn metrics_table(record: &MetricsRecord) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Metric").fg(Color::Cyan),
        Cell::new("Value").fg(Color::Cyan),
        Cell::new("Score").fg(Color::Cyan),
    ]);

    let concepts = if record.concepts_recognized.is_empty() {
        "-".to_string()
    } else {
        record
            .concepts_recognized
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };

    let rows: Vec<(&str, String, String)> = vec![
        ("Words", record.word_count.to_string(), String::new()),
        ("Sentences", record.sentence_count.to_string(), String::new()),
        (
            "Avg sentence length",
            format!("{:.1}", record.average_sentence_length),
            String::new(),
        ),
        (
            "Filler words",
            record.filler_word_count.to_string(),
            format!("{}/100", record.confidence_score),
        ),
        (
            "Talk time",
            format!("{}%", record.talk_time_ratio),
            String::new(),
        ),
        (
            "Turns (trainee/total)",
            format!("{}/{}", record.trainee_turns, record.conversation_length),
            String::new(),
        ),
        (
            "Discovery questions",
            record.discovery_questions_count.to_string(),
            format!("{}/5", record.discovery_score),
        ),
        (
            "Product concepts",
            concepts,
            format!("{}/5", record.product_knowledge_score),
        ),
        (
            "Objection handling",
            record.objection_handling_count.to_string(),
            format!("{}/5", record.objection_handling_score),
        ),
        (
            "Business value",
            record.business_value_mentions.to_string(),
            format!("{}/5", record.business_value_score),
        ),
        (
            "Overall effectiveness",
            String::new(),
            format!("{}/5", record.overall_effectiveness_score),
        ),
    ];

    for (name, value, score) in rows {
        table.add_row(vec![Cell::new(name), Cell::new(value), Cell::new(score)]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_json_object_input() {
        let engine = MetricsEngine::with_defaults();
        let record = analyze_input(
            &engine,
            r#"{"conversationHistory": [
                {"speaker": "trainee", "message": "What is your current budget for this?"},
                {"speaker": "counterpart", "message": "Small."}
            ]}"#,
        );
        assert_eq!(record.discovery_questions_count, 1);
        assert_eq!(record.conversation_length, 2);
    }

    #[test]
    fn test_analyze_plain_text_input() {
        let engine = MetricsEngine::with_defaults();
        let record = analyze_input(&engine, "Um, like, what is your goal?");
        assert_eq!(record.word_count, 6);
        assert_eq!(record.filler_word_count, 2);
    }

    #[test]
    fn test_analyze_malformed_history_is_default() {
        let engine = MetricsEngine::with_defaults();
        let record = analyze_input(&engine, r#"{"conversationHistory": 42}"#);
        assert_eq!(record, MetricsRecord::default());
    }

    #[test]
    fn test_analyze_non_string_transcript_keeps_history() {
        let engine = MetricsEngine::with_defaults();
        let record = analyze_input(
            &engine,
            r#"{"transcript": 42, "conversationHistory": [
                {"speaker": "trainee", "message": "What is your goal?"}
            ]}"#,
        );
        assert_eq!(record.discovery_questions_count, 1);
    }

    #[test]
    fn test_metrics_table_lists_scores() {
        let rendered = metrics_table(&MetricsRecord::default()).to_string();
        assert!(rendered.contains("Discovery questions"));
        assert!(rendered.contains("Overall effectiveness"));
        assert!(rendered.contains("2/5"));
        assert!(rendered.contains("50/100"));
    }
}
