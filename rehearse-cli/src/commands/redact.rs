//! Redact PII from a file or stdin.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use rehearse_core::Redactor;
use tracing::info;

use crate::commands::read_input;
use crate::config::ConfigLoader;

#[derive(Debug, Args)]
pub struct RedactArgs {
    /// File to redact (stdin when omitted or `-`)
    pub file: Option<PathBuf>,

    /// Print per-category replacement counts to stderr
    #[arg(long)]
    pub report: bool,
}

pub fn run(args: RedactArgs, config_path: Option<&Path>) -> Result<()> {
    let config = ConfigLoader::load_with_override(config_path)?;
    let redactor = Redactor::from_patterns(&config.redaction)?;

    let text = read_input(args.file.as_deref())?;
    let result = redactor.redact_with_report(&text);
    print!("{}", result.redacted_text);

    info!(replacements = result.total(), "redaction complete");
    if args.report {
        for count in &result.redactions {
            eprintln!("{:>5}  {}", count.count, count.placeholder);
        }
    }
    Ok(())
}
