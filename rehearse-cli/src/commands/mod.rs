pub mod analyze;
pub mod config;
pub mod redact;
pub mod serve;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

/// Read a file, or stdin when `path` is absent or `-`.
pub(crate) fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            Ok(buffer)
        }
    }
}
