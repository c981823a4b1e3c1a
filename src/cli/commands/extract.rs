//! Extract command - one replay, no cache.

use std::path::Path;

use anyhow::Context;

use crate::extract::{Extraction, extract_file};

/// Run extract command.
///
/// A rejection is a normal outcome and is reported on stderr; only an
/// unreadable or malformed file is an error.
pub fn run_extract(file: &Path, compact: bool) -> anyhow::Result<()> {
    let extraction =
        extract_file(file).with_context(|| format!("failed to extract {}", file.display()))?;

    match extraction {
        Extraction::Record(record) => {
            let json = if compact {
                serde_json::to_string(&record)
            } else {
                serde_json::to_string_pretty(&record)
            }
            .context("failed to serialize record")?;
            println!("{json}");
        }
        Extraction::Rejected(reason) => {
            eprintln!("{} is not a qualifying match: {reason}", file.display());
        }
    }
    Ok(())
}
