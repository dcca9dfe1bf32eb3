// src/pipeline/export.rs

//! CSV export of a processed batch.
//!
//! Written after a completed run for external analysis tooling; the
//! store remains the system of record.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::EnrichedPosting;

const HEADER: &str =
    "title,company,link,description,source,collected_at,category,score,keywords,summary,degraded";

/// File name of the export inside the output directory.
pub const EXPORT_FILE: &str = "jobs_processed.csv";

/// Write the enriched batch as CSV under `export_dir`.
///
/// Returns the path written. The directory is created if absent and
/// the file is overwritten on every run.
pub fn write_csv(export_dir: impl AsRef<Path>, batch: &[EnrichedPosting]) -> Result<PathBuf> {
    fs::create_dir_all(&export_dir)?;
    let path = export_dir.as_ref().join(EXPORT_FILE);

    let mut file = fs::File::create(&path)?;
    writeln!(file, "{HEADER}")?;
    for record in batch {
        writeln!(file, "{}", format_row(record))?;
    }
    file.flush()?;

    log::info!("Exported {} records to {}", batch.len(), path.display());
    Ok(path)
}

fn format_row(record: &EnrichedPosting) -> String {
    let posting = &record.posting;
    [
        escape(&posting.title),
        escape(&posting.company),
        escape(&posting.link),
        escape(&posting.description),
        escape(&posting.source),
        posting.collected_at.to_rfc3339(),
        escape(record.category.as_str()),
        record.score.to_string(),
        escape(&record.keywords.join(", ")),
        escape(&record.summary),
        record.degraded.to_string(),
    ]
    .join(",")
}

/// Quote a field when it contains a delimiter, quote, or newline.
fn escape(field: &str) -> String {
    if field.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
