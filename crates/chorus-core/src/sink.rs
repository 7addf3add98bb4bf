//! Output sinks for finished comparison sets.
//!
//! The image sink writes each successful image payload under the output
//! directory, one subdirectory per provider, with collision-avoiding file
//! numbering. The text report renders every entry side by side, with
//! failures appearing as labeled error lines rather than missing rows.

use crate::error::Result;
use crate::types::{ComparisonSet, Payload};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Report format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable side-by-side text
    Text,
    /// Single JSON document
    Json,
    /// One JSON object per result line
    JsonLines,
}

impl ReportFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Writes successful image payloads to disk, named per provider.
pub struct ImageSink {
    output_dir: PathBuf,
}

impl ImageSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Write every successful image payload in the set.
    ///
    /// Each provider gets its own subdirectory; file names are numbered
    /// past any existing files so repeated runs never overwrite earlier
    /// output. Failed entries and text payloads are skipped.
    pub fn write(&self, set: &ComparisonSet) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for result in set {
            let Some(Payload::Image { bytes, format }) = &result.payload else {
                continue;
            };
            let dir = self.output_dir.join(sanitize(&result.spec.provider));
            std::fs::create_dir_all(&dir)?;
            let path = next_free_path(&dir, format);
            std::fs::write(&path, bytes)?;
            tracing::info!(provider = %result.spec, "Wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

/// First `image_N.<ext>` in `dir` that doesn't exist yet.
fn next_free_path(dir: &Path, ext: &str) -> PathBuf {
    let mut i = 1usize;
    loop {
        let candidate = dir.join(format!("image_{i}.{ext}"));
        if !candidate.exists() {
            return candidate;
        }
        i += 1;
    }
}

/// Make a provider name safe for use as a directory name.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// Render the set as a side-by-side text report.
///
/// Every entry appears, success or failure, in dispatch order.
pub fn write_text_report<W: Write>(set: &ComparisonSet, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "Prompt: {}", set.prompt())?;
    for result in set {
        writeln!(writer, "{}", "-".repeat(60))?;
        writeln!(
            writer,
            "[{}] {}ms",
            result.spec,
            result.latency.as_millis()
        )?;
        match (&result.payload, &result.error) {
            (Some(Payload::Text { text }), _) => writeln!(writer, "{text}")?,
            (Some(Payload::Image { bytes, format }), _) => {
                writeln!(writer, "<image: {} bytes, {format}>", bytes.len())?
            }
            (None, Some(err)) => writeln!(writer, "FAILED ({}): {}", err.kind, err.message)?,
            (None, None) => {}
        }
    }
    writeln!(writer, "{}", "-".repeat(60))?;
    writeln!(
        writer,
        "{} succeeded, {} failed",
        set.success_count(),
        set.failure_count()
    )
}

/// Serialize an item to a JSON string.
pub fn to_json<T: Serialize>(item: &T, pretty: bool) -> std::result::Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(item)
    } else {
        serde_json::to_string(item)
    }
}

/// Serialize the set's results to JSONL, one result per line.
pub fn to_jsonl(set: &ComparisonSet) -> std::result::Result<String, serde_json::Error> {
    let mut output = String::new();
    for result in set {
        output.push_str(&serde_json::to_string(result)?);
        output.push('\n');
    }
    Ok(output)
}
