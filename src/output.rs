//! CLI output formatting.
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Preview
//!
//! ```text
//! 001 IMG_0042.jpg (2.3 MB, image/jpeg)
//!     Make: Acme
//!     GPSLatitude: 40.7128
//! 002 scan.png (18.0 KB, image/png)
//!     No metadata found
//! ```
//!
//! ## Clean
//!
//! ```text
//! cleaned IMG_0042.jpg (2.3 MB → 2.1 MB)
//! failed  photo.heic: decode failed: HEIC/HEIF decoding is not supported
//!
//! Cleaned 1 of 2 files, 1 failed
//! ```

use crate::imaging::ALLOW_LIST;
use crate::scan::Skipped;
use crate::session::{ScrubEvent, StatusCounts};
use crate::types::FileRecord;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte count: `512 B`, `18.0 KB`, `2.3 MB`.
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{bytes} B")
    }
}

// ============================================================================
// Preview
// ============================================================================

/// Metadata preview for every record, tags in allow-list order.
pub fn format_preview(records: &[FileRecord]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, record) in records.iter().enumerate() {
        let mime = if record.mime_type().is_empty() {
            "unknown type"
        } else {
            record.mime_type()
        };
        lines.push(format!(
            "{} {} ({}, {})",
            format_index(i + 1),
            record.name(),
            format_size(record.size_bytes()),
            mime
        ));

        match record.metadata() {
            Some(tags) => {
                for (_, name) in ALLOW_LIST {
                    if let Some(value) = tags.get(*name) {
                        lines.push(format!("{}{}: {}", indent(1), name, value));
                    }
                }
            }
            None => lines.push(format!("{}No metadata found", indent(1))),
        }
    }
    lines
}

pub fn print_preview(records: &[FileRecord]) {
    for line in format_preview(records) {
        println!("{}", line);
    }
}

/// Files left out because of the size ceiling.
pub fn format_skipped(skipped: &[Skipped]) -> Vec<String> {
    skipped
        .iter()
        .map(|s| {
            format!(
                "skipped {} ({} exceeds {})",
                s.path.display(),
                format_size(s.size_bytes),
                format_size(s.limit)
            )
        })
        .collect()
}

pub fn print_skipped(skipped: &[Skipped]) {
    for line in format_skipped(skipped) {
        println!("{}", line);
    }
}

// ============================================================================
// Clean
// ============================================================================

/// One line per scrub outcome.
pub fn format_scrub_event(event: &ScrubEvent) -> Vec<String> {
    match event {
        ScrubEvent::Completed {
            name,
            bytes_in,
            bytes_out,
            ..
        } => vec![format!(
            "cleaned {} ({} → {})",
            name,
            format_size(*bytes_in),
            format_size(*bytes_out)
        )],
        ScrubEvent::Failed { name, reason, .. } => vec![format!("failed  {}: {}", name, reason)],
    }
}

pub fn format_written(path: &Path) -> String {
    format!("{}→ {}", indent(1), path.display())
}

/// Batch summary line.
pub fn format_summary(counts: &StatusCounts) -> Vec<String> {
    let noun = if counts.total() == 1 { "file" } else { "files" };
    let mut line = format!(
        "Cleaned {} of {} {}",
        counts.completed,
        counts.total(),
        noun
    );
    if counts.failed > 0 {
        line.push_str(&format!(", {} failed", counts.failed));
    }
    vec![String::new(), line]
}

pub fn print_summary(counts: &StatusCounts) {
    for line in format_summary(counts) {
        println!("{}", line);
    }
}
