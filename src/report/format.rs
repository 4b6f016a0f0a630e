//! Formatted terminal output for a finished run.
//!
//! Formatting lives in one place so the loader and aggregation code stay free
//! of presentation concerns.

use std::path::PathBuf;

use crate::align::AlignedData;
use crate::io::ingest::LoadedRegion;
use crate::report::Digest;

/// Format the run summary: calendar span, per-region feed stats, national digest.
pub fn format_run_summary(aligned: &AlignedData, digest: &Digest, regions: &[LoadedRegion], skipped: &[String]) -> String {
    let mut out = String::new();

    out.push_str("=== ozh - regional feed aggregation ===\n");
    if let (Some(first), Some(last)) = (aligned.calendar.first(), aligned.calendar.last()) {
        out.push_str(&format!("Calendar: {first} .. {last} ({} days)\n", aligned.calendar.len()));
    }
    out.push_str(&format!("Regions: {} configured", aligned.regions.len()));
    if !skipped.is_empty() {
        out.push_str(&format!(", {} skipped ({})", skipped.len(), skipped.join(",")));
    }
    out.push('\n');

    let issues: usize = regions.iter().map(|r| r.issues.len()).sum();
    let rows: usize = regions.iter().map(|r| r.rows_used).sum();
    out.push_str(&format!("Rows: {rows} used, {issues} row issues\n"));

    let empty: Vec<&str> = regions
        .iter()
        .filter(|r| r.series.records.is_empty())
        .map(|r| r.series.code.as_str())
        .collect();
    if !empty.is_empty() {
        out.push_str(&format!("Empty feeds: {}\n", empty.join(",")));
    }

    out.push_str(&format!("\nNational totals on {}:\n", digest.date));
    out.push_str(&format!("{:<14} {:>12} {:>10}\n", "metric", "total", "change"));
    out.push_str(&format!("{:-<14} {:-<12} {:-<10}\n", "", "", ""));
    for ((metric, total), (_, change)) in digest.totals.iter().zip(&digest.changes) {
        out.push_str(&format!("{:<14} {:>12} {:>+10}\n", metric.key(), total, change));
    }

    out.push_str(&format!(
        "\nReported today: {}\n",
        if digest.updated_regions.is_empty() {
            "-".to_string()
        } else {
            digest.updated_regions.join(",")
        }
    ));

    out
}

/// List of report files written by the run.
pub fn format_written(paths: &[PathBuf]) -> String {
    let mut out = String::from("Wrote:\n");
    for path in paths {
        out.push_str(&format!("- {}\n", path.display()));
    }
    out
}
