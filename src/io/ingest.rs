//! CSV ingest of a single region feed.
//!
//! This module turns the published CSV text of one region into a
//! `RegionSeries` keyed by date.
//!
//! Design goals:
//! - **Strict schema** only for `date`; every metric column is optional
//! - **Row-level validation** (skip bad rows and cells, but report what happened)
//! - **Same-day corrections collapse** to the per-metric maximum
//! - **Separation of concerns**: no calendar or aggregation logic here

use std::collections::HashMap;

use csv::StringRecord;

use crate::config::{MetricSpec, SourceSpec};
use crate::domain::{DEFAULT_TIME, LastUpdate, MetricRecord, RegionSeries, parse_date};
use crate::error::AppError;

/// A non-fatal problem in one feed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the collapsed series plus bookkeeping about the feed.
#[derive(Debug, Clone)]
pub struct LoadedRegion {
    pub series: RegionSeries,
    /// Date/time of the last dated row in file order. `None` for an empty feed.
    pub last_update: Option<LastUpdate>,
    pub issues: Vec<RowIssue>,
    pub rows_read: usize,
    pub rows_used: usize,
}

impl LoadedRegion {
    pub fn empty(code: &str) -> Self {
        Self {
            series: RegionSeries::empty(code),
            last_update: None,
            issues: Vec::new(),
            rows_read: 0,
            rows_used: 0,
        }
    }
}

/// Parse one region feed.
///
/// A feed with no rows (or no bytes at all) yields an empty series rather than an error.
/// A feed whose header has no `date` column cannot be interpreted and is reported
/// as `SourceUnavailable`.
pub fn load_region(source: &SourceSpec, body: &str, metrics: &[MetricSpec]) -> Result<LoadedRegion, AppError> {
    if body.trim().is_empty() {
        return Ok(LoadedRegion::empty(&source.code));
    }

    let unavailable = |reason: String| AppError::source_unavailable(&source.code, &source.location.to_string(), reason);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| unavailable(format!("failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let date_idx = find_column(&header_map, "date").ok_or_else(|| unavailable("missing required column `date`".into()))?;
    let time_idx = find_column(&header_map, "time");
    let metric_cols: Vec<(&MetricSpec, Option<usize>)> = metrics
        .iter()
        .map(|spec| (spec, find_column(&header_map, &spec.column)))
        .collect();

    let mut loaded = LoadedRegion::empty(&source.code);

    for (idx, result) in reader.records().enumerate() {
        // records() starts on the line after the header; lines are 1-based.
        let line = idx + 2;
        loaded.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                loaded.issues.push(RowIssue {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let date = match cell(&record, Some(date_idx)).map(parse_date) {
            Some(Ok(d)) => d,
            Some(Err(message)) => {
                loaded.issues.push(RowIssue { line, message });
                continue;
            }
            None => {
                loaded.issues.push(RowIssue {
                    line,
                    message: "missing `date` value".to_string(),
                });
                continue;
            }
        };

        let mut row = MetricRecord::default();
        for (spec, col) in &metric_cols {
            match parse_count(cell(&record, *col)) {
                Ok(value) => row.set(spec.metric, value),
                Err(message) => loaded.issues.push(RowIssue {
                    line,
                    message: format!("`{}`: {message}", spec.column),
                }),
            }
        }

        loaded
            .series
            .records
            .entry(date)
            .and_modify(|existing| existing.merge_max(&row))
            .or_insert(row);

        let time = cell(&record, time_idx).unwrap_or(DEFAULT_TIME).to_string();
        loaded.last_update = Some(LastUpdate { date, time });
        loaded.rows_used += 1;
    }

    Ok(loaded)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // Keep the first occurrence if a feed repeats a header.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn find_column(header_map: &HashMap<String, usize>, name: &str) -> Option<usize> {
    if let Some(idx) = header_map.get(name) {
        return Some(*idx);
    }
    header_map
        .iter()
        .filter(|(header, _)| header.eq_ignore_ascii_case(name))
        .map(|(_, idx)| *idx)
        .min()
}

/// Non-empty cell text, if the column exists on this row.
fn cell(record: &StringRecord, idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| record.get(i)).filter(|s| !s.is_empty())
}

/// Parse a count cell: empty means missing; integral floats like `12.0` are accepted.
fn parse_count(raw: Option<&str>) -> Result<Option<u64>, String> {
    let Some(s) = raw else {
        return Ok(None);
    };
    if s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("na") {
        return Ok(None);
    }
    if let Ok(v) = s.parse::<u64>() {
        return Ok(Some(v));
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v < u64::MAX as f64 => Ok(Some(v as u64)),
        _ => Err(format!("invalid count `{s}`")),
    }
}
