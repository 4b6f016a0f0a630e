//! The aggregation pipeline shared by the binary and the integration tests.
//!
//! fetch feeds -> load/collapse per region -> align onto calendar -> digest -> write reports
//!
//! Everything is recomputed from scratch on each run.

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::align::{AlignedData, align_regions};
use crate::config::{Config, SourceErrorPolicy};
use crate::data::FeedSource;
use crate::domain::{Metric, RegionSeries};
use crate::error::AppError;
use crate::io::ingest::{LoadedRegion, load_region};
use crate::io::{write_dimension_csv, write_dimension_json, write_last_updated_csv, write_summary_json, write_workbook};
use crate::report::{Digest, build_digest};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// One entry per configured region, in configuration order.
    pub regions: Vec<LoadedRegion>,
    /// Regions replaced by an empty series under `on_source_error = "skip"`.
    pub skipped: Vec<String>,
    pub aligned: AlignedData,
    pub digest: Digest,
}

/// Load every region, align, and build the digest. Writes nothing.
pub fn run_pipeline(config: &Config, feeds: &dyn FeedSource, today: NaiveDate) -> Result<RunOutput, AppError> {
    let (regions, skipped) = load_regions(config, feeds)?;

    let series: Vec<RegionSeries> = regions.iter().map(|r| r.series.clone()).collect();
    let metrics: Vec<Metric> = config.metrics.iter().map(|m| m.metric).collect();
    let aligned = align_regions(&series, &metrics, today, &config.national_code);

    let digest = build_digest(&aligned)?;
    info!(
        date = %digest.date,
        reported = digest.updated_regions.len(),
        "digest built"
    );

    Ok(RunOutput {
        regions,
        skipped,
        aligned,
        digest,
    })
}

/// Fetch and parse every configured feed, applying the source error policy.
pub fn load_regions(config: &Config, feeds: &dyn FeedSource) -> Result<(Vec<LoadedRegion>, Vec<String>), AppError> {
    let mut regions = Vec::with_capacity(config.sources.len());
    let mut skipped = Vec::new();

    for source in &config.sources {
        let loaded = feeds
            .fetch(source)
            .and_then(|body| load_region(source, &body, &config.metrics));

        let loaded = match (loaded, config.on_source_error) {
            (Ok(loaded), _) => loaded,
            (Err(err @ AppError::SourceUnavailable { .. }), SourceErrorPolicy::Skip) => {
                warn!(region = %source.code, error = %err, "skipping unavailable source");
                skipped.push(source.code.clone());
                LoadedRegion::empty(&source.code)
            }
            (Err(err), _) => return Err(err),
        };

        if loaded.series.records.is_empty() {
            warn!(region = %source.code, "feed has no dated rows");
        }
        if !loaded.issues.is_empty() {
            warn!(region = %source.code, issues = loaded.issues.len(), "feed rows with problems");
            for issue in &loaded.issues {
                debug!(region = %source.code, line = issue.line, "{}", issue.message);
            }
        }
        info!(
            region = %source.code,
            rows = loaded.rows_used,
            days = loaded.series.records.len(),
            "region loaded"
        );

        regions.push(loaded);
    }

    Ok((regions, skipped))
}

/// Write every report into the configured output directory, overwriting old files.
///
/// Returns the paths written, in write order.
pub fn write_reports(config: &Config, run: &RunOutput) -> Result<Vec<PathBuf>, AppError> {
    let output = &config.output;
    std::fs::create_dir_all(&output.dir).map_err(|e| AppError::output(&output.dir, e))?;

    let mut written = Vec::new();

    let last_updated: Vec<_> = run
        .regions
        .iter()
        .map(|r| (r.series.code.clone(), r.last_update.clone()))
        .collect();
    let path = output.last_updated_path();
    write_last_updated_csv(&path, &last_updated)?;
    written.push(path);

    let path = output.summary_path();
    write_summary_json(&path, &run.digest.to_summary())?;
    written.push(path);

    let mut sheets = Vec::with_capacity(run.aligned.tables.len());
    for (spec, table) in config.metrics.iter().zip(&run.aligned.tables) {
        let grid = table.to_grid();

        let path = output.dimension_path(spec.metric, "csv");
        write_dimension_csv(&path, &grid)?;
        written.push(path);

        let path = output.dimension_path(spec.metric, "json");
        write_dimension_json(&path, &grid)?;
        written.push(path);

        sheets.push((spec.sheet.as_str(), grid));
    }

    let path = output.workbook_path();
    write_workbook(&path, &sheets)?;
    written.push(path);

    for path in &written {
        debug!(path = %path.display(), "report written");
    }
    info!(files = written.len(), dir = %output.dir.display(), "reports written");

    Ok(written)
}
