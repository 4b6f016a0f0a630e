//! Run configuration.
//!
//! The region sources, the metric table and the report file names all live in
//! one explicit `Config` value that is loaded once at startup and handed to the
//! pipeline. The on-disk form is a TOML file (`sources.toml` by default):
//!
//! ```toml
//! national_code = "CH"
//! on_source_error = "abort"
//!
//! [sources]
//! zh = "https://example.org/COVID19_Fallzahlen_Kanton_ZH_total.csv"
//! be = "feeds/be.csv"
//!
//! [metrics.vent]
//! sheet = "Ventilated"
//!
//! [output]
//! dir = "reports"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::domain::Metric;
use crate::error::AppError;

/// Placeholder substituted by the metric key in `dimension_stem`.
pub const METRIC_PLACEHOLDER: &str = "{metric}";

/// What to do when a region feed cannot be fetched or parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceErrorPolicy {
    /// Fail the whole run.
    #[default]
    Abort,
    /// Log and continue with the region as an empty series.
    Skip,
}

/// Where a region's feed is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedLocation {
    Url(String),
    Path(PathBuf),
}

impl FeedLocation {
    /// Classify a configured location. Relative paths are resolved against `base_dir`.
    pub fn resolve(raw: &str, base_dir: &Path) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return FeedLocation::Url(raw.to_string());
        }
        let path = PathBuf::from(raw);
        if path.is_absolute() {
            FeedLocation::Path(path)
        } else {
            FeedLocation::Path(base_dir.join(path))
        }
    }
}

impl std::fmt::Display for FeedLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedLocation::Url(url) => write!(f, "{url}"),
            FeedLocation::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// One configured region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    /// Upper-cased region code, e.g. `ZH`.
    pub code: String,
    pub location: FeedLocation,
}

/// How a metric is read from the feeds and labelled in the workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSpec {
    pub metric: Metric,
    pub column: String,
    pub sheet: String,
}

impl MetricSpec {
    pub fn default_for(metric: Metric) -> Self {
        Self {
            metric,
            column: metric.default_column().to_string(),
            sheet: metric.display_name().to_string(),
        }
    }
}

/// Report file names, relative to `dir`.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_last_updated")]
    pub last_updated: String,

    #[serde(default = "default_summary")]
    pub summary: String,

    #[serde(default = "default_workbook")]
    pub workbook: String,

    /// File stem of the per-metric tables; must contain `{metric}`.
    #[serde(default = "default_dimension_stem")]
    pub dimension_stem: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            last_updated: default_last_updated(),
            summary: default_summary(),
            workbook: default_workbook(),
            dimension_stem: default_dimension_stem(),
        }
    }
}

impl OutputConfig {
    pub fn last_updated_path(&self) -> PathBuf {
        self.dir.join(&self.last_updated)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.dir.join(&self.summary)
    }

    pub fn workbook_path(&self) -> PathBuf {
        self.dir.join(&self.workbook)
    }

    /// Path of one per-metric table, e.g. `covid19_cases_switzerland_openzh.csv`.
    pub fn dimension_path(&self, metric: Metric, extension: &str) -> PathBuf {
        let stem = self.dimension_stem.replace(METRIC_PLACEHOLDER, metric.key());
        self.dir.join(format!("{stem}.{extension}"))
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_last_updated() -> String {
    "last_updated.csv".to_string()
}

fn default_summary() -> String {
    "summary.json".to_string()
}

fn default_workbook() -> String {
    "covid_19_data_switzerland.xlsx".to_string()
}

fn default_dimension_stem() -> String {
    "covid19_{metric}_switzerland_openzh".to_string()
}

fn default_national_code() -> String {
    "CH".to_string()
}

/// Longest worksheet name a workbook accepts.
const MAX_SHEET_NAME_LEN: usize = 31;

/// Characters a worksheet name must not contain.
const FORBIDDEN_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Workbook sheet names must be 1..=31 characters, free of `[]:*?/\`, and
/// unique ignoring case.
fn validate_sheet_names(metrics: &[MetricSpec]) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for spec in metrics {
        let sheet = spec.sheet.as_str();
        let len = sheet.chars().count();
        if len == 0 || len > MAX_SHEET_NAME_LEN {
            return Err(AppError::config(format!(
                "sheet name for [metrics.{}] must be 1 to {MAX_SHEET_NAME_LEN} characters, got {len}",
                spec.metric.key()
            )));
        }
        if let Some(c) = sheet.chars().find(|c| FORBIDDEN_SHEET_CHARS.contains(c)) {
            return Err(AppError::config(format!(
                "sheet name '{sheet}' for [metrics.{}] contains forbidden character '{c}'",
                spec.metric.key()
            )));
        }
        if !seen.insert(sheet.to_lowercase()) {
            return Err(AppError::config(format!(
                "sheet name '{sheet}' for [metrics.{}] is already used by another metric",
                spec.metric.key()
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Deserialize)]
struct MetricOverride {
    column: Option<String>,
    sheet: Option<String>,
}

/// On-disk shape of the config file.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    #[serde(default = "default_national_code")]
    national_code: String,

    #[serde(default)]
    on_source_error: SourceErrorPolicy,

    #[serde(default)]
    sources: IndexMap<String, String>,

    #[serde(default)]
    metrics: IndexMap<String, MetricOverride>,

    #[serde(default)]
    output: OutputConfig,
}

/// Fully resolved run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub national_code: String,
    pub on_source_error: SourceErrorPolicy,
    /// Regions in configuration order; this is also the report column order.
    pub sources: Vec<SourceSpec>,
    /// Always all six metrics, in `Metric::ALL` order.
    pub metrics: Vec<MetricSpec>,
    pub output: OutputConfig,
}

impl Config {
    /// Load and validate a config file. Relative feed paths resolve against its directory.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("failed to read config '{}': {e}", path.display()))
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml_str(&text, base_dir)
    }

    pub fn from_toml_str(text: &str, base_dir: &Path) -> Result<Self, AppError> {
        let file: ConfigFile =
            toml::from_str(text).map_err(|e| AppError::config(format!("invalid config: {e}")))?;
        Self::resolve(file, base_dir)
    }

    fn resolve(file: ConfigFile, base_dir: &Path) -> Result<Self, AppError> {
        if file.sources.is_empty() {
            return Err(AppError::config("no sources configured under [sources]"));
        }

        let national_code = file.national_code.trim().to_uppercase();
        if national_code.is_empty() {
            return Err(AppError::config("national_code must not be empty"));
        }

        let mut seen = HashSet::new();
        let mut sources = Vec::with_capacity(file.sources.len());
        for (raw_code, location) in &file.sources {
            let code = raw_code.trim().to_uppercase();
            if code.is_empty() {
                return Err(AppError::config("empty region code in [sources]"));
            }
            if code == national_code {
                return Err(AppError::config(format!(
                    "region code {code} clashes with national_code"
                )));
            }
            if !seen.insert(code.clone()) {
                return Err(AppError::config(format!("duplicate region code {code}")));
            }
            if location.trim().is_empty() {
                return Err(AppError::config(format!("empty location for region {code}")));
            }
            sources.push(SourceSpec {
                code,
                location: FeedLocation::resolve(location, base_dir),
            });
        }

        let mut metrics: Vec<MetricSpec> = Metric::ALL.into_iter().map(MetricSpec::default_for).collect();
        for (key, ov) in &file.metrics {
            let metric = Metric::from_key(key)
                .ok_or_else(|| AppError::config(format!("unknown metric [metrics.{key}]")))?;
            let spec = &mut metrics[metric.index()];
            if let Some(column) = &ov.column {
                spec.column = column.clone();
            }
            if let Some(sheet) = &ov.sheet {
                spec.sheet = sheet.clone();
            }
        }

        validate_sheet_names(&metrics)?;

        if !file.output.dimension_stem.contains(METRIC_PLACEHOLDER) {
            return Err(AppError::config(format!(
                "output.dimension_stem must contain {METRIC_PLACEHOLDER}"
            )));
        }

        Ok(Self {
            national_code,
            on_source_error: file.on_source_error,
            sources,
            metrics,
            output: file.output,
        })
    }

    pub fn region_codes(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.code.clone()).collect()
    }

    /// Template written by `ozh --init-config`.
    pub fn default_toml() -> String {
        let mut out = String::new();
        out.push_str("# Label of the synthetic national column.\n");
        out.push_str("national_code = \"CH\"\n\n");
        out.push_str("# \"abort\" fails the run when a feed is unreachable; \"skip\" reports it as empty.\n");
        out.push_str("on_source_error = \"abort\"\n\n");
        out.push_str("# Region code -> CSV feed (http(s) URL or path relative to this file).\n");
        out.push_str("[sources]\n");
        out.push_str("zh = \"https://raw.githubusercontent.com/openZH/covid_19/master/fallzahlen_kanton_total_csv_v2/COVID19_Fallzahlen_Kanton_ZH_total.csv\"\n\n");
        out.push_str("# Per-metric overrides of the feed column and the workbook sheet name.\n");
        for metric in Metric::ALL {
            out.push_str(&format!(
                "# [metrics.{}]\n# column = \"{}\"\n# sheet = \"{}\"\n",
                metric.key(),
                metric.default_column(),
                metric.display_name()
            ));
        }
        out.push_str("\n[output]\n");
        out.push_str("dir = \".\"\n");
        out.push_str(&format!("last_updated = \"{}\"\n", default_last_updated()));
        out.push_str(&format!("summary = \"{}\"\n", default_summary()));
        out.push_str(&format!("workbook = \"{}\"\n", default_workbook()));
        out.push_str(&format!("dimension_stem = \"{}\"\n", default_dimension_stem()));
        out
    }
}
