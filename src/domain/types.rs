//! Shared domain types.
//!
//! These types are kept small so they can be:
//!
//! - filled by the feed loader
//! - aligned onto the shared calendar
//! - exported to CSV/JSON/xlsx

use std::collections::BTreeMap;

use chrono::NaiveDate;

/// Date format used by every feed and every report.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Time reported for a region whose feed carries no `time` value.
pub const DEFAULT_TIME: &str = "00:00";

/// Parse a `YYYY-MM-DD` date, ignoring surrounding whitespace.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| format!("invalid date `{s}` (expected YYYY-MM-DD)"))
}

/// One of the six cumulative counts published per region and day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Cases,
    Fatalities,
    Hospitalized,
    Icu,
    /// Patients on ventilation. Keyed `vent` so report file names stay stable.
    Vent,
    Released,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Cases,
        Metric::Fatalities,
        Metric::Hospitalized,
        Metric::Icu,
        Metric::Vent,
        Metric::Released,
    ];

    /// Key used in report file names and in the summary digest.
    pub fn key(self) -> &'static str {
        match self {
            Metric::Cases => "cases",
            Metric::Fatalities => "fatalities",
            Metric::Hospitalized => "hospitalized",
            Metric::Icu => "icu",
            Metric::Vent => "vent",
            Metric::Released => "released",
        }
    }

    /// Column holding this metric in the published feeds.
    pub fn default_column(self) -> &'static str {
        match self {
            Metric::Cases => "ncumul_conf",
            Metric::Fatalities => "ncumul_deceased",
            Metric::Hospitalized => "ncumul_hosp",
            Metric::Icu => "ncumul_ICU",
            Metric::Vent => "ncumul_vent",
            Metric::Released => "ncumul_released",
        }
    }

    /// Human-readable label, used as the workbook sheet name.
    pub fn display_name(self) -> &'static str {
        match self {
            Metric::Cases => "Cases",
            Metric::Fatalities => "Fatalities",
            Metric::Hospitalized => "Hospitalized",
            Metric::Icu => "ICU",
            Metric::Vent => "Ventilated",
            Metric::Released => "Released",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_key(key: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|m| m.key() == key)
    }
}

/// The six metric values for one region on one day. `None` means "not reported".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricRecord {
    values: [Option<u64>; 6],
}

impl MetricRecord {
    pub fn get(&self, metric: Metric) -> Option<u64> {
        self.values[metric.index()]
    }

    pub fn set(&mut self, metric: Metric, value: Option<u64>) {
        self.values[metric.index()] = value;
    }

    /// Collapse a same-day duplicate into `self`, keeping the larger value per metric.
    ///
    /// A missing value never wins over a present one.
    pub fn merge_max(&mut self, other: &MetricRecord) {
        for (mine, theirs) in self.values.iter_mut().zip(other.values) {
            *mine = match (*mine, theirs) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, b) => a.or(b),
            };
        }
    }
}

/// Daily records of one region, keyed by date (ascending).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionSeries {
    pub code: String,
    pub records: BTreeMap<NaiveDate, MetricRecord>,
}

impl RegionSeries {
    pub fn empty(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            records: BTreeMap::new(),
        }
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.keys().next().copied()
    }

    pub fn get(&self, date: NaiveDate, metric: Metric) -> Option<u64> {
        self.records.get(&date).and_then(|r| r.get(metric))
    }
}

/// Date and time of the last row a region published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastUpdate {
    pub date: NaiveDate,
    pub time: String,
}

/// A date-indexed, column-keyed grid of counts, as written to and read from reports.
///
/// `cells[row][col]` is the value of `columns[col]` on `dates[row]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueGrid {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<String>,
    pub cells: Vec<Vec<Option<u64>>>,
}

impl ValueGrid {
    pub fn get(&self, date: NaiveDate, column: &str) -> Option<u64> {
        let row = self.dates.iter().position(|d| *d == date)?;
        let col = self.columns.iter().position(|c| c == column)?;
        self.cells[row][col]
    }

    /// All values of one column, top to bottom.
    pub fn column(&self, column: &str) -> Option<Vec<Option<u64>>> {
        let col = self.columns.iter().position(|c| c == column)?;
        Some(self.cells.iter().map(|row| row[col]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_max_is_independent_per_metric() {
        let mut a = MetricRecord::default();
        a.set(Metric::Cases, Some(10));
        a.set(Metric::Fatalities, Some(3));

        let mut b = MetricRecord::default();
        b.set(Metric::Cases, Some(8));
        b.set(Metric::Fatalities, Some(4));
        b.set(Metric::Icu, Some(1));

        a.merge_max(&b);
        assert_eq!(a.get(Metric::Cases), Some(10));
        assert_eq!(a.get(Metric::Fatalities), Some(4));
        assert_eq!(a.get(Metric::Icu), Some(1));
        assert_eq!(a.get(Metric::Vent), None);
    }

    #[test]
    fn metric_keys_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(Metric::from_key(metric.key()), Some(metric));
        }
        assert_eq!(Metric::from_key("ventilated"), None);
    }
}
