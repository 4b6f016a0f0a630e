//! Reporting utilities: the summary digest and terminal output.

pub mod format;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

use crate::align::AlignedData;
use crate::domain::Metric;
use crate::error::AppError;

pub use format::format_run_summary;

/// Latest national totals, their day-over-day change, and who reported today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    /// Last calendar date.
    pub date: NaiveDate,
    pub totals: Vec<(Metric, u64)>,
    pub changes: Vec<(Metric, i64)>,
    /// Regions with a raw `cases` value on `date`, in column order.
    pub updated_regions: Vec<String>,
}

impl Digest {
    pub fn total(&self, metric: Metric) -> Option<u64> {
        self.totals.iter().find(|(m, _)| *m == metric).map(|(_, v)| *v)
    }

    pub fn change(&self, metric: Metric) -> Option<i64> {
        self.changes.iter().find(|(m, _)| *m == metric).map(|(_, v)| *v)
    }

    /// The flat record written to `summary.json`.
    pub fn to_summary(&self) -> SummaryRecord {
        SummaryRecord {
            totals: self.totals.iter().map(|(m, v)| (m.key(), *v)).collect(),
            changes: self.changes.iter().map(|(m, v)| (m.key(), *v)).collect(),
            updated_cantons: self.updated_regions.join(","),
        }
    }
}

/// On-disk shape of the digest.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRecord {
    pub totals: IndexMap<&'static str, u64>,
    pub changes: IndexMap<&'static str, i64>,
    pub updated_cantons: String,
}

/// Build the digest from the national columns of every table.
///
/// Needs at least two calendar dates to compute a day-over-day change.
pub fn build_digest(aligned: &AlignedData) -> Result<Digest, AppError> {
    let days = aligned.calendar.len();
    let date = match aligned.calendar.last() {
        Some(date) if days >= 2 => date,
        _ => {
            return Err(AppError::Precondition(format!(
                "the digest needs at least 2 calendar dates, got {days}"
            )));
        }
    };

    let mut totals = Vec::with_capacity(aligned.tables.len());
    let mut changes = Vec::with_capacity(aligned.tables.len());
    for table in &aligned.tables {
        let national = table.national();
        let last = national[days - 1];
        let prev = national[days - 2];
        totals.push((table.metric(), last));
        changes.push((table.metric(), day_change(prev, last)));
    }

    let updated_regions = aligned
        .table(Metric::Cases)
        .map(|t| t.raw().reporting_on(days - 1).into_iter().map(str::to_string).collect())
        .unwrap_or_default();

    Ok(Digest {
        date,
        totals,
        changes,
        updated_regions,
    })
}

/// `last - prev`, clamped to the `i64` range.
fn day_change(prev: u64, last: u64) -> i64 {
    if last >= prev {
        i64::try_from(last - prev).unwrap_or(i64::MAX)
    } else {
        i64::try_from(prev - last).map_or(i64::MIN, |d| -d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::align_regions;
    use crate::domain::{MetricRecord, RegionSeries};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, day).unwrap()
    }

    fn series(code: &str, cases: &[(u32, u64)]) -> RegionSeries {
        let mut s = RegionSeries::empty(code);
        for (day, v) in cases {
            let mut r = MetricRecord::default();
            r.set(Metric::Cases, Some(*v));
            s.records.insert(d(*day), r);
        }
        s
    }

    #[test]
    fn digest_on_two_region_fixture() {
        let a = series("A", &[(1, 10), (3, 15)]);
        let b = series("B", &[(1, 5), (2, 7)]);
        let aligned = align_regions(&[a, b], &Metric::ALL, d(3), "CH");

        let digest = build_digest(&aligned).unwrap();
        assert_eq!(digest.date, d(3));
        assert_eq!(digest.total(Metric::Cases), Some(22));
        assert_eq!(digest.change(Metric::Cases), Some(5));
        assert_eq!(digest.total(Metric::Icu), Some(0));
        assert_eq!(digest.change(Metric::Icu), Some(0));
        assert_eq!(digest.updated_regions, vec!["A"]);
    }

    #[test]
    fn change_can_be_negative() {
        let a = series("A", &[(1, 10), (2, 8)]);
        let aligned = align_regions(&[a], &[Metric::Cases], d(2), "CH");
        assert_eq!(build_digest(&aligned).unwrap().change(Metric::Cases), Some(-2));
    }

    #[test]
    fn change_saturates_at_extreme_totals() {
        assert_eq!(day_change(0, u64::MAX), i64::MAX);
        assert_eq!(day_change(u64::MAX, 0), i64::MIN);
        assert_eq!(day_change(u64::MAX - 1, u64::MAX), 1);

        // Two regions whose forward-filled sum saturates at u64::MAX.
        let a = series("A", &[(1, 0), (2, u64::MAX)]);
        let b = series("B", &[(1, 0), (2, u64::MAX)]);
        let aligned = align_regions(&[a, b], &[Metric::Cases], d(2), "CH");
        let digest = build_digest(&aligned).unwrap();
        assert_eq!(digest.total(Metric::Cases), Some(u64::MAX));
        assert_eq!(digest.change(Metric::Cases), Some(i64::MAX));
    }

    #[test]
    fn fewer_than_two_dates_is_a_precondition_error() {
        let a = series("A", &[(3, 1)]);
        let aligned = align_regions(&[a], &Metric::ALL, d(3), "CH");
        assert!(matches!(build_digest(&aligned), Err(AppError::Precondition(_))));

        let empty = align_regions(&[RegionSeries::empty("A")], &Metric::ALL, d(3), "CH");
        assert!(matches!(build_digest(&empty), Err(AppError::Precondition(_))));
    }

    #[test]
    fn summary_record_keeps_metric_order() {
        let a = series("A", &[(1, 1), (2, 3)]);
        let b = series("B", &[(2, 4)]);
        let aligned = align_regions(&[a, b], &Metric::ALL, d(2), "CH");
        let summary = build_digest(&aligned).unwrap().to_summary();

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.starts_with(r#"{"totals":{"cases":7,"fatalities":0,"#));
        assert!(json.contains(r#""changes":{"cases":6,"#));
        assert!(json.ends_with(r#""updated_cantons":"A,B"}"#));
    }
}
