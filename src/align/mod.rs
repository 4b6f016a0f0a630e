//! Calendar alignment and national aggregation.
//!
//! Given the loaded series of every region, build the shared daily calendar
//! and one `DimensionTable` per metric. Missing days stay missing in the
//! tables; only the national column is computed from forward-filled values.

pub mod calendar;
pub mod table;

use std::ops::Bound;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::{Metric, RegionSeries};

pub use calendar::Calendar;
pub use table::{DimensionTable, FilledView, RawView, forward_fill};

/// All metrics aligned onto one calendar.
#[derive(Debug, Clone)]
pub struct AlignedData {
    pub calendar: Calendar,
    /// Region codes in column order.
    pub regions: Vec<String>,
    /// One table per metric, in the order requested.
    pub tables: Vec<DimensionTable>,
    /// Daily records dated after the calendar end (i.e. after "today").
    pub dropped_future_records: usize,
}

impl AlignedData {
    pub fn table(&self, metric: Metric) -> Option<&DimensionTable> {
        self.tables.iter().find(|t| t.metric() == metric)
    }
}

/// Align every region's series onto the calendar ending at `today`.
pub fn align_regions(series: &[RegionSeries], metrics: &[Metric], today: NaiveDate, national_code: &str) -> AlignedData {
    let calendar = Calendar::build(series, today);

    let dropped_future_records = series
        .iter()
        .map(|s| s.records.range((Bound::Excluded(today), Bound::Unbounded)).count())
        .sum::<usize>();
    if dropped_future_records > 0 {
        warn!(count = dropped_future_records, %today, "ignoring records dated after today");
    }

    match (calendar.first(), calendar.last()) {
        (Some(first), Some(last)) => debug!(%first, %last, days = calendar.len(), "calendar built"),
        _ => warn!("calendar is empty: no region reported any data up to {today}"),
    }

    let tables = metrics
        .iter()
        .map(|m| DimensionTable::from_series(*m, &calendar, series, national_code))
        .collect();

    AlignedData {
        regions: series.iter().map(|s| s.code.clone()).collect(),
        calendar,
        tables,
        dropped_future_records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MetricRecord;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 4, day).unwrap()
    }

    fn record(cases: u64, icu: Option<u64>) -> MetricRecord {
        let mut r = MetricRecord::default();
        r.set(Metric::Cases, Some(cases));
        r.set(Metric::Icu, icu);
        r
    }

    #[test]
    fn every_metric_shares_the_calendar() {
        let mut a = RegionSeries::empty("A");
        a.records.insert(d(2), record(4, Some(1)));
        let mut b = RegionSeries::empty("B");
        b.records.insert(d(3), record(6, None));
        b.records.insert(d(9), record(9, None));

        let aligned = align_regions(&[a, b], &Metric::ALL, d(4), "CH");

        assert_eq!(aligned.calendar.len(), 3);
        assert_eq!(aligned.tables.len(), 6);
        assert_eq!(aligned.regions, vec!["A", "B"]);
        assert_eq!(aligned.dropped_future_records, 1);
        for table in &aligned.tables {
            assert_eq!(table.dates(), aligned.calendar.dates());
        }

        let icu = aligned.table(Metric::Icu).unwrap();
        assert_eq!(icu.raw().column("B").unwrap(), &[None, None, None]);
        assert_eq!(icu.national(), vec![1, 1, 1]);

        let cases = aligned.table(Metric::Cases).unwrap();
        assert_eq!(cases.national(), vec![4, 10, 10]);
    }
}
