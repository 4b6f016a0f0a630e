//! Per-metric dimension tables and their raw / forward-filled views.

use chrono::NaiveDate;

use super::calendar::Calendar;
use crate::domain::{Metric, RegionSeries, ValueGrid};

/// One metric aligned onto the calendar: one column per region, `None` where the
/// region filed nothing for that exact day.
///
/// Both the raw export and the forward-filled national total are read through
/// views of this single table, so they always agree on the underlying data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionTable {
    metric: Metric,
    dates: Vec<NaiveDate>,
    regions: Vec<String>,
    national_code: String,
    /// `columns[region][row]`, each the same length as `dates`.
    columns: Vec<Vec<Option<u64>>>,
}

impl DimensionTable {
    /// Reindex every region onto `calendar`. Records outside the calendar are ignored.
    pub fn from_series(metric: Metric, calendar: &Calendar, series: &[RegionSeries], national_code: &str) -> Self {
        let columns = series
            .iter()
            .map(|s| {
                let mut column = vec![None; calendar.len()];
                for (date, record) in &s.records {
                    if let Some(row) = calendar.position(*date) {
                        column[row] = record.get(metric);
                    }
                }
                column
            })
            .collect();

        Self {
            metric,
            dates: calendar.dates().to_vec(),
            regions: series.iter().map(|s| s.code.clone()).collect(),
            national_code: national_code.to_string(),
            columns,
        }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Values exactly as reported, gaps included.
    pub fn raw(&self) -> RawView<'_> {
        RawView { table: self }
    }

    /// Values with each gap carried forward from the region's last report.
    pub fn filled(&self) -> FilledView<'_> {
        FilledView {
            table: self,
            columns: self.columns.iter().map(|c| forward_fill(c)).collect(),
        }
    }

    /// National column: per date, the sum of every region's forward-filled value.
    pub fn national(&self) -> Vec<u64> {
        let filled = self.filled();
        (0..self.dates.len()).map(|row| filled.total(row)).collect()
    }

    /// The exported form: raw region columns followed by the national column.
    pub fn to_grid(&self) -> ValueGrid {
        let national = self.national();
        let mut columns = self.regions.clone();
        columns.push(self.national_code.clone());

        let cells = (0..self.dates.len())
            .map(|row| {
                let mut cells: Vec<Option<u64>> = self.columns.iter().map(|c| c[row]).collect();
                cells.push(Some(national[row]));
                cells
            })
            .collect();

        ValueGrid {
            dates: self.dates.clone(),
            columns,
            cells,
        }
    }

    fn region_index(&self, code: &str) -> Option<usize> {
        self.regions.iter().position(|r| r == code)
    }
}

/// Read-only access to the reported values.
#[derive(Debug, Clone, Copy)]
pub struct RawView<'a> {
    table: &'a DimensionTable,
}

impl<'a> RawView<'a> {
    pub fn column(&self, code: &str) -> Option<&'a [Option<u64>]> {
        let idx = self.table.region_index(code)?;
        Some(&self.table.columns[idx])
    }

    /// Regions with a reported value on `row`, in column order.
    pub fn reporting_on(&self, row: usize) -> Vec<&'a str> {
        self.table
            .regions
            .iter()
            .zip(&self.table.columns)
            .filter(|(_, col)| col.get(row).copied().flatten().is_some())
            .map(|(code, _)| code.as_str())
            .collect()
    }
}

/// Forward-filled values; only used to compute the national total.
#[derive(Debug, Clone)]
pub struct FilledView<'a> {
    table: &'a DimensionTable,
    columns: Vec<Vec<Option<u64>>>,
}

impl FilledView<'_> {
    pub fn column(&self, code: &str) -> Option<&[Option<u64>]> {
        let idx = self.table.region_index(code)?;
        Some(&self.columns[idx])
    }

    /// Sum across regions on `row`. Regions that never reported count as 0.
    pub fn total(&self, row: usize) -> u64 {
        self.columns
            .iter()
            .filter_map(|c| c.get(row).copied().flatten())
            .fold(0u64, u64::saturating_add)
    }
}

/// Replace each `None` with the most recent earlier `Some`. Leading gaps stay `None`.
pub fn forward_fill(column: &[Option<u64>]) -> Vec<Option<u64>> {
    let mut last = None;
    column
        .iter()
        .map(|v| {
            if v.is_some() {
                last = *v;
            }
            last
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MetricRecord;
    use proptest::prelude::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, day).unwrap()
    }

    fn series(code: &str, values: &[(NaiveDate, u64)]) -> RegionSeries {
        let mut s = RegionSeries::empty(code);
        for (date, v) in values {
            let mut r = MetricRecord::default();
            r.set(Metric::Cases, Some(*v));
            s.records.insert(*date, r);
        }
        s
    }

    /// A = [10, -, 15], B = [5, 7, -] over three days.
    fn fixture() -> DimensionTable {
        let a = series("A", &[(d(1), 10), (d(3), 15)]);
        let b = series("B", &[(d(1), 5), (d(2), 7)]);
        let cal = Calendar::span(d(1), d(3));
        DimensionTable::from_series(Metric::Cases, &cal, &[a, b], "CH")
    }

    #[test]
    fn raw_view_keeps_gaps() {
        let table = fixture();
        assert_eq!(table.raw().column("A").unwrap(), &[Some(10), None, Some(15)]);
        assert_eq!(table.raw().column("B").unwrap(), &[Some(5), Some(7), None]);
        assert_eq!(table.raw().reporting_on(2), vec!["A"]);
    }

    #[test]
    fn filled_view_carries_last_report_forward() {
        let table = fixture();
        let filled = table.filled();
        assert_eq!(filled.column("A").unwrap(), &[Some(10), Some(10), Some(15)]);
        assert_eq!(filled.column("B").unwrap(), &[Some(5), Some(7), Some(7)]);
    }

    #[test]
    fn national_sums_forward_filled_values() {
        assert_eq!(fixture().national(), vec![15, 17, 22]);
    }

    #[test]
    fn grid_appends_national_column() {
        let grid = fixture().to_grid();
        assert_eq!(grid.columns, vec!["A", "B", "CH"]);
        assert_eq!(grid.cells[1], vec![None, Some(7), Some(17)]);
        assert_eq!(grid.column("CH").unwrap(), vec![Some(15), Some(17), Some(22)]);
    }

    #[test]
    fn empty_region_is_all_gaps_and_adds_nothing() {
        let a = series("A", &[(d(1), 3)]);
        let cal = Calendar::span(d(1), d(2));
        let table = DimensionTable::from_series(Metric::Cases, &cal, &[a, RegionSeries::empty("Z")], "CH");

        assert_eq!(table.raw().column("Z").unwrap(), &[None, None]);
        assert_eq!(table.filled().column("Z").unwrap(), &[None, None]);
        assert_eq!(table.national(), vec![3, 3]);
    }

    #[test]
    fn records_after_calendar_end_are_ignored() {
        let a = series("A", &[(d(1), 1), (d(5), 50)]);
        let cal = Calendar::span(d(1), d(2));
        let table = DimensionTable::from_series(Metric::Cases, &cal, &[a], "CH");
        assert_eq!(table.national(), vec![1, 1]);
    }

    proptest! {
        #[test]
        fn forward_fill_uses_most_recent_prior_value(column in proptest::collection::vec(proptest::option::of(0u64..1000), 0..60)) {
            let filled = forward_fill(&column);
            prop_assert_eq!(filled.len(), column.len());
            for (i, v) in filled.iter().enumerate() {
                let expected = column[..=i].iter().rev().find_map(|x| *x);
                prop_assert_eq!(*v, expected);
            }
        }
    }
}
