//! The shared daily calendar every dimension table is indexed against.

use chrono::NaiveDate;

use crate::domain::RegionSeries;

/// Consecutive days, ascending, inclusive on both ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Calendar {
    dates: Vec<NaiveDate>,
}

impl Calendar {
    /// Calendar from the earliest first date of any region through `today`.
    ///
    /// Regions without data contribute nothing. If no region has data, or the
    /// earliest date lies after `today`, the calendar is empty.
    pub fn build<'a>(series: impl IntoIterator<Item = &'a RegionSeries>, today: NaiveDate) -> Self {
        match series.into_iter().filter_map(RegionSeries::first_date).min() {
            Some(start) => Self::span(start, today),
            None => Self::default(),
        }
    }

    /// Every day from `start` to `end`, inclusive. Empty when `start > end`.
    pub fn span(start: NaiveDate, end: NaiveDate) -> Self {
        let dates = start.iter_days().take_while(|d| *d <= end).collect();
        Self { dates }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Row index of `date`, if it lies inside the calendar.
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        let first = self.first()?;
        let offset = usize::try_from((date - first).num_days()).ok()?;
        (offset < self.dates.len()).then_some(offset)
    }
}
