use chrono::NaiveDate;
use log::debug;
use polars::prelude::*;
use serde::Serialize;

use crate::error::{require_columns, RentalError, Result};
use crate::record::{Record, DATE};

/// Closed interval of calendar days, `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(RentalError::InvalidRange {
                start,
                end,
                reason: "start is after end",
            });
        }
        Ok(DateRange { start, end })
    }

    /// The full span covered by `records`, `None` when there are none.
    pub fn spanning(records: &[Record]) -> Option<Self> {
        let start = records.iter().map(|r| r.date).min()?;
        let end = records.iter().map(|r| r.date).max()?;
        Some(DateRange { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn within(&self, outer: &DateRange) -> bool {
        outer.contains(self.start) && outer.contains(self.end)
    }
}

/// Keep the rows whose `date` lies inside `range`, both ends included.
pub fn filter_by_range(df: &DataFrame, range: &DateRange) -> Result<DataFrame> {
    require_columns(df, &[DATE])?;
    let filter_expr = col(DATE)
        .gt_eq(lit(range.start))
        .and(col(DATE).lt_eq(lit(range.end)));
    let out = df.clone().lazy().filter(filter_expr).collect()?;
    debug!(
        "range {} .. {} keeps {} of {} rows",
        range.start,
        range.end,
        out.height(),
        df.height()
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{day, record};
    use crate::loader::to_frame;

    #[test]
    fn new_rejects_reversed_range() {
        assert!(DateRange::new(day(2021, 1, 1), day(2021, 1, 1)).is_ok());
        assert!(matches!(
            DateRange::new(day(2021, 1, 2), day(2021, 1, 1)),
            Err(RentalError::InvalidRange { .. })
        ));
    }

    #[test]
    fn spanning_uses_min_and_max_dates() {
        let records = vec![
            record(day(2021, 3, 1), 1, 1, 1),
            record(day(2021, 1, 9), 1, 1, 1),
            record(day(2021, 2, 1), 1, 1, 1),
        ];
        let range = DateRange::spanning(&records).unwrap();
        assert_eq!(range.start(), day(2021, 1, 9));
        assert_eq!(range.end(), day(2021, 3, 1));
        assert_eq!(DateRange::spanning(&[]), None);
    }

    #[test]
    fn contains_and_within_are_inclusive() {
        let outer = DateRange::new(day(2021, 1, 1), day(2021, 1, 31)).unwrap();
        assert!(outer.contains(day(2021, 1, 1)));
        assert!(outer.contains(day(2021, 1, 31)));
        assert!(!outer.contains(day(2021, 2, 1)));

        let inner = DateRange::new(day(2021, 1, 5), day(2021, 1, 31)).unwrap();
        assert!(inner.within(&outer));
        let spill = DateRange::new(day(2020, 12, 31), day(2021, 1, 5)).unwrap();
        assert!(!spill.within(&outer));
    }

    #[test]
    fn full_bounds_keep_every_row() {
        let records = vec![
            record(day(2021, 1, 1), 1, 10, 90),
            record(day(2021, 1, 2), 1, 5, 95),
            record(day(2021, 1, 3), 1, 7, 3),
        ];
        let df = to_frame(&records).unwrap();
        let range = DateRange::spanning(&records).unwrap();
        let filtered = filter_by_range(&df, &range).unwrap();
        assert!(filtered.equals(&df));
    }

    #[test]
    fn single_day_range_is_inclusive() {
        let records = vec![
            record(day(2021, 1, 1), 1, 10, 90),
            record(day(2021, 1, 2), 1, 5, 95),
        ];
        let df = to_frame(&records).unwrap();
        let range = DateRange::new(day(2021, 1, 2), day(2021, 1, 2)).unwrap();
        let filtered = filter_by_range(&df, &range).unwrap();
        assert_eq!(filtered.height(), 1);
        let casual: Vec<_> = filtered
            .column("casual")
            .unwrap()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(casual, vec![5]);
    }

    #[test]
    fn dates_compare_as_dates_across_years() {
        let records = vec![
            record(day(2011, 12, 31), 1, 1, 1),
            record(day(2012, 1, 1), 1, 2, 2),
            record(day(2012, 10, 1), 1, 3, 3),
        ];
        let df = to_frame(&records).unwrap();
        let range = DateRange::new(day(2011, 12, 31), day(2012, 9, 30)).unwrap();
        assert_eq!(filter_by_range(&df, &range).unwrap().height(), 2);
    }

    #[test]
    fn empty_match_is_not_an_error() {
        let records = vec![record(day(2021, 1, 1), 1, 10, 90)];
        let df = to_frame(&records).unwrap();
        let range = DateRange::new(day(2022, 1, 1), day(2022, 12, 31)).unwrap();
        let filtered = filter_by_range(&df, &range).unwrap();
        assert_eq!(filtered.height(), 0);
        assert_eq!(filtered.width(), df.width());
    }

    #[test]
    fn missing_date_column_is_a_schema_error() {
        let df = df!("total" => &[1i64, 2]).unwrap();
        let range = DateRange::new(day(2021, 1, 1), day(2021, 1, 2)).unwrap();
        assert!(matches!(
            filter_by_range(&df, &range),
            Err(RentalError::Schema { column }) if column == "date"
        ));
    }
}
