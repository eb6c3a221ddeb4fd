use std::path::Path;

use chrono::NaiveDate;
use log::info;
use polars::prelude::DataFrame;
use serde::Serialize;

use crate::aggregate::{
    AggregateTable, DAILY_CASUAL, DAILY_REGISTERED, DAILY_TOTAL, MONTHLY_TOTAL, SEASON_SPLIT,
    WEEKDAY_TOTAL,
};
use crate::error::{RentalError, Result};
use crate::filter::{filter_by_range, DateRange};
use crate::loader::{load_csv, to_frame};
use crate::record::{Record, CASUAL, REGISTERED, TOTAL};

/// The normalized records, loaded once and never modified afterwards.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
    frame: DataFrame,
}

impl Dataset {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_records(load_csv(path)?)
    }

    pub fn from_records(records: Vec<Record>) -> Result<Self> {
        let frame = to_frame(&records)?;
        Ok(Dataset { records, frame })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// First to last day of the dataset; the range used when none is given.
    pub fn bounds(&self) -> Option<DateRange> {
        DateRange::spanning(&self.records)
    }

    /// Build a range from caller input, rejecting one that is reversed or
    /// reaches outside the dataset.
    pub fn range(&self, start: NaiveDate, end: NaiveDate) -> Result<DateRange> {
        let range = DateRange::new(start, end)?;
        match self.bounds() {
            Some(bounds) if range.within(&bounds) => Ok(range),
            _ => Err(RentalError::InvalidRange {
                start,
                end,
                reason: "outside the dataset",
            }),
        }
    }

    pub fn report(&self, range: &DateRange) -> Result<Report> {
        let filtered = filter_by_range(&self.frame, range)?;
        let report = Report::compute(*range, &filtered)?;
        info!(
            "report {} .. {}: {} days, {} rentals",
            range.start(),
            range.end(),
            filtered.height(),
            report.metrics()?.total
        );
        Ok(report)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub total: i64,
    pub casual: i64,
    pub registered: i64,
}

/// Every aggregate the dashboard shows for one date range.
#[derive(Debug, Clone)]
pub struct Report {
    pub range: DateRange,
    pub daily_total: AggregateTable,
    pub daily_casual: AggregateTable,
    pub daily_registered: AggregateTable,
    pub season_split: AggregateTable,
    pub monthly_total: AggregateTable,
    pub weekday_total: AggregateTable,
}

impl Report {
    pub fn compute(range: DateRange, filtered: &DataFrame) -> Result<Self> {
        Ok(Report {
            range,
            daily_total: DAILY_TOTAL.reduce(filtered)?,
            daily_casual: DAILY_CASUAL.reduce(filtered)?,
            daily_registered: DAILY_REGISTERED.reduce(filtered)?,
            season_split: SEASON_SPLIT.reduce(filtered)?,
            monthly_total: MONTHLY_TOTAL.reduce(filtered)?,
            weekday_total: WEEKDAY_TOTAL.reduce(filtered)?,
        })
    }

    pub fn metrics(&self) -> Result<Metrics> {
        Ok(Metrics {
            total: self.daily_total.sum(TOTAL)?,
            casual: self.daily_casual.sum(CASUAL)?,
            registered: self.daily_registered.sum(REGISTERED)?,
        })
    }

    pub fn tables(&self) -> [&AggregateTable; 6] {
        [
            &self.daily_total,
            &self.daily_casual,
            &self.daily_registered,
            &self.season_split,
            &self.monthly_total,
            &self.weekday_total,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{day, record};

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            record(day(2021, 1, 1), 1, 10, 90),
            record(day(2021, 1, 2), 1, 5, 95),
            record(day(2021, 4, 10), 2, 20, 30),
        ])
        .unwrap()
    }

    #[test]
    fn bounds_span_the_records() {
        let bounds = dataset().bounds().unwrap();
        assert_eq!(bounds.start(), day(2021, 1, 1));
        assert_eq!(bounds.end(), day(2021, 4, 10));
        assert_eq!(Dataset::from_records(vec![]).unwrap().bounds(), None);
    }

    #[test]
    fn range_rejects_instead_of_clamping() {
        let ds = dataset();
        assert!(ds.range(day(2021, 1, 2), day(2021, 4, 10)).is_ok());
        assert!(matches!(
            ds.range(day(2021, 1, 3), day(2021, 1, 2)),
            Err(RentalError::InvalidRange { reason: "start is after end", .. })
        ));
        assert!(matches!(
            ds.range(day(2020, 12, 31), day(2021, 1, 2)),
            Err(RentalError::InvalidRange { reason: "outside the dataset", .. })
        ));
        assert!(matches!(
            ds.range(day(2021, 1, 1), day(2021, 4, 11)),
            Err(RentalError::InvalidRange { .. })
        ));
    }

    #[test]
    fn full_range_report_covers_everything() {
        let ds = dataset();
        let report = ds.report(&ds.bounds().unwrap()).unwrap();
        assert_eq!(
            report.metrics().unwrap(),
            Metrics {
                total: 250,
                casual: 35,
                registered: 215
            }
        );
        assert_eq!(report.daily_total.len(), 3);
        assert_eq!(report.season_split.len(), 2);
        assert_eq!(report.monthly_total.len(), 12);
    }

    #[test]
    fn narrowed_range_recomputes_every_table() {
        let ds = dataset();
        let range = ds.range(day(2021, 1, 2), day(2021, 1, 2)).unwrap();
        let report = ds.report(&range).unwrap();
        assert_eq!(report.daily_total.labels().unwrap(), vec!["2021-01-02"]);
        assert_eq!(report.daily_total.values(TOTAL).unwrap(), vec![100]);
        assert_eq!(report.metrics().unwrap().casual, 5);
        assert_eq!(report.season_split.labels().unwrap(), vec!["Spring"]);
        assert_eq!(report.monthly_total.sum(TOTAL).unwrap(), 100);
    }

    #[test]
    fn range_without_rows_gives_empty_report() {
        let ds = dataset();
        let range = ds.range(day(2021, 2, 1), day(2021, 3, 31)).unwrap();
        let report = ds.report(&range).unwrap();
        for table in report.tables() {
            assert_eq!(table.sum(table.measures()[0]).unwrap(), 0);
        }
        assert!(report.daily_total.is_empty());
        assert!(report.weekday_total.is_empty());
        assert_eq!(report.monthly_total.len(), 12);
    }

    #[test]
    fn snapshot_is_unchanged_by_reports() {
        let ds = dataset();
        let before = ds.frame().clone();
        let range = ds.range(day(2021, 1, 1), day(2021, 1, 1)).unwrap();
        ds.report(&range).unwrap();
        assert!(ds.frame().equals(&before));
        assert_eq!(ds.records().len(), 3);
    }
}
