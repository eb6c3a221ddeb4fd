pub mod aggregate;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod loader;
pub mod record;

pub use aggregate::{AggregateTable, Aggregation, Ordering, Reducer};
pub use dataset::{Dataset, Metrics, Report};
pub use error::{RentalError, Result};
pub use filter::{filter_by_range, DateRange};
pub use record::{Month, Record, Season, Weekday};

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{Datelike, NaiveDate};

    use crate::record::{Month, Record, Season, Weekday};

    pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// A record whose calendar fields follow from `date`.
    pub fn record(date: NaiveDate, season: i64, casual: u32, registered: u32) -> Record {
        Record {
            date,
            year_flag: if date.year() > 2011 { 1 } else { 0 },
            month: Month::from_code(i64::from(date.month())).unwrap(),
            weather_condition: 1,
            season: Season::from_code(season).unwrap(),
            weekday: Weekday::from_code(i64::from(date.weekday().num_days_from_sunday())).unwrap(),
            casual,
            registered,
            total: casual + registered,
        }
    }
}
