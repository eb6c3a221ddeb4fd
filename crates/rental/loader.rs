use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use log::{debug, info};
use polars::prelude::*;
use serde::Deserialize;

use crate::error::{RentalError, Result};
use crate::record::{
    Month, Record, Season, Weekday, CASUAL, DATE, MONTH, REGISTERED, SEASON, TOTAL,
    WEATHER_CONDITION, WEEKDAY, YEAR_FLAG,
};

/// Source headers the normalizer reads; every other column is dropped.
const SOURCE_COLUMNS: [&str; 9] = [
    "dteday",
    "yr",
    "mnth",
    "weathersit",
    "season",
    "weekday",
    "casual",
    "registered",
    "cnt",
];

const DATE_HEADER: &str = "dteday";
const DATE_ALIAS: &str = "dateday";

/// A row as it appears in the source file, codes still numeric.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "dteday")]
    pub date: NaiveDate,
    #[serde(rename = "yr")]
    pub year_flag: u8,
    #[serde(rename = "mnth")]
    pub month_code: i64,
    #[serde(rename = "weathersit")]
    pub weather_code: u8,
    #[serde(rename = "season")]
    pub season_code: i64,
    #[serde(rename = "weekday")]
    pub weekday_code: i64,
    pub casual: u32,
    pub registered: u32,
    #[serde(rename = "cnt")]
    pub total: u32,
}

/// Map coded rows to labelled records. Any month, season or weekday code
/// outside its table rejects the whole load.
pub fn normalize(raw: &[RawRecord]) -> Result<Vec<Record>> {
    raw.iter()
        .enumerate()
        .map(|(i, r)| {
            let row = i + 1;
            let invalid = |field, code| RentalError::Validation { row, field, code };
            Ok(Record {
                date: r.date,
                year_flag: r.year_flag,
                month: Month::from_code(r.month_code).ok_or_else(|| invalid("month", r.month_code))?,
                weather_condition: r.weather_code,
                season: Season::from_code(r.season_code)
                    .ok_or_else(|| invalid("season", r.season_code))?,
                weekday: Weekday::from_code(r.weekday_code)
                    .ok_or_else(|| invalid("weekday", r.weekday_code))?,
                casual: r.casual,
                registered: r.registered,
                total: r.total,
            })
        })
        .collect()
}

pub fn load_from_reader<R: Read>(reader: R) -> Result<Vec<Record>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut headers = rdr.headers()?.clone();
    // `dateday` names the date only when `dteday` is absent; otherwise it is dropped.
    if !headers.iter().any(|h| h == DATE_HEADER) {
        headers = headers
            .iter()
            .map(|h| if h == DATE_ALIAS { DATE_HEADER } else { h })
            .collect();
        rdr.set_headers(headers.clone());
    }
    let dropped: Vec<&str> = headers
        .iter()
        .filter(|h| !SOURCE_COLUMNS.contains(h))
        .collect();
    if !dropped.is_empty() {
        debug!("dropping columns: {}", dropped.join(", "));
    }

    let raw = rdr
        .deserialize::<RawRecord>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    debug!("read {} raw rows", raw.len());
    normalize(&raw)
}

pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    let path = path.as_ref();
    info!("loading dataset: {}", path.display());
    let records = load_from_reader(File::open(path)?)?;
    info!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Column-wise snapshot of the records, labels already resolved.
pub fn to_frame(records: &[Record]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Series::new(DATE, records.iter().map(|r| r.date).collect::<Vec<_>>()),
        Series::new(
            YEAR_FLAG,
            records.iter().map(|r| i32::from(r.year_flag)).collect::<Vec<_>>(),
        ),
        Series::new(MONTH, records.iter().map(|r| r.month.label()).collect::<Vec<_>>()),
        Series::new(
            WEATHER_CONDITION,
            records
                .iter()
                .map(|r| i32::from(r.weather_condition))
                .collect::<Vec<_>>(),
        ),
        Series::new(SEASON, records.iter().map(|r| r.season.label()).collect::<Vec<_>>()),
        Series::new(WEEKDAY, records.iter().map(|r| r.weekday.label()).collect::<Vec<_>>()),
        Series::new(CASUAL, records.iter().map(|r| i64::from(r.casual)).collect::<Vec<_>>()),
        Series::new(
            REGISTERED,
            records.iter().map(|r| i64::from(r.registered)).collect::<Vec<_>>(),
        ),
        Series::new(TOTAL, records.iter().map(|r| i64::from(r.total)).collect::<Vec<_>>()),
    ])?;
    Ok(df)
}
