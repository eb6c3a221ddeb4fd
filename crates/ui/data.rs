use chrono::NaiveDate;
use std::error::Error;
use unicode_width::UnicodeWidthStr;

/// One category and its value, e.g. a month and its rentals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Point {
    pub label: String,
    pub value: u64,
}

impl Point {
    pub fn new(label: impl Into<String>, value: u64) -> Self {
        Point {
            label: label.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonBar {
    pub season: String,
    pub registered: u64,
    pub casual: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    pub total: u64,
    pub casual: u64,
    pub registered: u64,
}

/// Everything drawn for one date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardData {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub metrics: Metrics,
    pub daily: Vec<Point>,
    pub monthly: Vec<Point>,
    pub seasons: Vec<SeasonBar>,
    pub weekdays: Vec<Point>,
}

/// Supplies dashboard data for a date range. The dashboard asks again on
/// every range change and keeps nothing from earlier answers.
pub trait DashboardSource {
    /// First and last selectable day.
    fn bounds(&self) -> (NaiveDate, NaiveDate);

    fn snapshot(&self, start: NaiveDate, end: NaiveDate) -> Result<DashboardData, Box<dyn Error>>;
}

/// Widest rendering of the given values, at least one column.
pub fn value_width<I: IntoIterator<Item = u64>>(values: I) -> u16 {
    let width = values
        .into_iter()
        .map(|v| UnicodeWidthStr::width(v.to_string().as_str()))
        .max()
        .unwrap_or(0)
        .max(1);
    u16::try_from(width).unwrap_or(u16::MAX)
}

/// Short axis label: the first `n` characters of `label`.
pub fn abbreviate(label: &str, n: usize) -> String {
    label.chars().take(n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_width_fits_the_longest_number() {
        assert_eq!(value_width([7, 12_345, 999]), 5);
        assert_eq!(value_width([0]), 1);
        assert_eq!(value_width(Vec::<u64>::new()), 1);
    }

    #[test]
    fn abbreviate_keeps_leading_chars() {
        assert_eq!(abbreviate("September", 3), "Sep");
        assert_eq!(abbreviate("May", 5), "May");
    }
}
