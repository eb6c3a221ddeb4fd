use chrono::NaiveDate;
use serde::Serialize;

pub const DATE: &str = "date";
pub const YEAR_FLAG: &str = "year_flag";
pub const MONTH: &str = "month";
pub const WEATHER_CONDITION: &str = "weather_condition";
pub const SEASON: &str = "season";
pub const WEEKDAY: &str = "weekday";
pub const CASUAL: &str = "casual";
pub const REGISTERED: &str = "registered";
pub const TOTAL: &str = "total";

pub const MONTH_LABELS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub const SEASON_LABELS: [&str; 4] = ["Spring", "Summer", "Fall", "Winter"];

pub const WEEKDAY_LABELS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Month codes run 1 (January) to 12 (December).
    pub fn from_code(code: i64) -> Option<Self> {
        let idx = usize::try_from(code.checked_sub(1)?).ok()?;
        Self::ALL.get(idx).copied()
    }

    pub fn label(self) -> &'static str {
        MONTH_LABELS[self as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

    /// Season codes run 1 (Spring) to 4 (Winter).
    pub fn from_code(code: i64) -> Option<Self> {
        let idx = usize::try_from(code.checked_sub(1)?).ok()?;
        Self::ALL.get(idx).copied()
    }

    pub fn label(self) -> &'static str {
        SEASON_LABELS[self as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// Weekday codes run 0 (Sunday) to 6 (Saturday).
    pub fn from_code(code: i64) -> Option<Self> {
        let idx = usize::try_from(code).ok()?;
        Self::ALL.get(idx).copied()
    }

    pub fn label(self) -> &'static str {
        WEEKDAY_LABELS[self as usize]
    }
}

/// One normalized day of rentals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub date: NaiveDate,
    pub year_flag: u8,
    pub month: Month,
    pub weather_condition: u8,
    pub season: Season,
    pub weekday: Weekday,
    pub casual: u32,
    pub registered: u32,
    /// Expected to equal `casual + registered`; taken from the source as is.
    pub total: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_codes_map_in_calendar_order() {
        assert_eq!(Month::from_code(1), Some(Month::January));
        assert_eq!(Month::from_code(12), Some(Month::December));
        assert_eq!(Month::from_code(0), None);
        assert_eq!(Month::from_code(13), None);
        assert_eq!(Month::from_code(-1), None);
        assert_eq!(Month::August.label(), "August");
        let labels: Vec<_> = Month::ALL.iter().map(|m| m.label()).collect();
        assert_eq!(labels, MONTH_LABELS);
    }

    #[test]
    fn season_codes_start_at_one() {
        assert_eq!(Season::from_code(1).map(Season::label), Some("Spring"));
        assert_eq!(Season::from_code(4).map(Season::label), Some("Winter"));
        assert_eq!(Season::from_code(0), None);
        assert_eq!(Season::from_code(5), None);
    }

    #[test]
    fn weekday_codes_start_at_sunday() {
        assert_eq!(Weekday::from_code(0), Some(Weekday::Sunday));
        assert_eq!(Weekday::from_code(6).map(Weekday::label), Some("Saturday"));
        assert_eq!(Weekday::from_code(7), None);
        assert_eq!(Weekday::from_code(-3), None);
    }
}
