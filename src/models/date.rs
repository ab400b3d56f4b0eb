//! Calendar dates and partition months.
//!
//! Ledger documents store their date as three zero-padded string fields
//! (`year`, `month`, `day`) while operation records are physically grouped
//! into monthly partitions named `{year}-{month}`. The types here convert
//! between those storage shapes and real calendar arithmetic.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when reconstructing a date from storage fields or input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("date field {field} is not numeric: '{value}'")]
    NonNumeric { field: &'static str, value: String },

    #[error("no such calendar date: {year:04}-{month:02}-{day:02}")]
    OutOfRange { year: i32, month: u32, day: u32 },

    #[error("malformed date string: '{0}' (expected YYYY-MM-DD)")]
    Unparseable(String),
}

/// A calendar date with no time-of-day component.
///
/// This is the logical date of a ledger record, reconstructed from its
/// `year`/`month`/`day` string fields. Range filtering and period
/// validation operate on this type, never on raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Builds a date from numeric components, rejecting impossible dates.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or(DateError::OutOfRange { year, month, day })
    }

    /// Reconstructs a logical date from the stored string fields.
    ///
    /// Leading zeros are accepted ("01" and "1" both parse as January), but
    /// the reconstructed triple must name a real calendar date.
    pub fn from_storage_fields(year: &str, month: &str, day: &str) -> Result<Self, DateError> {
        let year: i32 = parse_field("year", year)?;
        let month: u32 = parse_field("month", month)?;
        let day: u32 = parse_field("day", day)?;
        Self::new(year, month, day)
    }

    /// Parses an ISO `YYYY-MM-DD` string, as used in API query parameters.
    pub fn parse_iso(value: &str) -> Result<Self, DateError> {
        NaiveDate::from_str(value.trim())
            .map(Self)
            .map_err(|_| DateError::Unparseable(value.to_string()))
    }

    /// Today's date in the server's local timezone.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// The `year` field as stored on ledger documents ("2025").
    pub fn year_field(&self) -> String {
        format!("{:04}", self.0.year())
    }

    /// The `month` field as stored on ledger documents ("01".."12").
    pub fn month_field(&self) -> String {
        format!("{:02}", self.0.month())
    }

    /// The `day` field as stored on ledger documents ("01".."31").
    pub fn day_field(&self) -> String {
        format!("{:02}", self.0.day())
    }

    /// The previous calendar day. Saturates at the minimum representable date.
    pub fn pred(self) -> Self {
        self.0.pred_opt().map(Self).unwrap_or(self)
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

fn parse_field<T: FromStr>(field: &'static str, value: &str) -> Result<T, DateError> {
    value.trim().parse().map_err(|_| DateError::NonNumeric {
        field,
        value: value.to_string(),
    })
}

/// A monthly storage partition, named `{year}-{month}` with a zero-padded
/// month ("2025-02").
///
/// A record's partition is where it physically lives; its logical date may
/// fall in the previous month when the record was entered late (carry-over).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartitionMonth {
    pub year: i32,
    pub month: u32,
}

impl PartitionMonth {
    /// Builds a partition month. `month` is 1-based.
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// The partition a date falls into when stored on time.
    pub fn of(date: CalendarDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The following month, wrapping December into January of the next year.
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The `year` equality predicate value for flat collection queries.
    pub fn year_field(&self) -> String {
        format!("{:04}", self.year)
    }

    /// The `month` equality predicate value for flat collection queries.
    pub fn month_field(&self) -> String {
        format!("{:02}", self.month)
    }

    /// The partition document key, e.g. "2025-02".
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

impl fmt::Display for PartitionMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// An inclusive span of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: CalendarDate,
    pub end: CalendarDate,
}

impl DateRange {
    pub fn new(start: CalendarDate, end: CalendarDate) -> Self {
        Self { start, end }
    }

    /// Whether `date` falls within the range, bounds included.
    pub fn contains(&self, date: CalendarDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Named reporting periods offered by the dashboard and mobile app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RangePreset {
    Today,
    Yesterday,
    ThisWeek,
    ThisMonth,
}

impl RangePreset {
    /// Resolves the preset into a concrete range relative to `today`.
    ///
    /// Weeks start on Monday. "This month" runs from the first of the month
    /// through today.
    pub fn resolve(self, today: CalendarDate) -> DateRange {
        match self {
            RangePreset::Today => DateRange::new(today, today),
            RangePreset::Yesterday => {
                let yesterday = today.pred();
                DateRange::new(yesterday, yesterday)
            }
            RangePreset::ThisWeek => {
                let offset = today.as_naive().weekday().num_days_from_monday() as i64;
                let monday = CalendarDate::from(today.as_naive() - Duration::days(offset));
                DateRange::new(monday, today)
            }
            RangePreset::ThisMonth => {
                let first = CalendarDate::new(today.year(), today.month(), 1).unwrap_or(today);
                DateRange::new(first, today)
            }
        }
    }
}

impl FromStr for RangePreset {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "today" => Ok(RangePreset::Today),
            "yesterday" => Ok(RangePreset::Yesterday),
            "this-week" | "week" => Ok(RangePreset::ThisWeek),
            "this-month" | "month" => Ok(RangePreset::ThisMonth),
            other => Err(format!(
                "unknown range preset: '{}' (expected today, yesterday, this-week or this-month)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> CalendarDate {
        CalendarDate::new(year, month, day).unwrap()
    }

    #[test]
    fn storage_fields_are_zero_padded() {
        let d = date(2025, 1, 5);
        assert_eq!(d.year_field(), "2025");
        assert_eq!(d.month_field(), "01");
        assert_eq!(d.day_field(), "05");
    }

    #[test]
    fn from_storage_fields_accepts_padded_and_unpadded() {
        let padded = CalendarDate::from_storage_fields("2025", "01", "31").unwrap();
        let unpadded = CalendarDate::from_storage_fields("2025", "1", "31").unwrap();
        assert_eq!(padded, unpadded);
        assert_eq!(padded, date(2025, 1, 31));
    }

    #[test]
    fn from_storage_fields_rejects_impossible_dates() {
        let err = CalendarDate::from_storage_fields("2025", "02", "30").unwrap_err();
        assert!(matches!(err, DateError::OutOfRange { .. }));

        let err = CalendarDate::from_storage_fields("2025", "1x", "05").unwrap_err();
        assert!(matches!(err, DateError::NonNumeric { field: "month", .. }));
    }

    #[test]
    fn parse_iso_handles_whitespace_and_garbage() {
        assert_eq!(CalendarDate::parse_iso(" 2025-03-01 ").unwrap(), date(2025, 3, 1));
        assert!(CalendarDate::parse_iso("03/01/2025").is_err());
        assert!(CalendarDate::parse_iso("").is_err());
    }

    #[test]
    fn partition_month_key_is_zero_padded() {
        assert_eq!(PartitionMonth::new(2025, 2).key(), "2025-02");
        assert_eq!(PartitionMonth::new(2025, 11).to_string(), "2025-11");
    }

    #[test]
    fn partition_month_next_wraps_december() {
        assert_eq!(PartitionMonth::new(2025, 11).next(), PartitionMonth::new(2025, 12));
        assert_eq!(PartitionMonth::new(2025, 12).next(), PartitionMonth::new(2026, 1));
    }

    #[test]
    fn date_range_contains_is_inclusive() {
        let range = DateRange::new(date(2025, 1, 1), date(2025, 1, 31));
        assert!(range.contains(date(2025, 1, 1)));
        assert!(range.contains(date(2025, 1, 31)));
        assert!(range.contains(date(2025, 1, 15)));
        assert!(!range.contains(date(2024, 12, 31)));
        assert!(!range.contains(date(2025, 2, 1)));
    }

    #[test]
    fn preset_today_and_yesterday() {
        let today = date(2025, 3, 15);
        assert_eq!(RangePreset::Today.resolve(today), DateRange::new(today, today));
        assert_eq!(
            RangePreset::Yesterday.resolve(today),
            DateRange::new(date(2025, 3, 14), date(2025, 3, 14))
        );
    }

    #[test]
    fn preset_this_week_starts_on_monday() {
        // 2025-03-15 is a Saturday; the week began Monday 2025-03-10.
        let range = RangePreset::ThisWeek.resolve(date(2025, 3, 15));
        assert_eq!(range, DateRange::new(date(2025, 3, 10), date(2025, 3, 15)));

        // A Monday resolves to a single-day-so-far week.
        let range = RangePreset::ThisWeek.resolve(date(2025, 3, 10));
        assert_eq!(range, DateRange::new(date(2025, 3, 10), date(2025, 3, 10)));
    }

    #[test]
    fn preset_this_month_starts_on_the_first() {
        let range = RangePreset::ThisMonth.resolve(date(2025, 3, 15));
        assert_eq!(range, DateRange::new(date(2025, 3, 1), date(2025, 3, 15)));
    }

    #[test]
    fn preset_parse_is_case_insensitive() {
        assert_eq!("Today".parse::<RangePreset>().unwrap(), RangePreset::Today);
        assert_eq!("this-week".parse::<RangePreset>().unwrap(), RangePreset::ThisWeek);
        assert!("fortnight".parse::<RangePreset>().is_err());
    }
}
