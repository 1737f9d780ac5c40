//! Shared domain types.
//!
//! Records are validated once at construction and are read-only afterwards.
//! Aggregates are plain serializable rows so they can be rendered, printed,
//! or exported without conversion.

use std::ops::RangeInclusive;

use serde::Serialize;

use crate::domain::dates::{format_date, is_valid_month};

/// Accepted arrival years.
pub const YEAR_RANGE: RangeInclusive<i32> = 1900..=2100;
/// Accepted days of month. Month length is not checked.
pub const DAY_RANGE: RangeInclusive<u32> = 1..=31;

/// Why a single input line was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowErrorKind {
    /// Fewer than the 8 required columns.
    TooFewFields,
    /// Year missing, not an integer, or outside `YEAR_RANGE`.
    InvalidYear,
    /// Month is not one of the 12 canonical English names.
    InvalidMonth,
    /// Day missing, not an integer, or outside `DAY_RANGE`.
    InvalidDay,
    /// Anything else that went wrong while handling the line.
    Unexpected,
}

impl RowErrorKind {
    pub const ALL: [RowErrorKind; 5] = [
        RowErrorKind::TooFewFields,
        RowErrorKind::InvalidYear,
        RowErrorKind::InvalidMonth,
        RowErrorKind::InvalidDay,
        RowErrorKind::Unexpected,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RowErrorKind::TooFewFields => "too few fields",
            RowErrorKind::InvalidYear => "invalid year",
            RowErrorKind::InvalidMonth => "invalid month",
            RowErrorKind::InvalidDay => "invalid day",
            RowErrorKind::Unexpected => "unexpected error",
        }
    }
}

impl std::fmt::Display for RowErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One validated booking row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingRecord {
    hotel: String,
    arrival_year: i32,
    arrival_month: String,
    arrival_day: u32,
    adults: u32,
    children: u32,
    babies: u32,
    country: String,
    date: String,
    total_visitors: u64,
}

impl BookingRecord {
    /// Validate the arrival date and build a record with its derived fields.
    ///
    /// Checks run year, then month, then day; the first failure is returned.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        hotel: &str,
        arrival_year: i32,
        arrival_month: &str,
        arrival_day: u32,
        adults: u32,
        children: u32,
        babies: u32,
        country: &str,
    ) -> Result<Self, RowErrorKind> {
        if !YEAR_RANGE.contains(&arrival_year) {
            return Err(RowErrorKind::InvalidYear);
        }
        if !is_valid_month(arrival_month) {
            return Err(RowErrorKind::InvalidMonth);
        }
        if !DAY_RANGE.contains(&arrival_day) {
            return Err(RowErrorKind::InvalidDay);
        }

        let arrival_month = arrival_month.trim();
        Ok(Self {
            hotel: hotel.trim().to_string(),
            arrival_year,
            arrival_month: arrival_month.to_string(),
            arrival_day,
            adults,
            children,
            babies,
            country: country.trim().to_string(),
            date: format_date(arrival_year, arrival_month, arrival_day),
            total_visitors: u64::from(adults) + u64::from(children) + u64::from(babies),
        })
    }

    pub fn hotel(&self) -> &str {
        &self.hotel
    }

    pub fn arrival_year(&self) -> i32 {
        self.arrival_year
    }

    pub fn arrival_month(&self) -> &str {
        &self.arrival_month
    }

    pub fn arrival_day(&self) -> u32 {
        self.arrival_day
    }

    pub fn adults(&self) -> u32 {
        self.adults
    }

    pub fn children(&self) -> u32 {
        self.children
    }

    pub fn babies(&self) -> u32 {
        self.babies
    }

    /// Trimmed country code; may be empty.
    pub fn country(&self) -> &str {
        &self.country
    }

    /// Canonical `YYYY-MM-DD` arrival date.
    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn total_visitors(&self) -> u64 {
        self.total_visitors
    }
}

/// Visitor total for one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryAggregate {
    pub country: String,
    pub total_visitors: u64,
}

/// Visitor total for one arrival date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateAggregate {
    pub date: String,
    pub total_visitors: u64,
}

/// Adults and children arriving on one date (sparkline input).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyBreakdown {
    pub date: String,
    pub adults: u64,
    pub children: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: i32, month: &str, day: u32) -> Result<BookingRecord, RowErrorKind> {
        BookingRecord::new(" Resort Hotel ", year, month, day, 2, 1, 1, " PRT ")
    }

    #[test]
    fn derives_date_and_total() {
        let r = record(2015, "July", 1).unwrap();
        assert_eq!(r.date(), "2015-07-01");
        assert_eq!(r.total_visitors(), 4);
        assert_eq!(r.hotel(), "Resort Hotel");
        assert_eq!(r.country(), "PRT");
    }

    #[test]
    fn year_bounds_are_inclusive() {
        assert!(record(1900, "May", 1).is_ok());
        assert!(record(2100, "May", 1).is_ok());
        assert_eq!(record(1899, "May", 1), Err(RowErrorKind::InvalidYear));
        assert_eq!(record(2101, "May", 1), Err(RowErrorKind::InvalidYear));
    }

    #[test]
    fn checks_year_before_month_before_day() {
        assert_eq!(record(1800, "Jul", 40), Err(RowErrorKind::InvalidYear));
        assert_eq!(record(2000, "Jul", 40), Err(RowErrorKind::InvalidMonth));
        assert_eq!(record(2000, "July", 40), Err(RowErrorKind::InvalidDay));
        assert_eq!(record(2000, "July", 0), Err(RowErrorKind::InvalidDay));
    }

    #[test]
    fn total_does_not_overflow_u32() {
        let r = BookingRecord::new("H", 2000, "May", 1, u32::MAX, u32::MAX, 1, "X").unwrap();
        assert_eq!(r.total_visitors(), 2 * u64::from(u32::MAX) + 1);
    }
}
