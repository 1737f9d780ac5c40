//! Month-name lookup and canonical date formatting.
//!
//! Booking exports carry the arrival date as three columns (year, English
//! month name, day of month). Everything downstream keys on a single
//! `YYYY-MM-DD` string, so this is the one place that builds it.

use chrono::Month;

/// The 12 accepted month names, in calendar order.
///
/// Matching is exact and case-sensitive: `"july"`, `"Jul"` and `"JULY"` are
/// all rejected.
const MONTH_NAMES: [(&str, Month); 12] = [
    ("January", Month::January),
    ("February", Month::February),
    ("March", Month::March),
    ("April", Month::April),
    ("May", Month::May),
    ("June", Month::June),
    ("July", Month::July),
    ("August", Month::August),
    ("September", Month::September),
    ("October", Month::October),
    ("November", Month::November),
    ("December", Month::December),
];

/// Resolve a month name (after trimming) to a `chrono::Month`.
pub fn month_from_name(name: &str) -> Option<Month> {
    let name = name.trim();
    MONTH_NAMES
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, month)| *month)
}

/// 1-based month ordinal for a canonical month name.
pub fn month_number(name: &str) -> Option<u32> {
    month_from_name(name).map(|m| m.number_from_month())
}

pub fn is_valid_month(name: &str) -> bool {
    month_from_name(name).is_some()
}

/// Build the canonical `YYYY-MM-DD` key for an arrival date.
///
/// Unknown month names fall back to January. The parser rejects those rows
/// before this is reached, so the fallback only matters for direct callers.
/// No calendar check is made: `(2023, "April", 31)` yields `"2023-04-31"`.
pub fn format_date(year: i32, month_name: &str, day: u32) -> String {
    let month = month_number(month_name).unwrap_or(1);
    format!("{year}-{month:02}-{day:02}")
}
