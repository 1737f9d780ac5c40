//! Date-range filtering and the derived dashboard view.
//!
//! The range is caller-owned state; filtering always builds a new collection
//! and leaves the loaded records untouched. `DashboardView::derive` is what
//! both front-ends render from.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::aggregate::{daily_breakdown, group_by_country, group_by_date, total_adults, total_children};
use crate::domain::{BookingRecord, CountryAggregate, DailyBreakdown, DateAggregate};

const DATE_FMT: &str = "%Y-%m-%d";

/// Inclusive range over canonical date strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub from: String,
    pub to: String,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: from.format(DATE_FMT).to_string(),
            to: to.format(DATE_FMT).to_string(),
        }
    }

    /// Both bounds are included. Comparison is on the canonical string, so
    /// a non-calendar key such as `2023-04-31` still sorts between April 30
    /// and May 1.
    pub fn contains(&self, date: &str) -> bool {
        date >= self.from.as_str() && date <= self.to.as_str()
    }

    pub fn is_inverted(&self) -> bool {
        self.from > self.to
    }

    pub fn from_date(&self) -> Option<NaiveDate> {
        parse_bound(&self.from)
    }

    pub fn to_date(&self) -> Option<NaiveDate> {
        parse_bound(&self.to)
    }

    /// Replace the lower bound, keeping the upper one.
    pub fn with_from(&self, from: NaiveDate) -> Self {
        Self {
            from: from.format(DATE_FMT).to_string(),
            to: self.to.clone(),
        }
    }

    /// Replace the upper bound, keeping the lower one.
    pub fn with_to(&self, to: NaiveDate) -> Self {
        Self {
            from: self.from.clone(),
            to: to.format(DATE_FMT).to_string(),
        }
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}", self.from, self.to)
    }
}

/// Interpret a canonical date key as a calendar date.
///
/// Keys past the end of their month (e.g. `2023-04-31`) roll forward into
/// the next month, matching where they sort.
pub fn parse_bound(s: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(s, DATE_FMT) {
        return Some(d);
    }

    let mut parts = s.splitn(3, '-');
    let year = parts.next()?.parse::<i32>().ok()?;
    let month = parts.next()?.parse::<u32>().ok()?;
    let day = parts.next()?.parse::<u64>().ok()?;
    if day == 0 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, 1)?.checked_add_days(Days::new(day - 1))
}

/// Earliest and latest arrival date in the collection.
pub fn date_bounds(records: &[BookingRecord]) -> Option<DateRange> {
    let from = records.iter().map(|r| r.date()).min()?;
    let to = records.iter().map(|r| r.date()).max()?;
    Some(DateRange {
        from: from.to_string(),
        to: to.to_string(),
    })
}

/// Data bounds with optional caller overrides on either end.
pub fn resolve_range(records: &[BookingRecord], from: Option<NaiveDate>, to: Option<NaiveDate>) -> Option<DateRange> {
    let bounds = date_bounds(records)?;
    Some(DateRange {
        from: from.map(|d| d.format(DATE_FMT).to_string()).unwrap_or(bounds.from),
        to: to.map(|d| d.format(DATE_FMT).to_string()).unwrap_or(bounds.to),
    })
}

pub fn filter_by_range(records: &[BookingRecord], range: &DateRange) -> Vec<BookingRecord> {
    records
        .iter()
        .filter(|r| range.contains(r.date()))
        .cloned()
        .collect()
}

/// Everything the dashboard shows for one range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub range: DateRange,
    pub record_count: usize,
    pub total_adults: u64,
    pub total_children: u64,
    pub by_country: Vec<CountryAggregate>,
    pub by_date: Vec<DateAggregate>,
    pub daily: Vec<DailyBreakdown>,
}

impl DashboardView {
    pub fn derive(records: &[BookingRecord], range: &DateRange) -> Self {
        let filtered = filter_by_range(records, range);
        Self {
            range: range.clone(),
            record_count: filtered.len(),
            total_adults: total_adults(&filtered),
            total_children: total_children(&filtered),
            by_country: group_by_country(&filtered),
            by_date: group_by_date(&filtered),
            daily: daily_breakdown(&filtered),
        }
    }

    pub fn total_visitors(&self) -> u64 {
        self.by_date.iter().map(|d| d.total_visitors).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(month: &str, day: u32, adults: u32, children: u32, country: &str) -> BookingRecord {
        BookingRecord::new("H", 2023, month, day, adults, children, 0, country).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Vec<BookingRecord> {
        vec![
            rec("July", 14, 1, 0, "PRT"),
            rec("July", 15, 2, 1, "PRT"),
            rec("July", 16, 3, 2, "FRA"),
            rec("July", 17, 4, 0, "GBR"),
        ]
    }

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let range = DateRange::new(ymd(2023, 7, 15), ymd(2023, 7, 16));
        let filtered = filter_by_range(&sample(), &range);
        let dates: Vec<&str> = filtered.iter().map(|r| r.date()).collect();
        assert_eq!(dates, vec!["2023-07-15", "2023-07-16"]);
    }

    #[test]
    fn filtering_leaves_source_intact() {
        let records = sample();
        let before = records.clone();
        let _ = filter_by_range(&records, &DateRange::new(ymd(2023, 7, 17), ymd(2023, 7, 17)));
        assert_eq!(records, before);
    }

    #[test]
    fn bounds_span_min_and_max() {
        let bounds = date_bounds(&sample()).unwrap();
        assert_eq!(bounds.from, "2023-07-14");
        assert_eq!(bounds.to, "2023-07-17");
        assert!(date_bounds(&[]).is_none());
    }

    #[test]
    fn overrides_replace_only_given_bounds() {
        let range = resolve_range(&sample(), Some(ymd(2023, 7, 15)), None).unwrap();
        assert_eq!(range.from, "2023-07-15");
        assert_eq!(range.to, "2023-07-17");
        assert!(resolve_range(&[], Some(ymd(2023, 7, 15)), None).is_none());
    }

    #[test]
    fn non_calendar_dates_sort_and_parse_sensibly() {
        let records = vec![rec("April", 30, 1, 0, "X"), rec("April", 31, 1, 0, "X"), rec("May", 1, 1, 0, "X")];
        let range = DateRange::new(ymd(2023, 4, 30), ymd(2023, 4, 30)).with_to(ymd(2023, 5, 1));
        assert_eq!(filter_by_range(&records, &range).len(), 3);

        assert_eq!(parse_bound("2023-04-31"), Some(ymd(2023, 5, 1)));
        assert_eq!(parse_bound("2023-02-30"), Some(ymd(2023, 3, 2)));
        assert_eq!(parse_bound("garbage"), None);
    }

    #[test]
    fn view_derives_all_panels_from_filtered_subset() {
        let range = DateRange::new(ymd(2023, 7, 15), ymd(2023, 7, 17));
        let view = DashboardView::derive(&sample(), &range);

        assert_eq!(view.record_count, 3);
        assert_eq!(view.total_adults, 9);
        assert_eq!(view.total_children, 3);
        assert_eq!(view.total_visitors(), 12);
        assert_eq!(view.by_country[0].country, "FRA");
        assert_eq!(view.by_date.len(), 3);
        assert_eq!(view.daily[0].date, "2023-07-15");
        assert_eq!(view.daily[0].adults, 2);
    }

    #[test]
    fn inverted_range_gives_empty_view() {
        let range = DateRange::new(ymd(2023, 7, 17), ymd(2023, 7, 14));
        assert!(range.is_inverted());
        let view = DashboardView::derive(&sample(), &range);
        assert_eq!(view.record_count, 0);
        assert!(view.by_country.is_empty());
    }
}
