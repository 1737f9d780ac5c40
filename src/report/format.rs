//! Formatted terminal output for the `summary` command.
//!
//! We keep formatting code in one place so output changes stay localized and
//! the aggregation code never builds strings.

use crate::dashboard::DashboardView;
use crate::data::{DataSource, EmptyReason, LoadFailure};
use crate::io::ingest::ParsedBookings;

const BAR_WIDTH: usize = 30;

/// Full run summary: load stats, range, counters, countries, dates.
pub fn format_summary(source: &DataSource, parsed: &ParsedBookings, view: &DashboardView, top_n: usize) -> String {
    let mut out = String::new();

    out.push_str("=== hotel - Booking Dashboard ===\n");
    out.push_str(&format!("Source: {source}\n"));
    out.push_str(&format!(
        "Rows: read={} | used={} | skipped={}\n",
        parsed.rows_read,
        parsed.rows_used(),
        parsed.rows_skipped(),
    ));
    for (kind, count) in parsed.skipped_by_kind() {
        out.push_str(&format!("  - {kind}: {count}\n"));
    }

    out.push_str(&format!("Range: {}\n", view.range));
    out.push_str(&format!(
        "Bookings in range: {} | adults={} | children={} | visitors={}\n",
        view.record_count,
        view.total_adults,
        view.total_children,
        view.total_visitors(),
    ));

    out.push('\n');
    out.push_str(&format_countries(view, top_n));
    out.push('\n');
    out.push_str(&format_dates(view));

    out
}

/// Top-N countries with proportional bars.
pub fn format_countries(view: &DashboardView, top_n: usize) -> String {
    let mut out = String::new();
    out.push_str("Visitors by country:\n");
    if view.by_country.is_empty() {
        out.push_str("  (none)\n");
        return out;
    }

    let max = view.by_country.first().map(|c| c.total_visitors).unwrap_or(0);
    let width = view
        .by_country
        .iter()
        .take(top_n)
        .map(|c| c.country.chars().count())
        .max()
        .unwrap_or(0);
    for c in view.by_country.iter().take(top_n) {
        out.push_str(&format!(
            "  {:<width$} {:>7} {}\n",
            c.country,
            c.total_visitors,
            bar(c.total_visitors, max, BAR_WIDTH),
        ));
    }
    let hidden = view.by_country.len().saturating_sub(top_n);
    if hidden > 0 {
        out.push_str(&format!("  … {hidden} more\n"));
    }
    out
}

/// Per-date totals with adults/children columns.
pub fn format_dates(view: &DashboardView) -> String {
    let mut out = String::new();
    out.push_str("Visitors over time:\n");
    if view.by_date.is_empty() {
        out.push_str("  (none)\n");
        return out;
    }

    let max = view.by_date.iter().map(|d| d.total_visitors).max().unwrap_or(0);
    out.push_str(&format!("  {:<10} {:>7} {:>7} {:>8}\n", "date", "total", "adults", "children"));
    for (d, daily) in view.by_date.iter().zip(view.daily.iter()) {
        out.push_str(&format!(
            "  {:<10} {:>7} {:>7} {:>8} {}\n",
            d.date,
            d.total_visitors,
            daily.adults,
            daily.children,
            bar(d.total_visitors, max, BAR_WIDTH),
        ));
    }
    out
}

pub fn format_empty(source: &DataSource, reason: &EmptyReason) -> String {
    format!("No booking data available from {source}: {reason}.")
}

pub fn format_failure(failure: &LoadFailure) -> String {
    format!("Failed to load booking data. {failure}")
}

fn bar(value: u64, max: u64, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let len = ((value as f64 / max as f64) * width as f64).round() as usize;
    "█".repeat(len.min(width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{DateRange, date_bounds};
    use crate::io::ingest::{NaiveSplitter, parse_bookings};

    const CSV: &str = "hotel,y,m,d,a,c,b,country
HotelA,2023,July,15,2,1,0,Portugal
HotelB,2023,July,15,1,0,0,France
HotelB,2023,July,16,3,2,1,Portugal
HotelC,1899,July,16,3,2,1,Portugal
HotelC,2023,Jul,16,3,2,1,Portugal";

    fn fixture() -> (ParsedBookings, DashboardView) {
        let parsed = parse_bookings(CSV, &NaiveSplitter).unwrap();
        let range: DateRange = date_bounds(&parsed.records).unwrap();
        let view = DashboardView::derive(&parsed.records, &range);
        (parsed, view)
    }

    #[test]
    fn summary_reports_rows_and_totals() {
        let (parsed, view) = fixture();
        let text = format_summary(&DataSource::parse("data/x.csv"), &parsed, &view, 10);

        assert!(text.contains("Source: data/x.csv"));
        assert!(text.contains("Rows: read=5 | used=3 | skipped=2"));
        assert!(text.contains("  - invalid year: 1"));
        assert!(text.contains("  - invalid month: 1"));
        assert!(text.contains("Range: 2023-07-15 → 2023-07-16"));
        assert!(text.contains("adults=6 | children=3 | visitors=10"));
    }

    #[test]
    fn countries_largest_first_and_truncated() {
        let (_, view) = fixture();
        let text = format_countries(&view, 1);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[1].trim_start().starts_with("Portugal"));
        assert!(lines[1].contains('9'));
        assert_eq!(lines[2].trim(), "… 1 more");
    }

    #[test]
    fn dates_include_breakdown_columns() {
        let (_, view) = fixture();
        let text = format_dates(&view);
        assert!(text.contains("2023-07-15"));
        let row = text.lines().find(|l| l.contains("2023-07-16")).unwrap();
        let cols: Vec<&str> = row.split_whitespace().collect();
        assert_eq!(&cols[..4], &["2023-07-16", "6", "3", "2"]);
    }

    #[test]
    fn bar_scales_to_max() {
        assert_eq!(bar(10, 10, 4).chars().count(), 4);
        assert_eq!(bar(5, 10, 4).chars().count(), 2);
        assert_eq!(bar(0, 0, 4), "");
    }
}
