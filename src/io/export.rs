//! Export aggregates to CSV and the full dashboard view to JSON.
//!
//! The CSVs are meant to be easy to consume in spreadsheets or downstream
//! scripts; the JSON carries every panel of the current view.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::dashboard::DashboardView;
use crate::domain::{CountryAggregate, DateAggregate};
use crate::error::AppError;

/// Write per-country totals (`country,total_visitors`).
pub fn write_countries_csv(path: &Path, rows: &[CountryAggregate]) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::usage(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writeln!(file, "country,total_visitors")
        .map_err(|e| AppError::usage(format!("Failed to write export CSV header: {e}")))?;
    for row in rows {
        writeln!(file, "{},{}", csv_field(&row.country), row.total_visitors)
            .map_err(|e| AppError::usage(format!("Failed to write export CSV row: {e}")))?;
    }
    Ok(())
}

/// Write per-date totals (`date,total_visitors`).
pub fn write_dates_csv(path: &Path, rows: &[DateAggregate]) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::usage(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writeln!(file, "date,total_visitors")
        .map_err(|e| AppError::usage(format!("Failed to write export CSV header: {e}")))?;
    for row in rows {
        writeln!(file, "{},{}", row.date, row.total_visitors)
            .map_err(|e| AppError::usage(format!("Failed to write export CSV row: {e}")))?;
    }
    Ok(())
}

/// Write the whole view as pretty JSON.
pub fn write_view_json(path: &Path, view: &DashboardView) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::usage(format!("Failed to create JSON export '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, view)
        .map_err(|e| AppError::usage(format!("Failed to write JSON export: {e}")))?;
    Ok(())
}

/// Country values come from user data; quote them if they would break the row.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::DateRange;
    use crate::domain::BookingRecord;
    use chrono::NaiveDate;

    fn view() -> DashboardView {
        let records = vec![
            BookingRecord::new("H", 2023, "July", 15, 2, 1, 0, "Portugal").unwrap(),
            BookingRecord::new("H", 2023, "July", 16, 1, 0, 0, "Korea, Republic of").unwrap(),
        ];
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2023, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 7, 31).unwrap(),
        );
        DashboardView::derive(&records, &range)
    }

    #[test]
    fn country_csv_quotes_commas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("countries.csv");
        write_countries_csv(&path, &view().by_country).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "country,total_visitors\nPortugal,3\n\"Korea, Republic of\",1\n");
    }

    #[test]
    fn dates_csv_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dates.csv");
        write_dates_csv(&path, &view().by_date).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "date,total_visitors\n2023-07-15,3\n2023-07-16,1\n");
    }

    #[test]
    fn json_export_carries_every_panel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view.json");
        write_view_json(&path, &view()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["record_count"], 2);
        assert_eq!(value["total_adults"], 3);
        assert_eq!(value["range"]["from"], "2023-07-01");
        assert_eq!(value["by_country"][0]["country"], "Portugal");
        assert_eq!(value["daily"][1]["adults"], 1);
    }

    #[test]
    fn unwritable_path_is_usage_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_dates_csv(&dir.path().join("missing/dir/out.csv"), &[]).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_USAGE);
    }
}
