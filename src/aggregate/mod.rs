//! Grouping and totals over a record collection.
//!
//! Every function here is a pure fold over the slice it is given. Nothing is
//! cached; callers re-run them on whatever subset they currently display.

use std::collections::{BTreeMap, HashMap};

use crate::domain::{BookingRecord, CountryAggregate, DailyBreakdown, DateAggregate};

/// Visitors per country, largest first.
///
/// Records with an empty country are skipped. Equal totals are ordered by
/// country name.
pub fn group_by_country(records: &[BookingRecord]) -> Vec<CountryAggregate> {
    let mut totals: HashMap<&str, u64> = HashMap::new();
    for r in records {
        let country = r.country().trim();
        if country.is_empty() {
            continue;
        }
        *totals.entry(country).or_insert(0) += r.total_visitors();
    }

    let mut out: Vec<CountryAggregate> = totals
        .into_iter()
        .map(|(country, total_visitors)| CountryAggregate {
            country: country.to_string(),
            total_visitors,
        })
        .collect();
    out.sort_by(|a, b| {
        b.total_visitors
            .cmp(&a.total_visitors)
            .then_with(|| a.country.cmp(&b.country))
    });
    out
}

/// Visitors per arrival date, oldest first.
///
/// Canonical dates are fixed-width and zero-padded, so string order is
/// calendar order.
pub fn group_by_date(records: &[BookingRecord]) -> Vec<DateAggregate> {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for r in records {
        if r.date().is_empty() {
            continue;
        }
        *totals.entry(r.date()).or_insert(0) += r.total_visitors();
    }

    totals
        .into_iter()
        .map(|(date, total_visitors)| DateAggregate {
            date: date.to_string(),
            total_visitors,
        })
        .collect()
}

/// Adults and children per arrival date, in the same order as `group_by_date`.
pub fn daily_breakdown(records: &[BookingRecord]) -> Vec<DailyBreakdown> {
    let mut days: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for r in records {
        let entry = days.entry(r.date()).or_insert((0, 0));
        entry.0 += u64::from(r.adults());
        entry.1 += u64::from(r.children());
    }

    days.into_iter()
        .map(|(date, (adults, children))| DailyBreakdown {
            date: date.to_string(),
            adults,
            children,
        })
        .collect()
}

pub fn total_adults(records: &[BookingRecord]) -> u64 {
    records.iter().map(|r| u64::from(r.adults())).sum()
}

pub fn total_children(records: &[BookingRecord]) -> u64 {
    records.iter().map(|r| u64::from(r.children())).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(day: u32, adults: u32, children: u32, babies: u32, country: &str) -> BookingRecord {
        BookingRecord::new("H", 2023, "July", day, adults, children, babies, country).unwrap()
    }

    fn example() -> Vec<BookingRecord> {
        vec![
            rec(15, 2, 1, 0, "Portugal"),
            rec(15, 1, 0, 0, "France"),
            rec(16, 3, 2, 1, "Portugal"),
        ]
    }

    #[test]
    fn groups_example_by_date() {
        let by_date = group_by_date(&example());
        assert_eq!(
            by_date,
            vec![
                DateAggregate { date: "2023-07-15".to_string(), total_visitors: 4 },
                DateAggregate { date: "2023-07-16".to_string(), total_visitors: 6 },
            ]
        );
    }

    #[test]
    fn groups_example_by_country() {
        let by_country = group_by_country(&example());
        assert_eq!(
            by_country,
            vec![
                CountryAggregate { country: "Portugal".to_string(), total_visitors: 9 },
                CountryAggregate { country: "France".to_string(), total_visitors: 1 },
            ]
        );
    }

    #[test]
    fn empty_country_excluded_from_country_totals_only() {
        let mut records = example();
        records.push(rec(17, 5, 0, 0, ""));

        let by_country = group_by_country(&records);
        let country_sum: u64 = by_country.iter().map(|c| c.total_visitors).sum();
        assert_eq!(country_sum, 10);
        assert!(by_country.iter().all(|c| !c.country.is_empty()));

        let by_date = group_by_date(&records);
        assert_eq!(by_date.last().map(|d| d.total_visitors), Some(5));
    }

    #[test]
    fn country_ties_ordered_by_name() {
        let records = vec![rec(1, 2, 0, 0, "ESP"), rec(1, 2, 0, 0, "DEU"), rec(1, 5, 0, 0, "GBR")];
        let names: Vec<String> = group_by_country(&records).into_iter().map(|c| c.country).collect();
        assert_eq!(names, vec!["GBR", "DEU", "ESP"]);
    }

    #[test]
    fn dates_sort_chronologically_across_months_and_years() {
        let records = vec![
            BookingRecord::new("H", 2016, "January", 2, 1, 0, 0, "X").unwrap(),
            BookingRecord::new("H", 2015, "December", 31, 1, 0, 0, "X").unwrap(),
            BookingRecord::new("H", 2015, "February", 10, 1, 0, 0, "X").unwrap(),
        ];
        let dates: Vec<String> = group_by_date(&records).into_iter().map(|d| d.date).collect();
        assert_eq!(dates, vec!["2015-02-10", "2015-12-31", "2016-01-02"]);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let records = example();
        assert_eq!(group_by_country(&records), group_by_country(&records));
        assert_eq!(group_by_date(&records), group_by_date(&records));
        assert_eq!(daily_breakdown(&records), daily_breakdown(&records));
    }

    #[test]
    fn breakdown_and_totals() {
        let records = example();
        assert_eq!(total_adults(&records), 6);
        assert_eq!(total_children(&records), 3);
        assert_eq!(
            daily_breakdown(&records),
            vec![
                DailyBreakdown { date: "2023-07-15".to_string(), adults: 3, children: 1 },
                DailyBreakdown { date: "2023-07-16".to_string(), adults: 3, children: 2 },
            ]
        );
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(group_by_country(&[]).is_empty());
        assert!(group_by_date(&[]).is_empty());
        assert_eq!(total_adults(&[]), 0);
    }
}
