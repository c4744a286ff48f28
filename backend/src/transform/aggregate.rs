//! Group-by aggregates over the cleaned table.

use std::collections::BTreeMap;

use crate::models::{weekday_name, MonthAverage, SalesRecord, StoreId, StoreTotal, WeekdayAverage};

/// Number of stores kept by [`top_stores`] in the standard report.
pub const TOP_STORE_COUNT: usize = 3;

/// Total sales per store, ordered by store id.
///
/// Sums run in table order, so each total equals the store's last
/// cumulative value exactly.
pub fn store_totals(records: &[SalesRecord]) -> Vec<StoreTotal> {
    let mut totals: BTreeMap<&StoreId, f64> = BTreeMap::new();
    for record in records {
        *totals.entry(&record.store_id).or_insert(0.0) += record.sales;
    }

    totals
        .into_iter()
        .map(|(store_id, total_sales)| StoreTotal {
            store_id: store_id.clone(),
            total_sales,
        })
        .collect()
}

/// Mean sales per weekday name, ordered by name.
///
/// Rows without a parsed date are not part of any weekday group.
pub fn weekday_averages(records: &[SalesRecord]) -> Vec<WeekdayAverage> {
    let mut groups: BTreeMap<&'static str, (f64, usize)> = BTreeMap::new();
    for record in records {
        if let Some(day) = record.weekday {
            let entry = groups.entry(weekday_name(day)).or_insert((0.0, 0));
            entry.0 += record.sales;
            entry.1 += 1;
        }
    }

    groups
        .into_iter()
        .map(|(weekday, (sum, count))| WeekdayAverage {
            weekday: weekday.to_string(),
            avg_sales_per_day: sum / count as f64,
        })
        .collect()
}

/// Mean sales per calendar month, ordered by month.
pub fn month_averages(records: &[SalesRecord]) -> Vec<MonthAverage> {
    let mut groups: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for record in records {
        if let Some(month) = record.month {
            let entry = groups.entry(month).or_insert((0.0, 0));
            entry.0 += record.sales;
            entry.1 += 1;
        }
    }

    groups
        .into_iter()
        .map(|(month, (sum, count))| MonthAverage {
            month,
            avg_daily_sales: sum / count as f64,
        })
        .collect()
}

/// The `n` stores with the highest totals, descending.
///
/// Stable: equal totals keep their order in `totals`.
pub fn top_stores(totals: &[StoreTotal], n: usize) -> Vec<StoreTotal> {
    let mut ranked = totals.to_vec();
    ranked.sort_by(|a, b| b.total_sales.total_cmp(&a.total_sales));
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SalesCategory;
    use chrono::{Datelike, NaiveDate};

    fn rec(store: &str, date: Option<(i32, u32, u32)>, sales: f64) -> SalesRecord {
        let date = date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
        SalesRecord {
            line: 0,
            store_id: StoreId::from(store),
            date,
            raw_date: String::new(),
            sales,
            extra: vec![],
            weekday: date.map(|d| d.weekday()),
            month: date.map(|d| d.month()),
            cumulative_sales: 0.0,
            category: SalesCategory::classify(sales),
        }
    }

    fn total(store: &str, total_sales: f64) -> StoreTotal {
        StoreTotal {
            store_id: StoreId::from(store),
            total_sales,
        }
    }

    #[test]
    fn test_store_totals_ordered_by_id() {
        let records = vec![
            rec("101", Some((2024, 1, 1)), 6000.0),
            rec("99", Some((2024, 1, 1)), 10.0),
            rec("101", Some((2024, 1, 2)), 2000.0),
            rec("102", None, 4000.0),
        ];

        assert_eq!(
            store_totals(&records),
            vec![total("99", 10.0), total("101", 8000.0), total("102", 4000.0)]
        );
    }

    #[test]
    fn test_weekday_averages_skip_unparseable_dates() {
        let records = vec![
            rec("101", Some((2024, 1, 1)), 6000.0), // Monday
            rec("102", Some((2024, 1, 1)), 4000.0), // Monday
            rec("101", Some((2024, 1, 2)), 2000.0), // Tuesday
            rec("101", None, 9999.0),
        ];
        let averages = weekday_averages(&records);

        assert_eq!(averages.len(), 2);
        assert_eq!(averages[0].weekday, "Monday");
        assert_eq!(averages[0].avg_sales_per_day, 5000.0);
        assert_eq!(averages[1].weekday, "Tuesday");
        assert_eq!(averages[1].avg_sales_per_day, 2000.0);
    }

    #[test]
    fn test_weekday_averages_alphabetical() {
        let records = vec![
            rec("1", Some((2024, 1, 1)), 1.0), // Monday
            rec("1", Some((2024, 1, 5)), 1.0), // Friday
            rec("1", Some((2024, 1, 6)), 1.0), // Saturday
        ];
        let names: Vec<String> = weekday_averages(&records)
            .into_iter()
            .map(|w| w.weekday)
            .collect();

        assert_eq!(names, vec!["Friday", "Monday", "Saturday"]);
    }

    #[test]
    fn test_month_averages() {
        let records = vec![
            rec("1", Some((2024, 2, 1)), 100.0),
            rec("1", Some((2024, 1, 1)), 10.0),
            rec("1", Some((2024, 1, 2)), 30.0),
            rec("1", None, 500.0),
        ];

        assert_eq!(
            month_averages(&records),
            vec![
                MonthAverage { month: 1, avg_daily_sales: 20.0 },
                MonthAverage { month: 2, avg_daily_sales: 100.0 },
            ]
        );
    }

    #[test]
    fn test_top_stores_descending_and_truncated() {
        let totals = vec![
            total("1", 10.0),
            total("2", 40.0),
            total("3", 30.0),
            total("4", 20.0),
        ];
        let top = top_stores(&totals, TOP_STORE_COUNT);

        assert_eq!(top, vec![total("2", 40.0), total("3", 30.0), total("4", 20.0)]);
    }

    #[test]
    fn test_top_stores_ties_keep_grouping_order() {
        let totals = vec![total("1", 5.0), total("2", 7.0), total("3", 5.0), total("4", 5.0)];
        let top = top_stores(&totals, TOP_STORE_COUNT);

        assert_eq!(top, vec![total("2", 7.0), total("1", 5.0), total("3", 5.0)]);
    }

    #[test]
    fn test_top_stores_fewer_than_n() {
        let totals = vec![total("1", 5.0)];
        assert_eq!(top_stores(&totals, TOP_STORE_COUNT).len(), 1);
        assert!(top_stores(&[], TOP_STORE_COUNT).is_empty());
    }
}
