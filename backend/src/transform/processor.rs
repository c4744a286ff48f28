//! The sales table processor.
//!
//! A pure function from a [`RawTable`] to a [`SalesReport`]. Stages run in a
//! fixed order and each consumes the previous stage's output:
//!
//! ```text
//! fill missing sales → dedup → parse dates → sort → derive columns
//!     → store totals → weekday averages → top 3 (→ month averages)
//! ```
//!
//! Malformed values never abort processing: bad dates become `None`, bad
//! sales become 0, and both are listed in [`CleaningReport::issues`].

use serde::Serialize;

use super::aggregate::{month_averages, store_totals, top_stores, weekday_averages, TOP_STORE_COUNT};
use super::cleaning::{deduplicate, fill_missing_sales, parse_dates, sort_by_date, ColumnLayout};
use super::derive::derive_columns;
use crate::error::{AnalysisError, AnalysisResult, RowIssue};
use crate::models::{
    MonthAverage, RawTable, SalesRecord, StoreTotal, WeekdayAverage, DATE_COLUMN,
    REQUIRED_COLUMNS, SALES_COLUMN, STORE_ID_COLUMN,
};

/// What cleaning did to the input.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub duplicates_removed: usize,
    /// Empty cells per input column before cleaning.
    pub missing_before: Vec<(String, usize)>,
    /// Missing values per input column after cleaning. Dates that failed to
    /// parse count as missing.
    pub missing_after: Vec<(String, usize)>,
    pub issues: Vec<RowIssue>,
}

impl CleaningReport {
    pub fn unparseable_dates(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| matches!(i, RowIssue::UnparseableDate { .. }))
            .count()
    }

    pub fn unparseable_numbers(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| matches!(i, RowIssue::UnparseableNumber { .. }))
            .count()
    }
}

/// Everything the processor produces for one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    /// Input header, in input order.
    pub columns: Vec<String>,
    /// Cleaned, date-sorted rows with derived columns.
    pub records: Vec<SalesRecord>,
    pub store_totals: Vec<StoreTotal>,
    pub weekday_averages: Vec<WeekdayAverage>,
    pub top_stores: Vec<StoreTotal>,
    pub month_averages: Vec<MonthAverage>,
    pub cleaning: CleaningReport,
    /// Positions of StoreID, Date and Sales in [`SalesReport::columns`].
    #[serde(skip)]
    pub layout: ColumnLayout,
}

impl SalesReport {
    /// Names of the input columns carried verbatim, in input order.
    pub fn extra_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.layout.is_required(*i))
            .map(|(_, c)| c.as_str())
            .collect()
    }

    /// Sum of sales over the cleaned table.
    pub fn total_sales(&self) -> f64 {
        self.records.iter().map(|r| r.sales).sum()
    }
}

/// Locate the required columns, or list every one that is missing.
pub fn column_layout(headers: &[String]) -> AnalysisResult<ColumnLayout> {
    let find = |name: &str| headers.iter().position(|h| h == name);

    match (find(STORE_ID_COLUMN), find(DATE_COLUMN), find(SALES_COLUMN)) {
        (Some(store_id), Some(date), Some(sales)) => Ok(ColumnLayout {
            store_id,
            date,
            sales,
        }),
        _ => Err(AnalysisError::MissingColumn(
            REQUIRED_COLUMNS
                .iter()
                .filter(|&&c| find(c).is_none())
                .map(|c| c.to_string())
                .collect(),
        )),
    }
}

/// Run every stage over `table`.
///
/// Fails only when a required column is absent.
pub fn process(table: &RawTable) -> AnalysisResult<SalesReport> {
    let layout = column_layout(&table.headers)?;
    let mut issues = Vec::new();

    let filled = fill_missing_sales(&table.records, layout, &mut issues);
    let deduped = deduplicate(filled);
    let duplicates_removed = table.records.len() - deduped.len();
    let dated = parse_dates(deduped, &mut issues);
    let sorted = sort_by_date(dated);
    let records = derive_columns(sorted);

    let totals = store_totals(&records);
    let weekdays = weekday_averages(&records);
    let top = top_stores(&totals, TOP_STORE_COUNT);
    let months = month_averages(&records);

    issues.sort_by_key(RowIssue::line);

    let cleaning = CleaningReport {
        rows_read: table.records.len(),
        rows_kept: records.len(),
        duplicates_removed,
        missing_before: table.missing_counts(),
        missing_after: missing_after(&table.headers, layout, &records),
        issues,
    };

    Ok(SalesReport {
        columns: table.headers.clone(),
        records,
        store_totals: totals,
        weekday_averages: weekdays,
        top_stores: top,
        month_averages: months,
        cleaning,
        layout,
    })
}

fn missing_after(
    headers: &[String],
    layout: ColumnLayout,
    records: &[SalesRecord],
) -> Vec<(String, usize)> {
    let mut extra_index = 0;
    headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let missing = if i == layout.date {
                records.iter().filter(|r| r.date.is_none()).count()
            } else if i == layout.sales {
                0
            } else if i == layout.store_id {
                records
                    .iter()
                    .filter(|r| r.store_id.as_str().is_empty())
                    .count()
            } else {
                let extra = extra_index;
                extra_index += 1;
                records
                    .iter()
                    .filter(|r| r.extra.get(extra).map_or(true, |v| v.is_empty()))
                    .count()
            };
            (header.clone(), missing)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SalesCategory;

    fn table(rows: &[[&str; 3]]) -> RawTable {
        let mut table = RawTable::new(vec!["StoreID".into(), "Date".into(), "Sales".into()]);
        for row in rows {
            table.push_row(row.iter().copied());
        }
        table
    }

    #[test]
    fn test_reference_example() {
        let report = process(&table(&[
            ["101", "2024-01-01", "6000"],
            ["101", "2024-01-02", "2000"],
            ["102", "2024-01-01", "4000"],
        ]))
        .unwrap();

        let totals: Vec<(&str, f64)> = report
            .store_totals
            .iter()
            .map(|t| (t.store_id.as_str(), t.total_sales))
            .collect();
        assert_eq!(totals, vec![("101", 8000.0), ("102", 4000.0)]);

        // sorted: (101, Jan 1), (102, Jan 1), (101, Jan 2)
        let rows: Vec<(&str, f64, SalesCategory)> = report
            .records
            .iter()
            .map(|r| (r.store_id.as_str(), r.cumulative_sales, r.category))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("101", 6000.0, SalesCategory::High),
                ("102", 4000.0, SalesCategory::Medium),
                ("101", 8000.0, SalesCategory::Low),
            ]
        );

        let weekdays: Vec<&str> = report
            .weekday_averages
            .iter()
            .map(|w| w.weekday.as_str())
            .collect();
        assert_eq!(weekdays, vec!["Monday", "Tuesday"]);
        assert_eq!(report.weekday_averages[0].avg_sales_per_day, 5000.0);
        assert_eq!(report.weekday_averages[1].avg_sales_per_day, 2000.0);

        assert_eq!(report.top_stores.len(), 2);
        assert_eq!(report.top_stores[0].store_id.as_str(), "101");
    }

    #[test]
    fn test_totals_agree_with_rows() {
        let report = process(&table(&[
            ["103", "2024-02-03", "1500.5"],
            ["101", "2024-01-06", "7000"],
            ["102", "2024-01-07", ""],
            ["101", "2024-02-10", "3500"],
            ["103", "2024-01-06", "4200"],
            ["104", "2024-03-01", "10"],
        ]))
        .unwrap();

        let grand: f64 = report.store_totals.iter().map(|t| t.total_sales).sum();
        assert!((grand - report.total_sales()).abs() < 1e-9);

        for total in &report.store_totals {
            let last = report
                .records
                .iter()
                .rev()
                .find(|r| r.store_id == total.store_id)
                .unwrap();
            assert!((last.cumulative_sales - total.total_sales).abs() < 1e-9);
        }

        assert_eq!(report.top_stores.len(), 3);
        assert!(report
            .top_stores
            .windows(2)
            .all(|w| w[0].total_sales >= w[1].total_sales));

        let dates: Vec<_> = report.records.iter().map(|r| r.date).collect();
        assert!(dates.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let mut raw = RawTable::new(vec!["StoreID".into(), "Day".into()]);
        raw.push_row(["101", "2024-01-01"]);

        assert_eq!(
            process(&raw),
            Err(AnalysisError::MissingColumn(vec!["Date".into(), "Sales".into()]))
        );
    }

    #[test]
    fn test_empty_sales_is_zero_and_low() {
        let report = process(&table(&[["101", "2024-01-01", ""]])).unwrap();

        assert_eq!(report.records[0].sales, 0.0);
        assert_eq!(report.records[0].category, SalesCategory::Low);
        assert!(report.cleaning.issues.is_empty());
        assert_eq!(report.cleaning.missing_before[2], ("Sales".to_string(), 1));
        assert_eq!(report.cleaning.missing_after[2], ("Sales".to_string(), 0));
    }

    #[test]
    fn test_duplicate_counted_once() {
        let report = process(&table(&[
            ["101", "2024-01-01", "100"],
            ["101", "2024-01-01", "100"],
        ]))
        .unwrap();

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.store_totals[0].total_sales, 100.0);
        assert_eq!(report.cleaning.duplicates_removed, 1);
        assert_eq!(report.cleaning.rows_read, 2);
        assert_eq!(report.cleaning.rows_kept, 1);
    }

    #[test]
    fn test_bad_values_degrade_and_are_reported() {
        let report = process(&table(&[
            ["101", "someday", "250"],
            ["101", "2024-01-01", "lots"],
        ]))
        .unwrap();

        assert_eq!(report.records.len(), 2);
        // valid date first, unparseable last
        assert_eq!(report.records[0].raw_date, "2024-01-01");
        assert_eq!(report.records[0].sales, 0.0);
        assert_eq!(report.records[1].date, None);
        assert_eq!(report.records[1].month, None);
        assert_eq!(report.records[1].cumulative_sales, 250.0);

        assert_eq!(report.cleaning.unparseable_dates(), 1);
        assert_eq!(report.cleaning.unparseable_numbers(), 1);
        // issues ordered by source line
        assert_eq!(report.cleaning.issues[0].line(), 2);
        assert_eq!(report.cleaning.missing_after[1], ("Date".to_string(), 1));
    }

    #[test]
    fn test_extra_columns() {
        let mut raw = RawTable::new(vec![
            "Region".into(),
            "StoreID".into(),
            "Date".into(),
            "Sales".into(),
            "Promo".into(),
        ]);
        raw.push_row(["North", "101", "2024-01-01", "10", ""]);
        let report = process(&raw).unwrap();

        assert_eq!(report.extra_columns(), vec!["Region", "Promo"]);
        assert_eq!(report.records[0].extra, vec!["North", ""]);
        assert_eq!(report.cleaning.missing_after[4], ("Promo".to_string(), 1));
    }

    #[test]
    fn test_empty_table() {
        let report = process(&table(&[])).unwrap();

        assert!(report.records.is_empty());
        assert!(report.store_totals.is_empty());
        assert!(report.weekday_averages.is_empty());
        assert!(report.top_stores.is_empty());
        assert_eq!(report.total_sales(), 0.0);
    }
}
