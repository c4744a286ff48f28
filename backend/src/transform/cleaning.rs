//! Cleaning stages: null handling, deduplication, date parsing and sorting.
//!
//! Each stage consumes the previous stage's rows; the order is fixed by
//! [`crate::transform::processor::process`].

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::error::RowIssue;
use crate::models::{RawRecord, StoreId};

/// Date-only formats tried in order. Month-first wins for ambiguous `a/b/YYYY`.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%b %d %Y",
];

/// Date-time formats; the time of day is discarded.
/// `%.f` also matches when there is no fractional part.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

/// A row after null handling: typed sales, everything else still raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRow {
    pub line: usize,
    pub store_id: StoreId,
    pub raw_date: String,
    pub sales: f64,
    pub extra: Vec<String>,
}

/// A row with its parsed date (`None` when unparseable).
#[derive(Debug, Clone, PartialEq)]
pub struct DatedRow {
    pub row: CleanRow,
    pub date: Option<NaiveDate>,
}

/// Column positions of the required fields in a raw record.
///
/// When a required name repeats in the header, the first occurrence is the
/// required column and later ones are carried as extra columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnLayout {
    pub store_id: usize,
    pub date: usize,
    pub sales: usize,
}

impl ColumnLayout {
    pub fn is_required(&self, index: usize) -> bool {
        index == self.store_id || index == self.date || index == self.sales
    }
}

/// Outcome of reading a sales cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SalesValue {
    Present(f64),
    Missing,
    Unparseable,
}

/// Read a sales cell. Non-finite numbers (`inf`, `NaN`) are unparseable.
pub fn parse_sales(raw: &str) -> SalesValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return SalesValue::Missing;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => SalesValue::Present(v),
        _ => SalesValue::Unparseable,
    }
}

/// Stage 1: replace missing sales with 0.
///
/// Present-but-unparseable sales also become 0 and are reported.
pub fn fill_missing_sales(
    records: &[RawRecord],
    layout: ColumnLayout,
    issues: &mut Vec<RowIssue>,
) -> Vec<CleanRow> {
    records
        .iter()
        .map(|record| {
            let field = |i: usize| record.fields.get(i).cloned().unwrap_or_default();
            let raw_sales = field(layout.sales);

            let sales = match parse_sales(&raw_sales) {
                SalesValue::Present(v) => v,
                SalesValue::Missing => 0.0,
                SalesValue::Unparseable => {
                    issues.push(RowIssue::UnparseableNumber {
                        line: record.line,
                        value: raw_sales.clone(),
                    });
                    0.0
                }
            };

            let extra = record
                .fields
                .iter()
                .enumerate()
                .filter(|(i, _)| !layout.is_required(*i))
                .map(|(_, v)| v.clone())
                .collect();

            CleanRow {
                line: record.line,
                store_id: StoreId::new(field(layout.store_id)),
                raw_date: field(layout.date),
                sales,
                extra,
            }
        })
        .collect()
}

/// Equality key over every field; sales compare by numeric value.
fn dedup_key(row: &CleanRow) -> (String, String, u64, Vec<String>) {
    // -0.0 and 0.0 must collide
    let sales_bits = (row.sales + 0.0).to_bits();
    (
        row.store_id.0.clone(),
        row.raw_date.clone(),
        sales_bits,
        row.extra.clone(),
    )
}

/// Stage 2: drop rows identical to an earlier row. First occurrence wins.
pub fn deduplicate(rows: Vec<CleanRow>) -> Vec<CleanRow> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| seen.insert(dedup_key(row)))
        .collect()
}

/// Parse a calendar date in any of the accepted formats.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// Stage 3: parse dates. Failures become `None` and are reported.
pub fn parse_dates(rows: Vec<CleanRow>, issues: &mut Vec<RowIssue>) -> Vec<DatedRow> {
    rows.into_iter()
        .map(|row| {
            let date = parse_date(&row.raw_date);
            if date.is_none() {
                issues.push(RowIssue::UnparseableDate {
                    line: row.line,
                    value: row.raw_date.clone(),
                });
            }
            DatedRow { row, date }
        })
        .collect()
}

/// Stage 4: stable sort by date, unparseable dates last.
pub fn sort_by_date(mut rows: Vec<DatedRow>) -> Vec<DatedRow> {
    rows.sort_by(|a, b| match (a.date, b.date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    rows
}
