//! Exploratory filters printed alongside the report.

use crate::models::{SalesRecord, StoreId};

/// Sales strictly above this count as a strong day.
pub const STRONG_DAY_THRESHOLD: f64 = 5000.0;
/// Weekend sales strictly above this count as a strong weekend day.
pub const STRONG_WEEKEND_THRESHOLD: f64 = 4000.0;

/// Rows belonging to one store, in table order.
pub fn rows_for_store<'a>(records: &'a [SalesRecord], store: &StoreId) -> Vec<&'a SalesRecord> {
    records.iter().filter(|r| &r.store_id == store).collect()
}

/// Rows with sales strictly greater than `threshold`.
pub fn rows_above(records: &[SalesRecord], threshold: f64) -> Vec<&SalesRecord> {
    records.iter().filter(|r| r.sales > threshold).collect()
}

/// Saturday/Sunday rows with sales strictly greater than `threshold`.
pub fn weekend_rows_above(records: &[SalesRecord], threshold: f64) -> Vec<&SalesRecord> {
    records
        .iter()
        .filter(|r| r.is_weekend() && r.sales > threshold)
        .collect()
}
