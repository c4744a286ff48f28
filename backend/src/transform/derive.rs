//! Derived columns: Weekday, Month, CumulativeSales, SalesCategory.

use chrono::Datelike;
use std::collections::HashMap;

use super::cleaning::DatedRow;
use crate::models::{SalesCategory, SalesRecord, StoreId};

/// Stages 5–8 over date-sorted rows.
///
/// Cumulative sales run per store in the given row order, inclusive of the
/// current row.
pub fn derive_columns(rows: Vec<DatedRow>) -> Vec<SalesRecord> {
    let mut running: HashMap<StoreId, f64> = HashMap::new();

    rows.into_iter()
        .map(|DatedRow { row, date }| {
            let cumulative = running.entry(row.store_id.clone()).or_insert(0.0);
            *cumulative += row.sales;

            SalesRecord {
                line: row.line,
                weekday: date.map(|d| d.weekday()),
                month: date.map(|d| d.month()),
                cumulative_sales: *cumulative,
                category: SalesCategory::classify(row.sales),
                store_id: row.store_id,
                date,
                raw_date: row.raw_date,
                sales: row.sales,
                extra: row.extra,
            }
        })
        .collect()
}
