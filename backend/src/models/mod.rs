//! Domain models for the retail sales pipeline.
//!
//! - [`RawTable`] / [`RawRecord`] - header plus string records, as read from CSV
//! - [`StoreId`] - store identifier with numeric-aware ordering
//! - [`SalesCategory`] - High / Medium / Low classification of a sales amount
//! - [`SalesRecord`] - one cleaned row with its derived columns
//! - [`StoreTotal`], [`WeekdayAverage`], [`MonthAverage`] - aggregates

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Column holding the store identifier.
pub const STORE_ID_COLUMN: &str = "StoreID";
/// Column holding the transaction date.
pub const DATE_COLUMN: &str = "Date";
/// Column holding the sales amount.
pub const SALES_COLUMN: &str = "Sales";

/// Columns every input table must provide.
pub const REQUIRED_COLUMNS: [&str; 3] = [STORE_ID_COLUMN, DATE_COLUMN, SALES_COLUMN];

// =============================================================================
// Raw input
// =============================================================================

/// One data record as read from the source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// 1-based line in the source file (the header is line 1).
    pub line: usize,
    /// Field values, aligned with [`RawTable::headers`].
    pub fields: Vec<String>,
}

/// A header row plus string records, before any cleaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            records: Vec::new(),
        }
    }

    /// Append a record, numbering it after the previous one.
    ///
    /// Short records are padded with empty fields.
    pub fn push_row<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let line = self.records.last().map(|r| r.line + 1).unwrap_or(2);
        let mut fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.len() < self.headers.len() {
            fields.resize(self.headers.len(), String::new());
        }
        self.records.push(RawRecord { line, fields });
    }

    /// Position of a column in the header.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.records.len(), self.headers.len())
    }

    /// Number of empty cells per column, in header order.
    pub fn missing_counts(&self) -> Vec<(String, usize)> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let missing = self
                    .records
                    .iter()
                    .filter(|r| r.fields.get(i).map_or(true, |v| v.trim().is_empty()))
                    .count();
                (header.clone(), missing)
            })
            .collect()
    }
}

// =============================================================================
// Store identifier
// =============================================================================

/// Identifier grouping rows of the same retail location.
///
/// Ordering is numeric when both identifiers are integers (`99 < 101`),
/// textual otherwise. Integer identifiers sort before textual ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(pub String);

impl StoreId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for StoreId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.parse::<i64>(), other.0.parse::<i64>()) {
            (Ok(a), Ok(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for StoreId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StoreId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// =============================================================================
// Sales category
// =============================================================================

/// Threshold at or above which a sale is [`SalesCategory::High`].
pub const HIGH_SALES_THRESHOLD: f64 = 5000.0;
/// Threshold at or above which a sale is at least [`SalesCategory::Medium`].
pub const MEDIUM_SALES_THRESHOLD: f64 = 3000.0;

/// Magnitude bucket of a single sales amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SalesCategory {
    High,
    Medium,
    Low,
}

impl SalesCategory {
    /// `High` for `s >= 5000`, `Medium` for `3000 <= s < 5000`, `Low` otherwise.
    pub fn classify(sales: f64) -> Self {
        if sales >= HIGH_SALES_THRESHOLD {
            SalesCategory::High
        } else if sales >= MEDIUM_SALES_THRESHOLD {
            SalesCategory::Medium
        } else {
            SalesCategory::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SalesCategory::High => "High",
            SalesCategory::Medium => "Medium",
            SalesCategory::Low => "Low",
        }
    }
}

impl fmt::Display for SalesCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Cleaned rows
// =============================================================================

/// English name of a weekday ("Monday").
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn serialize_weekday<S: Serializer>(day: &Option<Weekday>, s: S) -> Result<S::Ok, S::Error> {
    match day {
        Some(d) => s.serialize_some(weekday_name(*d)),
        None => s.serialize_none(),
    }
}

/// A cleaned input row with its derived columns.
///
/// `date`, `weekday` and `month` are `None` when the source date could not be
/// parsed; `raw_date` keeps the original text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRecord {
    pub line: usize,
    pub store_id: StoreId,
    pub date: Option<NaiveDate>,
    pub raw_date: String,
    pub sales: f64,
    /// Values of the non-required input columns, in input order.
    pub extra: Vec<String>,
    #[serde(serialize_with = "serialize_weekday")]
    pub weekday: Option<Weekday>,
    pub month: Option<u32>,
    pub cumulative_sales: f64,
    pub category: SalesCategory,
}

impl SalesRecord {
    pub fn weekday_name(&self) -> Option<&'static str> {
        self.weekday.map(weekday_name)
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self.weekday, Some(Weekday::Sat) | Some(Weekday::Sun))
    }
}

// =============================================================================
// Aggregates
// =============================================================================

/// Total sales of one store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreTotal {
    pub store_id: StoreId,
    pub total_sales: f64,
}

/// Mean sales of all rows falling on one weekday.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayAverage {
    pub weekday: String,
    pub avg_sales_per_day: f64,
}

/// Mean sales of all rows falling in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthAverage {
    pub month: u32,
    pub avg_daily_sales: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_boundaries() {
        assert_eq!(SalesCategory::classify(5000.0), SalesCategory::High);
        assert_eq!(SalesCategory::classify(4999.5), SalesCategory::Medium);
        assert_eq!(SalesCategory::classify(3000.0), SalesCategory::Medium);
        assert_eq!(SalesCategory::classify(2999.99), SalesCategory::Low);
        assert_eq!(SalesCategory::classify(0.0), SalesCategory::Low);
        assert_eq!(SalesCategory::classify(-10.0), SalesCategory::Low);
    }

    #[test]
    fn test_store_id_numeric_ordering() {
        let mut ids: Vec<StoreId> = ["101", "99", "B2", "A1", "7"]
            .into_iter()
            .map(StoreId::from)
            .collect();
        ids.sort();
        let ordered: Vec<&str> = ids.iter().map(|s| s.as_str()).collect();
        assert_eq!(ordered, vec!["7", "99", "101", "A1", "B2"]);
    }

    #[test]
    fn test_store_id_equal_only_when_text_equal() {
        assert_ne!(StoreId::from("007").cmp(&StoreId::from("7")), Ordering::Equal);
        assert_eq!(StoreId::from("7").cmp(&StoreId::from("7")), Ordering::Equal);
    }

    #[test]
    fn test_push_row_pads_and_numbers_lines() {
        let mut table = RawTable::new(vec!["a".into(), "b".into()]);
        table.push_row(["1"]);
        table.push_row(["2", "3"]);

        assert_eq!(table.records[0].line, 2);
        assert_eq!(table.records[0].fields, vec!["1", ""]);
        assert_eq!(table.records[1].line, 3);
        assert_eq!(table.shape(), (2, 2));
    }

    #[test]
    fn test_missing_counts() {
        let mut table = RawTable::new(vec!["a".into(), "b".into()]);
        table.push_row(["1", ""]);
        table.push_row(["", " "]);
        assert_eq!(
            table.missing_counts(),
            vec![("a".to_string(), 1), ("b".to_string(), 2)]
        );
    }

    #[test]
    fn test_weekday_serializes_as_name() {
        let record = SalesRecord {
            line: 2,
            store_id: StoreId::from("101"),
            date: NaiveDate::from_ymd_opt(2024, 1, 1),
            raw_date: "2024-01-01".into(),
            sales: 10.0,
            extra: vec![],
            weekday: Some(Weekday::Mon),
            month: Some(1),
            cumulative_sales: 10.0,
            category: SalesCategory::Low,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["weekday"], "Monday");
        assert_eq!(json["storeId"], "101");
        assert_eq!(json["category"], "Low");
        assert!(record.weekday_name() == Some("Monday"));
        assert!(!record.is_weekend());
    }
}
