//! CSV export of a [`SalesReport`].
//!
//! Three artifacts with fixed names:
//!
//! | File                        | Columns                                        |
//! |-----------------------------|------------------------------------------------|
//! | `cleaned_retail_sales.csv`  | Date, input columns, then the derived columns  |
//! | `store_sales_summary.csv`   | StoreID, TotalSales                            |
//! | `weekday_sales_summary.csv` | Weekday, AvgSalesPerDay                        |

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::ExportResult;
use crate::models::{SalesRecord, DATE_COLUMN};
use crate::transform::processor::SalesReport;

pub const CLEANED_FILE: &str = "cleaned_retail_sales.csv";
pub const STORE_SUMMARY_FILE: &str = "store_sales_summary.csv";
pub const WEEKDAY_SUMMARY_FILE: &str = "weekday_sales_summary.csv";

/// Every artifact name, in the order they are written.
pub const OUTPUT_FILES: [&str; 3] = [CLEANED_FILE, STORE_SUMMARY_FILE, WEEKDAY_SUMMARY_FILE];

/// Derived columns appended to the cleaned table.
pub const DERIVED_COLUMNS: [&str; 4] = ["Weekday", "Month", "CumulativeSales", "SalesCategory"];

/// Paths of the artifacts written by [`export_to_dir`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFiles {
    pub cleaned: PathBuf,
    pub store_summary: PathBuf,
    pub weekday_summary: PathBuf,
}

impl ExportedFiles {
    pub fn paths(&self) -> [&Path; 3] {
        [&self.cleaned, &self.store_summary, &self.weekday_summary]
    }
}

/// Shortest decimal form that round-trips (`6000`, `2500.5`).
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}

/// Header of the cleaned table: Date first, then the other input columns in
/// input order, then the derived columns.
pub fn cleaned_header(report: &SalesReport) -> Vec<String> {
    let date = report.layout.date;
    std::iter::once(DATE_COLUMN.to_string())
        .chain(
            report
                .columns
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != date)
                .map(|(_, c)| c.clone()),
        )
        .chain(DERIVED_COLUMNS.iter().map(|c| c.to_string()))
        .collect()
}

/// One row of the cleaned table, laid out as [`cleaned_header`].
pub fn cleaned_row(report: &SalesReport, record: &SalesRecord) -> Vec<String> {
    let layout = report.layout;
    let mut row = Vec::with_capacity(report.columns.len() + DERIVED_COLUMNS.len());
    row.push(
        record
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
    );

    let mut extra = record.extra.iter();
    for i in 0..report.columns.len() {
        if i == layout.date {
            continue;
        } else if i == layout.store_id {
            row.push(record.store_id.to_string());
        } else if i == layout.sales {
            row.push(format_number(record.sales));
        } else {
            row.push(extra.next().cloned().unwrap_or_default());
        }
    }

    row.push(record.weekday_name().unwrap_or_default().to_string());
    row.push(record.month.map(|m| m.to_string()).unwrap_or_default());
    row.push(format_number(record.cumulative_sales));
    row.push(record.category.to_string());
    row
}

/// Write the cleaned table with derived columns.
pub fn write_cleaned<W: Write>(report: &SalesReport, writer: W) -> ExportResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(cleaned_header(report))?;
    for record in &report.records {
        csv.write_record(cleaned_row(report, record))?;
    }
    csv.flush()?;
    Ok(())
}

/// Write `StoreID,TotalSales`.
pub fn write_store_summary<W: Write>(report: &SalesReport, writer: W) -> ExportResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["StoreID", "TotalSales"])?;
    for total in &report.store_totals {
        csv.write_record([total.store_id.to_string(), format_number(total.total_sales)])?;
    }
    csv.flush()?;
    Ok(())
}

/// Write `Weekday,AvgSalesPerDay`.
pub fn write_weekday_summary<W: Write>(report: &SalesReport, writer: W) -> ExportResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["Weekday", "AvgSalesPerDay"])?;
    for avg in &report.weekday_averages {
        csv.write_record([avg.weekday.clone(), format_number(avg.avg_sales_per_day)])?;
    }
    csv.flush()?;
    Ok(())
}

/// Write one artifact by file name into memory.
///
/// Returns `None` for names that are not one of [`OUTPUT_FILES`].
pub fn render_artifact(report: &SalesReport, name: &str) -> Option<ExportResult<Vec<u8>>> {
    let mut buf = Vec::new();
    let result = match name {
        CLEANED_FILE => write_cleaned(report, &mut buf),
        STORE_SUMMARY_FILE => write_store_summary(report, &mut buf),
        WEEKDAY_SUMMARY_FILE => write_weekday_summary(report, &mut buf),
        _ => return None,
    };
    Some(result.map(|_| buf))
}

/// Write all three artifacts into `dir`, creating it if needed.
pub fn export_to_dir(report: &SalesReport, dir: &Path) -> ExportResult<ExportedFiles> {
    fs::create_dir_all(dir)?;

    let files = ExportedFiles {
        cleaned: dir.join(CLEANED_FILE),
        store_summary: dir.join(STORE_SUMMARY_FILE),
        weekday_summary: dir.join(WEEKDAY_SUMMARY_FILE),
    };

    write_cleaned(report, BufWriter::new(File::create(&files.cleaned)?))?;
    write_store_summary(report, BufWriter::new(File::create(&files.store_summary)?))?;
    write_weekday_summary(report, BufWriter::new(File::create(&files.weekday_summary)?))?;

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawTable;
    use crate::transform::processor::process;

    fn report() -> SalesReport {
        let mut table = RawTable::new(vec![
            "StoreID".into(),
            "Date".into(),
            "Sales".into(),
            "Region".into(),
        ]);
        table.push_row(["101", "2024-01-02", "2000", "North"]);
        table.push_row(["101", "2024-01-01", "6000", "North"]);
        table.push_row(["102", "2024-01-01", "4000.5", "South"]);
        table.push_row(["103", "n/a", "", "East"]);
        process(&table).unwrap()
    }

    fn render(name: &str) -> String {
        let bytes = render_artifact(&report(), name).unwrap().unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(6000.0), "6000");
        assert_eq!(format_number(2500.5), "2500.5");
        assert_eq!(format_number(0.0), "0");
    }

    #[test]
    fn test_cleaned_layout() {
        let text = render(CLEANED_FILE);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Date,StoreID,Sales,Region,Weekday,Month,CumulativeSales,SalesCategory"
        );
        assert_eq!(lines[1], "2024-01-01,101,6000,North,Monday,1,6000,High");
        assert_eq!(lines[2], "2024-01-01,102,4000.5,South,Monday,1,4000.5,Medium");
        assert_eq!(lines[3], "2024-01-02,101,2000,North,Tuesday,1,8000,Low");
        assert_eq!(lines[4], ",103,0,East,,,0,Low");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_repeated_required_header_is_carried_verbatim() {
        let mut table = RawTable::new(vec![
            "StoreID".into(),
            "Date".into(),
            "Sales".into(),
            "Sales".into(),
        ]);
        table.push_row(["101", "2024-01-01", "10", "99"]);
        let report = process(&table).unwrap();

        assert_eq!(report.extra_columns(), vec!["Sales"]);
        assert_eq!(
            cleaned_header(&report),
            vec![
                "Date",
                "StoreID",
                "Sales",
                "Sales",
                "Weekday",
                "Month",
                "CumulativeSales",
                "SalesCategory"
            ]
        );
        assert_eq!(
            cleaned_row(&report, &report.records[0]),
            vec!["2024-01-01", "101", "10", "99", "Monday", "1", "10", "Low"]
        );
        assert_eq!(report.store_totals[0].total_sales, 10.0);
    }

    #[test]
    fn test_store_summary() {
        assert_eq!(
            render(STORE_SUMMARY_FILE),
            "StoreID,TotalSales\n101,8000\n102,4000.5\n103,0\n"
        );
    }

    #[test]
    fn test_weekday_summary() {
        assert_eq!(
            render(WEEKDAY_SUMMARY_FILE),
            "Weekday,AvgSalesPerDay\nMonday,5000.25\nTuesday,2000\n"
        );
    }

    #[test]
    fn test_unknown_artifact() {
        assert!(render_artifact(&report(), "../secrets.csv").is_none());
    }

    #[test]
    fn test_export_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");
        let files = export_to_dir(&report(), &out).unwrap();

        for path in files.paths() {
            assert!(path.exists(), "{} missing", path.display());
        }
        let summary = std::fs::read_to_string(&files.store_summary).unwrap();
        assert!(summary.starts_with("StoreID,TotalSales"));
    }
}
