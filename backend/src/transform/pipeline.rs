//! High-level pipeline API: read CSV → process → (optionally) export.
//!
//! # Example
//!
//! ```rust,ignore
//! use retail_sales::{analyze_file, JobLogger};
//! use std::path::Path;
//!
//! let outcome = analyze_file(Path::new("retail_sales.csv"), &JobLogger::default())?;
//! println!("{} stores", outcome.report.store_totals.len());
//! ```

use serde::Serialize;
use std::path::Path;

use crate::api::logs::JobLogger;
use crate::error::PipelineResult;
use crate::export::{export_to_dir, ExportedFiles};
use crate::parser::{parse_bytes_auto, parse_csv_file_auto, ParseResult};
use crate::transform::processor::{process, SalesReport};

/// How many row issues are logged individually before summarising.
const MAX_LOGGED_ISSUES: usize = 5;

/// CSV file information
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Result of analysing one CSV document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub csv_info: CsvInfo,
    pub report: SalesReport,
}

/// Analyse a CSV file.
pub fn analyze_file(path: &Path, log: &JobLogger) -> PipelineResult<AnalysisOutcome> {
    log.info(format!("📖 Reading {}", path.display()));
    let parsed = parse_csv_file_auto(path)?;
    analyze_parsed(parsed, log)
}

/// Analyse CSV bytes (e.g. an upload).
pub fn analyze_bytes(bytes: &[u8], log: &JobLogger) -> PipelineResult<AnalysisOutcome> {
    log.info(format!("📖 Reading upload ({} bytes)", bytes.len()));
    let parsed = parse_bytes_auto(bytes)?;
    analyze_parsed(parsed, log)
}

/// Analyse CSV bytes and write the three artifacts into `out_dir`.
pub fn analyze_and_export(
    bytes: &[u8],
    out_dir: &Path,
    log: &JobLogger,
) -> PipelineResult<(AnalysisOutcome, ExportedFiles)> {
    let outcome = analyze_bytes(bytes, log)?;
    let files = export_report(&outcome.report, out_dir, log)?;
    Ok((outcome, files))
}

/// Write the artifacts of an existing report.
pub fn export_report(
    report: &SalesReport,
    out_dir: &Path,
    log: &JobLogger,
) -> PipelineResult<ExportedFiles> {
    log.info(format!("💾 Exporting to {}", out_dir.display()));
    let files = export_to_dir(report, out_dir)?;
    for path in files.paths() {
        log.success(format!("Wrote {}", path.display()));
    }
    Ok(files)
}

/// Process an already parsed CSV document.
pub fn analyze_parsed(parsed: ParseResult, log: &JobLogger) -> PipelineResult<AnalysisOutcome> {
    log.success(format!("Detected encoding: {}", parsed.encoding));
    log.success(format!(
        "Detected separator: '{}'",
        format_delimiter(parsed.delimiter)
    ));
    let (rows, cols) = parsed.table.shape();
    log.success(format!("Read {} rows × {} columns", rows, cols));

    let csv_info = CsvInfo {
        encoding: parsed.encoding,
        delimiter: parsed.delimiter,
        headers: parsed.table.headers.clone(),
        row_count: rows,
    };

    log.info("🧹 Cleaning and aggregating...");
    let report = match process(&parsed.table) {
        Ok(report) => report,
        Err(e) => {
            log.error(e.to_string());
            return Err(e.into());
        }
    };

    log_cleaning(&report, log);
    log.success(format!(
        "{} stores, {} weekdays, {} months",
        report.store_totals.len(),
        report.weekday_averages.len(),
        report.month_averages.len()
    ));

    Ok(AnalysisOutcome { csv_info, report })
}

fn log_cleaning(report: &SalesReport, log: &JobLogger) {
    let cleaning = &report.cleaning;
    if cleaning.duplicates_removed > 0 {
        log.info(format!("Removed {} duplicate rows", cleaning.duplicates_removed));
    }

    if cleaning.issues.is_empty() {
        log.success(format!("All {} rows clean", cleaning.rows_kept));
        return;
    }

    log.warning(format!(
        "{} unparseable dates, {} unparseable sales values",
        cleaning.unparseable_dates(),
        cleaning.unparseable_numbers()
    ));
    for issue in cleaning.issues.iter().take(MAX_LOGGED_ISSUES) {
        log.warning(format!("• {}", issue));
    }
    if cleaning.issues.len() > MAX_LOGGED_ISSUES {
        log.warning(format!(
            "... +{} more",
            cleaning.issues.len() - MAX_LOGGED_ISSUES
        ));
    }
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}
