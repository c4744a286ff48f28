//! REST API types for the JSON upload endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::RowIssue;
use crate::export::OUTPUT_FILES;
use crate::models::{MonthAverage, StoreTotal, WeekdayAverage};
use crate::transform::pipeline::AnalysisOutcome;

/// Row issues included in a response; the rest are only counted.
const MAX_REPORTED_ISSUES: usize = 10;

/// Response sent after a CSV upload has been analysed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Unique job identifier
    pub job_id: String,

    /// Status: "ready" when every row was clean, "warning" otherwise
    pub status: String,

    pub store_totals: Vec<StoreTotal>,
    pub weekday_averages: Vec<WeekdayAverage>,
    pub top_stores: Vec<StoreTotal>,
    pub month_averages: Vec<MonthAverage>,

    /// Artifacts available for download
    pub downloads: Vec<DownloadLink>,

    pub metadata: ResponseMetadata,
}

/// A downloadable artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadLink {
    pub name: String,
    pub url: String,
}

/// Metadata about the analysis
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub file_name: Option<String>,
    pub csv_info: CsvMetadata,
    pub cleaning: CleaningStats,
}

/// CSV file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvMetadata {
    pub encoding: String,
    pub delimiter: String,
    pub row_count: usize,
    pub columns: Vec<String>,
}

/// Cleaning statistics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningStats {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub duplicates_removed: usize,
    pub unparseable_dates: usize,
    pub unparseable_numbers: usize,
    pub issues: Vec<RowIssue>,
}

/// URL of one artifact of a job.
pub fn download_url(job_id: &str, file_name: &str) -> String {
    format!("/download/{}/{}", job_id, file_name)
}

/// Download links for every artifact of a job.
pub fn download_links(job_id: &str) -> Vec<DownloadLink> {
    OUTPUT_FILES
        .iter()
        .map(|name| DownloadLink {
            name: name.to_string(),
            url: download_url(job_id, name),
        })
        .collect()
}

impl UploadResponse {
    pub fn new(job_id: &str, file_name: Option<String>, outcome: AnalysisOutcome) -> Self {
        let AnalysisOutcome { csv_info, report } = outcome;
        let cleaning = report.cleaning;

        UploadResponse {
            job_id: job_id.to_string(),
            status: if cleaning.issues.is_empty() { "ready" } else { "warning" }.to_string(),
            store_totals: report.store_totals,
            weekday_averages: report.weekday_averages,
            top_stores: report.top_stores,
            month_averages: report.month_averages,
            downloads: download_links(job_id),
            metadata: ResponseMetadata {
                file_name,
                csv_info: CsvMetadata {
                    encoding: csv_info.encoding,
                    delimiter: csv_info.delimiter.to_string(),
                    row_count: csv_info.row_count,
                    columns: csv_info.headers,
                },
                cleaning: CleaningStats {
                    rows_read: cleaning.rows_read,
                    rows_kept: cleaning.rows_kept,
                    duplicates_removed: cleaning.duplicates_removed,
                    unparseable_dates: cleaning.unparseable_dates(),
                    unparseable_numbers: cleaning.unparseable_numbers(),
                    issues: cleaning
                        .issues
                        .into_iter()
                        .take(MAX_REPORTED_ISSUES)
                        .collect(),
                },
            },
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": null,
        "status": "error",
        "error": error,
        "storeTotals": [],
        "weekdayAverages": [],
        "topStores": [],
        "downloads": []
    })
}
