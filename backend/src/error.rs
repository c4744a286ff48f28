//! Error types for the retail sales pipeline.
//!
//! - [`CsvError`] - CSV reading and decoding errors
//! - [`AnalysisError`] - fatal errors raised by the table processor
//! - [`RowIssue`] - non-fatal, per-row problems recorded while cleaning
//! - [`ExportError`] - errors while writing output artifacts
//! - [`PipelineError`] - read → process → export orchestration errors
//! - [`ServerError`] - HTTP-facing errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// CSV Reading Errors
// =============================================================================

/// Errors while reading a CSV document.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode the raw bytes.
    #[error("Failed to decode content: {0}")]
    Encoding(String),

    /// Malformed CSV.
    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        let line = err
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(0);
        CsvError::Parse {
            line,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Analysis Errors
// =============================================================================

/// Fatal errors raised by the sales table processor.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    /// One or more required columns are absent from the header.
    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingColumn(Vec<String>),
}

/// A non-fatal problem with a single input row.
///
/// The row is kept; the offending value degrades to a sentinel (`None` date)
/// or to zero (sales).
#[derive(Debug, Error, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RowIssue {
    #[error("Line {line}: unparseable date '{value}'")]
    UnparseableDate { line: usize, value: String },

    #[error("Line {line}: unparseable sales value '{value}', using 0")]
    UnparseableNumber { line: usize, value: String },
}

impl RowIssue {
    /// Source line of the offending row (1-based, header is line 1).
    pub fn line(&self) -> usize {
        match self {
            RowIssue::UnparseableDate { line, .. } | RowIssue::UnparseableNumber { line, .. } => {
                *line
            }
        }
    }
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while writing output artifacts.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Export IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV writer error: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level errors for the read → process → export flow.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV reading.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for the table processor.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Result type for exports.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let csv_err = CsvError::EmptyFile;
        let pipeline_err: PipelineError = csv_err.into();
        assert!(pipeline_err.to_string().contains("empty"));

        let analysis_err = AnalysisError::MissingColumn(vec!["Sales".into()]);
        let pipeline_err: PipelineError = analysis_err.into();
        assert!(pipeline_err.to_string().contains("Sales"));

        let server_err: ServerError = pipeline_err.into();
        assert!(server_err.to_string().starts_with("Pipeline error"));
    }

    #[test]
    fn test_missing_column_lists_all_names() {
        let err = AnalysisError::MissingColumn(vec!["Date".into(), "Sales".into()]);
        assert_eq!(err.to_string(), "Missing required column(s): Date, Sales");
    }

    #[test]
    fn test_row_issue_format() {
        let issue = RowIssue::UnparseableDate {
            line: 7,
            value: "not-a-date".into(),
        };
        assert_eq!(issue.line(), 7);
        let msg = issue.to_string();
        assert!(msg.contains("Line 7"));
        assert!(msg.contains("not-a-date"));
    }

    #[test]
    fn test_row_issue_serializes_with_kind_tag() {
        let issue = RowIssue::UnparseableNumber {
            line: 3,
            value: "abc".into(),
        };
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["kind"], "unparseableNumber");
        assert_eq!(json["line"], 3);
    }
}
