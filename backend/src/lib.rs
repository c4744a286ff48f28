//! # Retail Sales - store sales cleaning, enrichment and aggregation
//!
//! Reads a retail sales CSV (`StoreID`, `Date`, `Sales`, ...), cleans it,
//! derives per-row columns and produces per-store, per-weekday and per-month
//! summaries, written back out as CSV.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Processor  │────▶│  CSV files  │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (clean/agg) │     │  (3 tables) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use retail_sales::{analyze_file, export_report, JobLogger};
//! use std::path::Path;
//!
//! let log = JobLogger::default();
//! let outcome = analyze_file(Path::new("retail_sales.csv"), &log)?;
//! export_report(&outcome.report, Path::new("."), &log)?;
//! println!("Top store: {}", outcome.report.top_stores[0].store_id);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (RawTable, SalesRecord, StoreId)
//! - [`config`] - Environment-driven settings
//! - [`parser`] - CSV parsing with auto-detection
//! - [`transform`] - Cleaning, derivation, aggregation and pipeline
//! - [`export`] - CSV artifacts
//! - [`farm`] - Farm revenue estimate
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Output
pub mod export;

// Farm revenue
pub mod farm;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AnalysisError,
    CsvError,
    ExportError,
    PipelineError,
    RowIssue,
    ServerError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    RawRecord,
    RawTable,
    SalesCategory,
    SalesRecord,
    StoreId,
    StoreTotal,
    WeekdayAverage,
    MonthAverage,
};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    parse_str,
    parse_csv_file,
    parse_csv_file_auto,
    parse_bytes_auto,
    detect_encoding,
    detect_delimiter,
    decode_content,
    table_to_json,
    ParseResult,
};

// =============================================================================
// Re-exports - Processor
// =============================================================================

pub use transform::{process, CleaningReport, SalesReport};

pub use transform::highlights::{rows_above, rows_for_store, weekend_rows_above};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    analyze_file,
    analyze_bytes,
    analyze_and_export,
    analyze_parsed,
    export_report,
    format_delimiter,
    AnalysisOutcome,
    CsvInfo,
};

// =============================================================================
// Re-exports - Export
// =============================================================================

pub use export::{export_to_dir, ExportedFiles, OUTPUT_FILES};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::logs::JobLogger;
pub use api::types::{
    UploadResponse,
    ResponseMetadata,
    CsvMetadata,
    CleaningStats,
    DownloadLink,
    error_response,
};

pub use config::Settings;

// Server
pub mod server {
    pub use crate::api::server::{build_router, start_server};
}
