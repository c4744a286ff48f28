//! Sales table transformation.
//!
//! - Cleaning: null handling, dedup, date parsing, sort
//! - Derive: Weekday, Month, CumulativeSales, SalesCategory
//! - Aggregate: store totals, weekday/month averages, top stores
//! - Highlights: exploratory row filters
//! - Processor: the staged, pure `process` function
//! - Pipeline: read → process → export with logging

pub mod aggregate;
pub mod cleaning;
pub mod derive;
pub mod highlights;
pub mod pipeline;
pub mod processor;

pub use pipeline::*;
pub use processor::{process, CleaningReport, SalesReport};
