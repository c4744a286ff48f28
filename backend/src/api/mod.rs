//! HTTP API module.
//!
//! This module provides the HTTP server, the HTML views and the JSON
//! response types for the retail sales backend.

pub mod logs;
pub mod server;
pub mod types;
pub mod views;

pub use logs::*;
pub use server::start_server;
pub use types::*;
