//! Runtime configuration.
//!
//! Values come from the environment (a `.env` file is loaded first by the
//! binary) and fall back to the defaults below.
//!
//! | Variable                      | Default     |
//! |-------------------------------|-------------|
//! | `RETAIL_SALES_PORT`           | `3000`      |
//! | `RETAIL_SALES_UPLOAD_DIR`     | `uploads`   |
//! | `RETAIL_SALES_PROCESSED_DIR`  | `processed` |
//! | `RETAIL_SALES_MAX_UPLOAD_MB`  | `50`        |

use std::path::PathBuf;

/// Input file read by `analyze` when none is given.
pub const DEFAULT_INPUT_FILE: &str = "retail_sales.csv";

/// Store shown in the per-store highlight when none is given.
pub const DEFAULT_HIGHLIGHT_STORE: &str = "101";

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_PROCESSED_DIR: &str = "processed";

/// 50 MB limit.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Server settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub port: u16,
    /// Uploaded files land in `<upload_dir>/<job_id>/`.
    pub upload_dir: PathBuf,
    /// Artifacts land in `<processed_dir>/<job_id>/`.
    pub processed_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            processed_dir: PathBuf::from(DEFAULT_PROCESSED_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; unparseable values keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = lookup("RETAIL_SALES_PORT")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.port);
        let upload_dir = lookup("RETAIL_SALES_UPLOAD_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.upload_dir);
        let processed_dir = lookup("RETAIL_SALES_PROCESSED_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.processed_dir);
        let max_upload_bytes = lookup("RETAIL_SALES_MAX_UPLOAD_MB")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .map(|mb| mb * 1024 * 1024)
            .unwrap_or(defaults.max_upload_bytes);

        Self {
            port,
            upload_dir,
            processed_dir,
            max_upload_bytes,
        }
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        self
    }
}
