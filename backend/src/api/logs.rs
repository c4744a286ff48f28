//! Pipeline log streaming via Server-Sent Events (SSE).
//!
//! Log entries go to a broadcast channel that SSE clients subscribe to, and
//! are echoed through `tracing`. Entries emitted while handling an upload
//! carry that upload's job id.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Log level for frontend display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Upload the entry belongs to (none for CLI runs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            job_id: None,
        }
    }

    pub fn with_job(mut self, job_id: Option<&str>) -> Self {
        self.job_id = job_id.map(str::to_string);
        self
    }
}

/// Global log broadcaster
pub static LOG_BROADCASTER: Lazy<LogBroadcaster> = Lazy::new(LogBroadcaster::new);

/// Broadcasts log entries to all connected SSE clients
pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEntry>,
}

impl LogBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Send a log entry to all subscribers
    pub fn log(&self, entry: LogEntry) {
        let job = entry.job_id.as_deref().unwrap_or("-");
        match entry.level {
            LogLevel::Info => tracing::info!(job, "{}", entry.message),
            LogLevel::Success => tracing::info!(job, "✓ {}", entry.message),
            LogLevel::Warning => tracing::warn!(job, "{}", entry.message),
            LogLevel::Error => tracing::error!(job, "{}", entry.message),
        }

        // no receivers is fine
        let _ = self.sender.send(entry);
    }

    /// Get a receiver for SSE streaming
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for LogBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Logger handle scoped to one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct JobLogger {
    job_id: Option<String>,
}

impl JobLogger {
    pub fn for_job(job_id: impl Into<String>) -> Self {
        Self {
            job_id: Some(job_id.into()),
        }
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    fn emit(&self, level: LogLevel, msg: impl Into<String>) {
        LOG_BROADCASTER.log(LogEntry::new(level, msg).with_job(self.job_id()));
    }

    pub fn info(&self, msg: impl Into<String>) {
        self.emit(LogLevel::Info, msg);
    }

    pub fn success(&self, msg: impl Into<String>) {
        self.emit(LogLevel::Success, msg);
    }

    pub fn warning(&self, msg: impl Into<String>) {
        self.emit(LogLevel::Warning, msg);
    }

    pub fn error(&self, msg: impl Into<String>) {
        self.emit(LogLevel::Error, msg);
    }
}
