//! Failure log sink: one line per failed fetch/transform, with enough
//! detail (URL, status or error text) to replay the batch later.
//!
//! The sink is an explicit handle injected into the fetcher rather than a
//! process-wide logging singleton, so tests can use an in-memory sink.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Level prefix for recorded failure lines, matching `<LEVEL>:<message>`.
const FAILURE_LEVEL: &str = "WARNING";

/// Append-only sink for fetch/transform failures. Must be safe for
/// concurrent writes from pool tasks.
pub trait FailureLog: Send + Sync {
    fn record(&self, message: &str);
}

/// File-backed failure log. Lines are written as `WARNING:{message}`.
pub struct FileFailureLog {
    file: Mutex<File>,
}

impl FileFailureLog {
    /// Open (or create) the log file in append mode.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl FailureLog for FileFailureLog {
    fn record(&self, message: &str) {
        let mut file = match self.file.lock() {
            Ok(file) => file,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(file, "{}:{}", FAILURE_LEVEL, message) {
            tracing::error!(error = %e, "Failed to append to failure log");
        }
    }
}

/// In-memory failure log for tests.
#[derive(Default)]
pub struct MemoryFailureLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryFailureLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl FailureLog for MemoryFailureLog {
    fn record(&self, message: &str) {
        self.lines
            .lock()
            .unwrap()
            .push(format!("{}:{}", FAILURE_LEVEL, message));
    }
}

/// Extract the failed image URLs from failure log content, one per line
/// that contains an `https:...jpg` URL. Used by the log-replay tool.
pub fn extract_failed_urls(log_content: &str) -> Vec<String> {
    log_content
        .lines()
        .filter_map(|line| {
            let start = line.find("https:")?;
            let end = line.rfind(".jpg")? + ".jpg".len();
            (end > start).then(|| line[start..end].to_string())
        })
        .collect()
}
