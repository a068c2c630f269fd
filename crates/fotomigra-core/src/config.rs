//! Run configuration for a migration.
//!
//! The CLI builds this from flags; library crates receive the pieces they
//! need rather than reading process-wide state.

use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_LOG_FILENAME, DEFAULT_N_TRIES, DEFAULT_THREADS, DEFAULT_TIMEOUT_SECS,
};

/// Configuration for one migration run.
#[derive(Clone, Debug)]
pub struct MigrationConfig {
    /// Bucket holding the images to migrate.
    pub download_bucket: String,
    /// Bucket receiving the reorganized images.
    pub upload_bucket: String,
    /// Path to the service-account credentials file. When absent, the
    /// storage backend falls back to ambient environment credentials.
    pub credentials_path: Option<PathBuf>,
    /// Broker name, used as the top-level destination folder.
    pub broker_name: String,
    /// Public URL of the watermark image. No watermarking when absent.
    pub watermark_url: Option<String>,
    /// Failure log file path.
    pub log_file: Option<PathBuf>,
    /// Worker pool size for the photo migration phase.
    pub threads: usize,
    /// Timeout for image and watermark-service requests.
    pub timeout: Duration,
    /// Retries after a failed watermark-service call.
    pub n_tries: u32,
}

impl MigrationConfig {
    /// Failure log path, defaulting to `logs.log` in the working directory.
    pub fn log_file_or_default(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILENAME))
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            download_bucket: String::new(),
            upload_bucket: String::new(),
            credentials_path: None,
            broker_name: String::new(),
            watermark_url: None,
            log_file: None,
            threads: DEFAULT_THREADS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            n_tries: DEFAULT_N_TRIES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_defaults() {
        let config = MigrationConfig::default();
        assert_eq!(config.log_file_or_default(), PathBuf::from("logs.log"));

        let config = MigrationConfig {
            log_file: Some(PathBuf::from("/tmp/run.log")),
            ..Default::default()
        };
        assert_eq!(config.log_file_or_default(), PathBuf::from("/tmp/run.log"));
    }
}
