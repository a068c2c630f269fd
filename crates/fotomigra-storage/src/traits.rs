//! Bucket abstraction trait.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Listing failed: {0}")]
    ListFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// An entry discovered while listing a bucket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectEntry {
    /// Full object path within the bucket.
    pub name: String,
    /// Object size in bytes.
    pub size: u64,
}

/// Bucket abstraction.
///
/// The source bucket only needs [`Bucket::list`] and [`Bucket::public_url`];
/// the destination bucket only needs [`Bucket::put`]. Both sides share one
/// trait so test doubles can stand in for either.
#[async_trait]
pub trait Bucket: Send + Sync {
    /// Bucket name, as used in public download URLs.
    fn name(&self) -> &str;

    /// Enumerate every object in the bucket.
    async fn list(&self) -> StorageResult<Vec<ObjectEntry>>;

    /// Write an object and return its public URL.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<String>;

    /// Public-read download URL for an object in this bucket.
    fn public_url(&self, key: &str) -> String {
        fotomigra_core::naming::public_url(self.name(), key)
    }
}
