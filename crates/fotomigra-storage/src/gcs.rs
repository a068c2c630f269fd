//! GCS/Firebase Storage bucket implementation.

use crate::traits::{Bucket, ObjectEntry, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use object_store::gcp::{GoogleCloudStorage, GoogleCloudStorageBuilder};
use object_store::path::Path;
use object_store::{
    Attribute, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
    Result as ObjectResult,
};
use std::path::Path as FsPath;

/// GCS bucket backed by `object_store`.
#[derive(Clone)]
pub struct GcsBucket {
    store: GoogleCloudStorage,
    bucket: String,
}

impl GcsBucket {
    /// Create a new GcsBucket instance
    ///
    /// # Arguments
    /// * `bucket` - bucket name (e.g. "duvify-brokers-fotos-unidades")
    /// * `service_account_path` - optional path to a service-account JSON
    ///   credentials file; without it, credentials come from the environment
    ///
    /// Fails with [`StorageError::ConfigError`], which callers treat as fatal
    /// before any migration work starts.
    pub fn new(bucket: String, service_account_path: Option<&FsPath>) -> StorageResult<Self> {
        let mut builder = GoogleCloudStorageBuilder::from_env().with_bucket_name(bucket.clone());

        if let Some(path) = service_account_path {
            builder = builder.with_service_account_path(path.to_string_lossy());
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(GcsBucket { store, bucket })
    }
}

#[async_trait]
impl Bucket for GcsBucket {
    fn name(&self) -> &str {
        &self.bucket
    }

    async fn list(&self) -> StorageResult<Vec<ObjectEntry>> {
        let start = std::time::Instant::now();
        let mut stream = self.store.list(None);
        let mut entries = Vec::new();

        while let Some(meta) = stream.next().await {
            let meta = meta.map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "GCS listing failed"
                );
                StorageError::ListFailed(e.to_string())
            })?;
            entries.push(ObjectEntry {
                name: meta.location.to_string(),
                size: meta.size,
            });
        }

        tracing::info!(
            bucket = %self.bucket,
            objects = entries.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "GCS listing successful"
        );

        Ok(entries)
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<String> {
        let size = data.len() as u64;
        let location = Path::from(key.to_string());
        let start = std::time::Instant::now();

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());

        let result: ObjectResult<_> = self
            .store
            .put_opts(&location, PutPayload::from(data), PutOptions::from(attributes))
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "GCS upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "GCS upload successful"
        );

        Ok(self.public_url(key))
    }
}
