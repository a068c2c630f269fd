//! Concurrent migration orchestrator.
//!
//! Phases run strictly in order: photos, then blueprints. Within a phase,
//! one task per folder group runs over a bounded pool; each task owns its
//! group end-to-end (fetch-all then upload-all). Completion is reported in
//! arrival order, not submission order.

use std::sync::Arc;

use bytes::Bytes;
use futures::{stream, StreamExt};
use thiserror::Error;

use fotomigra_core::constants::{
    BLUEPRINT_POOL_SIZE, JPEG_CONTENT_TYPE, LOCATION_PLAN_FILENAME, PHOTOS_SUBPATH,
    USAGE_PLAN_FILENAME,
};
use fotomigra_fetch::Fetcher;
use fotomigra_storage::Bucket;

use crate::grouper::FolderGroups;

/// Per-group structural failures. These fail the owning task only; the pool
/// drains every other task.
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("Blueprint set at {prefix} has {found} image(s), expected 2")]
    IncompleteBlueprintSet { prefix: String, found: usize },
}

/// Drives the migration of folder groups into the destination bucket.
pub struct Migrator {
    destination: Arc<dyn Bucket>,
    fetcher: Arc<dyn Fetcher>,
    broker: String,
}

impl Migrator {
    pub fn new(destination: Arc<dyn Bucket>, fetcher: Arc<dyn Fetcher>, broker: String) -> Self {
        Self {
            destination,
            fetcher,
            broker,
        }
    }

    /// Migrate every photo group over a pool bounded by `concurrency`.
    ///
    /// Each group's images are uploaded as `{broker}/{prefix}{index:02}.jpg`
    /// with a 1-based index following fetch order. Returns the reported
    /// folders in completion order.
    pub async fn migrate_photos(&self, groups: &FolderGroups, concurrency: usize) -> Vec<String> {
        let mut tasks = stream::iter(groups.iter())
            .map(|(prefix, urls)| {
                let dest_prefix = format!("{}/{}", self.broker, prefix);
                async move { self.upload_photo_set(dest_prefix, urls).await }
            })
            .buffer_unordered(concurrency.max(1));

        let mut completed = Vec::with_capacity(groups.len());
        while let Some(folder) = tasks.next().await {
            tracing::info!(folder = %folder, "Images uploaded to folder");
            completed.push(folder);
        }
        completed
    }

    /// Migrate every blueprint group over a fixed pool of 5.
    ///
    /// Element 0 becomes `plano-ubicacion.jpg`, element 1 `plano-uso.jpg`.
    /// A short group yields an error result for that group alone.
    pub async fn migrate_blueprints(
        &self,
        groups: &FolderGroups,
    ) -> Vec<Result<String, MigrateError>> {
        let mut tasks = stream::iter(groups.iter())
            .map(|(prefix, urls)| async move { self.upload_blueprint_set(prefix, urls).await })
            .buffer_unordered(BLUEPRINT_POOL_SIZE);

        let mut results = Vec::with_capacity(groups.len());
        while let Some(result) = tasks.next().await {
            match &result {
                Ok(folder) => {
                    tracing::info!(folder = %folder, "Blueprints uploaded to folder");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Blueprint set skipped");
                }
            }
            results.push(result);
        }
        results
    }

    /// Upload one object; on failure, log and return the empty-string
    /// sentinel instead of raising, so the group's task keeps going.
    pub async fn upload_one(&self, path: &str, data: Bytes) -> String {
        match self.destination.put(path, data, JPEG_CONTENT_TYPE).await {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(error = %e, path = %path, "Error uploading image");
                String::new()
            }
        }
    }

    async fn upload_photo_set(&self, dest_prefix: String, urls: &[String]) -> String {
        let images = self.fetcher.fetch_many(urls).await;
        for (index, image) in images.into_iter().enumerate() {
            let path = format!("{}{:02}.jpg", dest_prefix, index + 1);
            self.upload_one(&path, image).await;
        }
        photo_folder(&dest_prefix)
    }

    async fn upload_blueprint_set(
        &self,
        prefix: &str,
        urls: &[String],
    ) -> Result<String, MigrateError> {
        if urls.len() < 2 {
            return Err(MigrateError::IncompleteBlueprintSet {
                prefix: prefix.to_string(),
                found: urls.len(),
            });
        }

        let mut images = self.fetcher.fetch_many(urls).await;
        let usage_plan = images.swap_remove(1);
        let location_plan = images.swap_remove(0);

        let folder = format!("{}/{}", self.broker, prefix);
        self.upload_one(&format!("{}/{}", folder, LOCATION_PLAN_FILENAME), location_plan)
            .await;
        self.upload_one(&format!("{}/{}", folder, USAGE_PLAN_FILENAME), usage_plan)
            .await;

        Ok(folder)
    }
}

/// Folder reported for a completed photo group: the destination prefix with
/// the `fotos/...` tail trimmed.
fn photo_folder(dest_prefix: &str) -> String {
    match dest_prefix.find(PHOTOS_SUBPATH) {
        Some(pos) => dest_prefix[..pos].to_string(),
        None => dest_prefix.to_string(),
    }
}
