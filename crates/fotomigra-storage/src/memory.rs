//! In-memory bucket implementation for tests.

use crate::traits::{Bucket, ObjectEntry, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

/// A stored object: payload plus the content type it was written with.
#[derive(Clone, Debug)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: String,
}

/// In-memory bucket. Objects are kept in a `BTreeMap`, so listing order is
/// lexicographic by name. Individual keys can be armed to fail on `put` to
/// exercise upload-failure handling.
pub struct MemoryBucket {
    name: String,
    objects: Mutex<BTreeMap<String, StoredObject>>,
    failing_puts: Mutex<HashSet<String>>,
}

impl MemoryBucket {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: Mutex::new(BTreeMap::new()),
            failing_puts: Mutex::new(HashSet::new()),
        }
    }

    /// Seed an object, bypassing the `Bucket` interface.
    pub fn insert(&self, key: impl Into<String>, data: impl Into<Bytes>) {
        self.objects.lock().unwrap().insert(
            key.into(),
            StoredObject {
                data: data.into(),
                content_type: "application/octet-stream".to_string(),
            },
        );
    }

    /// Make every `put` for `key` fail with an upload error.
    pub fn fail_puts_for(&self, key: impl Into<String>) {
        self.failing_puts.lock().unwrap().insert(key.into());
    }

    /// Stored object for `key`, if any.
    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    /// All stored keys, in lexicographic order.
    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl Bucket for MemoryBucket {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list(&self) -> StorageResult<Vec<ObjectEntry>> {
        let objects = self.objects.lock().unwrap();
        Ok(objects
            .iter()
            .map(|(name, stored)| ObjectEntry {
                name: name.clone(),
                size: stored.data.len() as u64,
            })
            .collect())
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<String> {
        if self.failing_puts.lock().unwrap().contains(key) {
            return Err(StorageError::UploadFailed(format!(
                "injected failure for {}",
                key
            )));
        }
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(self.public_url(key))
    }
}
