//! Fotomigra Storage Library
//!
//! This crate provides the bucket abstraction and implementations used by
//! the migration pipeline: a GCS/Firebase backend built on `object_store`
//! and an in-memory backend for tests.
//!
//! A [`Bucket`] exposes exactly what the pipeline needs: listing the source
//! bucket, writing to the destination bucket, and computing the public-read
//! download URL of an object.

pub mod gcs;
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use gcs::GcsBucket;
pub use memory::MemoryBucket;
pub use traits::{Bucket, ObjectEntry, StorageError, StorageResult};
