//! Fotomigra Fetch Library
//!
//! This crate turns a public image URL into image bytes: either a raw
//! download or a watermark-service round trip with bounded retry and
//! post-compression. The contract is that a fetch never fails — on any
//! error the configured placeholder image is returned so the batch
//! continues, and the failure is recorded in the failure log for offline
//! replay.

pub mod compress;
pub mod faillog;
pub mod fetcher;
pub mod placeholder;

// Re-export commonly used types
pub use compress::recompress_jpeg;
pub use faillog::{extract_failed_urls, FailureLog, FileFailureLog, MemoryFailureLog};
pub use fetcher::{Fetcher, ImageFetcher};
pub use placeholder::default_placeholder;
