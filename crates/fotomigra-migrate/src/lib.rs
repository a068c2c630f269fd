//! Fotomigra Migrate Library
//!
//! This crate turns a source bucket listing into folder groups and runs the
//! concurrent migration: one task per folder group over a bounded pool,
//! fetch-all then upload-all, with per-image failures degraded rather than
//! propagated.

pub mod grouper;
pub mod orchestrator;

// Re-export commonly used types
pub use grouper::{blueprint_groups, photo_groups};
pub use orchestrator::{MigrateError, Migrator};
