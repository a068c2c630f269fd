//! Fotomigra Core Library
//!
//! This crate provides the naming/URL codec, run configuration, and shared
//! constants used by all Fotomigra components.

pub mod config;
pub mod constants;
pub mod naming;

// Re-export commonly used types
pub use config::MigrationConfig;
