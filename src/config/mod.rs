//! Configuration module
//!
//! This module provides the `StashConfig` struct and its type-safe builder
//! with validation and sensible defaults.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod types;

// Re-exports for public API
pub use builder::{Complete, StashConfigBuilder, WithDataDir, default_data_dir};
pub use types::StashConfig;
