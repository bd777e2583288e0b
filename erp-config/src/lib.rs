//! Configuration management for the assistant runtime.
//!
//! Configuration comes from an optional JSON file, then environment
//! overrides. Every field has a default, so an empty document (or no file at
//! all) yields the built-in dataset with misses surfaced to the caller.

#![warn(missing_docs, clippy::pedantic)]

mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ENV_DATASET, ENV_LOG_FORMAT, ENV_MISS_POLICY};
pub use schema::{AppConfig, DatasetSource, LogConfig, LogFormat};
