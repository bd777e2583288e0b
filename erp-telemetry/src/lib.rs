//! Observability utilities for the assistant runtime.

#![warn(missing_docs, clippy::pedantic)]

pub mod metrics;
pub mod tracing_support;

pub use metrics::{DispatchSnapshot, DispatchStats};
pub use tracing_support::{TelemetryError, init};
