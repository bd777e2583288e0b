//! ERP business queries exposed as named, typed tools.
//!
//! This facade bundles the workspace crates behind feature flags. The core
//! (primitives, lookup store, tool registry) is always present; configuration,
//! telemetry, and the [`runtime`] wiring used by the `erp-assistant` binary
//! can be switched off by downstream users that host the registry themselves.

#![warn(missing_docs, clippy::pedantic)]

/// Re-export shared primitives for convenience.
pub use erp_primitives as primitives;

/// Immutable lookup store.
pub use erp_store as store;

/// Tool definitions, registry, and business catalog.
pub use erp_tools as tools;

/// Configuration management (enabled by `config` feature).
#[cfg(feature = "config")]
pub use erp_config as config;

/// Logging and dispatch statistics (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use erp_telemetry as telemetry;

/// Start-up wiring and the line-delimited JSON session (enabled by `runtime` feature).
#[cfg(feature = "runtime")]
pub mod runtime;
