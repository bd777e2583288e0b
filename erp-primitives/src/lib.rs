//! Core shared types for the ERP assistant tool runtime.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod ids;
mod key;
mod name;

/// Error type and result alias shared across the workspace.
pub use error::{Error, Result};
/// Per-invocation identifier used for log and response correlation.
pub use ids::CallId;
/// Normalized lookup keys and the entity collections they address.
pub use key::{EntityKey, EntityKind};
/// Validated tool identifier.
pub use name::ToolName;
