//! Shared error definitions for ERP primitives.

use thiserror::Error;
use uuid::Error as UuidError;

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing primitive types.
#[derive(Debug, Error)]
pub enum Error {
    /// The provided call identifier could not be parsed.
    #[error("invalid call id: {source}")]
    InvalidCallId {
        /// Source parsing error from the UUID library.
        #[from]
        source: UuidError,
    },

    /// Tool name failed validation.
    #[error("invalid tool name `{name}`: {reason}")]
    InvalidToolName {
        /// The offending name.
        name: String,
        /// Human-readable reason for rejection.
        reason: String,
    },
}
