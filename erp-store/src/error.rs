//! Error types for the lookup store.

use erp_primitives::{EntityKey, EntityKind};
use serde_json::Error as SerdeError;
use thiserror::Error;

/// Errors emitted while building or querying a [`LookupStore`](crate::LookupStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists for the normalized key.
    #[error("{kind} `{key}` not found")]
    NotFound {
        /// Collection that was searched.
        kind: EntityKind,
        /// Normalized key that missed.
        key: EntityKey,
    },
    /// Two raw dataset keys collapsed into the same normalized key.
    #[error("duplicate {kind} key `{key}` after normalization")]
    DuplicateKey {
        /// Collection holding the collision.
        kind: EntityKind,
        /// Normalized key shared by both entries.
        key: EntityKey,
    },
    /// A dataset value cannot be held by the store.
    #[error("invalid value for {kind} `{key}`: {reason}")]
    InvalidValue {
        /// Collection holding the value.
        kind: EntityKind,
        /// Normalized key of the offending record.
        key: EntityKey,
        /// Human-readable reason.
        reason: &'static str,
    },
    /// Dataset document could not be decoded.
    #[error("dataset decoding error: {source}")]
    Decode {
        /// Source [`serde_json::Error`].
        #[from]
        source: SerdeError,
    },
}

impl StoreError {
    /// Returns `true` for lookup misses.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
