//! Configuration errors.

use std::path::PathBuf;

use erp_store::StoreError;
use thiserror::Error;

/// Errors raised while loading configuration or the dataset it names.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The configuration document is malformed.
    #[error("invalid configuration: {source}")]
    Parse {
        /// Source [`serde_json::Error`].
        #[from]
        source: serde_json::Error,
    },
    /// An environment override carried an unusable value.
    #[error("invalid value for {var}: {reason}")]
    InvalidOverride {
        /// Environment variable name.
        var: &'static str,
        /// Human-readable reason.
        reason: String,
    },
    /// The dataset could not be decoded or indexed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
