//! Errors produced by tool registration and invocation.

use erp_primitives::{EntityKey, EntityKind, Error as PrimitiveError};
use erp_store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Errors produced by tool registration and invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool definition could not be bound at start-up.
    #[error("invalid definition for tool `{name}`: {reason}")]
    Configuration {
        /// Name of the tool being defined.
        name: String,
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Tool name collided with an existing registration.
    #[error("tool `{name}` is already registered")]
    DuplicateTool {
        /// Name of the offending tool.
        name: String,
    },

    /// Requested tool does not exist.
    #[error("tool `{name}` is not registered")]
    UnknownTool {
        /// Name of the missing tool.
        name: String,
    },

    /// Raw arguments did not decode into the tool's input record.
    #[error("invalid arguments for tool `{name}`: {detail}")]
    InvalidArguments {
        /// Name of the invoked tool.
        name: String,
        /// Decoding failure detail.
        detail: String,
    },

    /// The backing store has no record for the requested key.
    #[error("{kind} `{key}` not found")]
    NotFound {
        /// Collection that was searched.
        kind: EntityKind,
        /// Normalized key that missed.
        key: EntityKey,
    },

    /// Handler output did not match the declared response shape.
    #[error("tool `{name}` produced invalid output: {detail}")]
    InvalidOutput {
        /// Name of the invoked tool.
        name: String,
        /// Mismatch detail.
        detail: String,
    },

    /// Tool execution failed.
    #[error("tool execution failed: {reason}")]
    Execution {
        /// Human-readable error returned by the tool implementation.
        reason: String,
    },
}

impl ToolError {
    /// Creates an execution error from the supplied reason.
    #[must_use]
    pub fn execution(reason: impl Into<String>) -> Self {
        Self::Execution {
            reason: reason.into(),
        }
    }

    /// Creates a configuration error for `name`.
    #[must_use]
    pub fn configuration(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an argument decoding error for `name`.
    #[must_use]
    pub fn invalid_arguments(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidArguments {
            name: name.into(),
            detail: detail.into(),
        }
    }

    /// Creates an output validation error for `name`.
    #[must_use]
    pub fn invalid_output(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidOutput {
            name: name.into(),
            detail: detail.into(),
        }
    }

    /// Classifies the error for the wire.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Configuration { .. } | Self::DuplicateTool { .. } => FailureKind::Configuration,
            Self::UnknownTool { .. } => FailureKind::UnknownTool,
            Self::InvalidArguments { .. } => FailureKind::InvalidArguments,
            Self::NotFound { .. } => FailureKind::NotFound,
            Self::InvalidOutput { .. } => FailureKind::InvalidOutput,
            Self::Execution { .. } => FailureKind::Execution,
        }
    }

    /// Returns `true` for start-up failures that must abort the process.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        self.kind() == FailureKind::Configuration
    }
}

impl From<StoreError> for ToolError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { kind, key } => Self::NotFound { kind, key },
            other => Self::execution(other.to_string()),
        }
    }
}

impl From<PrimitiveError> for ToolError {
    fn from(value: PrimitiveError) -> Self {
        match value {
            PrimitiveError::InvalidToolName { name, reason } => Self::Configuration { name, reason },
            err @ PrimitiveError::InvalidCallId { .. } => Self::execution(err.to_string()),
        }
    }
}

/// Failure category reported to the external caller.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Start-up binding failure.
    Configuration,
    /// No tool with the requested name.
    UnknownTool,
    /// Arguments did not match the input shape.
    InvalidArguments,
    /// Lookup miss surfaced by the handler.
    NotFound,
    /// Handler output violated the output shape.
    InvalidOutput,
    /// Any other handler failure.
    Execution,
}

impl FailureKind {
    /// Stable snake-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::UnknownTool => "unknown_tool",
            Self::InvalidArguments => "invalid_arguments",
            Self::NotFound => "not_found",
            Self::InvalidOutput => "invalid_output",
            Self::Execution => "execution",
        }
    }
}
