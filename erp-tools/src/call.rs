//! Wire envelopes for tool calls.
//!
//! The transport belongs to whoever hosts the registry; these types only fix
//! the decoded layout of one request and one response document.

use erp_primitives::CallId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FailureKind, ToolResult};

/// A call by name with untyped arguments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Correlation identifier; generated when the caller omits it.
    #[serde(default)]
    pub id: CallId,
    /// Requested tool name.
    pub name: String,
    /// Raw argument document.
    #[serde(default = "empty_arguments")]
    pub arguments: Value,
}

impl ToolCallRequest {
    /// Creates a request with a fresh identifier.
    #[must_use]
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: CallId::random(),
            name: name.into(),
            arguments,
        }
    }
}

fn empty_arguments() -> Value {
    Value::Object(Map::new())
}

/// Result of a call, echoed with the request identifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResponse {
    /// Identifier copied from the request.
    pub id: CallId,
    /// Tool name copied from the request.
    pub name: String,
    /// Success payload or failure descriptor.
    #[serde(flatten)]
    pub outcome: CallOutcome,
}

impl ToolCallResponse {
    /// Builds a response from a dispatch result.
    #[must_use]
    pub fn new(id: CallId, name: impl Into<String>, result: ToolResult<Value>) -> Self {
        Self {
            id,
            name: name.into(),
            outcome: result.into(),
        }
    }

    /// Returns `true` when the call succeeded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, CallOutcome::Ok { .. })
    }

    /// Returns the output document of a successful call.
    #[must_use]
    pub fn output(&self) -> Option<&Value> {
        match &self.outcome {
            CallOutcome::Ok { output } => Some(output),
            CallOutcome::Error { .. } => None,
        }
    }

    /// Returns the failure kind of an unsuccessful call.
    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match &self.outcome {
            CallOutcome::Ok { .. } => None,
            CallOutcome::Error { kind, .. } => Some(*kind),
        }
    }
}

/// Either the tool's output document or a failure descriptor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CallOutcome {
    /// The call produced an output conforming to the tool's response shape.
    Ok {
        /// Output document.
        output: Value,
    },
    /// The call failed.
    Error {
        /// Failure category.
        kind: FailureKind,
        /// Human-readable message.
        message: String,
    },
}

impl From<ToolResult<Value>> for CallOutcome {
    fn from(value: ToolResult<Value>) -> Self {
        match value {
            Ok(output) => Self::Ok { output },
            Err(err) => Self::Error {
                kind: err.kind(),
                message: err.to_string(),
            },
        }
    }
}
