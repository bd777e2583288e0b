//! Tool definitions and dispatch for the ERP assistant.
//!
//! A tool pairs a stable name and a description with a typed handler whose
//! request and response records declare their [`Shape`] explicitly. The
//! [`ToolRegistry`] publishes those declarations to the external caller and
//! executes calls by name, decoding untyped arguments into the declared input
//! record before the handler runs.

#![warn(missing_docs, clippy::pedantic)]

pub mod call;
pub mod catalog;
pub mod definition;
pub mod error;
pub mod observer;
pub mod registry;
pub mod shape;

pub use call::{CallOutcome, ToolCallRequest, ToolCallResponse};
pub use definition::{FnTool, ToolDefinition, ToolDescriptor, TypedTool};
pub use error::{FailureKind, ToolError, ToolResult};
pub use observer::{CompositeObserver, DispatchEvent, DispatchObserver, TracingObserver};
pub use registry::ToolRegistry;
pub use shape::{FieldSpec, FieldType, Shape, ShapeViolation, ToolShape};
