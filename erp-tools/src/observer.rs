//! Hooks invoked after every dispatch.

use std::sync::Arc;
use std::time::Duration;

use erp_primitives::CallId;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ToolResult;

/// Outcome of a single dispatch, as seen by observers.
#[derive(Debug)]
pub struct DispatchEvent<'a> {
    /// Identifier of the call.
    pub call_id: CallId,
    /// Requested tool name (possibly unknown).
    pub tool: &'a str,
    /// Result returned to the caller.
    pub result: &'a ToolResult<Value>,
    /// Wall time spent inside the dispatcher.
    pub elapsed: Duration,
}

/// Observer notified whenever the registry completes a dispatch.
pub trait DispatchObserver: Send + Sync {
    /// Records the completed dispatch.
    fn on_dispatch(&self, event: &DispatchEvent<'_>);
}

/// Observer that emits dispatch outcomes to the tracing system.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl DispatchObserver for TracingObserver {
    fn on_dispatch(&self, event: &DispatchEvent<'_>) {
        let elapsed_us = u64::try_from(event.elapsed.as_micros()).unwrap_or(u64::MAX);
        match event.result {
            Ok(_) => debug!(
                call_id = %event.call_id,
                tool = event.tool,
                elapsed_us,
                "tool call succeeded"
            ),
            Err(err) => warn!(
                call_id = %event.call_id,
                tool = event.tool,
                kind = err.kind().as_str(),
                error = %err,
                elapsed_us,
                "tool call failed"
            ),
        }
    }
}

/// Observer that forwards events to a collection of observers.
pub struct CompositeObserver {
    observers: Vec<Arc<dyn DispatchObserver>>,
}

impl CompositeObserver {
    /// Creates a composite from the supplied observers.
    #[must_use]
    pub fn new<I>(observers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn DispatchObserver>>,
    {
        Self {
            observers: observers.into_iter().collect(),
        }
    }
}

impl DispatchObserver for CompositeObserver {
    fn on_dispatch(&self, event: &DispatchEvent<'_>) {
        for observer in &self.observers {
            observer.on_dispatch(event);
        }
    }
}
