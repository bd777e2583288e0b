//! Registry and dispatcher for tool definitions.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use erp_primitives::CallId;
use serde_json::Value;
use tracing::{debug, trace};

use crate::call::{ToolCallRequest, ToolCallResponse};
use crate::definition::{ToolDefinition, ToolDescriptor};
use crate::error::{ToolError, ToolResult};
use crate::observer::{DispatchEvent, DispatchObserver};

/// Ordered collection of tool definitions exposed to the external caller.
///
/// Registration takes `&mut self`; once populated the registry is shared
/// read-only (typically behind an `Arc`), so dispatch needs no locking.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
    index: HashMap<String, usize>,
    observer: Option<Arc<dyn DispatchObserver>>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.tools.iter().map(ToolDefinition::name).collect();
        f.debug_struct("ToolRegistry")
            .field("registered", &names)
            .field("observer_configured", &self.observer.is_some())
            .finish()
    }
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from definitions, in order.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::DuplicateTool`] on the first repeated name.
    pub fn from_definitions<I>(definitions: I) -> ToolResult<Self>
    where
        I: IntoIterator<Item = ToolDefinition>,
    {
        let mut registry = Self::new();
        for definition in definitions {
            registry.register(definition)?;
        }
        Ok(registry)
    }

    /// Registers a tool definition.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::DuplicateTool`] if the name is already present;
    /// the existing registration is left untouched.
    pub fn register(&mut self, definition: ToolDefinition) -> ToolResult<()> {
        let name = definition.name().to_owned();
        if self.index.contains_key(&name) {
            return Err(ToolError::DuplicateTool { name });
        }

        debug!(tool = %name, "tool registered");
        self.index.insert(name, self.tools.len());
        self.tools.push(definition);
        Ok(())
    }

    /// Installs the observer notified after every dispatch.
    pub fn set_observer(&mut self, observer: Arc<dyn DispatchObserver>) {
        self.observer = Some(observer);
    }

    /// Installs an observer, returning the registry for chaining.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn DispatchObserver>) -> Self {
        self.set_observer(observer);
        self
    }

    /// Returns the definition registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.index.get(name).map(|&slot| &self.tools[slot])
    }

    /// Published descriptions of every tool, in registration order.
    #[must_use]
    pub fn list_definitions(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(ToolDefinition::descriptor).collect()
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Executes the tool registered under `name` with raw arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] when the tool is not found,
    /// [`ToolError::InvalidArguments`] when `args` do not decode into the
    /// tool's input record, or any failure the handler surfaces.
    pub fn dispatch(&self, name: &str, args: Value) -> ToolResult<Value> {
        self.dispatch_with_id(CallId::random(), name, args)
    }

    /// Like [`ToolRegistry::dispatch`], correlating logs with `call_id`.
    ///
    /// # Errors
    ///
    /// See [`ToolRegistry::dispatch`].
    pub fn dispatch_with_id(&self, call_id: CallId, name: &str, args: Value) -> ToolResult<Value> {
        let started = Instant::now();
        trace!(%call_id, tool = name, arguments = %args, "dispatching tool call");

        let result = match self.get(name) {
            Some(definition) => definition.invoke(args),
            None => Err(ToolError::UnknownTool {
                name: name.to_owned(),
            }),
        };

        if let Some(observer) = &self.observer {
            observer.on_dispatch(&DispatchEvent {
                call_id,
                tool: name,
                result: &result,
                elapsed: started.elapsed(),
            });
        }

        result
    }

    /// Executes a request envelope, folding every failure into the response.
    #[must_use]
    pub fn handle(&self, request: ToolCallRequest) -> ToolCallResponse {
        let ToolCallRequest {
            id,
            name,
            arguments,
        } = request;
        let result = self.dispatch_with_id(id, &name, arguments);
        ToolCallResponse::new(id, name, result)
    }
}
