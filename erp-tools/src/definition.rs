//! Binding of names and descriptions to typed handlers.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use erp_primitives::ToolName;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{ToolError, ToolResult};
use crate::shape::{Shape, ToolShape};

/// A handler whose request and response are declared records.
pub trait TypedTool: Send + Sync + 'static {
    /// Decoded request record.
    type Input: ToolShape + Serialize + DeserializeOwned;
    /// Response record.
    type Output: ToolShape + Serialize;

    /// Runs the handler against a correctly shaped input.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolError`] the handler chooses to surface to the caller.
    fn call(&self, input: Self::Input) -> ToolResult<Self::Output>;
}

/// Adapts a closure into a [`TypedTool`].
pub struct FnTool<I, O, F> {
    handler: F,
    _marker: PhantomData<fn(I) -> O>,
}

impl<I, O, F> FnTool<I, O, F>
where
    F: Fn(I) -> ToolResult<O>,
{
    /// Wraps the supplied closure.
    #[must_use]
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

impl<I, O, F> TypedTool for FnTool<I, O, F>
where
    I: ToolShape + Serialize + DeserializeOwned + 'static,
    O: ToolShape + Serialize + 'static,
    F: Fn(I) -> ToolResult<O> + Send + Sync + 'static,
{
    type Input = I;
    type Output = O;

    fn call(&self, input: I) -> ToolResult<O> {
        (self.handler)(input)
    }
}

trait ErasedHandler: Send + Sync {
    fn invoke(&self, name: &str, input: &Shape, output: &Shape, args: Value) -> ToolResult<Value>;
}

struct Bound<T>(T);

impl<T: TypedTool> ErasedHandler for Bound<T> {
    fn invoke(&self, name: &str, input: &Shape, output: &Shape, args: Value) -> ToolResult<Value> {
        input
            .validate(&args)
            .map_err(|violation| ToolError::invalid_arguments(name, violation.to_string()))?;
        let decoded: T::Input = serde_json::from_value(args)
            .map_err(|err| ToolError::invalid_arguments(name, err.to_string()))?;

        let result = self.0.call(decoded)?;

        let encoded =
            serde_json::to_value(&result)
            .map_err(|err| ToolError::invalid_output(name, err.to_string()))?;
        output
            .validate(&encoded)
            .map_err(|violation| ToolError::invalid_output(name, violation.to_string()))?;
        Ok(encoded)
    }
}

/// A named, described tool bound to its handler.
#[derive(Clone)]
pub struct ToolDefinition {
    name: ToolName,
    description: String,
    input: Shape,
    output: Shape,
    handler: Arc<dyn ErasedHandler>,
}

impl fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input", &self.input)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

impl ToolDefinition {
    /// Binds `tool` under `name`.
    ///
    /// Both shape declarations are checked, and the records' example values
    /// are encoded and validated against them, so a declaration that drifts
    /// from the record's serde encoding fails here rather than on a call.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Configuration`] for an invalid name, an empty
    /// description, or a shape mismatch.
    pub fn new<T: TypedTool>(
        name: impl Into<String>,
        description: impl Into<String>,
        tool: T,
    ) -> ToolResult<Self> {
        let name = ToolName::new(name)?;
        let description = description.into();
        if description.trim().is_empty() {
            return Err(ToolError::configuration(
                name.as_str(),
                "description cannot be empty",
            ));
        }

        let input = T::Input::shape();
        let output = T::Output::shape();
        bind_input::<T::Input>(&name, &input)?;
        bind_output::<T::Output>(&name, &output)?;

        Ok(Self {
            name,
            description,
            input,
            output,
            handler: Arc::new(Bound(tool)),
        })
    }

    /// Binds a closure under `name`.
    ///
    /// # Errors
    ///
    /// See [`ToolDefinition::new`].
    pub fn from_fn<I, O, F>(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: F,
    ) -> ToolResult<Self>
    where
        I: ToolShape + Serialize + DeserializeOwned + 'static,
        O: ToolShape + Serialize + 'static,
        F: Fn(I) -> ToolResult<O> + Send + Sync + 'static,
    {
        Self::new(name, description, FnTool::new(handler))
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the description read by the external caller.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the declared request shape.
    #[must_use]
    pub fn input_shape(&self) -> &Shape {
        &self.input
    }

    /// Returns the declared response shape.
    #[must_use]
    pub fn output_shape(&self) -> &Shape {
        &self.output
    }

    /// Returns the published description of this tool.
    #[must_use]
    pub fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name.clone(),
            description: self.description.clone(),
            input: self.input.clone(),
            output: self.output.clone(),
        }
    }

    /// Validates `args`, runs the handler, and validates its result.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArguments`] without running the handler
    /// when `args` do not fit the input shape, [`ToolError::InvalidOutput`]
    /// when the result does not fit the output shape, or whatever the
    /// handler surfaces.
    pub fn invoke(&self, args: Value) -> ToolResult<Value> {
        self.handler
            .invoke(self.name.as_str(), &self.input, &self.output, args)
    }
}

fn bind_input<I>(name: &ToolName, shape: &Shape) -> ToolResult<()>
where
    I: ToolShape + Serialize + DeserializeOwned,
{
    let mismatch = |detail: String| ToolError::configuration(name.as_str(), detail);

    shape
        .check()
        .map_err(|violation| mismatch(format!("input shape: {violation}")))?;
    let encoded = serde_json::to_value(I::example())
        .map_err(|err| mismatch(format!("input example: {err}")))?;
    shape
        .validate(&encoded)
        .map_err(|violation| mismatch(format!("input record does not match shape: {violation}")))?;
    serde_json::from_value::<I>(encoded)
        .map_err(|err| mismatch(format!("input record cannot be decoded: {err}")))?;
    Ok(())
}

fn bind_output<O>(name: &ToolName, shape: &Shape) -> ToolResult<()>
where
    O: ToolShape + Serialize,
{
    let mismatch = |detail: String| ToolError::configuration(name.as_str(), detail);

    shape
        .check()
        .map_err(|violation| mismatch(format!("output shape: {violation}")))?;
    let encoded = serde_json::to_value(O::example())
        .map_err(|err| mismatch(format!("output example: {err}")))?;
    shape
        .validate(&encoded)
        .map_err(|violation| mismatch(format!("output record does not match shape: {violation}")))
}

/// Name, description, and shapes of a tool as published to the caller.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Stable tool identifier.
    pub name: ToolName,
    /// Text the caller uses to decide when to invoke the tool.
    pub description: String,
    /// Declared request fields.
    pub input: Shape,
    /// Declared response fields.
    pub output: Shape,
}

impl ToolDescriptor {
    /// Renders a function declaration in the layout most function-calling
    /// model APIs accept.
    #[must_use]
    pub fn function_declaration(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "parameters": self.input.to_json_schema(),
            "response": self.output.to_json_schema(),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use super::*;
    use crate::error::FailureKind;
    use crate::shape::FieldType;

    #[derive(Debug, Serialize, Deserialize)]
    struct EchoInput {
        text: String,
    }

    impl ToolShape for EchoInput {
        fn shape() -> Shape {
            Shape::new().field("text", FieldType::String)
        }

        fn example() -> Self {
            Self { text: "пример".into() }
        }
    }

    #[derive(Debug, Serialize)]
    struct EchoOutput {
        length: i64,
    }

    impl ToolShape for EchoOutput {
        fn shape() -> Shape {
            Shape::new().field("length", FieldType::Integer)
        }

        fn example() -> Self {
            Self { length: 0 }
        }
    }

    // Declares a field the record does not serialize.
    #[derive(Debug, Serialize)]
    struct DriftedOutput {
        len: i64,
    }

    impl ToolShape for DriftedOutput {
        fn shape() -> Shape {
            Shape::new().field("length", FieldType::Integer)
        }

        fn example() -> Self {
            Self { len: 0 }
        }
    }

    #[derive(Debug, Serialize)]
    struct Ratio {
        ratio: f64,
    }

    impl ToolShape for Ratio {
        fn shape() -> Shape {
            Shape::new().field("ratio", FieldType::Float)
        }

        fn example() -> Self {
            Self { ratio: 0.0 }
        }
    }

    fn length(input: EchoInput) -> ToolResult<EchoOutput> {
        let length = i64::try_from(input.text.chars().count())
            .map_err(|err| ToolError::execution(err.to_string()))?;
        Ok(EchoOutput { length })
    }

    #[test]
    fn binds_and_invokes_closure() {
        let def = ToolDefinition::from_fn("text_length", "Count characters", length).unwrap();

        let output = def.invoke(json!({ "text": "стул" })).unwrap();
        assert_eq!(output, json!({ "length": 4 }));
        assert_eq!(def.name(), "text_length");
        assert_eq!(def.input_shape().fields().len(), 1);
    }

    #[test]
    fn shape_drift_fails_binding() {
        let err = ToolDefinition::from_fn("drifted", "Broken output", |_: EchoInput| {
            Ok(DriftedOutput { len: 1 })
        })
        .expect_err("mismatched shape");

        assert!(err.is_configuration());
        assert!(matches!(err, ToolError::Configuration { ref name, .. } if name == "drifted"));
    }

    #[test]
    fn empty_description_and_bad_name_fail_binding() {
        let err = ToolDefinition::from_fn("text_length", "  ", length).expect_err("blank");
        assert!(err.is_configuration());

        let err = ToolDefinition::from_fn("", "Count characters", length).expect_err("no name");
        assert!(err.is_configuration());
    }

    #[test]
    fn bad_arguments_skip_the_handler() {
        let calls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let seen = std::sync::Arc::clone(&calls);
        let def = ToolDefinition::from_fn("text_length", "Count characters", move |input: EchoInput| {
            seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            length(input)
        })
        .unwrap();

        let err = def.invoke(json!({ "text": 5 })).expect_err("mistyped");
        assert_eq!(err.kind(), FailureKind::InvalidArguments);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn non_conforming_output_is_withheld() {
        let def = ToolDefinition::from_fn("ratio", "Always divides by zero", |_: EchoInput| {
            Ok(Ratio { ratio: f64::NAN })
        })
        .expect("example output binds");

        let err = def
            .invoke(json!({ "text": "стул" }))
            .expect_err("NaN encodes as null");
        assert_eq!(err.kind(), FailureKind::InvalidOutput);
        assert!(matches!(err, ToolError::InvalidOutput { ref name, .. } if name == "ratio"));
    }

    #[test]
    fn descriptor_renders_function_declaration() {
        let def = ToolDefinition::from_fn("text_length", "Count characters", length).unwrap();
        let declaration = def.descriptor().function_declaration();
        assert_eq!(declaration["name"], "text_length");
        assert_eq!(declaration["parameters"]["required"], json!(["text"]));
        assert_eq!(declaration["response"]["properties"]["length"]["type"], "integer");
    }
}
