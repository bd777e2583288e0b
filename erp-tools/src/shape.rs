//! Explicit request/response shape declarations.
//!
//! Every tool record states its fields by hand through [`ToolShape`]. The
//! declaration is checked once when a tool is bound and then used to validate
//! every incoming argument document and every outgoing result.

use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

/// Primitive type of a declared field.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// UTF-8 text.
    String,
    /// Signed 64-bit integer.
    Integer,
    /// Double-precision number.
    Float,
}

impl FieldType {
    /// JSON Schema type keyword for this field type.
    #[must_use]
    pub const fn json_type(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "number",
        }
    }

    /// Returns `true` when `value` is representable as this type.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.as_i64().is_some(),
            Self::Float => value.is_number(),
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
        })
    }
}

/// One named, typed field of a [`Shape`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    name: String,
    #[serde(rename = "type")]
    field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl FieldSpec {
    /// Field name as it appears in argument and result documents.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared primitive type.
    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Optional hint for the external caller.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Ordered set of fields making up a request or response record.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Shape {
    fields: Vec<FieldSpec>,
}

impl Shape {
    /// Creates an empty shape.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field without a description.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            field_type,
            description: None,
        });
        self
    }

    /// Appends a described field.
    #[must_use]
    pub fn described_field(
        mut self,
        name: impl Into<String>,
        field_type: FieldType,
        description: impl Into<String>,
    ) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            field_type,
            description: Some(description.into()),
        });
        self
    }

    /// Declared fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    /// Checks that the declaration itself is well formed.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeViolation::EmptyFieldName`] or
    /// [`ShapeViolation::DuplicateField`].
    pub fn check(&self) -> Result<(), ShapeViolation> {
        let mut seen = HashSet::with_capacity(self.fields.len());
        for spec in &self.fields {
            if spec.name.trim().is_empty() {
                return Err(ShapeViolation::EmptyFieldName);
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(ShapeViolation::DuplicateField(spec.name.clone()));
            }
        }
        Ok(())
    }

    /// Validates that `value` carries exactly the declared fields with the
    /// declared types.
    ///
    /// # Errors
    ///
    /// Returns the first [`ShapeViolation`] found: a non-object document,
    /// then missing fields, then mistyped fields, then undeclared fields.
    pub fn validate(&self, value: &Value) -> Result<(), ShapeViolation> {
        let Value::Object(map) = value else {
            return Err(ShapeViolation::NotAnObject {
                found: json_kind(value),
            });
        };

        for spec in &self.fields {
            let Some(field) = map.get(&spec.name) else {
                return Err(ShapeViolation::MissingField(spec.name.clone()));
            };
            if !spec.field_type.accepts(field) {
                return Err(ShapeViolation::TypeMismatch {
                    field: spec.name.clone(),
                    expected: spec.field_type,
                    found: json_kind(field),
                });
            }
        }

        if let Some(extra) = map.keys().find(|key| self.get(key).is_none()) {
            return Err(ShapeViolation::UnexpectedField(extra.clone()));
        }

        Ok(())
    }

    /// Renders the shape as a JSON Schema object for function-calling runtimes.
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::with_capacity(self.fields.len());
        for spec in &self.fields {
            let mut property = json!({ "type": spec.field_type().json_type() });
            if let (Some(description), Value::Object(obj)) = (spec.description(), &mut property) {
                obj.insert("description".into(), Value::from(description));
            }
            properties.insert(spec.name().to_owned(), property);
        }
        let required: Vec<&str> = self.fields.iter().map(FieldSpec::name).collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }
}

/// Record type with a hand-written shape declaration.
pub trait ToolShape: Sized {
    /// The declared fields of this record.
    fn shape() -> Shape;

    /// A representative value, used to verify the declaration against the
    /// record's serde encoding when a tool is bound.
    fn example() -> Self;
}

/// Reasons a document or declaration does not conform to a [`Shape`].
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ShapeViolation {
    /// Document is not a JSON object.
    #[error("expected an object, found {found}")]
    NotAnObject {
        /// JSON kind that was supplied.
        found: &'static str,
    },
    /// A declared field is absent.
    #[error("missing field `{0}`")]
    MissingField(String),
    /// A field carries the wrong primitive type.
    #[error("field `{field}` must be {expected}, found {found}")]
    TypeMismatch {
        /// Offending field.
        field: String,
        /// Declared type.
        expected: FieldType,
        /// JSON kind that was supplied.
        found: &'static str,
    },
    /// The document carries a field the shape does not declare.
    #[error("unexpected field `{0}`")]
    UnexpectedField(String),
    /// A declaration names the same field twice.
    #[error("field `{0}` declared more than once")]
    DuplicateField(String),
    /// A declaration contains a blank field name.
    #[error("field names cannot be empty")]
    EmptyFieldName,
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_shape() -> Shape {
        Shape::new()
            .described_field("product_name", FieldType::String, "Название товара")
            .field("quantity", FieldType::Integer)
    }

    #[test]
    fn accepts_conforming_document() {
        let shape = product_shape();
        shape
            .validate(&json!({ "product_name": "монитор 24 дюйма", "quantity": 2 }))
            .expect("conforming");
    }

    #[test]
    fn reports_missing_before_unexpected() {
        let err = product_shape()
            .validate(&json!({ "wrong_field": 1, "quantity": 1 }))
            .expect_err("missing product_name");
        assert_eq!(err, ShapeViolation::MissingField("product_name".into()));
    }

    #[test]
    fn rejects_undeclared_fields() {
        let err = product_shape()
            .validate(&json!({ "product_name": "x", "quantity": 1, "warehouse": "main" }))
            .expect_err("extra field");
        assert_eq!(err, ShapeViolation::UnexpectedField("warehouse".into()));
    }

    #[test]
    fn integer_fields_reject_fractions_and_strings() {
        let shape = product_shape();
        let err = shape
            .validate(&json!({ "product_name": "x", "quantity": 1.5 }))
            .expect_err("fraction");
        assert!(matches!(err, ShapeViolation::TypeMismatch { found: "float", .. }));

        let err = shape
            .validate(&json!({ "product_name": "x", "quantity": "1" }))
            .expect_err("string");
        assert!(matches!(err, ShapeViolation::TypeMismatch { found: "string", .. }));
    }

    #[test]
    fn float_fields_accept_integers() {
        let shape = Shape::new().field("debt", FieldType::Float);
        shape.validate(&json!({ "debt": 30000 })).expect("integer is a number");
        shape.validate(&json!({ "debt": 125_430.5 })).expect("float");
        assert!(shape.validate(&json!({ "debt": null })).is_err());
    }

    #[test]
    fn non_objects_are_rejected() {
        let err = product_shape().validate(&json!(["x"])).expect_err("array");
        assert_eq!(err, ShapeViolation::NotAnObject { found: "array" });
    }

    #[test]
    fn declaration_check_finds_duplicates() {
        let shape = Shape::new()
            .field("debt", FieldType::Float)
            .field("debt", FieldType::Integer);
        assert_eq!(shape.check(), Err(ShapeViolation::DuplicateField("debt".into())));
        assert_eq!(
            Shape::new().field(" ", FieldType::String).check(),
            Err(ShapeViolation::EmptyFieldName)
        );
    }

    #[test]
    fn renders_json_schema() {
        let schema = product_shape().to_json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["product_name"]["type"], "string");
        assert_eq!(schema["properties"]["product_name"]["description"], "Название товара");
        assert_eq!(schema["properties"]["quantity"]["type"], "integer");
        assert_eq!(schema["required"], json!(["product_name", "quantity"]));
        assert_eq!(schema["additionalProperties"], false);
    }
}
