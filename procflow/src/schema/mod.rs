//! Schema validation boundary.
//!
//! The engine never validates values itself; it invokes an injected
//! [`Schema`] and normalizes its failure. [`TypedSchema`] adapts any
//! serde-deserializable type into a validator whose parsed value carries
//! serde's defaults and coercions, and [`FnSchema`] adapts a closure.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::marker::PhantomData;
use thiserror::Error;

/// Failure raised by a schema's parse operation.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct SchemaViolation {
    /// Human-readable failure message.
    pub message: String,
    /// Structured validator detail, when available.
    pub detail: Option<Value>,
}

impl SchemaViolation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }

    /// Attaches structured detail.
    #[must_use]
    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// An externally supplied validator.
///
/// `parse` returns the validated value, which may differ from the input
/// when the validator applies defaults or coercions. The parsed value,
/// not the raw one, flows to downstream pipeline stages.
pub trait Schema: Send + Sync {
    /// Validates a value, returning the parsed form or a violation.
    fn parse(&self, value: &Value) -> Result<Value, SchemaViolation>;
}

/// A validator backed by a serde-deserializable type.
///
/// Parsing round-trips the value through `T`, so unknown-field policy,
/// `#[serde(default)]` fills, and numeric coercions declared on `T` are
/// reflected in the parsed value.
pub struct TypedSchema<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedSchema<T> {
    /// Creates a new typed schema.
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for TypedSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Schema for TypedSchema<T>
where
    T: Serialize + DeserializeOwned,
{
    fn parse(&self, value: &Value) -> Result<Value, SchemaViolation> {
        let typed: T = serde_json::from_value(value.clone())
            .map_err(|e| SchemaViolation::new(e.to_string()))?;
        serde_json::to_value(&typed).map_err(|e| SchemaViolation::new(e.to_string()))
    }
}

/// A validator backed by a closure.
pub struct FnSchema<F> {
    parse_fn: F,
}

impl<F> FnSchema<F>
where
    F: Fn(&Value) -> Result<Value, SchemaViolation> + Send + Sync,
{
    /// Creates a new closure-backed schema.
    #[must_use]
    pub fn new(parse_fn: F) -> Self {
        Self { parse_fn }
    }
}

impl<F> Schema for FnSchema<F>
where
    F: Fn(&Value) -> Result<Value, SchemaViolation> + Send + Sync,
{
    fn parse(&self, value: &Value) -> Result<Value, SchemaViolation> {
        (self.parse_fn)(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Payload {
        name: String,
        #[serde(default)]
        verbose: bool,
    }

    #[test]
    fn test_typed_schema_accepts_valid_value() {
        let schema = TypedSchema::<Payload>::new();
        let parsed = schema
            .parse(&serde_json::json!({"name": "ada", "verbose": true}))
            .unwrap();
        assert_eq!(parsed, serde_json::json!({"name": "ada", "verbose": true}));
    }

    #[test]
    fn test_typed_schema_applies_defaults() {
        let schema = TypedSchema::<Payload>::new();
        let parsed = schema.parse(&serde_json::json!({"name": "ada"})).unwrap();
        assert_eq!(parsed.get("verbose"), Some(&serde_json::json!(false)));
    }

    #[test]
    fn test_typed_schema_rejects_wrong_type() {
        let schema = TypedSchema::<Payload>::new();
        let err = schema.parse(&serde_json::json!({"name": 123})).unwrap_err();
        assert!(!err.message.is_empty());
    }

    #[test]
    fn test_fn_schema() {
        let schema = FnSchema::new(|value: &Value| {
            if value.get("ok").is_some() {
                Ok(value.clone())
            } else {
                Err(SchemaViolation::new("missing 'ok'")
                    .with_detail(serde_json::json!({"missing": "ok"})))
            }
        });

        assert!(schema.parse(&serde_json::json!({"ok": 1})).is_ok());
        let err = schema.parse(&serde_json::json!({})).unwrap_err();
        assert_eq!(err.message, "missing 'ok'");
        assert_eq!(err.detail, Some(serde_json::json!({"missing": "ok"})));
    }

    #[test]
    fn test_schema_is_object_safe() {
        let passthrough: Box<dyn Schema> = Box::new(FnSchema::new(|v: &Value| Ok(v.clone())));
        let value = serde_json::json!({"name": "x"});
        assert_eq!(passthrough.parse(&value).unwrap(), value);

        let typed: Box<dyn Schema> = Box::new(TypedSchema::<Payload>::new());
        assert!(typed.parse(&serde_json::json!("not an object")).is_err());
    }
}
