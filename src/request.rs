//! Request body construction and serialization.
//!
//! The [`RequestBody`] record is derived from an operation during
//! configuration resolution; [`serialize`] validates it and produces the
//! JSON payload handed to the transport. Validation failures surface
//! synchronously, before any transport call is attempted, and are delivered
//! through the stream's error channel.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::link::SerializationError;

/// The logical request payload for one invocation.
///
/// Only `query`, `variables`, `operationName`, and `extensions` are emitted
/// as top-level keys in the serialized form, each omitted when absent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    /// The query document.
    pub query: String,
    /// The operation variables; must be a flat mapping when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
    /// The operation name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    /// The operation extensions, present only when configuration enabled
    /// them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
}

/// Validates and serializes a request body to its JSON wire form.
///
/// # Errors
///
/// Returns [`SerializationError::MissingQuery`] when the query document is
/// empty, and [`SerializationError::Variables`] when the variables are not
/// representable as a flat mapping from name to value.
pub fn serialize(body: &RequestBody) -> Result<String, SerializationError> {
    if body.query.trim().is_empty() {
        return Err(SerializationError::MissingQuery);
    }
    if let Some(variables) = &body.variables {
        if !variables.is_object() {
            return Err(SerializationError::Variables {
                found: value_kind(variables),
            });
        }
    }

    // RequestBody contains no map keys that can fail to serialize, so this
    // cannot error once the shape checks above have passed.
    serde_json::to_string(body).map_err(|source| SerializationError::Encode {
        message: source.to_string(),
    })
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
