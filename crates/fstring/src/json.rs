//! JSON objects and arrays as template values.
//!
//! Serializable data enters the engine through [`ValueMap::from_serialize`]
//! or `Value::from(serde_json::Value)`. Scalars map to scalar values; objects
//! and arrays are wrapped in [`JsonValue`] so chains like `{user.name}` read
//! object keys.
//!
//! [`ValueMap::from_serialize`]: crate::ValueMap::from_serialize

use std::fmt;

use crate::error::AccessError;
use crate::introspect::{AccessKind, Accessor, Introspectable};
use crate::value::Value;

const KEY_SLOT: u32 = 0;
const LEN_SLOT: u32 = 1;
const IS_EMPTY_SLOT: u32 = 2;

/// A JSON object or array exposed to dotted chains.
///
/// Every field name resolves for this type, since keys vary per instance; a
/// key missing on a particular object fails when the accessor is invoked.
/// `len()` and `is_empty()` work on both objects and arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonValue(serde_json::Value);

impl JsonValue {
    pub fn new(value: serde_json::Value) -> Self {
        JsonValue(value)
    }

    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }

    fn len(&self) -> Result<usize, AccessError> {
        match &self.0 {
            serde_json::Value::Array(items) => Ok(items.len()),
            serde_json::Value::Object(map) => Ok(map.len()),
            other => Err(AccessError::Failed {
                message: format!("{} has no length", json_kind(other)),
            }),
        }
    }
}

impl Introspectable for JsonValue {
    fn resolve_accessor(&self, name: &str, kind: AccessKind) -> Option<Accessor> {
        match (kind, name) {
            (AccessKind::Field, key) => Some(Accessor::field(KEY_SLOT, key.to_owned())),
            (AccessKind::Method, "len") => Some(Accessor::method(LEN_SLOT, "len")),
            (AccessKind::Method, "is_empty") => Some(Accessor::method(IS_EMPTY_SLOT, "is_empty")),
            _ => None,
        }
    }

    fn invoke(&self, accessor: &Accessor) -> Result<Value, AccessError> {
        match accessor.slot() {
            KEY_SLOT => match &self.0 {
                serde_json::Value::Object(map) => map
                    .get(accessor.name())
                    .map(|value| Value::from(value.clone()))
                    .ok_or_else(|| AccessError::Failed {
                        message: format!("object has no key '{}'", accessor.name()),
                    }),
                other => Err(AccessError::Failed {
                    message: format!("{} has no key '{}'", json_kind(other), accessor.name()),
                }),
            },
            LEN_SLOT => self.len().map(Value::from),
            IS_EMPTY_SLOT => self.len().map(|len| Value::Bool(len == 0)),
            slot => Err(AccessError::UnknownSlot {
                type_name: self.type_name(),
                slot,
            }),
        }
    }

    fn type_name(&self) -> &'static str {
        "JsonValue"
    }

    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of a JSON value's kind for messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn read(value: &JsonValue, name: &str, kind: AccessKind) -> Result<Value, AccessError> {
        let accessor = value
            .resolve_accessor(name, kind)
            .expect("accessor resolves");
        value.invoke(&accessor)
    }

    #[test]
    fn object_keys_are_fields() {
        let user = JsonValue::new(json!({"name": "Ada", "manager": null}));
        assert_eq!(read(&user, "name", AccessKind::Field), Ok(Value::from("Ada")));
        assert_eq!(read(&user, "manager", AccessKind::Field), Ok(Value::Null));
    }

    #[test]
    fn missing_key_fails_on_invoke() {
        let user = JsonValue::new(json!({"name": "Ada"}));
        let err = read(&user, "email", AccessKind::Field).unwrap_err();
        assert!(err.to_string().contains("email"));
    }

    #[test]
    fn arrays_have_no_keys() {
        let items = JsonValue::new(json!([1, 2, 3]));
        let err = read(&items, "first", AccessKind::Field).unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn length_methods() {
        let items = JsonValue::new(json!([1, 2, 3]));
        assert_eq!(read(&items, "len", AccessKind::Method), Ok(Value::from(3usize)));
        assert_eq!(
            read(&items, "is_empty", AccessKind::Method),
            Ok(Value::Bool(false))
        );

        let empty = JsonValue::new(json!({}));
        assert_eq!(
            read(&empty, "is_empty", AccessKind::Method),
            Ok(Value::Bool(true))
        );
        assert!(empty.resolve_accessor("keys", AccessKind::Method).is_none());
    }

    #[test]
    fn describes_as_compact_json() {
        let value = Value::object(JsonValue::new(json!({"a": [1, "b"]})));
        assert_eq!(value.to_string(), r#"{"a":[1,"b"]}"#);
    }
}
