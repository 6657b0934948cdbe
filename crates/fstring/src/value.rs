//! Runtime values substituted into templates.
//!
//! The [`Value`] enum is what placeholders resolve to. Scalars are stored
//! inline; anything else is an opaque [`Introspectable`] object behind an
//! `Arc`, reachable through dotted accessor chains.
//!
//! [`ValueMap`] maps placeholder names to values. A key that is present with
//! [`Value::Null`] is different from a key that is absent: the former renders
//! as `null`, the latter fails with [`FormatError::KeyNotFound`].

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::{FormatError, Result};
use crate::introspect::{short_type_name, Introspectable};
use crate::json::{json_kind, JsonValue};

/// A value that can be substituted into a template.
///
/// # Example
///
/// ```
/// use fstring::{Value, Number};
///
/// assert_eq!(Value::from(3).to_string(), "3");
/// assert_eq!(Value::from(2.0).to_string(), "2.0");
/// assert_eq!(Value::from("hi").to_string(), "hi");
/// assert_eq!(Value::Null.to_string(), "null");
/// assert_eq!(Value::from(7u8), Value::Number(Number::U64(7)));
/// ```
#[derive(Clone)]
pub enum Value {
    /// Present but empty. Renders as `null`.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(Number),
    /// Owned string value.
    String(String),
    /// Opaque object exposing accessors.
    Object(Arc<dyn Introspectable>),
}

impl Value {
    /// Wraps an introspectable value as an object.
    pub fn object<T: Introspectable>(value: T) -> Self {
        Value::Object(Arc::new(value))
    }

    /// Returns `true` if this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the number value, if present.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extracts the object, if present.
    pub fn as_object(&self) -> Option<&dyn Introspectable> {
        match self {
            Value::Object(object) => Some(object.as_ref()),
            _ => None,
        }
    }

    /// Short name of the value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(_) => "object",
        }
    }

    /// The receiver used to resolve the next segment of a dotted chain.
    ///
    /// Strings carry a small set of built-in methods; numbers, booleans and
    /// null have no accessors.
    pub(crate) fn receiver(&self) -> Option<&dyn Introspectable> {
        match self {
            Value::String(s) => Some(s as &dyn Introspectable),
            Value::Object(object) => Some(object.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => fmt::Display::fmt(n, f),
            Value::String(s) => f.write_str(s),
            Value::Object(object) => object.describe(f),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Object(object) => f
                .debug_tuple("Object")
                .field(&short_type_name(object.type_name()))
                .finish(),
        }
    }
}

/// Objects compare by identity; everything else by value.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            _ => false,
        }
    }
}

/// Numeric value preserving the signedness of its source.
///
/// - `I64` for signed integers
/// - `U64` for unsigned integers
/// - `F64` for floating point
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Returns `true` for the integer variants.
    pub fn is_integer(self) -> bool {
        !matches!(self, Number::F64(_))
    }
}

/// Floats always keep a fractional part (`3.0`, not `3`).
impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{}", n),
            Number::U64(n) => write!(f, "{}", n),
            Number::F64(n) => write!(f, "{:?}", n),
        }
    }
}

/// Conversion of a borrowed Rust value into a [`Value`].
///
/// This is what `#[derive(Introspect)]` calls on fields and method results,
/// so every field of a derived type must implement it. Nested objects are
/// held as `Arc<T>` (optionally inside `Option`), which keeps accessor reads
/// cheap.
pub trait ToValue {
    /// Converts `self` into an owned value.
    fn to_value(&self) -> Value;
}

macro_rules! number_conversions {
    ($($ty:ty => $variant:ident as $target:ty),* $(,)?) => {
        $(
            impl From<$ty> for Number {
                fn from(n: $ty) -> Self {
                    Number::$variant(n as $target)
                }
            }

            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Number(Number::from(n))
                }
            }

            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::from(*self)
                }
            }
        )*
    };
}

number_conversions! {
    i8 => I64 as i64,
    i16 => I64 as i64,
    i32 => I64 as i64,
    i64 => I64 as i64,
    isize => I64 as i64,
    u8 => U64 as u64,
    u16 => U64 as u64,
    u32 => U64 as u64,
    u64 => U64 as u64,
    usize => U64 as u64,
    f32 => F64 as f64,
    f64 => F64 as f64,
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::String(c.to_string())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T: Introspectable> From<Arc<T>> for Value {
    fn from(object: Arc<T>) -> Self {
        Value::Object(object)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Number(Number::I64(i))
                } else if let Some(u) = n.as_u64() {
                    Value::Number(Number::U64(u))
                } else {
                    n.as_f64().map_or(Value::Null, |f| Value::Number(Number::F64(f)))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            nested => Value::object(JsonValue::new(nested)),
        }
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl ToValue for char {
    fn to_value(&self) -> Value {
        Value::from(*self)
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::from(self)
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, ToValue::to_value)
    }
}

impl<T: Introspectable> ToValue for Arc<T> {
    fn to_value(&self) -> Value {
        Value::Object(self.clone())
    }
}

impl ToValue for serde_json::Value {
    fn to_value(&self) -> Value {
        Value::from(self.clone())
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

/// Placeholder names mapped to values.
///
/// # Example
///
/// ```
/// use fstring::{ValueMap, Value};
///
/// let values = ValueMap::new().with("name", "World").with("missing", Value::Null);
///
/// assert!(values.contains_key("missing"));
/// assert_eq!(values.get("missing"), Some(&Value::Null));
/// assert_eq!(values.get("other"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValueMap {
    entries: FxHashMap<String, Value>,
}

impl ValueMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts a value, returning the previous one under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(name.into(), value.into())
    }

    /// Looks up a value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Returns `true` if `name` is present, even when mapped to null.
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the names in arbitrary order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Builds a map from any serializable value whose JSON form is an object.
    ///
    /// Nested objects and arrays become [`JsonValue`] objects, so `{user.name}`
    /// reads the `name` key of a nested `user` object.
    ///
    /// ```
    /// use fstring::ValueMap;
    /// use serde_json::json;
    ///
    /// let values = ValueMap::from_serialize(&json!({"count": 3, "user": {"name": "Ada"}})).unwrap();
    /// assert_eq!(values.len(), 2);
    /// ```
    pub fn from_serialize<T: Serialize + ?Sized>(data: &T) -> Result<Self> {
        match serde_json::to_value(data)? {
            serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(FormatError::InvalidValues {
                message: format!("expected an object at the top level, got {}", json_kind(&other)),
            }),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for ValueMap
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ValueMap::new();
        map.extend(iter);
        map
    }
}

impl<K, V> Extend<(K, V)> for ValueMap
where
    K: Into<String>,
    V: Into<Value>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

/// Builds a [`ValueMap`] from `name => value` pairs.
///
/// ```
/// use fstring::value_map;
///
/// let values = value_map! { "a" => 1, "b" => "two" };
/// assert_eq!(values.len(), 2);
/// ```
#[macro_export]
macro_rules! value_map {
    () => {
        $crate::ValueMap::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::ValueMap::new();
        $(
            map.insert($name, $value);
        )+
        map
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_scalars() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::from(-4i32).to_string(), "-4");
        assert_eq!(Value::from(4u64).to_string(), "4");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
        assert_eq!(Value::from(3.0).to_string(), "3.0");
        assert_eq!(Value::from('x').to_string(), "x");
    }

    #[test]
    fn value_extractors() {
        assert_eq!(Value::from("hello").as_str(), Some("hello"));
        assert_eq!(Value::from(42i64).as_number(), Some(Number::I64(42)));
        assert_eq!(Value::Bool(false).as_bool(), Some(false));
        assert!(Value::Null.is_null());

        assert_eq!(Value::from("test").as_number(), None);
        assert_eq!(Value::from(1i64).as_str(), None);
        assert!(Value::from(1i64).as_object().is_none());
    }

    #[test]
    fn number_conversions() {
        assert_eq!(Number::from(42i32), Number::I64(42));
        assert_eq!(Number::from(42u32), Number::U64(42));
        assert_eq!(Number::from(42.5f64), Number::F64(42.5));
        assert_eq!(Number::I64(3).to_f64(), 3.0);
        assert!(Number::U64(3).is_integer());
        assert!(!Number::F64(3.0).is_integer());
    }

    #[test]
    fn option_converts_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
        assert_eq!(Some(5u8).to_value(), Value::from(5u8));
        assert_eq!(None::<String>.to_value(), Value::Null);
    }

    #[test]
    fn json_scalars_map_to_scalars() {
        assert_eq!(Value::from(json!(null)), Value::Null);
        assert_eq!(Value::from(json!(true)), Value::Bool(true));
        assert_eq!(Value::from(json!(-3)), Value::Number(Number::I64(-3)));
        assert_eq!(
            Value::from(json!(u64::MAX)),
            Value::Number(Number::U64(u64::MAX))
        );
        assert_eq!(Value::from(json!(0.25)), Value::Number(Number::F64(0.25)));
        assert_eq!(Value::from(json!("s")), Value::from("s"));
    }

    #[test]
    fn json_containers_become_objects() {
        let value = Value::from(json!({"a": [1, 2]}));
        assert_eq!(value.kind(), "object");
        assert_eq!(value.to_string(), r#"{"a":[1,2]}"#);
    }

    #[test]
    fn objects_compare_by_identity() {
        let shared = Value::from(json!([1]));
        assert_eq!(shared, shared.clone());
        assert_ne!(shared, Value::from(json!([1])));
    }

    #[test]
    fn value_map_distinguishes_null_from_absent() {
        let values = ValueMap::new().with("a", Value::Null);
        assert!(values.contains_key("a"));
        assert!(!values.contains_key("b"));
        assert_eq!(values.get("a"), Some(&Value::Null));
    }

    #[test]
    fn value_map_from_iterator_and_macro() {
        let collected: ValueMap = vec![("x", 1), ("y", 2)].into_iter().collect();
        assert_eq!(collected.len(), 2);

        let built = value_map! { "x" => 1, "y" => "two", };
        let mut names: Vec<&str> = built.names().collect();
        names.sort_unstable();
        assert_eq!(names, ["x", "y"]);

        assert!(value_map! {}.is_empty());
    }

    #[test]
    fn from_serialize_requires_object() {
        #[derive(Serialize)]
        struct Data {
            name: &'static str,
            count: u32,
        }

        let values = ValueMap::from_serialize(&Data {
            name: "Ada",
            count: 2,
        })
        .unwrap();
        assert_eq!(values.get("name"), Some(&Value::from("Ada")));
        assert_eq!(values.get("count"), Some(&Value::Number(Number::I64(2))));

        let err = ValueMap::from_serialize(&[1, 2]).unwrap_err();
        assert!(err.to_string().contains("array"));
    }
}
