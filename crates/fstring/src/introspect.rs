//! Named accessors over opaque values.
//!
//! Dotted placeholders such as `{user.name}` or `{user.display_name()}` read
//! from values whose concrete type the engine does not know. Types opt in by
//! implementing [`Introspectable`], usually via `#[derive(Introspect)]`.
//!
//! Lookup is split in two steps so the engine can cache the expensive one:
//!
//! 1. [`Introspectable::resolve_accessor`] maps a name to an [`Accessor`]
//!    descriptor. The result depends only on the receiver's type, so the
//!    engine caches it per `(TypeId, segment)`.
//! 2. [`Introspectable::invoke`] reads the accessor on a specific receiver.
//!
//! # Manual Implementation
//!
//! ```
//! use fstring::{AccessError, AccessKind, Accessor, Introspectable, Value};
//!
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl Point {
//!     fn norm1(&self) -> i32 {
//!         self.x.abs() + self.y.abs()
//!     }
//! }
//!
//! impl Introspectable for Point {
//!     fn resolve_accessor(&self, name: &str, kind: AccessKind) -> Option<Accessor> {
//!         match (kind, name) {
//!             (AccessKind::Field, "x") => Some(Accessor::field(0, "x")),
//!             (AccessKind::Field, "y") => Some(Accessor::field(1, "y")),
//!             (AccessKind::Method, "norm1") => Some(Accessor::method(2, "norm1")),
//!             _ => None,
//!         }
//!     }
//!
//!     fn invoke(&self, accessor: &Accessor) -> Result<Value, AccessError> {
//!         match accessor.slot() {
//!             0 => Ok(self.x.into()),
//!             1 => Ok(self.y.into()),
//!             2 => Ok(self.norm1().into()),
//!             slot => Err(AccessError::UnknownSlot { type_name: self.type_name(), slot }),
//!         }
//!     }
//! }
//! ```

use std::any::Any;
use std::borrow::Cow;
use std::fmt;

use crate::error::AccessError;
use crate::value::Value;

/// Whether a path segment reads a field or calls a zero-argument method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    /// Plain `name` segment.
    Field,
    /// `name()` segment, or the `getName` fallback for a missing field.
    Method,
}

/// A resolved accessor: which slot of the receiver's table to read.
///
/// Accessors are plain descriptors. They are only meaningful for the type
/// that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessor {
    kind: AccessKind,
    slot: u32,
    name: Cow<'static, str>,
}

impl Accessor {
    /// A field accessor.
    pub fn field(slot: u32, name: impl Into<Cow<'static, str>>) -> Self {
        Accessor {
            kind: AccessKind::Field,
            slot,
            name: name.into(),
        }
    }

    /// A zero-argument method accessor.
    pub fn method(slot: u32, name: impl Into<Cow<'static, str>>) -> Self {
        Accessor {
            kind: AccessKind::Method,
            slot,
            name: name.into(),
        }
    }

    pub fn kind(&self) -> AccessKind {
        self.kind
    }

    pub fn slot(&self) -> u32 {
        self.slot
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A type whose fields and zero-argument methods can be read by name.
///
/// Implementations must be deterministic per type: the engine caches the
/// result of [`resolve_accessor`](Self::resolve_accessor) for every value of
/// the same concrete type, so an accessor resolved on one instance is later
/// invoked on others.
pub trait Introspectable: Any + Send + Sync {
    /// Resolves `name` to an accessor, or `None` if the type has no such
    /// field or method.
    fn resolve_accessor(&self, name: &str, kind: AccessKind) -> Option<Accessor>;

    /// Reads `accessor` on this receiver.
    fn invoke(&self, accessor: &Accessor) -> Result<Value, AccessError>;

    /// Type name used in error messages.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Textual representation used when the object itself is substituted.
    ///
    /// Defaults to the short type name.
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(short_type_name(self.type_name()))
    }
}

/// Strips the module path from a type name: `app::model::User` -> `User`.
pub(crate) fn short_type_name(name: &str) -> &str {
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base)
}

const STRING_METHODS: [&str; 5] = ["len", "is_empty", "to_uppercase", "to_lowercase", "trim"];

/// Built-in methods on string values: `len()` (in characters),
/// `is_empty()`, `to_uppercase()`, `to_lowercase()` and `trim()`.
impl Introspectable for String {
    fn resolve_accessor(&self, name: &str, kind: AccessKind) -> Option<Accessor> {
        if kind != AccessKind::Method {
            return None;
        }
        let slot = STRING_METHODS.iter().position(|method| *method == name)?;
        Some(Accessor::method(slot as u32, STRING_METHODS[slot]))
    }

    fn invoke(&self, accessor: &Accessor) -> Result<Value, AccessError> {
        match accessor.slot() {
            0 => Ok(self.chars().count().into()),
            1 => Ok(self.is_empty().into()),
            2 => Ok(self.to_uppercase().into()),
            3 => Ok(self.to_lowercase().into()),
            4 => Ok(self.trim().into()),
            slot => Err(AccessError::UnknownSlot {
                type_name: self.type_name(),
                slot,
            }),
        }
    }

    fn type_name(&self) -> &'static str {
        "String"
    }

    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unit;

    impl Introspectable for Unit {
        fn resolve_accessor(&self, _name: &str, _kind: AccessKind) -> Option<Accessor> {
            None
        }

        fn invoke(&self, accessor: &Accessor) -> Result<Value, AccessError> {
            Err(AccessError::UnknownSlot {
                type_name: self.type_name(),
                slot: accessor.slot(),
            })
        }
    }

    #[test]
    fn accessor_constructors() {
        let field = Accessor::field(3, "name");
        assert_eq!(field.kind(), AccessKind::Field);
        assert_eq!(field.slot(), 3);
        assert_eq!(field.name(), "name");

        let method = Accessor::method(0, String::from("dynamic"));
        assert_eq!(method.kind(), AccessKind::Method);
        assert_eq!(method.name(), "dynamic");
    }

    #[test]
    fn short_type_names() {
        assert_eq!(short_type_name("app::model::User"), "User");
        assert_eq!(short_type_name("User"), "User");
        assert_eq!(short_type_name("app::Wrapper<app::User>"), "Wrapper");
    }

    #[test]
    fn default_describe_uses_short_type_name() {
        let value = Value::object(Unit);
        assert_eq!(value.to_string(), "Unit");
        assert!(Unit.type_name().ends_with("Unit"));
    }

    #[test]
    fn string_builtins() {
        let s = String::from("  Hé  ");
        let read = |name: &str| {
            let accessor = s
                .resolve_accessor(name, AccessKind::Method)
                .expect("built-in method");
            s.invoke(&accessor).unwrap()
        };

        assert_eq!(read("len"), Value::from(6usize));
        assert_eq!(read("is_empty"), Value::Bool(false));
        assert_eq!(read("to_uppercase"), Value::from("  HÉ  "));
        assert_eq!(read("to_lowercase"), Value::from("  hé  "));
        assert_eq!(read("trim"), Value::from("Hé"));
    }

    #[test]
    fn string_has_no_fields() {
        let s = String::from("x");
        assert!(s.resolve_accessor("len", AccessKind::Field).is_none());
        assert!(s.resolve_accessor("split", AccessKind::Method).is_none());
    }
}
