//! Path expressions: the part of a placeholder before the `:`.
//!
//! ```text
//! path    := ident ( "." ident "()"? )*
//! ident   := [A-Za-z_][A-Za-z0-9_]*
//! ```
//!
//! The root is always a plain identifier looked up in the value map. Later
//! segments read fields (`user.name`) or call zero-argument methods
//! (`user.display_name()`).

use std::borrow::Cow;

use crate::error::{FormatError, Result};

/// A validated path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr<'p> {
    root: &'p str,
    segments: Vec<PathSegment<'p>>,
}

/// One `.name` or `.name()` step after the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSegment<'p> {
    name: &'p str,
    call: bool,
}

impl<'p> PathExpr<'p> {
    /// Validates and splits `expression`.
    ///
    /// # Example
    ///
    /// ```
    /// use fstring::PathExpr;
    ///
    /// let path = PathExpr::parse("user.manager.name()").unwrap();
    /// assert_eq!(path.root(), "user");
    /// assert_eq!(path.segments().len(), 2);
    /// assert!(path.segments()[1].is_call());
    ///
    /// assert!(PathExpr::parse("a + b").is_err());
    /// ```
    pub fn parse(expression: &'p str) -> Result<Self> {
        let unsupported = || FormatError::UnsupportedExpression {
            expression: expression.to_owned(),
        };

        let mut parts = expression.split('.');
        let root = parts.next().filter(|root| is_identifier(root)).ok_or_else(unsupported)?;

        let segments = parts
            .map(|part| {
                let (name, call) = match part.strip_suffix("()") {
                    Some(name) => (name, true),
                    None => (part, false),
                };
                if is_identifier(name) {
                    Ok(PathSegment { name, call })
                } else {
                    Err(unsupported())
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(PathExpr { root, segments })
    }

    /// The identifier looked up in the value map.
    pub fn root(&self) -> &'p str {
        self.root
    }

    /// Steps applied after the root, in order.
    pub fn segments(&self) -> &[PathSegment<'p>] {
        &self.segments
    }

    /// `true` when the path is a bare identifier.
    pub fn is_simple(&self) -> bool {
        self.segments.is_empty()
    }
}

impl<'p> PathSegment<'p> {
    /// The identifier, without any `()` marker.
    pub fn name(&self) -> &'p str {
        self.name
    }

    /// `true` for `name()` segments.
    pub fn is_call(&self) -> bool {
        self.call
    }

    /// The segment as written: `name` or `name()`.
    pub fn token(&self) -> Cow<'p, str> {
        if self.call {
            Cow::Owned(format!("{}()", self.name))
        } else {
            Cow::Borrowed(self.name)
        }
    }
}

/// Returns `true` if `s` matches `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(s: &str) -> bool {
    let mut bytes = s.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_alphabetic() || first == b'_' => {
            bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
        }
        _ => false,
    }
}

/// The conventional getter for a field name: `age` -> `getAge`.
pub(crate) fn getter_name(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => format!("get{}{}", first.to_ascii_uppercase(), chars.as_str()),
        None => String::from("get"),
    }
}
