//! Error types for template formatting.
//!
//! Every failure of a render call surfaces as a [`FormatError`]. Accessor
//! failures inside a dotted chain carry an [`AccessError`] as their source.

use thiserror::Error;

/// Errors raised while parsing, resolving or formatting a template.
#[derive(Debug, Error)]
pub enum FormatError {
    /// A `{` opened a placeholder that is never closed.
    #[error("unmatched '{{' at offset {offset}")]
    UnmatchedBrace { offset: usize },

    /// A `}` appeared outside a placeholder without being doubled.
    #[error("stray '}}' at offset {offset}")]
    StrayCloseBrace { offset: usize },

    /// A placeholder with nothing but whitespace inside.
    #[error("empty placeholder at offset {offset}")]
    EmptyPlaceholder { offset: usize },

    /// The path expression is not `ident(.ident(())?)*`.
    #[error(
        "unsupported expression '{expression}': only property or method access \
         such as user.name or user.age() is supported"
    )]
    UnsupportedExpression { expression: String },

    /// A simple identifier or the root of a chain is absent from the value map.
    #[error("key '{key}' not found in value map")]
    KeyNotFound { key: String },

    /// A chain segment could not be read from its receiver.
    #[error("expression '{expression}' failed to access '{segment}': {source}")]
    Access {
        expression: String,
        segment: String,
        #[source]
        source: AccessError,
    },

    /// The format spec is malformed or does not fit the resolved value.
    #[error("invalid format '{format}' for value '{value}': {reason}")]
    InvalidFormat {
        format: String,
        value: String,
        reason: &'static str,
    },

    /// Input data could not be turned into a value map.
    #[error("invalid values: {message}")]
    InvalidValues { message: String },

    /// Engine configuration could not be loaded.
    #[error("invalid engine configuration: {message}")]
    InvalidConfig { message: String },
}

impl From<serde_json::Error> for FormatError {
    fn from(err: serde_json::Error) -> Self {
        FormatError::InvalidValues {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for FormatError {
    fn from(err: serde_yaml::Error) -> Self {
        FormatError::InvalidConfig {
            message: err.to_string(),
        }
    }
}

/// Why a single accessor lookup or invocation failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// Neither a field nor a getter with the requested name exists.
    #[error("{type_name} has no field '{field}' and no getter '{getter}()'")]
    NoFieldOrGetter {
        type_name: &'static str,
        field: String,
        getter: String,
    },

    /// No zero-argument method with the requested name exists.
    #[error("{type_name} has no method '{method}()'")]
    NoMethod {
        type_name: &'static str,
        method: String,
    },

    /// The receiver is a scalar without any accessors.
    #[error("{kind} values have no accessors")]
    NotIntrospectable { kind: &'static str },

    /// The engine configuration forbids this access.
    #[error("access to '{name}' is not allowed")]
    Denied { name: String },

    /// An accessor was handed to a receiver that does not know its slot.
    #[error("{type_name} has no accessor in slot {slot}")]
    UnknownSlot { type_name: &'static str, slot: u32 },

    /// The accessor exists but reading it failed.
    #[error("{message}")]
    Failed { message: String },
}

/// Result type for formatting operations.
pub type Result<T> = std::result::Result<T, FormatError>;
