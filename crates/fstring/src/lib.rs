//! fstring - Named-placeholder string templates.
//!
//! fstring substitutes `{name}` placeholders in a template with values from a
//! [`ValueMap`]. It supports:
//!
//! - Escaped braces: `{{` and `}}` render as `{` and `}`
//! - Accessor chains: `{user.name}`, `{user.display_name()}`, with a
//!   `getName()` fallback when a field is missing
//! - Format specs: `{price:>8.2f}`, `{count:<4d}`, `{title:.10}`
//! - Caching of rendered output and of resolved accessors per engine
//!
//! # Quick Start
//!
//! ```rust
//! use fstring::{Engine, Introspect, Value, value_map};
//!
//! #[derive(Introspect)]
//! #[introspect(methods(initials))]
//! struct User {
//!     name: String,
//!     age: u32,
//! }
//!
//! impl User {
//!     fn initials(&self) -> String {
//!         self.name.split(' ').filter_map(|part| part.chars().next()).collect()
//!     }
//! }
//!
//! let engine = Engine::new();
//! let values = value_map! {
//!     "user" => Value::object(User { name: "Ada Lovelace".into(), age: 36 }),
//!     "balance" => 1234.5,
//! };
//!
//! let out = engine
//!     .render("{user.name} ({user.initials()}, {user.age}): {balance:>10.2f}", &values)
//!     .unwrap();
//! assert_eq!(out, "Ada Lovelace (AL, 36):    1234.50");
//! ```
//!
//! # Template Syntax
//!
//! ```text
//! placeholder := "{" path [ ":" format ] "}"
//! path        := ident ( "." ident [ "()" ] )*
//! format      := [ "<" | ">" ] [ width ] [ "." precision ] [ type ]
//! ```
//!
//! | Type | Meaning |
//! |------|---------|
//! | `f` | fixed point, `precision` fractional digits (default 6) |
//! | `d` | integer |
//! | anything else | text, truncated to `precision` characters |
//!
//! A `null` anywhere in a chain ends it: `{user.manager.name}` renders
//! `null` when `manager` is null. A name missing from the value map is an
//! error.
//!
//! # Caching
//!
//! Each [`Engine`] keeps two caches, both insert-only and safe to share
//! between threads:
//!
//! - the render cache, whose behavior is set by [`RenderCacheMode`]. The
//!   default, `Output`, keys rendered strings by the template and the value
//!   *names* only, so the first result is reused for later values;
//! - the accessor cache, keyed by the receiver's type and segment.
//!
//! [`render`] uses a process-wide default engine.

mod cache;
mod config;
mod engine;
mod error;
mod format;
mod introspect;
mod json;
mod parser;
mod path;
mod resolve;
mod value;

// Re-export public API
pub use config::{EngineConfig, RenderCacheMode};
pub use engine::{render, CacheStats, Engine};
pub use error::{AccessError, FormatError, Result};
pub use format::{apply_format, Align, FormatKind, FormatSpec, SpecError};
pub use introspect::{AccessKind, Accessor, Introspectable};
pub use json::JsonValue;
pub use parser::{parse, Parser, PlaceholderSpec, Segment};
pub use path::{is_identifier, PathExpr, PathSegment};
pub use value::{Number, ToValue, Value, ValueMap};

pub use fstring_macros::Introspect;
