//! Proc macros for fstring.
//!
//! ## Derive Macros
//!
//! - [`Introspect`] - Generate the accessor table that lets templates read a
//!   struct's fields and methods through dotted placeholders
//!
//! For working examples, see `fstring/tests/derive.rs`.

mod introspect;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `fstring::Introspectable` for a struct with named fields.
///
/// Every field becomes readable from templates under its own name. Field
/// types must implement `fstring::ToValue`; mark fields that don't (or that
/// should stay private) with `#[introspect(skip)]`.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `skip` | Leave the field out |
/// | `rename = "..."` | Use a custom name in templates |
///
/// # Container Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `methods(a, b)` | Zero-argument methods callable as `{x.a()}` |
/// | `getters(age)` | Zero-argument methods found by the getter fallback, so `{x.age}` calls `age()` when there is no `age` field |
/// | `display` | Render the object itself with its `Display` impl |
///
/// Methods must take `&self` and return a type implementing `ToValue`.
///
/// # Example
///
/// ```ignore
/// use fstring::{Engine, Introspect, Value, value_map};
///
/// #[derive(Introspect)]
/// #[introspect(methods(full_name), getters(age))]
/// struct Person {
///     first: String,
///     last: String,
///     #[introspect(skip)]
///     born: u32,
/// }
///
/// impl Person {
///     fn full_name(&self) -> String {
///         format!("{} {}", self.first, self.last)
///     }
///
///     fn age(&self) -> u32 {
///         2024 - self.born
///     }
/// }
///
/// let values = value_map! {
///     "p" => Value::object(Person { first: "Ada".into(), last: "L".into(), born: 1990 }),
/// };
/// let out = Engine::new().render("{p.full_name()} is {p.age}", &values).unwrap();
/// assert_eq!(out, "Ada L is 34");
/// ```
///
/// # Compile-Time Errors
///
/// - Enums, tuple structs and unit structs
/// - Types with lifetime parameters
/// - Unknown `#[introspect(...)]` attributes
/// - Two fields, or two methods, exposed under the same name
#[proc_macro_derive(Introspect, attributes(introspect))]
pub fn introspect_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    introspect::introspect_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
