//! Implementation of the `#[derive(Introspect)]` macro.
//!
//! This module generates `fstring::Introspectable` impls from struct fields
//! and `#[introspect(...)]` annotations.

mod attrs;
mod derive;

pub use derive::introspect_derive_impl;
