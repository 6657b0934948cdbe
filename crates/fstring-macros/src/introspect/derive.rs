//! Implementation of the `#[derive(Introspect)]` macro.
//!
//! Generates an `Introspectable` impl whose accessor table lists the
//! struct's fields followed by the registered methods and getters. Each
//! entry gets a slot number; `resolve_accessor` maps names to slots and
//! `invoke` maps slots back to a field read or a method call.

use std::collections::HashSet;

use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    ext::IdentExt, parse_quote, spanned::Spanned, Data, DeriveInput, Error, Fields, GenericParam,
    Ident, Result,
};

use super::attrs::{parse_container_attrs, parse_field_attrs};

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum EntryKind {
    Field,
    Method,
}

/// One row of the generated accessor table.
struct Entry {
    kind: EntryKind,
    name: String,
    read: TokenStream,
}

/// Main implementation of the Introspect derive macro.
pub fn introspect_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Introspect can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Introspect can only be derived for structs",
            ))
        }
    };

    if let Some(lifetime) = input.generics.lifetimes().next() {
        return Err(Error::new(
            lifetime.span(),
            "Introspect cannot be derived for types with lifetime parameters",
        ));
    }

    let container = parse_container_attrs(&input.attrs)?;

    let mut entries: Vec<Entry> = Vec::new();
    let mut field_types = Vec::new();
    let mut seen = HashSet::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        let name = match attrs.rename {
            Some(rename) if !is_identifier(&rename) => {
                return Err(Error::new(
                    field.span(),
                    format!(
                        "introspect rename '{}' is not a valid template identifier \
                         ([A-Za-z_][A-Za-z0-9_]*)",
                        rename
                    ),
                ))
            }
            Some(rename) => rename,
            None => field_name.unraw().to_string(),
        };
        if !seen.insert((EntryKind::Field, name.clone())) {
            return Err(Error::new(
                field.span(),
                format!("duplicate introspect field name '{}'", name),
            ));
        }

        field_types.push(&field.ty);
        entries.push(Entry {
            kind: EntryKind::Field,
            name,
            read: quote! { ::fstring::ToValue::to_value(&self.#field_name) },
        });
    }

    let methods = container
        .methods
        .iter()
        .map(|method| (method, method.unraw().to_string()));
    let getters = container
        .getters
        .iter()
        .map(|method| (method, getter_name(method)));

    for (method, name) in methods.chain(getters) {
        if !seen.insert((EntryKind::Method, name.clone())) {
            return Err(Error::new(
                method.span(),
                format!("duplicate introspect method name '{}'", name),
            ));
        }
        entries.push(Entry {
            kind: EntryKind::Method,
            name,
            read: quote! { ::fstring::ToValue::to_value(&self.#method()) },
        });
    }

    let resolve_arms = entries.iter().enumerate().map(|(slot, entry)| {
        let slot = slot as u32;
        let name = &entry.name;
        match entry.kind {
            EntryKind::Field => quote! {
                (::fstring::AccessKind::Field, #name) => {
                    ::core::option::Option::Some(::fstring::Accessor::field(#slot, #name))
                }
            },
            EntryKind::Method => quote! {
                (::fstring::AccessKind::Method, #name) => {
                    ::core::option::Option::Some(::fstring::Accessor::method(#slot, #name))
                }
            },
        }
    });

    let invoke_arms = entries.iter().enumerate().map(|(slot, entry)| {
        let slot = slot as u32;
        let read = &entry.read;
        quote! { #slot => ::core::result::Result::Ok(#read), }
    });

    let describe = container.display.then(|| {
        quote! {
            fn describe(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(self, f)
            }
        }
    });

    let mut generics = input.generics.clone();
    let has_type_params = generics
        .params
        .iter()
        .any(|param| matches!(param, GenericParam::Type(_)));
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!(::core::marker::Send));
        param.bounds.push(parse_quote!(::core::marker::Sync));
        param.bounds.push(parse_quote!('static));
    }
    if has_type_params {
        let where_clause = generics.make_where_clause();
        for ty in &field_types {
            where_clause
                .predicates
                .push(parse_quote!(#ty: ::fstring::ToValue));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let type_name = struct_name.unraw().to_string();

    let expanded = quote! {
        impl #impl_generics ::fstring::Introspectable for #struct_name #ty_generics #where_clause {
            fn resolve_accessor(
                &self,
                name: &str,
                kind: ::fstring::AccessKind,
            ) -> ::core::option::Option<::fstring::Accessor> {
                match (kind, name) {
                    #(#resolve_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn invoke(
                &self,
                accessor: &::fstring::Accessor,
            ) -> ::core::result::Result<::fstring::Value, ::fstring::AccessError> {
                match accessor.slot() {
                    #(#invoke_arms)*
                    slot => ::core::result::Result::Err(::fstring::AccessError::UnknownSlot {
                        type_name: #type_name,
                        slot,
                    }),
                }
            }

            fn type_name(&self) -> &'static str {
                #type_name
            }

            #describe
        }
    };

    Ok(expanded)
}

/// Matches `[A-Za-z_][A-Za-z0-9_]*`, the only names a template path can reach.
fn is_identifier(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_alphabetic() || first == b'_' => {
            bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
        }
        _ => false,
    }
}

/// `age` -> `getAge`.
fn getter_name(method: &Ident) -> String {
    let name = method.unraw().to_string();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("get{}{}", first.to_uppercase(), chars.as_str()),
        None => String::from("get"),
    }
}
