//! Attribute parsing for the Introspect derive macro.
//!
//! Field attributes: `#[introspect(skip)]`, `#[introspect(rename = "x")]`.
//!
//! Container attributes: `#[introspect(methods(a, b))]`,
//! `#[introspect(getters(age))]` and `#[introspect(display)]`. Container
//! attributes may be split over several `#[introspect(...)]` lines.

use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Expr, ExprLit, Ident, Lit, Meta, Result, Token,
};

/// Field-level attributes from `#[introspect(...)]`.
#[derive(Debug, Clone, Default)]
pub struct FieldAttr {
    /// Leave the field out of the accessor table.
    pub skip: bool,
    /// Name used in templates (default: the field name).
    pub rename: Option<String>,
}

impl Parse for FieldAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("skip") => attr.skip = true,

                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    if let Expr::Lit(ExprLit {
                        lit: Lit::Str(s), ..
                    }) = &nv.value
                    {
                        attr.rename = Some(s.value());
                    } else {
                        return Err(Error::new(
                            nv.value.span(),
                            "rename must be a string literal",
                        ));
                    }
                }

                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown introspect field attribute. Expected: skip or rename = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Container-level attributes from `#[introspect(...)]` on the struct.
#[derive(Debug, Clone, Default)]
pub struct ContainerAttr {
    /// Zero-argument methods callable as `name()`.
    pub methods: Vec<Ident>,
    /// Zero-argument methods exposed under `getName`.
    pub getters: Vec<Ident>,
    /// Use the type's `Display` impl when the object itself is rendered.
    pub display: bool,
}

impl ContainerAttr {
    fn merge(&mut self, other: ContainerAttr) {
        self.methods.extend(other.methods);
        self.getters.extend(other.getters);
        self.display |= other.display;
    }
}

impl Parse for ContainerAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = ContainerAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("display") => attr.display = true,

                Meta::List(list) if list.path.is_ident("methods") => {
                    let idents =
                        list.parse_args_with(Punctuated::<Ident, Token![,]>::parse_terminated)?;
                    attr.methods.extend(idents);
                }

                Meta::List(list) if list.path.is_ident("getters") => {
                    let idents =
                        list.parse_args_with(Punctuated::<Ident, Token![,]>::parse_terminated)?;
                    attr.getters.extend(idents);
                }

                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown introspect attribute. Expected: methods(...), getters(...) or display",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Extract `#[introspect(...)]` attributes from a field's attributes.
pub fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttr> {
    for attr in attrs {
        if attr.path().is_ident("introspect") {
            return attr.parse_args::<FieldAttr>();
        }
    }
    Ok(FieldAttr::default())
}

/// Extract and merge every `#[introspect(...)]` attribute on the struct.
pub fn parse_container_attrs(attrs: &[Attribute]) -> Result<ContainerAttr> {
    let mut merged = ContainerAttr::default();
    for attr in attrs {
        if attr.path().is_ident("introspect") {
            merged.merge(attr.parse_args::<ContainerAttr>()?);
        }
    }
    Ok(merged)
}
