// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `#[codec(...)]` attribute parsing, for both fields and enum containers.

use syn::{Attribute, Lit};

/// Parsed `#[codec(...)]` options on a record field.
#[derive(Default)]
pub struct FieldAttrs {
    /// `#[codec(rename = "...")]` — overrides the wire name.
    pub rename: Option<String>,
    /// `#[codec(default)]` — use `Default::default()` when absent on decode.
    pub default: bool,
    /// `#[codec(default = "path::to::fn")]` — call the named function when absent on decode.
    pub default_fn: Option<syn::Path>,
}

/// Parsed `#[codec(...)]` options on a flat enum container.
pub enum EnumRepr {
    ByName,
    ByOrdinal,
    ByProjection(syn::Ident),
}

impl Default for EnumRepr {
    fn default() -> Self {
        EnumRepr::ByName
    }
}

pub fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut out = FieldAttrs::default();
    for attr in attrs {
        if !attr.path().is_ident("codec") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value = meta.value()?;
                let lit: Lit = value.parse()?;
                if let Lit::Str(s) = lit {
                    out.rename = Some(s.value());
                    Ok(())
                } else {
                    Err(meta.error("rename expects a string literal"))
                }
            } else if meta.path.is_ident("default") {
                if meta.input.peek(syn::Token![=]) {
                    let value = meta.value()?;
                    let lit: Lit = value.parse()?;
                    if let Lit::Str(s) = lit {
                        out.default_fn = Some(s.parse()?);
                        out.default = true;
                        Ok(())
                    } else {
                        Err(meta.error("default expects a string literal function path"))
                    }
                } else {
                    out.default = true;
                    Ok(())
                }
            } else {
                Err(meta.error("unrecognized #[codec(...)] field option"))
            }
        })?;
    }
    Ok(out)
}

pub fn parse_enum_repr(attrs: &[Attribute]) -> syn::Result<EnumRepr> {
    let mut repr = EnumRepr::default();
    for attr in attrs {
        if !attr.path().is_ident("codec") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("by_name") {
                repr = EnumRepr::ByName;
                Ok(())
            } else if meta.path.is_ident("by_ordinal") {
                repr = EnumRepr::ByOrdinal;
                Ok(())
            } else if meta.path.is_ident("by_projection") {
                let value = meta.value()?;
                let lit: Lit = value.parse()?;
                if let Lit::Str(s) = lit {
                    repr = EnumRepr::ByProjection(s.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("by_projection expects a string literal method name"))
                }
            } else {
                Err(meta.error("unrecognized #[codec(...)] enum option"))
            }
        })?;
    }
    Ok(repr)
}
