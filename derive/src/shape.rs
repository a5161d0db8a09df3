// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Classifies a field's declared Rust type into the shape its codegen branch needs.
//!
//! This is a syntactic, macro-expansion-time classification (spec.md's `type_descriptor`),
//! not a runtime one: each shape below picks a different code template. Anything not
//! recognized as a primitive or a known container falls through to `External`, which is always
//! correct (it dispatches through the registry) and simply forgoes the primitive fast path.

use syn::{GenericArgument, PathArguments, Type};

/// One of the shapes `TypeDescriptor` enumerates.
pub enum FieldShape<'a> {
    /// A name recognized by the primitive codec table.
    Primitive,
    /// `Option<Inner>`.
    Optional(&'a Type),
    /// `Vec<Inner>` (excluding `Vec<u8>`, which is the `Binary` primitive).
    Seq(&'a Type),
    /// `HashSet<Inner>` / `BTreeSet<Inner>`.
    Set(&'a Type),
    /// `HashMap<String, Inner>` / `BTreeMap<String, Inner>`.
    Map(&'a Type),
    /// Resolved through the registry at run time.
    External,
}

const PRIMITIVE_IDENTS: &[&str] = &[
    "bool", "i32", "i64", "f64", "f32", "u8", "i16", "char", "String", "Uuid", "ObjectId",
    "Decimal128", "DateTime", "i128",
];

fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(syn::TypePath { path, .. }) => path.segments.last(),
        _ => None,
    }
}

fn single_generic_arg(segment: &syn::PathSegment) -> Option<&Type> {
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        }),
        _ => None,
    }
}

fn last_generic_arg(segment: &syn::PathSegment) -> Option<&Type> {
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().rev().find_map(|arg| match arg {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        }),
        _ => None,
    }
}

/// Is this type name one the primitive codec table handles directly?
pub fn is_primitive_type_name(name: &str) -> bool {
    PRIMITIVE_IDENTS.contains(&name)
}

/// Classify a field's declared type.
pub fn classify(ty: &Type) -> FieldShape<'_> {
    let Some(segment) = last_segment(ty) else {
        return FieldShape::External;
    };
    let name = segment.ident.to_string();

    if is_primitive_type_name(&name) {
        return FieldShape::Primitive;
    }

    match name.as_str() {
        "Option" => {
            if let Some(inner) = single_generic_arg(segment) {
                return FieldShape::Optional(inner);
            }
        }
        "Vec" => {
            if let Some(inner) = single_generic_arg(segment) {
                if last_segment(inner).map(|s| s.ident == "u8").unwrap_or(false) {
                    return FieldShape::Primitive; // Vec<u8> -> Binary
                }
                return FieldShape::Seq(inner);
            }
        }
        "HashSet" | "BTreeSet" => {
            if let Some(inner) = single_generic_arg(segment) {
                return FieldShape::Set(inner);
            }
        }
        "HashMap" | "BTreeMap" => {
            if let Some(inner) = last_generic_arg(segment) {
                return FieldShape::Map(inner);
            }
        }
        _ => {}
    }

    FieldShape::External
}
