// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Procedural derive backing `bsoncodec`.
//!
//! `#[derive(Codec)]` dispatches on shape:
//! - a struct with named fields -> the Record Codec Generator (`record` module),
//! - an enum whose variants are all single unnamed fields wrapping distinct types -> the Sealed
//!   Codec Generator (`sealed` module),
//! - an enum whose variants are all unit variants -> the Enum Codec Provider (`enum_codec`
//!   module).
//!
//! Any other shape (tuple/unit struct, union, mixed-variant enum) is a derivation-time error.

mod attrs;
mod enum_codec;
mod record;
mod sealed;
mod shape;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use proc_macro_crate::{crate_name, FoundCrate};
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

/// Resolve the path to the `bsoncodec` crate as seen from the derive target's crate, falling
/// back to `crate` when this derive is expanded inside `bsoncodec` itself (its own tests).
pub(crate) fn crate_path() -> TokenStream2 {
    match crate_name("bsoncodec") {
        Ok(FoundCrate::Itself) => quote!(crate),
        Ok(FoundCrate::Name(name)) => {
            let ident = syn::Ident::new(&name, proc_macro2::Span::call_site());
            quote!(::#ident)
        }
        Err(_) => quote!(::bsoncodec),
    }
}

#[proc_macro_derive(Codec, attributes(codec))]
pub fn derive_codec(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => record::expand_record(&input, named),
            _ => Err(syn::Error::new_spanned(
                &input.ident,
                "#[derive(Codec)] requires a struct with named fields (tuple/unit structs are not records)",
            )),
        },
        Data::Enum(data) => {
            if sealed::is_sealed_shape(data) {
                sealed::expand_sealed(&input, data)
            } else if enum_codec::is_flat_shape(data) {
                enum_codec::expand_enum(&input, data)
            } else {
                Err(syn::Error::new_spanned(
                    &input.ident,
                    "#[derive(Codec)] on an enum requires either all-unit variants (a flat enum) \
                     or all single-unnamed-field variants wrapping distinct record types (a sealed enum)",
                ))
            }
        }
        Data::Union(_) => Err(syn::Error::new_spanned(
            &input.ident,
            "#[derive(Codec)] does not support unions",
        )),
    }
}
