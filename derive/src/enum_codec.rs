// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Enum Codec Provider: expands `#[derive(Codec)]` on a flat, unit-variant-only enum.

use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{DataEnum, DeriveInput, Fields};

use crate::attrs::{self, EnumRepr};

pub fn is_flat_shape(data: &DataEnum) -> bool {
    !data.variants.is_empty()
        && data
            .variants
            .iter()
            .all(|v| matches!(v.fields, Fields::Unit))
}

pub fn expand_enum(input: &DeriveInput, data: &DataEnum) -> syn::Result<TokenStream2> {
    let krate = crate::crate_path();
    let ident = &input.ident;
    let codec_ident = format_ident!("__{}BsonCodec", ident);
    let repr = attrs::parse_enum_repr(&input.attrs)?;

    let variant_idents: Vec<_> = data.variants.iter().map(|v| v.ident.clone()).collect();

    let ordinal_match_arms = variant_idents.iter().enumerate().map(|(i, v)| {
        let i = i as i32;
        quote! { #i => ::std::option::Option::Some(#ident::#v), }
    });

    let (encode_body, decode_body) = match &repr {
        EnumRepr::ByName => {
            let encode_arms = variant_idents.iter().map(|v| {
                let name = v.to_string();
                quote! { #ident::#v => ::bson::Bson::String(#name.to_string()), }
            });
            let decode_arms = variant_idents.iter().map(|v| {
                let name = v.to_string();
                quote! { #name => ::std::result::Result::Ok(#ident::#v), }
            });
            let type_name_str = ident.to_string();
            (
                quote! {
                    Ok(match value {
                        #(#encode_arms)*
                    })
                },
                quote! {
                    let __name = match value {
                        ::bson::Bson::String(s) => s.as_str(),
                        other => {
                            return Err(#krate::CodecError::type_mismatch(
                                "string",
                                format!("{:?}", other),
                            ))
                        }
                    };
                    match __name {
                        #(#decode_arms)*
                        other => Err(#krate::CodecError::unknown_enum_value(other, #type_name_str)),
                    }
                },
            )
        }
        EnumRepr::ByOrdinal => {
            let encode_arms = variant_idents.iter().enumerate().map(|(i, v)| {
                let i = i as i32;
                quote! { #ident::#v => ::bson::Bson::Int32(#i), }
            });
            let type_name_str = ident.to_string();
            (
                quote! {
                    Ok(match value {
                        #(#encode_arms)*
                    })
                },
                quote! {
                    let __ordinal = match value {
                        ::bson::Bson::Int32(n) => *n,
                        other => {
                            return Err(#krate::CodecError::type_mismatch(
                                "int32",
                                format!("{:?}", other),
                            ))
                        }
                    };
                    #ident::__bsoncodec_variant_at_ordinal(__ordinal)
                        .ok_or_else(|| #krate::CodecError::unknown_enum_ordinal(__ordinal, #type_name_str))
                },
            )
        }
        EnumRepr::ByProjection(method) => {
            let encode_arms = variant_idents.iter().map(|v| {
                quote! { #ident::#v => #krate::primitive::BsonPrimitive::to_bson(&#ident::#v.#method()), }
            });
            let variant_count = variant_idents.len() as i32;
            let type_name_str = ident.to_string();
            (
                quote! {
                    Ok(match value {
                        #(#encode_arms)*
                    })
                },
                quote! {
                    for __ordinal in 0..#variant_count {
                        let __candidate = #ident::__bsoncodec_variant_at_ordinal(__ordinal)
                            .expect("ordinal within range always resolves to a variant");
                        if &#krate::primitive::BsonPrimitive::to_bson(&__candidate.#method()) == value {
                            return Ok(__candidate);
                        }
                    }
                    Err(#krate::CodecError::unknown_enum_value(format!("{:?}", value), #type_name_str))
                },
            )
        }
    };

    Ok(quote! {
        impl #ident {
            #[doc(hidden)]
            fn __bsoncodec_variant_at_ordinal(ordinal: i32) -> ::std::option::Option<#ident> {
                match ordinal {
                    #(#ordinal_match_arms)*
                    _ => ::std::option::Option::None,
                }
            }
        }

        #[doc(hidden)]
        #[allow(non_camel_case_types)]
        pub struct #codec_ident;

        impl #krate::registry::Codec<#ident> for #codec_ident {
            fn encode(&self, value: &#ident) -> #krate::Result<::bson::Bson> {
                #encode_body
            }

            fn decode(&self, value: &::bson::Bson) -> #krate::Result<#ident> {
                #decode_body
            }
        }

        impl #krate::registry::CodecDerived for #ident {
            fn build(
                _env: &#krate::Registry,
                _config: &#krate::CodecConfig,
            ) -> ::std::sync::Arc<dyn #krate::registry::AnyCodec> {
                ::std::sync::Arc::new(#codec_ident)
            }
        }
    })
}
