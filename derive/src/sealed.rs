// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Sealed Codec Generator: expands `#[derive(Codec)]` on an enum whose every variant wraps a
//! single, distinct record type — the Rust realization of a closed sum of record classes.

use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{DataEnum, DeriveInput, Fields, Type};

struct VariantPlan {
    variant_ident: syn::Ident,
    ty: Type,
}

pub fn is_sealed_shape(data: &DataEnum) -> bool {
    !data.variants.is_empty()
        && data.variants.iter().all(|v| match &v.fields {
            Fields::Unnamed(fields) => fields.unnamed.len() == 1,
            _ => false,
        })
}

pub fn expand_sealed(input: &DeriveInput, data: &DataEnum) -> syn::Result<TokenStream2> {
    let krate = crate::crate_path();
    let ident = &input.ident;
    let codec_ident = format_ident!("__{}BsonCodec", ident);

    let mut seen_types = std::collections::HashSet::new();
    let mut plans = Vec::new();
    for variant in &data.variants {
        let Fields::Unnamed(fields) = &variant.fields else {
            unreachable!("is_sealed_shape guarantees every variant is a single-field tuple variant");
        };
        let ty = fields.unnamed[0].ty.clone();
        let ty_key = quote!(#ty).to_string();
        if !seen_types.insert(ty_key) {
            return Err(syn::Error::new_spanned(
                &variant.ident,
                format!("variant '{}' wraps a type already used by another variant", variant.ident),
            ));
        }
        plans.push(VariantPlan {
            variant_ident: variant.ident.clone(),
            ty,
        });
    }

    let encode_arms = plans.iter().map(|p| {
        let variant_ident = &p.variant_ident;
        let ty = &p.ty;
        quote! {
            #ident::#variant_ident(inner) => self.encode_variant(
                ::std::any::TypeId::of::<#ty>(),
                ::std::any::type_name::<#ty>(),
                inner as &dyn ::std::any::Any,
            ),
        }
    });

    let schema_entries = plans.iter().map(|p| {
        let ty = &p.ty;
        quote! {
            #krate::VariantSchema {
                type_id: ::std::any::TypeId::of::<#ty>(),
                type_name: ::std::any::type_name::<#ty>(),
                tag: self.config.tag_for(
                    ::std::any::TypeId::of::<#ty>(),
                    ::std::any::type_name::<#ty>(),
                )?,
            },
        }
    });

    let decode_dispatch = plans.iter().map(|p| {
        let variant_ident = &p.variant_ident;
        let ty = &p.ty;
        quote! {
            if variant.type_id == ::std::any::TypeId::of::<#ty>() {
                return Ok(#ident::#variant_ident(*boxed.downcast::<#ty>().map_err(|_| {
                    #krate::CodecError::type_mismatch(stringify!(#ty), "mismatched concrete type")
                })?));
            }
        }
    });

    let variant_builder_entries = plans.iter().map(|p| {
        let ty = &p.ty;
        quote! {
            (
                ::std::any::TypeId::of::<#ty>(),
                <#ty as #krate::registry::CodecDerived>::build as fn(&#krate::Registry, &#krate::CodecConfig) -> ::std::sync::Arc<dyn #krate::registry::AnyCodec>,
            ),
        }
    });

    let type_name_str = ident.to_string();

    Ok(quote! {
        #[doc(hidden)]
        #[allow(non_camel_case_types)]
        pub struct #codec_ident {
            child_registry: #krate::CachedRegistry,
            config: #krate::CodecConfig,
        }

        impl #codec_ident {
            fn encode_variant(
                &self,
                type_id: ::std::any::TypeId,
                type_name: &'static str,
                value: &dyn ::std::any::Any,
            ) -> #krate::Result<::bson::Bson> {
                let tag = self.config.tag_for(type_id, type_name)?;
                let child = self.child_registry.get(type_id)?;
                let encoded = child.encode_any(value)?;
                let inner = match encoded {
                    ::bson::Bson::Document(d) => d,
                    other => {
                        return Err(#krate::CodecError::type_mismatch(
                            "document",
                            format!("{:?}", other),
                        ))
                    }
                };
                let mut doc = ::bson::Document::new();
                doc.insert(self.config.discriminator_field(), tag);
                for (key, val) in inner {
                    if key == self.config.discriminator_field() {
                        continue;
                    }
                    doc.insert(key, val);
                }
                Ok(::bson::Bson::Document(doc))
            }
        }

        impl #krate::registry::Codec<#ident> for #codec_ident {
            fn encode(&self, value: &#ident) -> #krate::Result<::bson::Bson> {
                match value {
                    #(#encode_arms)*
                }
            }

            fn decode(&self, value: &::bson::Bson) -> #krate::Result<#ident> {
                let __doc = match value {
                    ::bson::Bson::Document(d) => d,
                    other => {
                        return Err(#krate::CodecError::type_mismatch(
                            "document",
                            format!("{:?}", other),
                        ))
                    }
                };
                let tag = #krate::traversal::peek_discriminator(
                    __doc,
                    self.config.discriminator_field(),
                    #type_name_str,
                )?;
                let schema = #krate::SealedSchema {
                    type_name: #type_name_str,
                    variants: ::std::vec![ #(#schema_entries)* ],
                };
                let variant = schema.variant_for_tag(tag).ok_or_else(|| {
                    #krate::CodecError::unknown_discriminator(tag, schema.type_name)
                })?;
                let child = self.child_registry.get(variant.type_id)?;
                let boxed = child.decode_any(value)?;
                #(#decode_dispatch)*
                unreachable!("variant type_id resolved from schema matched no known variant")
            }
        }

        impl #krate::registry::CodecDerived for #ident {
            fn build(
                env: &#krate::Registry,
                config: &#krate::CodecConfig,
            ) -> ::std::sync::Arc<dyn #krate::registry::AnyCodec> {
                ::std::sync::Arc::new(#codec_ident {
                    child_registry: #krate::CachedRegistry::new(env.clone()),
                    config: config.clone(),
                })
            }
        }

        impl #krate::registry::SealedDerived for #ident {
            fn variant_builders() -> ::std::vec::Vec<(
                ::std::any::TypeId,
                fn(&#krate::Registry, &#krate::CodecConfig) -> ::std::sync::Arc<dyn #krate::registry::AnyCodec>,
            )> {
                ::std::vec![ #(#variant_builder_entries)* ]
            }
        }
    })
}
