// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Record Codec Generator: expands `#[derive(Codec)]` on a named-field struct.

use std::collections::HashSet;

use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{DeriveInput, FieldsNamed, Type};

use crate::attrs::{self, FieldAttrs};
use crate::shape::{self, FieldShape};

struct FieldPlan {
    field_ident: syn::Ident,
    ty: Type,
    wire_name: String,
    attrs: FieldAttrs,
}

pub fn expand_record(input: &DeriveInput, fields: &FieldsNamed) -> syn::Result<TokenStream2> {
    let krate = crate::crate_path();
    let ident = &input.ident;
    let codec_ident = format_ident!("__{}BsonCodec", ident);

    let mut wire_names_seen = HashSet::new();
    let mut plans = Vec::new();
    for field in &fields.named {
        let field_ident = field
            .ident
            .clone()
            .expect("FieldsNamed guarantees every field has an identifier");
        let field_attrs = attrs::parse_field_attrs(&field.attrs)?;
        let wire_name = field_attrs
            .rename
            .clone()
            .unwrap_or_else(|| field_ident.to_string());
        if !wire_names_seen.insert(wire_name.clone()) {
            return Err(syn::Error::new_spanned(
                &field_ident,
                format!(
                    "'{}' collides with another field's wire name '{}'",
                    field_ident, wire_name
                ),
            ));
        }
        plans.push(FieldPlan {
            field_ident,
            ty: field.ty.clone(),
            wire_name,
            attrs: field_attrs,
        });
    }

    let encode_stmts: Vec<_> = plans
        .iter()
        .map(|p| encode_stmt(&krate, p))
        .collect::<syn::Result<_>>()?;
    let slot_decls: Vec<_> = plans.iter().map(|p| slot_decl(p)).collect();
    let match_arms: Vec<_> = plans
        .iter()
        .map(|p| match_arm(&krate, p))
        .collect::<syn::Result<_>>()?;
    let construct_fields: Vec<_> = plans
        .iter()
        .map(|p| construct_field(&krate, p))
        .collect();
    let field_schema_entries: Vec<_> = plans
        .iter()
        .map(|p| field_schema_entry(&krate, p))
        .collect();

    Ok(quote! {
        #[doc(hidden)]
        #[allow(non_camel_case_types)]
        pub struct #codec_ident {
            child_registry: #krate::CachedRegistry,
            config: #krate::CodecConfig,
        }

        impl #krate::registry::Codec<#ident> for #codec_ident {
            fn encode(&self, value: &#ident) -> #krate::Result<::bson::Bson> {
                let mut writer = #krate::traversal::BsonWriter::start_document();
                #(#encode_stmts)*
                Ok(::bson::Bson::Document(writer.end_document()))
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
                let __reader = #krate::traversal::BsonReader::start_document(__doc);
                #(#slot_decls)*
                for (__name, __raw) in __reader.fields() {
                    if __name == self.config.discriminator_field() {
                        continue;
                    }
                    match __name {
                        #(#match_arms)*
                        _ => {}
                    }
                }
                Ok(#ident {
                    #(#construct_fields)*
                })
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

        impl #ident {
            /// Compile-time-derived field descriptions, for introspection only; encode/decode
            /// above does not interpret this at run time.
            #[doc(hidden)]
            pub fn __bsoncodec_fields() -> ::std::vec::Vec<#krate::FieldSchema> {
                ::std::vec![ #(#field_schema_entries),* ]
            }
        }
    })
}

fn encode_stmt(krate: &TokenStream2, plan: &FieldPlan) -> syn::Result<TokenStream2> {
    let field_ident = &plan.field_ident;
    let wire_name = &plan.wire_name;
    Ok(match shape::classify(&plan.ty) {
        FieldShape::Primitive => quote! {
            writer.write_named(#wire_name, #krate::primitive::BsonPrimitive::to_bson(&value.#field_ident));
        },
        FieldShape::Optional(inner) => {
            let elem_encode = optional_inner_encode_closure(krate, plan, inner)?;
            quote! {
                if let ::std::option::Option::Some(__bson) = #krate::traversal::encode_optional(
                    &value.#field_ident,
                    self.config.none_handling(),
                    #elem_encode,
                )? {
                    writer.write_named(#wire_name, __bson);
                }
            }
        }
        FieldShape::Seq(inner) => {
            let elem_encode = elem_encode_closure(krate, plan, inner)?;
            quote! {
                writer.write_named(
                    #wire_name,
                    #krate::traversal::encode_seq(&value.#field_ident, #elem_encode)?,
                );
            }
        }
        FieldShape::Set(inner) => {
            let elem_encode = elem_encode_closure(krate, plan, inner)?;
            quote! {
                writer.write_named(
                    #wire_name,
                    #krate::traversal::encode_set(&value.#field_ident, #elem_encode)?,
                );
            }
        }
        FieldShape::Map(inner) => {
            let elem_encode = elem_encode_closure(krate, plan, inner)?;
            quote! {
                writer.write_named(
                    #wire_name,
                    #krate::traversal::encode_map(&value.#field_ident, #elem_encode)?,
                );
            }
        }
        FieldShape::External => {
            let ty = &plan.ty;
            quote! {
                {
                    let __child = self.child_registry.get(::std::any::TypeId::of::<#ty>())?;
                    writer.write_named(
                        #wire_name,
                        __child.encode_any(&value.#field_ident as &dyn ::std::any::Any)?,
                    );
                }
            }
        }
    })
}

/// Containers may only hold a primitive or a registry-resolved (record/sealed/enum) element: a
/// container-of-container (`Vec<Vec<T>>`, `Map<K, Map<K, V>>`, ...) has no `TypeDescriptor`
/// mapping and is rejected here rather than silently mis-generated. `Option<Container<T>>` is not
/// rejected by this check — it is its own shape, handled one level up by
/// `optional_inner_encode_closure`/`optional_inner_decode_closure`, since an optional sequence
/// field is a named scenario in its own right rather than "a container inside a container".
fn reject_nested_container(plan: &FieldPlan, inner: &Type) -> syn::Result<()> {
    if matches!(shape::classify(inner), FieldShape::Primitive | FieldShape::External) {
        Ok(())
    } else {
        Err(syn::Error::new_spanned(
            &plan.field_ident,
            format!(
                "field '{}' nests one container inside another; only a primitive or a single \
                 externally registered type is supported as a container element",
                plan.field_ident
            ),
        ))
    }
}

fn elem_encode_closure(krate: &TokenStream2, plan: &FieldPlan, inner: &Type) -> syn::Result<TokenStream2> {
    reject_nested_container(plan, inner)?;
    Ok(if let FieldShape::Primitive = shape::classify(inner) {
        quote! { |v| Ok(#krate::primitive::BsonPrimitive::to_bson(v)) }
    } else {
        quote! {
            |v| {
                let __child = self.child_registry.get(::std::any::TypeId::of::<#inner>())?;
                __child.encode_any(v as &dyn ::std::any::Any)
            }
        }
    })
}

fn elem_decode_closure(krate: &TokenStream2, plan: &FieldPlan, inner: &Type) -> syn::Result<TokenStream2> {
    reject_nested_container(plan, inner)?;
    Ok(if let FieldShape::Primitive = shape::classify(inner) {
        quote! { |v| #krate::primitive::BsonPrimitive::from_bson(v) }
    } else {
        quote! {
            |v| {
                let __child = self.child_registry.get(::std::any::TypeId::of::<#inner>())?;
                let __boxed = __child.decode_any(v)?;
                __boxed.downcast::<#inner>().map(|b| *b).map_err(|_| {
                    #krate::CodecError::type_mismatch(stringify!(#inner), "mismatched concrete type")
                })
            }
        }
    })
}

/// Builds the `encode_elem` closure passed to `encode_optional` for an `Option<Inner>` field.
/// `Inner` is usually a primitive or externally registered type, handled the same way a bare
/// container's element is; but `Inner` may also itself be one level of `Seq`/`Set`/`Map` (the
/// `Option<Seq<Person>>` shape), in which case this wraps the matching `traversal::encode_*`
/// call, with that container's own element restricted to primitive/external by
/// `elem_encode_closure`'s usual check.
fn optional_inner_encode_closure(
    krate: &TokenStream2,
    plan: &FieldPlan,
    inner: &Type,
) -> syn::Result<TokenStream2> {
    Ok(match shape::classify(inner) {
        FieldShape::Seq(elem) => {
            let elem_encode = elem_encode_closure(krate, plan, elem)?;
            quote! { |v| #krate::traversal::encode_seq(v, #elem_encode) }
        }
        FieldShape::Set(elem) => {
            let elem_encode = elem_encode_closure(krate, plan, elem)?;
            quote! { |v| #krate::traversal::encode_set(v, #elem_encode) }
        }
        FieldShape::Map(elem) => {
            let elem_encode = elem_encode_closure(krate, plan, elem)?;
            quote! { |v| #krate::traversal::encode_map(v, #elem_encode) }
        }
        _ => elem_encode_closure(krate, plan, inner)?,
    })
}

/// Decode counterpart of `optional_inner_encode_closure`.
fn optional_inner_decode_closure(
    krate: &TokenStream2,
    plan: &FieldPlan,
    inner: &Type,
) -> syn::Result<TokenStream2> {
    Ok(match shape::classify(inner) {
        FieldShape::Seq(elem) => {
            let elem_decode = elem_decode_closure(krate, plan, elem)?;
            quote! { |v| #krate::traversal::decode_seq(v, #elem_decode) }
        }
        FieldShape::Set(elem) => {
            let elem_decode = elem_decode_closure(krate, plan, elem)?;
            quote! { |v| #krate::traversal::decode_set(v, #elem_decode) }
        }
        FieldShape::Map(elem) => {
            let elem_decode = elem_decode_closure(krate, plan, elem)?;
            quote! { |v| #krate::traversal::decode_map(v, #elem_decode) }
        }
        _ => elem_decode_closure(krate, plan, inner)?,
    })
}

fn slot_decl(plan: &FieldPlan) -> TokenStream2 {
    let slot_ident = slot_ident(plan);
    let ty = &plan.ty;
    quote! {
        let mut #slot_ident: ::std::option::Option<#ty> = ::std::option::Option::None;
    }
}

fn slot_ident(plan: &FieldPlan) -> syn::Ident {
    format_ident!("__slot_{}", plan.field_ident)
}

fn match_arm(krate: &TokenStream2, plan: &FieldPlan) -> syn::Result<TokenStream2> {
    let slot_ident = slot_ident(plan);
    let wire_name = &plan.wire_name;
    let assign = match shape::classify(&plan.ty) {
        FieldShape::Primitive => quote! {
            #slot_ident = ::std::option::Option::Some(#krate::primitive::BsonPrimitive::from_bson(__raw)?);
        },
        FieldShape::Optional(inner) => {
            let elem_decode = optional_inner_decode_closure(krate, plan, inner)?;
            quote! {
                #slot_ident = ::std::option::Option::Some(
                    #krate::traversal::decode_optional(::std::option::Option::Some(__raw), #elem_decode)?,
                );
            }
        }
        FieldShape::Seq(inner) => {
            let elem_decode = elem_decode_closure(krate, plan, inner)?;
            quote! {
                #slot_ident = ::std::option::Option::Some(
                    #krate::traversal::decode_seq(__raw, #elem_decode)?,
                );
            }
        }
        FieldShape::Set(inner) => {
            let elem_decode = elem_decode_closure(krate, plan, inner)?;
            quote! {
                #slot_ident = ::std::option::Option::Some(
                    #krate::traversal::decode_set(__raw, #elem_decode)?,
                );
            }
        }
        FieldShape::Map(inner) => {
            let elem_decode = elem_decode_closure(krate, plan, inner)?;
            quote! {
                #slot_ident = ::std::option::Option::Some(
                    #krate::traversal::decode_map(__raw, #elem_decode)?,
                );
            }
        }
        FieldShape::External => {
            let ty = &plan.ty;
            quote! {
                {
                    let __child = self.child_registry.get(::std::any::TypeId::of::<#ty>())?;
                    let __boxed = __child.decode_any(__raw)?;
                    #slot_ident = ::std::option::Option::Some(*__boxed.downcast::<#ty>().map_err(|_| {
                        #krate::CodecError::type_mismatch(stringify!(#ty), "mismatched concrete type")
                    })?);
                }
            }
        }
    };
    Ok(quote! {
        #wire_name => { #assign }
    })
}

fn construct_field(krate: &TokenStream2, plan: &FieldPlan) -> TokenStream2 {
    let field_ident = &plan.field_ident;
    let slot_ident = slot_ident(plan);
    let wire_name = &plan.wire_name;
    let is_optional = matches!(shape::classify(&plan.ty), FieldShape::Optional(_));

    let fallback = if let Some(path) = &plan.attrs.default_fn {
        quote! { #path() }
    } else if plan.attrs.default {
        quote! { ::std::default::Default::default() }
    } else if is_optional {
        quote! { ::std::option::Option::None }
    } else {
        quote! { return ::std::result::Result::Err(#krate::CodecError::missing_field(#wire_name)) }
    };

    quote! {
        #field_ident: match #slot_ident {
            ::std::option::Option::Some(v) => v,
            ::std::option::Option::None => #fallback,
        },
    }
}

fn field_schema_entry(krate: &TokenStream2, plan: &FieldPlan) -> TokenStream2 {
    let declared_name = plan.field_ident.to_string();
    let wire_name = &plan.wire_name;
    let descriptor = type_descriptor_expr(krate, &plan.ty);
    let has_default = plan.attrs.default || plan.attrs.default_fn.is_some();
    quote! {
        #krate::FieldSchema {
            declared_name: #declared_name,
            wire_name: #wire_name,
            type_descriptor: #descriptor,
            has_default: #has_default,
            is_discriminator: false,
        }
    }
}

fn type_descriptor_expr(krate: &TokenStream2, ty: &Type) -> TokenStream2 {
    match shape::classify(ty) {
        FieldShape::Primitive => {
            let kind = primitive_kind_tokens(krate, ty);
            quote! { #krate::TypeDescriptor::Primitive(#kind) }
        }
        FieldShape::Optional(inner) => {
            let inner_expr = type_descriptor_expr(krate, inner);
            quote! { #krate::TypeDescriptor::Optional(::std::boxed::Box::new(#inner_expr)) }
        }
        FieldShape::Seq(inner) => {
            let inner_expr = type_descriptor_expr(krate, inner);
            quote! { #krate::TypeDescriptor::Seq(::std::boxed::Box::new(#inner_expr)) }
        }
        FieldShape::Set(inner) => {
            let inner_expr = type_descriptor_expr(krate, inner);
            quote! { #krate::TypeDescriptor::Set(::std::boxed::Box::new(#inner_expr)) }
        }
        FieldShape::Map(inner) => {
            let inner_expr = type_descriptor_expr(krate, inner);
            quote! { #krate::TypeDescriptor::Map(::std::boxed::Box::new(#inner_expr)) }
        }
        FieldShape::External => quote! {
            #krate::TypeDescriptor::External {
                type_id: ::std::any::TypeId::of::<#ty>(),
                type_name: ::std::any::type_name::<#ty>(),
            }
        },
    }
}

fn primitive_kind_tokens(krate: &TokenStream2, ty: &Type) -> TokenStream2 {
    let name = match ty {
        Type::Path(p) => p
            .path
            .segments
            .last()
            .map(|s| s.ident.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    };
    let variant = match name.as_str() {
        "bool" => quote!(Bool),
        "i32" => quote!(Int32),
        "i64" => quote!(Int64),
        "f64" => quote!(Double),
        "f32" => quote!(Float32),
        "u8" => quote!(Byte),
        "i16" => quote!(Short),
        "char" => quote!(Char),
        "String" => quote!(String),
        "Uuid" => quote!(Uuid),
        "ObjectId" => quote!(ObjectId),
        "DateTime" => quote!(DateTime),
        "Decimal128" => quote!(Decimal128),
        "i128" => quote!(BigInt),
        // `Vec<u8>` is classified as `Primitive` by `shape::classify`, but its last path
        // segment is `Vec`, not a scalar name; handle it explicitly here.
        "Vec" => quote!(Binary),
        _ => quote!(String),
    };
    quote! { #krate::PrimitiveKind::#variant }
}
