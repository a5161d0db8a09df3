// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Compile-time-derived descriptions of record fields and sealed variants.
//!
//! `TypeDescriptor` and `FieldSchema` are populated by generated code purely for introspection
//! (debugging, documentation, reflection over a registered type); the actual encode/decode hot
//! path generated by `bsoncodec-derive` does not interpret these values at run time. The shape
//! of a field is resolved once, syntactically, at macro-expansion time, and dedicated Rust code
//! is emitted per shape.

use std::any::TypeId;

/// What kind of value a field holds, for introspection purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// A BSON scalar handled by the primitive codec table.
    Primitive(PrimitiveKind),
    /// `Option<T>`.
    Optional(Box<TypeDescriptor>),
    /// An ordered sequence (`Vec<T>`).
    Seq(Box<TypeDescriptor>),
    /// A set (`HashSet<T>`/`BTreeSet<T>`).
    Set(Box<TypeDescriptor>),
    /// A string-keyed map (`HashMap<String, T>`/`BTreeMap<String, T>`).
    Map(Box<TypeDescriptor>),
    /// A nested record, sealed enum, or flat enum, resolved through the registry at run time.
    External {
        /// The nested type's runtime handle.
        type_id: TypeId,
        /// The nested type's name, for error messages.
        type_name: &'static str,
    },
}

/// BSON scalar kinds understood by the primitive codec table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// `bool` -> BSON boolean.
    Bool,
    /// `i32` -> BSON int32.
    Int32,
    /// `i64` -> BSON int64.
    Int64,
    /// `f64` -> BSON double.
    Double,
    /// `f32` -> BSON double, range-checked on read.
    Float32,
    /// `u8` (byte) -> BSON int32.
    Byte,
    /// `i16` (short) -> BSON int32.
    Short,
    /// `char` -> BSON int32 (Unicode scalar value).
    Char,
    /// `String` -> BSON string.
    String,
    /// `uuid::Uuid` -> BSON string, canonical 8-4-4-4-12.
    Uuid,
    /// `bson::oid::ObjectId` -> BSON ObjectId.
    ObjectId,
    /// `chrono::DateTime<chrono::Utc>` -> BSON datetime (ms since epoch).
    DateTime,
    /// `bson::Decimal128` -> BSON decimal128.
    Decimal128,
    /// `i128`, the closest fixed-width stand-in for an arbitrary-precision integer available
    /// without adding a bignum dependency absent from the surrounding crate ecosystem -> BSON
    /// string (base 10).
    BigInt,
    /// `Vec<u8>` -> BSON binary (generic subtype).
    Binary,
}

/// A compile-time-derived description of one declared field of a record.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    /// The Rust identifier as written in source.
    pub declared_name: &'static str,
    /// The BSON key used on the wire, after `#[codec(rename = "...")]`.
    pub wire_name: &'static str,
    /// What shape of value this field holds.
    pub type_descriptor: TypeDescriptor,
    /// Whether a default value is available when the field is absent on decode.
    pub has_default: bool,
    /// Always `false` for fields produced by the Record Codec Generator: the discriminator key
    /// is owned exclusively by the Sealed Codec Generator (see `SPEC_FULL.md` §11).
    pub is_discriminator: bool,
}

/// A single concrete variant of a sealed enum, resolved at registration time.
#[derive(Debug, Clone)]
pub struct VariantSchema {
    /// The variant record's runtime handle.
    pub type_id: TypeId,
    /// The variant record's name, for error messages.
    pub type_name: &'static str,
    /// The tag string written to the discriminator field for this variant.
    pub tag: String,
}

/// The closed, finite set of variants of a sealed enum, resolved by the generated codec on each
/// encode/decode call (tag resolution can fail under `DiscriminatorStrategy::CustomMap`, and
/// `CodecDerived::build` has no way to propagate that at derivation time, so it isn't cached
/// there).
#[derive(Debug, Clone)]
pub struct SealedSchema {
    /// The sealed enum's own name, for error messages.
    pub type_name: &'static str,
    /// All variants, in declaration order.
    pub variants: Vec<VariantSchema>,
}

impl SealedSchema {
    /// Look up a variant by its tag string.
    pub fn variant_for_tag(&self, tag: &str) -> Option<&VariantSchema> {
        self.variants.iter().find(|v| v.tag == tag)
    }

    /// Look up a variant by its runtime type handle.
    pub fn variant_for_type(&self, type_id: TypeId) -> Option<&VariantSchema> {
        self.variants.iter().find(|v| v.type_id == type_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> SealedSchema {
        SealedSchema {
            type_name: "Animal",
            variants: vec![
                VariantSchema {
                    type_id: TypeId::of::<u8>(),
                    type_name: "Dog",
                    tag: "Dog".to_string(),
                },
                VariantSchema {
                    type_id: TypeId::of::<u16>(),
                    type_name: "Cat",
                    tag: "Cat".to_string(),
                },
            ],
        }
    }

    #[test]
    fn variant_lookup_by_tag() {
        let s = schema();
        assert_eq!(s.variant_for_tag("Cat").unwrap().type_name, "Cat");
        assert!(s.variant_for_tag("Bird").is_none());
    }

    #[test]
    fn variant_lookup_by_type() {
        let s = schema();
        assert_eq!(
            s.variant_for_type(TypeId::of::<u8>()).unwrap().type_name,
            "Dog"
        );
    }
}
