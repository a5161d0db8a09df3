// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! The primitive codec table: built-in encode/decode for BSON scalar kinds.
//!
//! These are the "fast path" the Record Codec Generator calls directly, bypassing a registry
//! lookup entirely, for any field whose declared type is one of the kinds below. Generated code
//! calls these functions by name; nothing here is dynamically dispatched.

use bson::spec::BinarySubtype;
use bson::{Binary, Bson};

use crate::error::{CodecError, Result};

fn bson_kind_name(value: &Bson) -> &'static str {
    match value {
        Bson::Double(_) => "double",
        Bson::String(_) => "string",
        Bson::Array(_) => "array",
        Bson::Document(_) => "document",
        Bson::Boolean(_) => "boolean",
        Bson::Null => "null",
        Bson::Int32(_) => "int32",
        Bson::Int64(_) => "int64",
        Bson::ObjectId(_) => "objectId",
        Bson::DateTime(_) => "datetime",
        Bson::Decimal128(_) => "decimal128",
        Bson::Binary(_) => "binary",
        _ => "other",
    }
}

/// A BSON scalar primitive with a fixed, bit-exact wire representation.
pub trait BsonPrimitive: Sized {
    /// Encode to a BSON scalar value.
    fn to_bson(&self) -> Bson;
    /// Decode from a BSON scalar value.
    fn from_bson(value: &Bson) -> Result<Self>;
}

impl BsonPrimitive for bool {
    fn to_bson(&self) -> Bson {
        Bson::Boolean(*self)
    }
    fn from_bson(value: &Bson) -> Result<Self> {
        match value {
            Bson::Boolean(b) => Ok(*b),
            other => Err(CodecError::type_mismatch("boolean", bson_kind_name(other))),
        }
    }
}

impl BsonPrimitive for i32 {
    fn to_bson(&self) -> Bson {
        Bson::Int32(*self)
    }
    fn from_bson(value: &Bson) -> Result<Self> {
        match value {
            Bson::Int32(v) => Ok(*v),
            other => Err(CodecError::type_mismatch("int32", bson_kind_name(other))),
        }
    }
}

impl BsonPrimitive for i64 {
    fn to_bson(&self) -> Bson {
        Bson::Int64(*self)
    }
    fn from_bson(value: &Bson) -> Result<Self> {
        match value {
            Bson::Int64(v) => Ok(*v),
            other => Err(CodecError::type_mismatch("int64", bson_kind_name(other))),
        }
    }
}

impl BsonPrimitive for f64 {
    fn to_bson(&self) -> Bson {
        Bson::Double(*self)
    }
    fn from_bson(value: &Bson) -> Result<Self> {
        match value {
            Bson::Double(v) => Ok(*v),
            other => Err(CodecError::type_mismatch("double", bson_kind_name(other))),
        }
    }
}

impl BsonPrimitive for f32 {
    fn to_bson(&self) -> Bson {
        Bson::Double(*self as f64)
    }
    fn from_bson(value: &Bson) -> Result<Self> {
        match value {
            Bson::Double(v) => {
                let narrowed = *v as f32;
                if v.is_finite() && narrowed.is_infinite() {
                    return Err(CodecError::float_overflow(*v));
                }
                Ok(narrowed)
            }
            other => Err(CodecError::type_mismatch("double", bson_kind_name(other))),
        }
    }
}

impl BsonPrimitive for String {
    fn to_bson(&self) -> Bson {
        Bson::String(self.clone())
    }
    fn from_bson(value: &Bson) -> Result<Self> {
        match value {
            Bson::String(s) => Ok(s.clone()),
            other => Err(CodecError::type_mismatch("string", bson_kind_name(other))),
        }
    }
}

impl BsonPrimitive for u8 {
    fn to_bson(&self) -> Bson {
        Bson::Int32(*self as i32)
    }
    fn from_bson(value: &Bson) -> Result<Self> {
        match value {
            Bson::Int32(v) => u8::try_from(*v)
                .map_err(|_| CodecError::type_mismatch("int32 in byte range", "out-of-range int32")),
            other => Err(CodecError::type_mismatch("int32", bson_kind_name(other))),
        }
    }
}

impl BsonPrimitive for i16 {
    fn to_bson(&self) -> Bson {
        Bson::Int32(*self as i32)
    }
    fn from_bson(value: &Bson) -> Result<Self> {
        match value {
            Bson::Int32(v) => i16::try_from(*v).map_err(|_| {
                CodecError::type_mismatch("int32 in short range", "out-of-range int32")
            }),
            other => Err(CodecError::type_mismatch("int32", bson_kind_name(other))),
        }
    }
}

impl BsonPrimitive for char {
    fn to_bson(&self) -> Bson {
        Bson::Int32(*self as i32)
    }
    fn from_bson(value: &Bson) -> Result<Self> {
        match value {
            Bson::Int32(v) => char::from_u32(*v as u32)
                .ok_or_else(|| CodecError::type_mismatch("int32 Unicode scalar value", "invalid code point")),
            other => Err(CodecError::type_mismatch("int32", bson_kind_name(other))),
        }
    }
}

impl BsonPrimitive for uuid::Uuid {
    fn to_bson(&self) -> Bson {
        Bson::String(self.hyphenated().to_string())
    }
    fn from_bson(value: &Bson) -> Result<Self> {
        match value {
            Bson::String(s) => {
                uuid::Uuid::parse_str(s).map_err(|_| CodecError::invalid_uuid(s.clone()))
            }
            other => Err(CodecError::type_mismatch("string", bson_kind_name(other))),
        }
    }
}

impl BsonPrimitive for bson::oid::ObjectId {
    fn to_bson(&self) -> Bson {
        Bson::ObjectId(*self)
    }
    fn from_bson(value: &Bson) -> Result<Self> {
        match value {
            Bson::ObjectId(id) => Ok(*id),
            other => Err(CodecError::type_mismatch("objectId", bson_kind_name(other))),
        }
    }
}

impl BsonPrimitive for bson::Decimal128 {
    fn to_bson(&self) -> Bson {
        Bson::Decimal128(*self)
    }
    fn from_bson(value: &Bson) -> Result<Self> {
        match value {
            Bson::Decimal128(d) => Ok(*d),
            other => Err(CodecError::type_mismatch("decimal128", bson_kind_name(other))),
        }
    }
}

impl BsonPrimitive for chrono::DateTime<chrono::Utc> {
    fn to_bson(&self) -> Bson {
        Bson::DateTime(bson::DateTime::from_chrono(*self))
    }
    fn from_bson(value: &Bson) -> Result<Self> {
        match value {
            Bson::DateTime(dt) => Ok(dt.to_chrono()),
            other => Err(CodecError::type_mismatch("datetime", bson_kind_name(other))),
        }
    }
}

impl BsonPrimitive for Vec<u8> {
    fn to_bson(&self) -> Bson {
        Bson::Binary(Binary {
            subtype: BinarySubtype::Generic,
            bytes: self.clone(),
        })
    }
    fn from_bson(value: &Bson) -> Result<Self> {
        match value {
            Bson::Binary(b) => Ok(b.bytes.clone()),
            other => Err(CodecError::type_mismatch("binary", bson_kind_name(other))),
        }
    }
}

/// `i128` stands in for an arbitrary-precision integer: no bignum crate is present in the
/// surrounding ecosystem, so range is bounded to 128 bits rather than truly arbitrary.
impl BsonPrimitive for i128 {
    fn to_bson(&self) -> Bson {
        Bson::String(self.to_string())
    }
    fn from_bson(value: &Bson) -> Result<Self> {
        match value {
            Bson::String(s) => s
                .parse::<i128>()
                .map_err(|_| CodecError::type_mismatch("base-10 integer string", "unparsable string")),
            other => Err(CodecError::type_mismatch("string", bson_kind_name(other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_round_trip() {
        assert_eq!(bool::from_bson(&true.to_bson()).unwrap(), true);
    }

    #[test]
    fn uuid_round_trip_canonical() {
        let id = uuid::Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let bson = id.to_bson();
        assert_eq!(bson, Bson::String("550e8400-e29b-41d4-a716-446655440000".to_string()));
        assert_eq!(uuid::Uuid::from_bson(&bson).unwrap(), id);
    }

    #[test]
    fn invalid_uuid_string_errors() {
        let bson = Bson::String("not-a-uuid".to_string());
        assert!(matches!(
            uuid::Uuid::from_bson(&bson),
            Err(CodecError::InvalidUuid { .. })
        ));
    }

    #[test]
    fn f32_overflow_detected() {
        let huge = Bson::Double(f64::MAX);
        assert!(matches!(
            f32::from_bson(&huge),
            Err(CodecError::FloatOverflow { .. })
        ));
    }

    #[test]
    fn byte_round_trip() {
        let b: u8 = 200;
        assert_eq!(u8::from_bson(&b.to_bson()).unwrap(), 200);
    }

    #[test]
    fn bigint_round_trip_via_string() {
        let v: i128 = 170_141_183_460_469_231_731_687_303_715_884_105_727;
        let bson = v.to_bson();
        assert_eq!(i128::from_bson(&bson).unwrap(), v);
    }
}
