// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Error taxonomy for codec derivation, encoding, and decoding.
//!
//! Mirrors the derivation/encoding/decoding split of the wider codec engine: derivation
//! errors surface from `RegistryBuilder::register*` calls, encoding/decoding errors surface
//! from a generated codec's `encode`/`decode` methods.

use std::fmt;

/// Errors raised anywhere in the codec engine.
#[derive(Debug, Clone)]
pub enum CodecError {
    /// `#[derive(Codec)]` applied to a tuple struct, unit struct, or union.
    NotARecord {
        /// The offending type's name.
        type_name: String,
    },

    /// `register_sealed` or a sealed derive target does not have the required variant shape.
    NotSealed {
        /// The offending type's name.
        type_name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A sealed enum has no variants.
    NoVariants {
        /// The offending type's name.
        type_name: String,
    },

    /// Two fields of the same record resolve to the same wire name.
    DuplicateWireName {
        /// Owning record's name.
        type_name: String,
        /// The colliding wire name.
        wire_name: String,
    },

    /// A type handle is already present in a builder's registered-type set.
    DuplicateRegistration {
        /// The offending type's name.
        type_name: String,
    },

    /// A type appears twice within a single batch registration call.
    DuplicateInTuple {
        /// The offending type's name.
        type_name: String,
    },

    /// A field's declared type has no known `TypeDescriptor` mapping.
    UnsupportedFieldType {
        /// Owning record's name.
        type_name: String,
        /// Offending field's declared name.
        field_name: String,
        /// Why the type could not be resolved.
        reason: String,
    },

    /// A sealed value's concrete runtime type is not among the registered variants.
    UnregisteredVariant {
        /// The sealed type's name.
        type_name: String,
    },

    /// Attempted to encode a `None`/absent value as a whole document root.
    NullRootValue,

    /// No codec is registered for a given runtime type handle.
    NoCodec {
        /// The type name the registry was asked for.
        type_name: String,
    },

    /// A required field was absent from a decoded document.
    MissingField {
        /// The field's wire name.
        wire_name: String,
    },

    /// A sealed document had no discriminator field at all.
    MissingDiscriminator {
        /// The sealed type's name.
        type_name: String,
    },

    /// A sealed document's discriminator tag did not match any known variant.
    UnknownDiscriminator {
        /// The tag string observed on the wire.
        tag: String,
        /// The sealed type's name.
        type_name: String,
    },

    /// An enum-by-name decode saw a string that does not match any variant.
    UnknownEnumValue {
        /// The observed string.
        value: String,
        /// The enum type's name.
        type_name: String,
    },

    /// An enum-by-ordinal decode saw an out-of-range index.
    UnknownEnumOrdinal {
        /// The observed ordinal.
        ordinal: i32,
        /// The enum type's name.
        type_name: String,
    },

    /// A UUID field's string value did not parse as a canonical UUID.
    InvalidUuid {
        /// The offending string.
        value: String,
    },

    /// An `f32` field's BSON double value does not fit in `f32` range.
    FloatOverflow {
        /// The out-of-range double.
        value: f64,
    },

    /// The BSON type observed on the wire does not match what the field expected.
    TypeMismatch {
        /// What the field expected.
        expected: String,
        /// What was actually observed.
        actual: String,
    },

    /// Anything else, including lock poisoning.
    Other(String),
}

impl CodecError {
    /// `T` is not a record eligible for the Record Codec Generator.
    pub fn not_a_record(type_name: impl Into<String>) -> Self {
        CodecError::NotARecord {
            type_name: type_name.into(),
        }
    }

    /// `S` is not a valid sealed enum shape.
    pub fn not_sealed(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::NotSealed {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// `S` has no variants.
    pub fn no_variants(type_name: impl Into<String>) -> Self {
        CodecError::NoVariants {
            type_name: type_name.into(),
        }
    }

    /// Two fields share a wire name.
    pub fn duplicate_wire_name(type_name: impl Into<String>, wire_name: impl Into<String>) -> Self {
        CodecError::DuplicateWireName {
            type_name: type_name.into(),
            wire_name: wire_name.into(),
        }
    }

    /// A type is already registered.
    pub fn duplicate_registration(type_name: impl Into<String>) -> Self {
        CodecError::DuplicateRegistration {
            type_name: type_name.into(),
        }
    }

    /// A type appears twice in one batch call.
    pub fn duplicate_in_tuple(type_name: impl Into<String>) -> Self {
        CodecError::DuplicateInTuple {
            type_name: type_name.into(),
        }
    }

    /// A field's type cannot be resolved to a `TypeDescriptor`.
    pub fn unsupported_field_type(
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CodecError::UnsupportedFieldType {
            type_name: type_name.into(),
            field_name: field_name.into(),
            reason: reason.into(),
        }
    }

    /// A sealed value's runtime type was never registered as a variant.
    pub fn unregistered_variant(type_name: impl Into<String>) -> Self {
        CodecError::UnregisteredVariant {
            type_name: type_name.into(),
        }
    }

    /// No codec registered for the requested type.
    pub fn no_codec(type_name: impl Into<String>) -> Self {
        CodecError::NoCodec {
            type_name: type_name.into(),
        }
    }

    /// A required field was missing.
    pub fn missing_field(wire_name: impl Into<String>) -> Self {
        CodecError::MissingField {
            wire_name: wire_name.into(),
        }
    }

    /// No discriminator field present on a sealed document.
    pub fn missing_discriminator(type_name: impl Into<String>) -> Self {
        CodecError::MissingDiscriminator {
            type_name: type_name.into(),
        }
    }

    /// Discriminator tag did not match any variant.
    pub fn unknown_discriminator(tag: impl Into<String>, type_name: impl Into<String>) -> Self {
        CodecError::UnknownDiscriminator {
            tag: tag.into(),
            type_name: type_name.into(),
        }
    }

    /// Enum-by-name value not recognized.
    pub fn unknown_enum_value(value: impl Into<String>, type_name: impl Into<String>) -> Self {
        CodecError::UnknownEnumValue {
            value: value.into(),
            type_name: type_name.into(),
        }
    }

    /// Enum-by-ordinal index out of range.
    pub fn unknown_enum_ordinal(ordinal: i32, type_name: impl Into<String>) -> Self {
        CodecError::UnknownEnumOrdinal {
            ordinal,
            type_name: type_name.into(),
        }
    }

    /// A string did not parse as a canonical UUID.
    pub fn invalid_uuid(value: impl Into<String>) -> Self {
        CodecError::InvalidUuid {
            value: value.into(),
        }
    }

    /// An `f32` field's double value overflowed.
    pub fn float_overflow(value: f64) -> Self {
        CodecError::FloatOverflow { value }
    }

    /// Observed BSON type did not match what was expected.
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        CodecError::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Catch-all, including poisoned locks.
    pub fn other(message: impl Into<String>) -> Self {
        CodecError::Other(message.into())
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            CodecError::NotARecord { type_name } => vec![("type", type_name.clone())],
            CodecError::NotSealed { type_name, reason } => {
                vec![("type", type_name.clone()), ("reason", reason.clone())]
            }
            CodecError::NoVariants { type_name } => vec![("type", type_name.clone())],
            CodecError::DuplicateWireName {
                type_name,
                wire_name,
            } => vec![
                ("type", type_name.clone()),
                ("wire_name", wire_name.clone()),
            ],
            CodecError::DuplicateRegistration { type_name } => vec![("type", type_name.clone())],
            CodecError::DuplicateInTuple { type_name } => vec![("type", type_name.clone())],
            CodecError::UnsupportedFieldType {
                type_name,
                field_name,
                reason,
            } => vec![
                ("type", type_name.clone()),
                ("field", field_name.clone()),
                ("reason", reason.clone()),
            ],
            CodecError::UnregisteredVariant { type_name } => vec![("type", type_name.clone())],
            CodecError::NullRootValue => vec![],
            CodecError::NoCodec { type_name } => vec![("type", type_name.clone())],
            CodecError::MissingField { wire_name } => vec![("field", wire_name.clone())],
            CodecError::MissingDiscriminator { type_name } => vec![("type", type_name.clone())],
            CodecError::UnknownDiscriminator { tag, type_name } => {
                vec![("tag", tag.clone()), ("type", type_name.clone())]
            }
            CodecError::UnknownEnumValue { value, type_name } => {
                vec![("value", value.clone()), ("type", type_name.clone())]
            }
            CodecError::UnknownEnumOrdinal { ordinal, type_name } => vec![
                ("ordinal", ordinal.to_string()),
                ("type", type_name.clone()),
            ],
            CodecError::InvalidUuid { value } => vec![("value", value.clone())],
            CodecError::FloatOverflow { value } => vec![("value", value.to_string())],
            CodecError::TypeMismatch { expected, actual } => {
                vec![("expected", expected.clone()), ("actual", actual.clone())]
            }
            CodecError::Other(msg) => vec![("message", msg.clone())],
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::NotARecord { type_name } => {
                write!(f, "'{type_name}' is not a record (tuple/unit structs and unions are not supported)")
            }
            CodecError::NotSealed { type_name, reason } => {
                write!(f, "'{type_name}' is not a valid sealed enum: {reason}")
            }
            CodecError::NoVariants { type_name } => {
                write!(f, "sealed enum '{type_name}' has no variants")
            }
            CodecError::DuplicateWireName {
                type_name,
                wire_name,
            } => write!(f, "'{type_name}' has two fields with wire name '{wire_name}'"),
            CodecError::DuplicateRegistration { type_name } => {
                write!(f, "'{type_name}' is already registered")
            }
            CodecError::DuplicateInTuple { type_name } => {
                write!(f, "'{type_name}' appears twice in the same batch registration")
            }
            CodecError::UnsupportedFieldType {
                type_name,
                field_name,
                reason,
            } => write!(
                f,
                "'{type_name}.{field_name}' has an unsupported field type: {reason}"
            ),
            CodecError::UnregisteredVariant { type_name } => write!(
                f,
                "value's concrete type is not a registered variant of '{type_name}'"
            ),
            CodecError::NullRootValue => write!(f, "cannot encode a null/absent value as a document root"),
            CodecError::NoCodec { type_name } => write!(f, "no codec registered for '{type_name}'"),
            CodecError::MissingField { wire_name } => {
                write!(f, "missing required field '{wire_name}'")
            }
            CodecError::MissingDiscriminator { type_name } => write!(
                f,
                "document has no discriminator field for sealed type '{type_name}'"
            ),
            CodecError::UnknownDiscriminator { tag, type_name } => write!(
                f,
                "discriminator tag '{tag}' does not match any variant of '{type_name}'"
            ),
            CodecError::UnknownEnumValue { value, type_name } => {
                write!(f, "'{value}' is not a variant of enum '{type_name}'")
            }
            CodecError::UnknownEnumOrdinal { ordinal, type_name } => write!(
                f,
                "ordinal {ordinal} is out of range for enum '{type_name}'"
            ),
            CodecError::InvalidUuid { value } => {
                write!(f, "'{value}' is not a canonical UUID string")
            }
            CodecError::FloatOverflow { value } => {
                write!(f, "{value} does not fit in an f32")
            }
            CodecError::TypeMismatch { expected, actual } => {
                write!(f, "expected BSON {expected}, found {actual}")
            }
            CodecError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CodecError {}

/// Result type for codec engine operations.
pub type Result<T> = std::result::Result<T, CodecError>;
