// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # bsoncodec
//!
//! Compile-time BSON codec derivation for a statically typed, ADT-oriented Rust ecosystem
//! talking to a MongoDB-compatible store.
//!
//! `#[derive(Codec)]` inspects a record struct, a sealed enum (every variant a single-field
//! newtype wrapping a distinct record), or a flat enum (every variant a unit variant), and
//! emits an encoder/decoder closing over a child-codec lookup registry. Generated codecs are
//! assembled into a [`Registry`] through an immutable [`RegistryBuilder`].
//!
//! ## Example
//!
//! ```ignore
//! use bsoncodec::{Codec, Registry, RegistryBuilder};
//!
//! #[derive(Codec)]
//! struct Person {
//!     #[codec(rename = "_id")]
//!     id: bson::oid::ObjectId,
//!     name: String,
//!     middle: Option<String>,
//!     age: i32,
//! }
//!
//! let registry = RegistryBuilder::from(Registry::empty())
//!     .register::<Person>()?
//!     .build();
//! # Ok::<(), bsoncodec::CodecError>(())
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod primitive;
pub mod registry;
pub mod schema;
pub mod traversal;

pub use bsoncodec_derive::Codec;

pub use cache::CachedRegistry;
pub use config::{CodecConfig, DiscriminatorStrategy, NoneHandling};
pub use error::{CodecError, Result};
pub use primitive::BsonPrimitive;
pub use registry::{AnyCodec, Codec as CodecTrait, CodecDerived, CodecProvider, Registry, RegistryBuilder, SealedDerived};
pub use schema::{FieldSchema, PrimitiveKind, SealedSchema, TypeDescriptor, VariantSchema};

/// Register several `#[derive(Codec)]` record/enum types against one shared derivation
/// environment.
///
/// Expands to successive `.register::<T>()?` calls. A genuine variadic generic method cannot
/// express a heterogeneous type list on stable Rust, so `register_all!` substitutes a
/// declarative macro for spec.md §4.4's `register_all<T1..Tn>` — mechanically equivalent, since
/// each expansion still derives against the builder state accumulated so far.
///
/// ```ignore
/// let builder = register_all!(builder, Person, Company)?;
/// ```
#[macro_export]
macro_rules! register_all {
    ($builder:expr, $($ty:ty),+ $(,)?) => {{
        let mut __builder = $builder;
        $(
            __builder = __builder.register::<$ty>()?;
        )+
        Ok::<_, $crate::CodecError>(__builder)
    }};
}

/// Batch form of [`RegistryBuilder::register_sealed`], one call per sealed type.
#[macro_export]
macro_rules! register_sealed_all {
    ($builder:expr, $($ty:ty),+ $(,)?) => {{
        let mut __builder = $builder;
        $(
            __builder = __builder.register_sealed::<$ty>()?;
        )+
        Ok::<_, $crate::CodecError>(__builder)
    }};
}
