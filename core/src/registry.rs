// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Registry, Registry Builder, and the hooks `bsoncodec-derive` targets.
//!
//! A [`Registry`] is an ordered composition of providers, searched in insertion order, first
//! match wins. A [`RegistryBuilder`] accumulates providers and explicit codecs immutably —
//! every mutator consumes and returns a new builder value — and assembles the final `Registry`
//! on [`RegistryBuilder::build`].

use std::any::{Any, TypeId};
use std::collections::HashSet;
use std::sync::Arc;

use bson::Bson;
use tracing::{debug, trace};

use crate::config::CodecConfig;
use crate::error::{CodecError, Result};

/// Type-erased codec, suitable for storage in a [`Registry`].
///
/// Implemented automatically for anything implementing [`Codec<T>`] via the blanket impl below;
/// `bsoncodec-derive` never implements this trait directly.
pub trait AnyCodec: Send + Sync + 'static {
    /// The runtime handle of the concrete type this codec encodes/decodes.
    fn type_id(&self) -> TypeId;
    /// The concrete type's name, for error messages.
    fn type_name(&self) -> &'static str;
    /// Encode a `&dyn Any` known to hold the concrete type.
    fn encode_any(&self, value: &dyn Any) -> Result<Bson>;
    /// Decode into a boxed `dyn Any` holding the concrete type.
    fn decode_any(&self, value: &Bson) -> Result<Box<dyn Any>>;
}

/// A typed codec for `T`. Every `#[derive(Codec)]` target implements this trait once, for
/// itself, via generated code.
pub trait Codec<T: 'static>: Send + Sync + 'static {
    /// Encode a value of `T` to a BSON value (a document, for records and sealed enums).
    fn encode(&self, value: &T) -> Result<Bson>;
    /// Decode a value of `T` from a BSON value.
    fn decode(&self, value: &Bson) -> Result<T>;
}

impl<T: 'static, C: Codec<T>> AnyCodec for C {
    fn type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn encode_any(&self, value: &dyn Any) -> Result<Bson> {
        let value = value.downcast_ref::<T>().ok_or_else(|| {
            CodecError::type_mismatch(std::any::type_name::<T>(), "mismatched concrete type")
        })?;
        Codec::<T>::encode(self, value)
    }

    fn decode_any(&self, value: &Bson) -> Result<Box<dyn Any>> {
        Ok(Box::new(Codec::<T>::decode(self, value)?))
    }
}

/// A function from (runtime type handle, ambient registry) to an optional codec.
///
/// Non-matching classes return `None`. A [`Registry`] iterates providers in insertion order and
/// returns the first `Some`.
pub trait CodecProvider: Send + Sync + 'static {
    /// Produce a codec for `type_id`, or `None` if this provider does not handle it.
    fn provide(&self, type_id: TypeId) -> Option<Arc<dyn AnyCodec>>;
}

struct ExactCodecProvider {
    type_id: TypeId,
    codec: Arc<dyn AnyCodec>,
}

impl CodecProvider for ExactCodecProvider {
    fn provide(&self, type_id: TypeId) -> Option<Arc<dyn AnyCodec>> {
        if type_id == self.type_id {
            Some(self.codec.clone())
        } else {
            None
        }
    }
}

/// The hook a `#[derive(Codec)]` target implements: given a derivation environment and the
/// active config, build this type's codec.
///
/// Implemented by generated code for record structs, sealed enums, and flat enums alike.
pub trait CodecDerived: Sized + 'static {
    /// Build this type's codec, closing over `env` as its child-codec lookup registry.
    fn build(env: &Registry, config: &CodecConfig) -> Arc<dyn AnyCodec>;
}

/// Additional hook implemented only by sealed enum derive targets: enumerates how to build each
/// variant's own codec, so `register_sealed` can register them alongside the sealed wrapper.
pub trait SealedDerived: CodecDerived {
    /// One `(type_id, builder)` pair per variant, in declaration order.
    fn variant_builders() -> Vec<(TypeId, fn(&Registry, &CodecConfig) -> Arc<dyn AnyCodec>)>;
}

/// An ordered, immutable composition of [`CodecProvider`]s, searched first-match-wins.
#[derive(Clone)]
pub struct Registry {
    providers: Arc<Vec<Arc<dyn CodecProvider>>>,
}

impl Registry {
    /// An empty registry: every lookup fails with `NoCodec`.
    pub fn empty() -> Self {
        Registry {
            providers: Arc::new(Vec::new()),
        }
    }

    /// Build a registry directly from a list of providers, in priority order.
    pub fn from_providers(providers: Vec<Arc<dyn CodecProvider>>) -> Self {
        Registry {
            providers: Arc::new(providers),
        }
    }

    /// Build a registry from pre-built codecs, one `ExactCodecProvider` each.
    pub fn from_codecs(codecs: &[Arc<dyn AnyCodec>]) -> Self {
        let providers = codecs
            .iter()
            .map(|c| {
                Arc::new(ExactCodecProvider {
                    type_id: c.type_id(),
                    codec: c.clone(),
                }) as Arc<dyn CodecProvider>
            })
            .collect();
        Registry::from_providers(providers)
    }

    /// Compose registries left-to-right; earlier entries win on conflict.
    pub fn compose(layers: &[Registry]) -> Self {
        let mut all = Vec::new();
        for layer in layers {
            all.extend(layer.providers.iter().cloned());
        }
        Registry::from_providers(all)
    }

    /// Look up a codec by runtime type handle.
    pub fn get(&self, type_id: TypeId) -> Result<Arc<dyn AnyCodec>> {
        for provider in self.providers.iter() {
            if let Some(codec) = provider.provide(type_id) {
                return Ok(codec);
            }
        }
        trace!(?type_id, "registry lookup missed");
        Err(CodecError::no_codec(format!("{type_id:?}")))
    }
}

/// The immutable builder value accumulating providers and explicit codecs.
///
/// Every mutator consumes `self` and returns a new `RegistryBuilder`; `build` borrows so it can
/// be called repeatedly without resetting accumulated state.
pub struct RegistryBuilder {
    base: Registry,
    config: CodecConfig,
    providers: Vec<Arc<dyn CodecProvider>>,
    explicit_codecs: Vec<Arc<dyn AnyCodec>>,
    registered_type_set: HashSet<TypeId>,
    derivation_cache: Option<Registry>,
}

impl RegistryBuilder {
    /// Start a new builder seeded by an externally supplied base registry.
    pub fn from(base: Registry) -> Self {
        RegistryBuilder {
            base,
            config: CodecConfig::default(),
            providers: Vec::new(),
            explicit_codecs: Vec::new(),
            registered_type_set: HashSet::new(),
            derivation_cache: None,
        }
    }

    /// Replace the active configuration. Invalidates the derivation cache.
    pub fn configure(mut self, f: impl FnOnce(CodecConfig) -> CodecConfig) -> Self {
        self.config = f(self.config);
        self.derivation_cache = None;
        self
    }

    /// Append a pre-built codec, rejecting it if its type is already registered.
    pub fn with_codec(mut self, codec: Arc<dyn AnyCodec>) -> Result<Self> {
        if self.registered_type_set.contains(&codec.type_id()) {
            return Err(CodecError::duplicate_registration(codec.type_name()));
        }
        self.registered_type_set.insert(codec.type_id());
        self.explicit_codecs.push(codec);
        self.derivation_cache = None;
        Ok(self)
    }

    /// Append several pre-built codecs; duplicates within the batch are also detected.
    pub fn with_codecs(mut self, codecs: Vec<Arc<dyn AnyCodec>>) -> Result<Self> {
        let mut seen_in_batch = HashSet::new();
        for codec in &codecs {
            if !seen_in_batch.insert(codec.type_id()) {
                return Err(CodecError::duplicate_registration(codec.type_name()));
            }
            if self.registered_type_set.contains(&codec.type_id()) {
                return Err(CodecError::duplicate_registration(codec.type_name()));
            }
        }
        for codec in codecs {
            self.registered_type_set.insert(codec.type_id());
            self.explicit_codecs.push(codec);
        }
        self.derivation_cache = None;
        Ok(self)
    }

    /// Derive and register a record, flat enum, or sealed enum's codec (use
    /// [`RegistryBuilder::register_sealed`] for sealed enums so variants also get registered).
    pub fn register<T: CodecDerived>(mut self) -> Result<Self> {
        let type_id = TypeId::of::<T>();
        if self.registered_type_set.contains(&type_id) {
            return Err(CodecError::duplicate_registration(std::any::type_name::<T>()));
        }
        let env = self.derivation_environment();
        let codec = T::build(&env, &self.config);
        debug!(type_name = std::any::type_name::<T>(), "registered codec");
        self.providers.push(Arc::new(ExactCodecProvider { type_id, codec }));
        self.registered_type_set.insert(type_id);
        self.derivation_cache = None;
        Ok(self)
    }

    /// `register::<T>()` if `cond` is true, otherwise a no-op.
    pub fn register_if<T: CodecDerived>(self, cond: bool) -> Result<Self> {
        if cond {
            self.register::<T>()
        } else {
            Ok(self)
        }
    }

    /// Derive and register a sealed enum's codec, plus every variant's own record codec.
    pub fn register_sealed<S: SealedDerived>(mut self) -> Result<Self> {
        let type_id = TypeId::of::<S>();
        if self.registered_type_set.contains(&type_id) {
            return Err(CodecError::duplicate_registration(std::any::type_name::<S>()));
        }
        let variants = S::variant_builders();
        if variants.is_empty() {
            return Err(CodecError::no_variants(std::any::type_name::<S>()));
        }
        for (variant_id, _) in &variants {
            if self.registered_type_set.contains(variant_id) {
                return Err(CodecError::duplicate_registration(format!(
                    "variant of {}",
                    std::any::type_name::<S>()
                )));
            }
        }

        let env = self.derivation_environment();
        let sealed_codec = S::build(&env, &self.config);
        self.providers.push(Arc::new(ExactCodecProvider {
            type_id,
            codec: sealed_codec,
        }));
        self.registered_type_set.insert(type_id);

        for (variant_id, build) in variants {
            let variant_codec = build(&env, &self.config);
            self.providers.push(Arc::new(ExactCodecProvider {
                type_id: variant_id,
                codec: variant_codec,
            }));
            self.registered_type_set.insert(variant_id);
        }

        debug!(type_name = std::any::type_name::<S>(), "registered sealed codec");
        self.derivation_cache = None;
        Ok(self)
    }

    /// Concatenate two builders: providers and explicit codecs from `other` are appended after
    /// `self`'s (so `self` wins on conflict, matching `Registry::compose`'s first-wins rule);
    /// `self`'s config is kept. Overlapping registrations are rejected.
    pub fn merge(mut self, other: RegistryBuilder) -> Result<Self> {
        for type_id in &other.registered_type_set {
            if self.registered_type_set.contains(type_id) {
                return Err(CodecError::duplicate_registration(format!("{type_id:?}")));
            }
        }
        self.explicit_codecs.extend(other.explicit_codecs);
        self.providers.extend(other.providers);
        self.registered_type_set.extend(other.registered_type_set);
        self.derivation_cache = None;
        Ok(self)
    }

    /// Assemble the final registry: `base` then explicit codecs then derived providers, earlier
    /// layers winning on conflict. Does not consume or reset the builder.
    pub fn build(&self) -> Registry {
        Registry::compose(&[
            self.base.clone(),
            Registry::from_codecs(&self.explicit_codecs),
            Registry::from_providers(self.providers.clone()),
        ])
    }

    /// The registry snapshot the next `register*` call derives against: `base ∪ explicit_codecs
    /// ∪ providers_registered_so_far`, NOT including the codec currently being derived.
    fn derivation_environment(&mut self) -> Registry {
        if let Some(cached) = &self.derivation_cache {
            return cached.clone();
        }
        let env = self.build();
        self.derivation_cache = Some(env.clone());
        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoCodec;
    impl Codec<i32> for EchoCodec {
        fn encode(&self, value: &i32) -> Result<Bson> {
            Ok(Bson::Int32(*value))
        }
        fn decode(&self, value: &Bson) -> Result<i32> {
            i32::try_from(value.as_i32().unwrap()).map_err(|_| CodecError::other("bad i32"))
        }
    }

    #[test]
    fn duplicate_explicit_codec_rejected() {
        let builder = RegistryBuilder::from(Registry::empty());
        let builder = builder
            .with_codec(Arc::new(EchoCodec))
            .expect("first insert succeeds");
        let err = builder.with_codec(Arc::new(EchoCodec)).unwrap_err();
        assert!(matches!(err, CodecError::DuplicateRegistration { .. }));
    }

    #[test]
    fn registry_lookup_succeeds_after_build() {
        let builder = RegistryBuilder::from(Registry::empty())
            .with_codec(Arc::new(EchoCodec))
            .unwrap();
        let registry = builder.build();
        let codec = registry.get(TypeId::of::<i32>()).unwrap();
        let encoded = codec.encode_any(&7i32).unwrap();
        assert_eq!(encoded, Bson::Int32(7));
    }

    #[test]
    fn base_layer_wins_over_new_builders_explicit_codec() {
        // `registered_type_set` tracks only this builder's own registrations, not `base`'s
        // contents, so shadowing a base codec is not an error: `build()`'s precedence order
        // (base before explicit codecs) resolves the conflict silently.
        let base = RegistryBuilder::from(Registry::empty())
            .with_codec(Arc::new(EchoCodec))
            .unwrap()
            .build();

        struct OtherCodec;
        impl Codec<i32> for OtherCodec {
            fn encode(&self, _value: &i32) -> Result<Bson> {
                Ok(Bson::Int32(-1))
            }
            fn decode(&self, _value: &Bson) -> Result<i32> {
                Ok(-1)
            }
        }

        let registry = RegistryBuilder::from(base)
            .with_codec(Arc::new(OtherCodec))
            .unwrap()
            .build();

        let codec = registry.get(TypeId::of::<i32>()).unwrap();
        assert_eq!(codec.encode_any(&7i32).unwrap(), Bson::Int32(7));
    }
}
