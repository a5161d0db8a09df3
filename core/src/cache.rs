// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Thread-safe, lazy, memoizing wrapper around a [`Registry`], one per derived codec.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::trace;

use crate::error::{CodecError, Result};
use crate::registry::{AnyCodec, Registry};

/// Wraps a [`Registry`] with a concurrent, append-only cache from type handle to the
/// first-resolved codec. Misses delegate to the wrapped registry and memoize; entries are never
/// evicted. An insertion race under concurrent lookups is benign: two threads may both resolve
/// the same child codec, one write wins, both callers observe an equivalent codec.
pub struct CachedRegistry {
    inner: Registry,
    cache: RwLock<HashMap<TypeId, Arc<dyn AnyCodec>>>,
}

impl CachedRegistry {
    /// Wrap `inner` with an empty cache.
    pub fn new(inner: Registry) -> Self {
        CachedRegistry {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve a codec by type handle, consulting (and populating) the cache.
    pub fn get(&self, type_id: TypeId) -> Result<Arc<dyn AnyCodec>> {
        if let Some(codec) = self.read_cache()?.get(&type_id) {
            return Ok(codec.clone());
        }

        let resolved = self.inner.get(type_id)?;
        let mut guard = self.write_cache()?;
        let codec = guard.entry(type_id).or_insert_with(|| resolved.clone());
        trace!(?type_id, "cached child registry miss resolved");
        Ok(codec.clone())
    }

    fn read_cache(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<TypeId, Arc<dyn AnyCodec>>>> {
        self.cache
            .read()
            .map_err(|_| CodecError::other("cached registry lock poisoned"))
    }

    fn write_cache(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<TypeId, Arc<dyn AnyCodec>>>> {
        self.cache
            .write()
            .map_err(|_| CodecError::other("cached registry lock poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Codec, RegistryBuilder};
    use bson::Bson;
    use std::sync::Arc;

    struct EchoCodec;
    impl Codec<i32> for EchoCodec {
        fn encode(&self, value: &i32) -> Result<Bson> {
            Ok(Bson::Int32(*value))
        }
        fn decode(&self, value: &Bson) -> Result<i32> {
            Ok(value.as_i32().unwrap())
        }
    }

    #[test]
    fn memoizes_after_first_resolution() {
        let registry = RegistryBuilder::from(Registry::empty())
            .with_codec(Arc::new(EchoCodec))
            .unwrap()
            .build();
        let cached = CachedRegistry::new(registry);

        let first = cached.get(TypeId::of::<i32>()).unwrap();
        let second = cached.get(TypeId::of::<i32>()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn miss_propagates_no_codec() {
        let cached = CachedRegistry::new(Registry::empty());
        assert!(cached.get(TypeId::of::<i32>()).is_err());
    }
}
