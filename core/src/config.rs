// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Immutable codec configuration carried by a [`crate::registry::RegistryBuilder`].

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{CodecError, Result};

/// How an absent optional field is handled during encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoneHandling {
    /// Write the field with a BSON null value.
    EncodeAsNull,
    /// Omit the field entirely.
    OmitField,
}

/// How a sealed variant's tag string is derived.
#[derive(Debug, Clone)]
pub enum DiscriminatorStrategy {
    /// The variant's unqualified type name (e.g. `Dog`).
    SimpleName,
    /// The variant's fully qualified type name (e.g. `my_crate::animal::Dog`).
    FullyQualifiedName,
    /// An explicit, user-supplied mapping from runtime type to tag string.
    CustomMap(Arc<HashMap<TypeId, String>>),
}

impl PartialEq for DiscriminatorStrategy {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DiscriminatorStrategy::SimpleName, DiscriminatorStrategy::SimpleName) => true,
            (
                DiscriminatorStrategy::FullyQualifiedName,
                DiscriminatorStrategy::FullyQualifiedName,
            ) => true,
            (DiscriminatorStrategy::CustomMap(a), DiscriminatorStrategy::CustomMap(b)) => {
                Arc::ptr_eq(a, b)
            }
            _ => false,
        }
    }
}

/// Immutable codec options shared by every derived codec in a registry.
///
/// Any mutator returns a fresh value rather than mutating in place.
#[derive(Debug, Clone, PartialEq)]
pub struct CodecConfig {
    none_handling: NoneHandling,
    discriminator_field: Arc<str>,
    discriminator_strategy: DiscriminatorStrategy,
}

/// Default discriminator field name. The source ecosystem this engine was distilled from used
/// both `"_t"` and `"_type"` across generations; `"_t"` is the shorter, more common convention
/// and is the one this implementation commits to.
pub const DEFAULT_DISCRIMINATOR_FIELD: &str = "_t";

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            none_handling: NoneHandling::OmitField,
            discriminator_field: Arc::from(DEFAULT_DISCRIMINATOR_FIELD),
            discriminator_strategy: DiscriminatorStrategy::SimpleName,
        }
    }
}

impl CodecConfig {
    /// Build a config with the default `none_handling`, discriminator field, and strategy.
    pub fn new() -> Self {
        Self::default()
    }

    /// The configured none-handling policy.
    pub fn none_handling(&self) -> NoneHandling {
        self.none_handling
    }

    /// The configured discriminator field name.
    pub fn discriminator_field(&self) -> &str {
        &self.discriminator_field
    }

    /// The configured discriminator strategy.
    pub fn discriminator_strategy(&self) -> &DiscriminatorStrategy {
        &self.discriminator_strategy
    }

    /// Return a copy with a different none-handling policy.
    pub fn with_none_handling(&self, policy: NoneHandling) -> Self {
        CodecConfig {
            none_handling: policy,
            ..self.clone()
        }
    }

    /// Return a copy with a different discriminator field name.
    ///
    /// Fails if `name` is empty, per the data model invariant that the discriminator field is a
    /// non-empty string.
    pub fn with_discriminator_field(&self, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(CodecError::other(
                "discriminator_field must be a non-empty string",
            ));
        }
        Ok(CodecConfig {
            discriminator_field: Arc::from(name),
            ..self.clone()
        })
    }

    /// Return a copy with a different discriminator strategy.
    pub fn with_discriminator_strategy(&self, strategy: DiscriminatorStrategy) -> Self {
        CodecConfig {
            discriminator_strategy: strategy,
            ..self.clone()
        }
    }

    /// Resolve the tag string for a sealed variant under the active strategy.
    ///
    /// `type_name` is expected to be `std::any::type_name::<V>()`, as supplied by generated
    /// code. `CustomMap` is honored for both encode and decode: a variant missing from the map
    /// is an error rather than a silent fallback, since the alternative (falling back to
    /// `SimpleName`) would make `CustomMap` only partially authoritative.
    pub fn tag_for(&self, type_id: TypeId, type_name: &str) -> Result<String> {
        match &self.discriminator_strategy {
            DiscriminatorStrategy::SimpleName => Ok(simple_name(type_name)),
            DiscriminatorStrategy::FullyQualifiedName => Ok(type_name.to_string()),
            DiscriminatorStrategy::CustomMap(map) => map.get(&type_id).cloned().ok_or_else(|| {
                CodecError::not_sealed(
                    type_name,
                    format!("no CustomMap discriminator entry for '{type_name}'"),
                )
            }),
        }
    }
}

fn simple_name(full: &str) -> String {
    full.rsplit("::").next().unwrap_or(full).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_discriminator_field_is_t() {
        assert_eq!(CodecConfig::default().discriminator_field(), "_t");
    }

    #[test]
    fn empty_discriminator_field_rejected() {
        let cfg = CodecConfig::default();
        assert!(cfg.with_discriminator_field("").is_err());
    }

    #[test]
    fn simple_name_strips_module_path() {
        let cfg = CodecConfig::default();
        let tag = cfg
            .tag_for(TypeId::of::<u8>(), "my_crate::animal::Dog")
            .unwrap();
        assert_eq!(tag, "Dog");
    }

    #[test]
    fn fully_qualified_keeps_module_path() {
        let cfg = CodecConfig::default()
            .with_discriminator_strategy(DiscriminatorStrategy::FullyQualifiedName);
        let tag = cfg
            .tag_for(TypeId::of::<u8>(), "my_crate::animal::Dog")
            .unwrap();
        assert_eq!(tag, "my_crate::animal::Dog");
    }

    #[test]
    fn custom_map_missing_entry_errors() {
        let map: HashMap<TypeId, String> = HashMap::new();
        let cfg = CodecConfig::default()
            .with_discriminator_strategy(DiscriminatorStrategy::CustomMap(Arc::new(map)));
        assert!(cfg.tag_for(TypeId::of::<u8>(), "Dog").is_err());
    }
}
