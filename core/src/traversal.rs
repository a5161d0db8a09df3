// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! The read/write harness generated codecs call into.
//!
//! Unlike the teacher's `CdrCursor`, which walks a raw byte buffer and needs an explicit
//! `mark()`/`reset()` origin stack to re-read a span, a `bson::Document` is already a fully
//! materialized, randomly-accessible ordered map. The sealed codec generator's "peek the
//! discriminator field, then decode the whole document" step is therefore realized here as a
//! direct, non-consuming `Document::get` lookup rather than a literal cursor rewind — the
//! externally observable property (peeking the tag does not disturb the subsequent full decode)
//! holds either way.

use std::collections::HashMap;

use bson::{Bson, Document};

use crate::error::{CodecError, Result};

/// Accumulates named fields into a BSON document in declared order.
#[derive(Default)]
pub struct BsonWriter {
    doc: Document,
}

impl BsonWriter {
    /// Start a new, empty document.
    pub fn start_document() -> Self {
        BsonWriter {
            doc: Document::new(),
        }
    }

    /// Write a named field.
    pub fn write_named(&mut self, name: &str, value: Bson) {
        self.doc.insert(name, value);
    }

    /// Write a named field as BSON null.
    pub fn write_null(&mut self, name: &str) {
        self.doc.insert(name, Bson::Null);
    }

    /// Finish and return the accumulated document.
    pub fn end_document(self) -> Document {
        self.doc
    }
}

/// Reads named fields out of an already-parsed BSON document.
pub struct BsonReader<'a> {
    doc: &'a Document,
}

impl<'a> BsonReader<'a> {
    /// Wrap a document for reading.
    pub fn start_document(doc: &'a Document) -> Self {
        BsonReader { doc }
    }

    /// Iterate fields in their on-wire (insertion) order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Bson)> {
        self.doc.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Look up a field by name without disturbing iteration — the realization of the
    /// traversal runtime's `mark()`/`reset()` primitive for a document-backed reader (see the
    /// module doc comment).
    pub fn peek(&self, name: &str) -> Option<&Bson> {
        self.doc.get(name)
    }

    /// Look up a required field, or fail with `MissingField`.
    pub fn require(&self, name: &str) -> Result<&Bson> {
        self.doc
            .get(name)
            .ok_or_else(|| CodecError::missing_field(name))
    }
}

/// Peek a sealed document's discriminator tag without consuming the reader.
///
/// Corresponds to spec.md §4.2's "mark the current reader position ... capture its string
/// value ... reset the reader to the mark": here that is simply a lookup, since `doc` remains
/// fully available for a subsequent complete decode through `Codec<V>`. `type_name` is the sealed
/// type being decoded, carried into `MissingDiscriminator` so the error identifies which type's
/// document was missing the field.
pub fn peek_discriminator<'a>(
    doc: &'a Document,
    discriminator_field: &str,
    type_name: &str,
) -> Result<&'a str> {
    match doc.get(discriminator_field) {
        None => Err(CodecError::missing_discriminator(type_name)),
        Some(Bson::String(tag)) => Ok(tag.as_str()),
        Some(other) => Err(CodecError::type_mismatch(
            "string discriminator",
            format!("{other:?}"),
        )),
    }
}

/// Encode `Option<T>` honoring the active `none_handling` policy. Returns `None` when the field
/// should be omitted entirely.
pub fn encode_optional<T>(
    value: &Option<T>,
    none_handling: crate::config::NoneHandling,
    encode_elem: impl FnOnce(&T) -> Result<Bson>,
) -> Result<Option<Bson>> {
    use crate::config::NoneHandling;
    match value {
        Some(v) => Ok(Some(encode_elem(v)?)),
        None => match none_handling {
            NoneHandling::EncodeAsNull => Ok(Some(Bson::Null)),
            NoneHandling::OmitField => Ok(None),
        },
    }
}

/// Decode `Option<T>` from a field slot that may be entirely absent or explicitly BSON null.
pub fn decode_optional<T>(
    value: Option<&Bson>,
    decode_elem: impl FnOnce(&Bson) -> Result<T>,
) -> Result<Option<T>> {
    match value {
        None | Some(Bson::Null) => Ok(None),
        Some(other) => Ok(Some(decode_elem(other)?)),
    }
}

/// Encode an ordered sequence.
pub fn encode_seq<T>(items: &[T], encode_elem: impl Fn(&T) -> Result<Bson>) -> Result<Bson> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(encode_elem(item)?);
    }
    Ok(Bson::Array(out))
}

/// Decode an ordered sequence.
pub fn decode_seq<T>(value: &Bson, decode_elem: impl Fn(&Bson) -> Result<T>) -> Result<Vec<T>> {
    match value {
        Bson::Array(items) => items.iter().map(decode_elem).collect(),
        other => Err(CodecError::type_mismatch("array", format!("{other:?}"))),
    }
}

/// Encode a set (`HashSet<T>` or `BTreeSet<T>`) as a BSON array — order is not semantically
/// meaningful for sets, but a BSON array is the only sequence container available.
pub fn encode_set<'a, C, T>(items: &'a C, encode_elem: impl Fn(&T) -> Result<Bson>) -> Result<Bson>
where
    &'a C: IntoIterator<Item = &'a T>,
    T: 'a,
{
    let mut out = Vec::new();
    for item in items {
        out.push(encode_elem(item)?);
    }
    Ok(Bson::Array(out))
}

/// Decode a set (`HashSet<T>` or `BTreeSet<T>`) from a BSON array.
pub fn decode_set<C, T>(value: &Bson, decode_elem: impl Fn(&Bson) -> Result<T>) -> Result<C>
where
    C: FromIterator<T>,
{
    match value {
        Bson::Array(items) => items.iter().map(decode_elem).collect(),
        other => Err(CodecError::type_mismatch("array", format!("{other:?}"))),
    }
}

/// Encode a string-keyed map (`HashMap<String, V>` or `BTreeMap<String, V>`) as a BSON
/// subdocument.
pub fn encode_map<'a, C, V>(items: &'a C, encode_elem: impl Fn(&V) -> Result<Bson>) -> Result<Bson>
where
    &'a C: IntoIterator<Item = (&'a String, &'a V)>,
    V: 'a,
{
    let mut doc = Document::new();
    for (key, value) in items {
        doc.insert(key.clone(), encode_elem(value)?);
    }
    Ok(Bson::Document(doc))
}

/// Decode a string-keyed map (`HashMap<String, V>` or `BTreeMap<String, V>`) from a BSON
/// subdocument.
pub fn decode_map<C, V>(value: &Bson, decode_elem: impl Fn(&Bson) -> Result<V>) -> Result<C>
where
    C: FromIterator<(String, V)>,
{
    match value {
        Bson::Document(doc) => doc
            .iter()
            .map(|(k, v)| Ok((k.clone(), decode_elem(v)?)))
            .collect(),
        other => Err(CodecError::type_mismatch("document", format!("{other:?}"))),
    }
}
