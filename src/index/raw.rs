//! Serde data model for the raw ingestion format.
//!
//! The format is one JSON object mapping compilation-unit name to unit data:
//! a doc string (`doc`), the entity rows (`i`), a shared parent path table
//! (`p`), and an optional alias table (`a`). Rows and type terms are
//! heterogeneous arrays with optional tails, so they are decoded with
//! hand-written visitors rather than derives.

use serde::Deserialize;
use serde::de::{self, Deserializer, IgnoredAny, SeqAccess, Visitor};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// The whole raw index: unit name to unit data, iterated in sorted order so
/// entity identities come out the same for every load of the same file.
#[derive(Debug, Default, Deserialize)]
pub struct RawIndex(pub BTreeMap<String, RawUnit>);

/// One compilation unit's slice of the raw index.
#[derive(Debug, Default, Deserialize)]
pub struct RawUnit {
    /// Top-level documentation for the unit itself.
    #[serde(default)]
    pub doc: String,
    /// Entity rows.
    #[serde(default)]
    pub i: Vec<RawRow>,
    /// Shared parent table: `[kind ordinal, name]` pairs.
    #[serde(default)]
    pub p: Vec<RawParent>,
    /// Alias table: literal query text to indices into `i`.
    #[serde(default)]
    pub a: HashMap<String, Vec<usize>>,
}

#[derive(Debug, Deserialize)]
pub struct RawParent(pub u8, pub String);

/// One entity row: `[kind, name, path, desc, parent, signature]`.
///
/// Everything after `name` may be omitted. An empty `path` means "inherit
/// the previous row's resolved path"; that is applied by the index builder,
/// not here.
#[derive(Debug)]
pub struct RawRow {
    pub kind: u8,
    pub name: String,
    pub path: String,
    pub desc: String,
    pub parent: Option<usize>,
    pub signature: Option<RawSignature>,
}

impl<'de> Deserialize<'de> for RawRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = RawRow;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an entity row array")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<RawRow, A::Error> {
                let kind = seq
                    .next_element::<u8>()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let name = seq
                    .next_element::<String>()?
                    .ok_or_else(|| de::Error::invalid_length(1, &self))?;
                let path = seq.next_element::<Option<String>>()?.flatten();
                let desc = seq.next_element::<Option<String>>()?.flatten();
                let parent = seq.next_element::<Option<usize>>()?.flatten();
                let signature = seq.next_element::<Option<RawSignature>>()?.flatten();
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(RawRow {
                    kind,
                    name,
                    path: path.unwrap_or_default(),
                    desc: desc.unwrap_or_default(),
                    parent,
                    signature,
                })
            }
        }

        deserializer.deserialize_seq(RowVisitor)
    }
}

/// A type signature: `[inputs]` or `[inputs, output]`, output possibly null.
#[derive(Debug)]
pub struct RawSignature {
    pub inputs: Vec<RawType>,
    pub output: Option<RawType>,
}

impl<'de> Deserialize<'de> for RawSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SignatureVisitor;

        impl<'de> Visitor<'de> for SignatureVisitor {
            type Value = RawSignature;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a [inputs, output] signature array")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<RawSignature, A::Error> {
                let inputs = seq.next_element::<Option<Vec<RawType>>>()?.flatten();
                let output = seq.next_element::<Option<RawType>>()?.flatten();
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(RawSignature {
                    inputs: inputs.unwrap_or_default(),
                    output,
                })
            }
        }

        deserializer.deserialize_seq(SignatureVisitor)
    }
}

/// A type term: either a bare name string, `[name]`, or
/// `[name, [generics, ...]]`.
#[derive(Debug)]
pub struct RawType {
    pub name: String,
    pub generics: Vec<String>,
}

impl<'de> Deserialize<'de> for RawType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TypeVisitor;

        impl<'de> Visitor<'de> for TypeVisitor {
            type Value = RawType;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a type name or [name, generics] array")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<RawType, E> {
                Ok(RawType {
                    name: value.to_owned(),
                    generics: Vec::new(),
                })
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<RawType, A::Error> {
                let name = seq
                    .next_element::<String>()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let generics = seq.next_element::<Option<Vec<String>>>()?.flatten();
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(RawType {
                    name,
                    generics: generics.unwrap_or_default(),
                })
            }
        }

        deserializer.deserialize_any(TypeVisitor)
    }
}
