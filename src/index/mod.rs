//! Immutable entity tables built once from the raw ingestion format.
//!
//! The builder flattens every unit's rows into one entity table plus a
//! parallel lowercase name-token table. After `build` returns, nothing is
//! added, removed, or mutated; queries only ever read, so an index can be
//! shared across any number of concurrent readers.

pub mod raw;

use crate::error::{IndexError, Result};
use crate::kind::ItemKind;
use ahash::AHashMap;
use anyhow::Context;
use raw::{RawIndex, RawSignature, RawType};
use std::fmt::{self, Debug, Formatter};
use std::path::Path;

/// Stable identity of one entity for the lifetime of a loaded index.
pub type EntityId = usize;

/// One documented item.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Name of the compilation unit that owns the entity.
    pub unit: String,
    pub kind: ItemKind,
    pub name: String,
    /// Declaring path, `::`-separated.
    pub path: String,
    pub desc: String,
    /// Owning item, resolved from the unit's shared path table.
    pub parent: Option<Parent>,
    pub signature: Option<TypeSignature>,
}

/// A resolved parent reference.
#[derive(Debug, Clone)]
pub struct Parent {
    pub kind: ItemKind,
    pub name: String,
}

/// A function signature: input terms in declaration order and an optional
/// output term. Entities without an output never match return queries.
#[derive(Debug, Clone, Default)]
pub struct TypeSignature {
    pub inputs: Vec<TypeTerm>,
    pub output: Option<TypeTerm>,
}

/// A type name plus one level of generic-argument names. Deeper nesting is
/// not represented; matching never looks further down either.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeTerm {
    pub name: String,
    pub generics: Vec<String>,
}

/// The flat, immutable search index.
///
/// Debug prints a summary rather than the full tables; an index can hold
/// tens of thousands of entities.
pub struct SearchIndex {
    entities: Vec<Entity>,
    /// Lowercase name tokens, parallel to `entities`.
    names: Vec<String>,
    units: Vec<String>,
    /// Pre-authored alias hits: unit name, then literal query text.
    aliases: AHashMap<String, AHashMap<String, Vec<EntityId>>>,
}

impl Debug for SearchIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchIndex")
            .field("units", &self.units.len())
            .field("entities", &self.entities.len())
            .finish()
    }
}

impl SearchIndex {
    /// Builds the flat tables from decoded raw data.
    ///
    /// Each unit contributes one synthetic entity for itself (kind
    /// `externcrate`, empty path, the unit doc as description) followed by
    /// its rows. A row with an empty path inherits the previous row's
    /// resolved path within the same unit.
    pub fn build(raw: RawIndex) -> std::result::Result<Self, IndexError> {
        let started = std::time::Instant::now();
        let mut entities = Vec::new();
        let mut names = Vec::new();
        let mut units = Vec::new();
        let mut aliases: AHashMap<String, AHashMap<String, Vec<EntityId>>> = AHashMap::new();

        for (unit_name, data) in raw.0 {
            units.push(unit_name.clone());
            names.push(unit_name.to_lowercase());
            entities.push(Entity {
                unit: unit_name.clone(),
                kind: ItemKind::ExternCrate,
                name: unit_name.clone(),
                path: String::new(),
                desc: data.doc,
                parent: None,
                signature: None,
            });

            let parents = data
                .p
                .iter()
                .map(|raw::RawParent(ordinal, name)| {
                    ItemKind::from_ordinal(*ordinal)
                        .map(|kind| Parent {
                            kind,
                            name: name.clone(),
                        })
                        .ok_or_else(|| IndexError::UnknownKind {
                            unit: unit_name.clone(),
                            ordinal: *ordinal,
                        })
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let first_row = entities.len();
            let mut last_path = String::new();
            for row in data.i {
                let kind =
                    ItemKind::from_ordinal(row.kind).ok_or_else(|| IndexError::UnknownKind {
                        unit: unit_name.clone(),
                        ordinal: row.kind,
                    })?;
                let path = if row.path.is_empty() {
                    last_path.clone()
                } else {
                    row.path
                };
                let parent = match row.parent {
                    Some(index) => Some(parents.get(index).cloned().ok_or_else(|| {
                        IndexError::UnresolvedParent {
                            unit: unit_name.clone(),
                            index,
                            table_len: parents.len(),
                        }
                    })?),
                    None => None,
                };
                names.push(row.name.to_lowercase());
                last_path.clone_from(&path);
                entities.push(Entity {
                    unit: unit_name.clone(),
                    kind,
                    name: row.name,
                    path,
                    desc: row.desc,
                    parent,
                    signature: row.signature.map(convert_signature),
                });
            }

            let rows = entities.len() - first_row;
            if !data.a.is_empty() {
                let table = aliases.entry(unit_name.clone()).or_default();
                for (alias, targets) in data.a {
                    let mut ids = Vec::with_capacity(targets.len());
                    for target in targets {
                        if target >= rows {
                            return Err(IndexError::UnresolvedAlias {
                                unit: unit_name,
                                alias,
                                index: target,
                                rows,
                            });
                        }
                        ids.push(first_row + target);
                    }
                    table.insert(alias, ids);
                }
            }
        }

        tracing::info!(
            "Built search index: {} units, {} entities in {:?}",
            units.len(),
            entities.len(),
            started.elapsed()
        );
        Ok(Self {
            entities,
            names,
            units,
            aliases,
        })
    }

    /// Reads a raw index JSON file and builds the flat tables from it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read search index at {}", path.display()))?;
        let raw: RawIndex =
            serde_json::from_str(&content).context("Failed to parse search index JSON")?;
        Ok(Self::build(raw)?)
    }

    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id]
    }

    /// Lowercase name token for one entity.
    pub(crate) fn name(&self, id: EntityId) -> &str {
        &self.names[id]
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter().enumerate()
    }

    /// Names of the indexed compilation units.
    pub fn unit_names(&self) -> impl Iterator<Item = &str> {
        self.units.iter().map(String::as_str)
    }

    pub fn has_unit(&self, name: &str) -> bool {
        self.units.iter().any(|unit| unit == name)
    }

    pub(crate) fn aliases_for(&self, unit: &str, query: &str) -> Option<&[EntityId]> {
        self.aliases
            .get(unit)
            .and_then(|table| table.get(query))
            .map(Vec::as_slice)
    }
}

fn convert_signature(raw: RawSignature) -> TypeSignature {
    TypeSignature {
        inputs: raw.inputs.into_iter().map(convert_type).collect(),
        output: raw.output.map(convert_type),
    }
}

/// Type names are matched lowercase; the original index serializer lowercases
/// them before search ever runs, so it happens once here rather than on every
/// comparison.
fn convert_type(raw: RawType) -> TypeTerm {
    TypeTerm {
        name: raw.name.to_lowercase(),
        generics: raw
            .generics
            .into_iter()
            .map(|generic| generic.to_lowercase())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use serde_json::json;

    fn build(value: serde_json::Value) -> std::result::Result<SearchIndex, IndexError> {
        let raw: RawIndex = serde_json::from_value(value).unwrap();
        SearchIndex::build(raw)
    }

    #[test]
    fn unit_row_precedes_items() {
        let index = build(json!({
            "demo": {
                "doc": "A demo unit",
                "i": [[3, "Widget", "demo", "A widget", null, null]],
                "p": []
            }
        }))
        .unwrap();
        check!(index.len() == 2);
        let unit_row = index.entity(0);
        check!(unit_row.kind == ItemKind::ExternCrate);
        check!(unit_row.name == "demo");
        check!(unit_row.path.is_empty());
        check!(unit_row.desc == "A demo unit");
        check!(index.entity(1).name == "Widget");
        check!(index.name(1) == "widget");
    }

    #[test]
    fn empty_path_inherits_previous_row() {
        let index = build(json!({
            "demo": {
                "doc": "",
                "i": [
                    [3, "First", "demo::widgets", "", null, null],
                    [3, "Second", "", "", null, null],
                    [3, "Third", "demo::other", "", null, null],
                    [3, "Fourth", "", "", null, null]
                ],
                "p": []
            }
        }))
        .unwrap();
        check!(index.entity(2).path == "demo::widgets");
        check!(index.entity(4).path == "demo::other");
    }

    #[test]
    fn parent_references_resolve() {
        let index = build(json!({
            "demo": {
                "doc": "",
                "i": [[11, "run", "demo", "", 0, null]],
                "p": [[3, "Widget"]]
            }
        }))
        .unwrap();
        let parent = index.entity(1).parent.as_ref().unwrap();
        check!(parent.kind == ItemKind::Struct);
        check!(parent.name == "Widget");
    }

    #[test]
    fn unresolved_parent_is_rejected() {
        let result = build(json!({
            "demo": {
                "doc": "",
                "i": [[11, "run", "demo", "", 3, null]],
                "p": [[3, "Widget"]]
            }
        }));
        check!(matches!(
            result,
            Err(IndexError::UnresolvedParent { index: 3, table_len: 1, .. })
        ));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let result = build(json!({
            "demo": { "doc": "", "i": [[77, "x", "demo", "", null, null]], "p": [] }
        }));
        check!(matches!(result, Err(IndexError::UnknownKind { ordinal: 77, .. })));
    }

    #[test]
    fn type_names_are_lowercased() {
        let index = build(json!({
            "demo": {
                "doc": "",
                "i": [[5, "make", "demo", "", null, [[["Vec", ["T"]]], ["Bool"]]]],
                "p": []
            }
        }))
        .unwrap();
        let signature = index.entity(1).signature.as_ref().unwrap();
        check!(signature.inputs[0].name == "vec");
        check!(signature.inputs[0].generics == vec!["t".to_owned()]);
        check!(signature.output.as_ref().unwrap().name == "bool");
    }

    #[test]
    fn alias_targets_resolve_to_entity_ids() {
        let index = build(json!({
            "demo": {
                "doc": "",
                "i": [
                    [5, "add", "demo", "", null, null],
                    [5, "sub", "demo", "", null, null]
                ],
                "p": [],
                "a": { "+": [0], "-": [1] }
            }
        }))
        .unwrap();
        check!(index.aliases_for("demo", "+") == Some(&[1][..]));
        check!(index.aliases_for("demo", "-") == Some(&[2][..]));
        check!(index.aliases_for("demo", "*").is_none());
        check!(index.aliases_for("other", "+").is_none());
    }

    #[test]
    fn alias_out_of_range_is_rejected() {
        let result = build(json!({
            "demo": {
                "doc": "",
                "i": [[5, "add", "demo", "", null, null]],
                "p": [],
                "a": { "+": [1] }
            }
        }));
        check!(matches!(result, Err(IndexError::UnresolvedAlias { index: 1, rows: 1, .. })));
    }
}
