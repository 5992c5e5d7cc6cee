//! Shared fixtures: small raw-format corpora built as JSON literals.

use serde_json::{Value, json};
use symdex::SearchIndex;
use symdex::index::raw::RawIndex;

/// Decodes and builds a search index from a raw JSON value.
pub fn build_index(value: Value) -> SearchIndex {
    let raw: RawIndex = serde_json::from_value(value).expect("fixture should decode");
    SearchIndex::build(raw).expect("fixture should build")
}

/// Names of a bucket's entities, in rank order.
pub fn bucket_names(index: &SearchIndex, hits: &[symdex::SearchHit]) -> Vec<String> {
    hits.iter()
        .map(|hit| index.entity(hit.id).name.clone())
        .collect()
}

/// A small standard-library-flavored corpus.
///
/// Kind ordinals: 0 = mod, 3 = struct, 5 = fn, 11 = method, 15 = primitive.
pub fn std_corpus() -> SearchIndex {
    build_index(json!({
        "alloc": {
            "doc": "Memory allocation APIs",
            "i": [
                [0, "vec", "alloc", "A contiguous growable array module", null, null],
                [3, "Vec", "alloc::vec", "A contiguous growable array type", null, null],
                [11, "push", "alloc::vec", "Appends an element", 0,
                    [[["vec", ["t"]], "t"], null]],
                [11, "pop", "alloc::vec", "Removes the last element", 0,
                    [[["vec", ["t"]]], ["option", ["t"]]]]
            ],
            "p": [[3, "Vec"]]
        },
        "std": {
            "doc": "The standard library",
            "i": [
                [3, "Vec", "std::vec", "Re-export of the growable array", null, null],
                [5, "from_utf8", "std::str", "Converts bytes to a string slice", null,
                    [[["vec", ["u8"]]], ["result", ["string", "fromutf8error"]]]],
                [15, "bool", "std", "The boolean primitive", null, null]
            ],
            "p": []
        }
    }))
}
