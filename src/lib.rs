//! Fuzzy, type-aware symbol search over a static documentation index.
//!
//! The index is a flat, immutable table of named, typed entities grouped by
//! compilation unit. Queries come in three modes (quoted literal,
//! `inputs -> output` signature, and path-qualified free text) and produce
//! three ranked buckets: name matches, argument-type matches, and
//! return-type matches. Rendering, input debouncing, and navigation are the
//! caller's business; this crate only parses, matches, and ranks.

pub mod cli;
pub mod error;
pub mod index;
pub mod kind;
pub mod search;
pub mod tracing;

pub use error::{IndexError, Result};
pub use index::{Entity, EntityId, Parent, SearchIndex, TypeSignature, TypeTerm};
pub use kind::{ItemKind, passes_filter};
pub use search::{
    Distance, MAX_RESULTS, SearchHit, SearchOptions, SearchResults, Searcher, search,
};
