//! Query execution over a built index.
//!
//! A search call is a pure function of (query string, index, options): it
//! performs no I/O, never suspends, and never mutates the index. The only
//! scratch state is the edit-distance row owned by the [`Searcher`], which
//! is why concurrent callers each need their own `Searcher` over the shared
//! index.

pub(crate) mod distance;
mod engine;
mod matching;
mod merge;
pub mod query;

pub use distance::EditDistance;

use crate::index::{EntityId, SearchIndex};
use std::fmt;

pub(crate) const MAX_EDIT_DISTANCE: usize = 3;
pub(crate) const NO_MATCH: usize = MAX_EDIT_DISTANCE + 1;

/// Hard cap on every result bucket.
pub const MAX_RESULTS: usize = 200;

/// A match distance, in fixed-point tenths of an edit-distance unit.
///
/// The path penalty contributes a tenth per point, so distances stay exact
/// integers and ordering is total; no float comparison anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Distance(pub(crate) u32);

impl Distance {
    pub const ZERO: Self = Self(0);

    pub fn as_f32(self) -> f32 {
        self.0 as f32 / 10.0
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 10, self.0 % 10)
    }
}

/// Caller-supplied configuration: the original's ambient globals, made
/// explicit parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions<'a> {
    /// Restrict matching to one compilation unit.
    pub filter_unit: Option<&'a str>,
    /// Unit whose entities win distance ties and whose alias table is
    /// consulted.
    pub current_unit: Option<&'a str>,
}

/// One ranked match.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub id: EntityId,
    pub distance: Distance,
    /// Set when the hit came from the alias table; holds the alias text.
    pub alias: Option<String>,
}

/// The three ranked result buckets.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    /// Name matches.
    pub names: Vec<SearchHit>,
    /// Argument-type matches.
    pub in_args: Vec<SearchHit>,
    /// Return-type matches.
    pub returned: Vec<SearchHit>,
}

/// A query session against one index; owns the scratch state reused across
/// calls. Build one per concurrent caller.
pub struct Searcher<'a> {
    index: &'a SearchIndex,
    lev: EditDistance,
}

impl<'a> Searcher<'a> {
    pub fn new(index: &'a SearchIndex) -> Self {
        Self {
            index,
            lev: EditDistance::new(),
        }
    }

    /// Evaluates a raw query string.
    ///
    /// Top-level comma-separated subqueries are each evaluated in isolation
    /// and their bucket families interleaved by ascending distance. An empty
    /// or degenerate query matches nothing.
    pub fn search(&mut self, raw: &str, options: &SearchOptions<'_>) -> SearchResults {
        let mut evaluated: Vec<SearchResults> = Vec::new();
        for piece in query::split_top_level_commas(raw) {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            let parsed = query::Query::parse(piece);
            tracing::debug!("executing subquery '{}'", piece);
            let mut results = engine::exec_query(self.index, &mut self.lev, &parsed, options);
            self.apply_aliases(&parsed, options, &mut results);
            evaluated.push(results);
        }

        if evaluated.len() > 1 {
            let mut names = Vec::with_capacity(evaluated.len());
            let mut in_args = Vec::with_capacity(evaluated.len());
            let mut returned = Vec::with_capacity(evaluated.len());
            for results in evaluated {
                names.push(results.names);
                in_args.push(results.in_args);
                returned.push(results.returned);
            }
            SearchResults {
                names: merge::merge_buckets(self.index, names),
                in_args: merge::merge_buckets(self.index, in_args),
                returned: merge::merge_buckets(self.index, returned),
            }
        } else {
            evaluated.pop().unwrap_or_default()
        }
    }

    /// Alias short-circuit: when the current unit's table maps the literal
    /// query text, the pre-authored hits go ahead of everything computed and
    /// the bucket is re-trimmed from the tail.
    fn apply_aliases(
        &self,
        parsed: &query::Query,
        options: &SearchOptions<'_>,
        results: &mut SearchResults,
    ) {
        let Some(current) = options.current_unit else {
            return;
        };
        let Some(targets) = self.index.aliases_for(current, &parsed.raw) else {
            return;
        };
        let hits: Vec<SearchHit> = targets
            .iter()
            .map(|&id| SearchHit {
                id,
                distance: Distance::ZERO,
                alias: Some(parsed.raw.clone()),
            })
            .collect();
        results.names.splice(0..0, hits);
        results.names.truncate(MAX_RESULTS);
    }
}

/// One-shot convenience wrapper around [`Searcher`].
pub fn search(index: &SearchIndex, raw: &str, options: &SearchOptions<'_>) -> SearchResults {
    Searcher::new(index).search(raw, options)
}
