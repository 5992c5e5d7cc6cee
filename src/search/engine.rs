//! Single-subquery execution: scoring, buckets, ordering, validation.
//!
//! Every entity is scored on up to three axes (name, argument types, return
//! type); each axis that clears its threshold lands in the corresponding
//! bucket keyed by the entity's dedup identity. Buckets are then sorted by a
//! fixed cascade of tie-breaks, validated, and capped.

use super::distance::EditDistance;
use super::matching;
use super::query::{Query, QueryMode, strip_underscores};
use super::{Distance, MAX_EDIT_DISTANCE, MAX_RESULTS, NO_MATCH, SearchHit, SearchOptions, SearchResults};
use crate::index::{Entity, EntityId, SearchIndex};
use crate::kind::passes_filter;
use ahash::AHashMap;
use std::cmp::Ordering;

/// Distances are tracked in tenths of an edit-distance unit so the 1/10 path
/// penalty stays integral.
const CAP_TENTHS: u32 = MAX_EDIT_DISTANCE as u32 * 10;

#[derive(Debug, Clone)]
struct Candidate {
    id: EntityId,
    /// Tenths of an edit-distance unit.
    dist: u32,
    /// Earliest occurrence of the query token in the stripped name.
    position: Option<usize>,
    /// Literal and signature matches skip post-sort validation.
    skip_validation: bool,
}

/// A result bucket during accumulation: insertion-ordered entries with a
/// dedup-identity slot map.
#[derive(Default)]
struct Bucket {
    entries: Vec<Candidate>,
    slots: AHashMap<String, usize>,
}

impl Bucket {
    fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    /// First entry wins its slot; later duplicates only lower the distance.
    fn insert(&mut self, key: String, candidate: Candidate) {
        match self.slots.get(&key) {
            Some(&at) => {
                let entry = &mut self.entries[at];
                entry.dist = entry.dist.min(candidate.dist);
            }
            None => {
                self.slots.insert(key, self.entries.len());
                self.entries.push(candidate);
            }
        }
    }
}

/// Dedup identity: kind + path + parent name + name. Overloads that share
/// all four collapse into one bucket entry.
pub(crate) fn dedup_key(entity: &Entity) -> String {
    let parent = entity.parent.as_ref().map_or("", |p| p.name.as_str());
    format!(
        "{}{}{}{}",
        entity.kind.name(),
        entity.path,
        parent,
        entity.name
    )
}

fn excluded_by_unit(entity: &Entity, options: &SearchOptions<'_>) -> bool {
    options
        .filter_unit
        .is_some_and(|filter| entity.unit != filter)
}

fn exact_candidate(id: EntityId) -> Candidate {
    Candidate {
        id,
        dist: 0,
        position: None,
        skip_validation: true,
    }
}

/// Evaluates one parsed subquery against the whole index.
pub(crate) fn exec_query(
    index: &SearchIndex,
    lev: &mut EditDistance,
    query: &Query,
    options: &SearchOptions<'_>,
) -> SearchResults {
    let mut names = Bucket::default();
    let mut in_args = Bucket::default();
    let mut returned = Bucket::default();

    match &query.mode {
        QueryMode::Literal(term) => {
            for (id, entity) in index.entities() {
                if excluded_by_unit(entity, options) {
                    continue;
                }
                let args_hit = matching::input_matches(entity, term);
                let return_hit = matching::output_matches(entity, term);
                if index.name(id) == term.name {
                    if passes_filter(query.filter, entity.kind) {
                        names.insert(dedup_key(entity), exact_candidate(id));
                    }
                } else if (args_hit || return_hit) && passes_filter(query.filter, entity.kind) {
                    if args_hit {
                        in_args.insert(dedup_key(entity), exact_candidate(id));
                    }
                    if return_hit {
                        returned.insert(dedup_key(entity), exact_candidate(id));
                    }
                }
            }
        }
        QueryMode::Signature { inputs, output } => {
            // `*` on either side is a wildcard: any inputs, or any output.
            let any_inputs = inputs.len() == 1 && inputs[0].name == "*";
            let any_output = output.name == "*";
            for (id, entity) in index.entities() {
                if excluded_by_unit(entity, options) || entity.signature.is_none() {
                    continue;
                }
                let return_hit = matching::output_matches(entity, output);
                if !(any_output || return_hit) {
                    continue;
                }
                if any_inputs {
                    names.insert(dedup_key(entity), exact_candidate(id));
                } else if inputs
                    .iter()
                    .all(|input| matching::input_matches(entity, input))
                {
                    in_args.insert(dedup_key(entity), exact_candidate(id));
                }
                if return_hit {
                    returned.insert(dedup_key(entity), exact_candidate(id));
                }
            }
        }
        QueryMode::Bare { path, name, term } => {
            if !name.is_empty() {
                scan_bare(
                    index, lev, query, options, path, name, term, &mut names, &mut in_args,
                    &mut returned,
                );
            }
        }
    }

    let split_tokens: Vec<&str> = query
        .text
        .split("::")
        .filter(|token| !token.is_empty())
        .collect();
    let (token, strip_candidates) = match &query.mode {
        QueryMode::Literal(term) => (term.name.as_str(), false),
        QueryMode::Signature { .. } => (query.text.as_str(), false),
        QueryMode::Bare { name, .. } => (name.as_str(), true),
    };

    SearchResults {
        in_args: finish_bucket(
            index,
            lev,
            in_args,
            token,
            strip_candidates,
            &split_tokens,
            false,
            options,
        ),
        returned: finish_bucket(
            index,
            lev,
            returned,
            token,
            strip_candidates,
            &split_tokens,
            false,
            options,
        ),
        names: finish_bucket(
            index,
            lev,
            names,
            token,
            strip_candidates,
            &split_tokens,
            true,
            options,
        ),
    }
}

/// Bare-mode scan: name distance with path penalty and substring snap, plus
/// approximate argument/return distances, per entity.
#[expect(clippy::too_many_arguments)]
fn scan_bare(
    index: &SearchIndex,
    lev: &mut EditDistance,
    query: &Query,
    options: &SearchOptions<'_>,
    path: &[String],
    name: &str,
    term: &crate::index::TypeTerm,
    names: &mut Bucket,
    in_args: &mut Bucket,
    returned: &mut Bucket,
) {
    let token_chars = name.chars().count();

    for (id, entity) in index.entities() {
        if excluded_by_unit(entity, options) {
            continue;
        }

        // Path constraints are a hard gate: no valid window, no entry in any
        // bucket. A fuzzy placement costs a tenth of a unit per point.
        let mut path_penalty = 0u32;
        if !path.is_empty() {
            let distance = matching::path_distance(lev, path, entity);
            if distance > MAX_EDIT_DISTANCE {
                continue;
            }
            path_penalty = distance as u32;
        }

        let filter_ok = passes_filter(query.filter, entity.kind);
        let word = index.name(id);
        let stripped = strip_underscores(word);
        let contained = stripped.contains(name);
        let key = dedup_key(entity);

        let mut position = None;
        if contained && filter_ok && !names.contains(&key) {
            position = stripped.find(name);
        }

        let args_distance = if filter_ok {
            matching::input_distance(lev, entity, term)
        } else {
            NO_MATCH
        };
        let return_distance = if filter_ok {
            matching::output_distance(lev, entity, term)
        } else {
            NO_MATCH
        };

        if args_distance <= MAX_EDIT_DISTANCE {
            in_args.insert(
                key.clone(),
                Candidate {
                    id,
                    dist: args_distance as u32 * 10,
                    position,
                    skip_validation: false,
                },
            );
        }
        if return_distance <= MAX_EDIT_DISTANCE {
            returned.insert(
                key.clone(),
                Candidate {
                    id,
                    dist: return_distance as u32 * 10,
                    position,
                    skip_validation: false,
                },
            );
        }

        if !filter_ok {
            continue;
        }

        let name_distance = lev.distance(word, name);
        let mut dist = if name_distance <= MAX_EDIT_DISTANCE {
            // One unit worse than the raw distance, so plain edit-distance
            // hits rank behind substring hits.
            (name_distance as u32 + 1) * 10
        } else {
            name_distance as u32 * 10
        };
        dist += path_penalty;

        // Substring snap: a long token occurring verbatim in the name pulls
        // the distance down hard.
        if dist > 0 && token_chars > 3 && contained {
            if token_chars < 6 {
                dist = dist.saturating_sub(10);
            } else {
                dist = 0;
            }
        }

        if position.is_some() || dist <= CAP_TENTHS {
            if position.is_some() && path.is_empty() {
                dist = 0;
            }
            names.insert(
                key,
                Candidate {
                    id,
                    dist,
                    position,
                    skip_validation: false,
                },
            );
        }
    }
}

/// Sorts a bucket, validates what needs validating, and caps the output.
#[expect(clippy::too_many_arguments)]
fn finish_bucket(
    index: &SearchIndex,
    lev: &mut EditDistance,
    bucket: Bucket,
    token: &str,
    strip_candidates: bool,
    split_tokens: &[&str],
    validate: bool,
    options: &SearchOptions<'_>,
) -> Vec<SearchHit> {
    if bucket.entries.is_empty() {
        return Vec::new();
    }

    let mut entries: Vec<(Candidate, bool)> = bucket
        .entries
        .into_iter()
        .map(|candidate| {
            let word = index.name(candidate.id);
            let exact = if strip_candidates {
                strip_underscores(word).as_ref() == token
            } else {
                word == token
            };
            (candidate, exact)
        })
        .collect();

    entries.sort_by(|(a, a_exact), (b, b_exact)| compare(index, options, a, *a_exact, b, *b_exact));

    let mut out = Vec::with_capacity(entries.len().min(MAX_RESULTS));
    for (candidate, _) in entries {
        if validate
            && !candidate.skip_validation
            && !validates(index, lev, candidate.id, split_tokens)
        {
            continue;
        }
        out.push(SearchHit {
            id: candidate.id,
            distance: Distance(candidate.dist),
            alias: None,
        });
        if out.len() >= MAX_RESULTS {
            break;
        }
    }
    out
}

/// The ranking cascade; the first differing rule decides.
fn compare(
    index: &SearchIndex,
    options: &SearchOptions<'_>,
    a: &Candidate,
    a_exact: bool,
    b: &Candidate,
    b_exact: bool,
) -> Ordering {
    let (entity_a, entity_b) = (index.entity(a.id), index.entity(b.id));
    let (word_a, word_b) = (index.name(a.id), index.name(b.id));

    // 1. Exact full-token name matches first.
    let ordering = b_exact.cmp(&a_exact);
    if ordering != Ordering::Equal {
        return ordering;
    }
    // 2. Smaller recorded distance first.
    let ordering = a.dist.cmp(&b.dist);
    if ordering != Ordering::Equal {
        return ordering;
    }
    // 3. The caller's current unit first.
    let a_current = options
        .current_unit
        .is_some_and(|unit| entity_a.unit == unit);
    let b_current = options
        .current_unit
        .is_some_and(|unit| entity_b.unit == unit);
    let ordering = b_current.cmp(&a_current);
    if ordering != Ordering::Equal {
        return ordering;
    }
    // 4. Shorter name first.
    let ordering = word_a.len().cmp(&word_b.len());
    if ordering != Ordering::Equal {
        return ordering;
    }
    // 5. Lexicographically smaller name first.
    let ordering = word_a.cmp(word_b);
    if ordering != Ordering::Equal {
        return ordering;
    }
    // 6. A literal occurrence present (and earlier) first.
    let a_position = a.position.map_or((true, 0), |at| (false, at));
    let b_position = b.position.map_or((true, 0), |at| (false, at));
    let ordering = a_position.cmp(&b_position);
    if ordering != Ordering::Equal {
        return ordering;
    }
    // 7. Primitive and keyword pages above everything else.
    let ordering = (!entity_a.kind.is_promoted()).cmp(&!entity_b.kind.is_promoted());
    if ordering != Ordering::Equal {
        return ordering;
    }
    // 8. Described entries before bare ones.
    let ordering = entity_a.desc.is_empty().cmp(&entity_b.desc.is_empty());
    if ordering != Ordering::Equal {
        return ordering;
    }
    // 9. Smaller kind ordinal first.
    let ordering = entity_a.kind.ordinal().cmp(&entity_b.kind.ordinal());
    if ordering != Ordering::Equal {
        return ordering;
    }
    // 10. Lexicographically smaller declaring path first.
    entity_a.path.cmp(&entity_b.path)
}

/// Post-sort validation: every `::`-split token of the query must occur in
/// the name, path, or parent name, or sit within the edit-distance cap of
/// the name.
fn validates(
    index: &SearchIndex,
    lev: &mut EditDistance,
    id: EntityId,
    tokens: &[&str],
) -> bool {
    let entity = index.entity(id);
    let name = index.name(id);
    tokens.iter().all(|token| {
        name.contains(token)
            || entity.path.to_lowercase().contains(token)
            || entity
                .parent
                .as_ref()
                .is_some_and(|parent| parent.name.to_lowercase().contains(token))
            || lev.distance(name, token) <= MAX_EDIT_DISTANCE
    })
}

#[cfg(test)]
mod tests {
    use super::super::{SearchOptions, Searcher};
    use crate::index::SearchIndex;
    use crate::index::raw::RawIndex;
    use assert2::check;
    use serde_json::json;

    fn index(value: serde_json::Value) -> SearchIndex {
        let raw: RawIndex = serde_json::from_value(value).unwrap();
        SearchIndex::build(raw).unwrap()
    }

    fn names_of(index: &SearchIndex, hits: &[super::SearchHit]) -> Vec<String> {
        hits.iter()
            .map(|hit| index.entity(hit.id).name.clone())
            .collect()
    }

    #[test]
    fn substring_snap_thresholds() {
        // Path-qualified so the snap is visible (unqualified substring hits
        // reset to zero outright).
        let corpus = index(json!({
            "demo": {
                "doc": "",
                "i": [
                    [5, "parse", "demo", "", null, null],
                    [5, "unparsed", "demo", "", null, null]
                ],
                "p": []
            }
        }));
        let mut searcher = Searcher::new(&corpus);
        let results = searcher.search("demo::parse", &SearchOptions::default());
        // Token "parse" is 5 chars: snap subtracts one unit. Exact name goes
        // from 1.0 to 0.0; the containing name drops by a unit but stays
        // ranked behind.
        let names = names_of(&corpus, &results.names);
        check!(names == vec!["parse".to_owned(), "unparsed".to_owned()]);
        check!(results.names[0].distance.as_f32() == 0.0);
        check!(results.names[1].distance.as_f32() > 0.0);
    }

    #[test]
    fn long_token_snaps_to_zero() {
        let corpus = index(json!({
            "demo": {
                "doc": "",
                "i": [[5, "reparsers", "demo", "", null, null]],
                "p": []
            }
        }));
        let mut searcher = Searcher::new(&corpus);
        // "parsers" is 7 chars and far from "reparsers" by pure edit
        // distance, but it occurs verbatim, so it snaps to zero.
        let results = searcher.search("demo::parsers", &SearchOptions::default());
        check!(results.names.len() == 1);
        check!(results.names[0].distance.as_f32() == 0.0);
    }

    #[test]
    fn short_token_gets_no_snap() {
        let corpus = index(json!({
            "demo": {
                "doc": "",
                "i": [[5, "mapx", "demo", "", null, null]],
                "p": []
            }
        }));
        let mut searcher = Searcher::new(&corpus);
        // "map" is only 3 chars; contained matches still count, but the snap
        // never fires for path-qualified hits.
        let results = searcher.search("demo::map", &SearchOptions::default());
        check!(results.names.len() == 1);
        check!(results.names[0].distance.as_f32() == 2.0);
    }

    #[test]
    fn shorter_names_rank_first_among_equals() {
        let corpus = index(json!({
            "demo": {
                "doc": "",
                "i": [
                    [3, "reader_buf", "demo", "", null, null],
                    [3, "reader", "demo", "", null, null]
                ],
                "p": []
            }
        }));
        let mut searcher = Searcher::new(&corpus);
        let results = searcher.search("read", &SearchOptions::default());
        let names = names_of(&corpus, &results.names);
        check!(names == vec!["reader".to_owned(), "reader_buf".to_owned()]);
    }

    #[test]
    fn described_entries_rank_before_bare_ones() {
        // Same name in two paths: rules 1-7 all tie, rule 8 decides.
        let corpus = index(json!({
            "demo": {
                "doc": "",
                "i": [
                    [3, "widget", "demo::bare", "", null, null],
                    [3, "widget", "demo::docd", "A documented widget", null, null]
                ],
                "p": []
            }
        }));
        let mut searcher = Searcher::new(&corpus);
        let results = searcher.search("widget", &SearchOptions::default());
        let paths: Vec<String> = results
            .names
            .iter()
            .map(|hit| corpus.entity(hit.id).path.clone())
            .collect();
        check!(paths == vec!["demo::docd".to_owned(), "demo::bare".to_owned()]);
    }

    #[test]
    fn primitives_promote_over_other_kinds() {
        let corpus = index(json!({
            "demo": {
                "doc": "",
                "i": [
                    [3, "slice", "demo::a", "", null, null],
                    [15, "slice", "demo::b", "", null, null]
                ],
                "p": []
            }
        }));
        let mut searcher = Searcher::new(&corpus);
        let results = searcher.search("slice", &SearchOptions::default());
        check!(corpus.entity(results.names[0].id).path == "demo::b");
    }

    #[test]
    fn validation_drops_unrelated_path_tokens() {
        let corpus = index(json!({
            "demo": {
                "doc": "",
                "i": [
                    [11, "open", "std::fs", "", 0, null],
                    [5, "openy", "std::phile", "", null, null]
                ],
                "p": [[3, "File"]]
            }
        }));
        let mut searcher = Searcher::new(&corpus);
        let results = searcher.search("file::open", &SearchOptions::default());
        let names = names_of(&corpus, &results.names);
        // "openy" survives the fuzzy path window ("phile" is one edit from
        // "file") but fails validation: no field contains "file" literally
        // and the name is far from it.
        check!(names == vec!["open".to_owned()]);
    }

    #[test]
    fn duplicate_identities_keep_the_smaller_distance() {
        // Same kind + path + name in the same unit: one slot, minimum
        // distance.
        let corpus = index(json!({
            "demo": {
                "doc": "",
                "i": [
                    [5, "grow", "demo", "", null, [[["vec", ["t"]]], null]],
                    [5, "grow", "demo", "", null, [[["vec", ["t"]], "usize"], null]]
                ],
                "p": []
            }
        }));
        let mut searcher = Searcher::new(&corpus);
        let results = searcher.search("vec<t>", &SearchOptions::default());
        check!(results.in_args.len() == 1);
        check!(results.in_args[0].distance.as_f32() == 0.0);
    }

    #[test]
    fn kind_filter_gates_every_axis() {
        let corpus = index(json!({
            "demo": {
                "doc": "",
                "i": [
                    [5, "launch", "demo", "", null, [[["config"]], ["status"]]],
                    [3, "launcher", "demo", "", null, null]
                ],
                "p": []
            }
        }));
        let mut searcher = Searcher::new(&corpus);
        let results = searcher.search("fn:launch", &SearchOptions::default());
        let names = names_of(&corpus, &results.names);
        check!(names == vec!["launch".to_owned()], "struct fails the fn filter");

        let results = searcher.search("fn:config", &SearchOptions::default());
        check!(names_of(&corpus, &results.in_args) == vec!["launch".to_owned()]);
        let results = searcher.search("struct:config", &SearchOptions::default());
        check!(results.in_args.is_empty(), "fn fails the struct filter on args too");
    }
}
