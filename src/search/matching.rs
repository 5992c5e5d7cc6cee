//! Generic-aware type comparison, argument/return matching, and windowed
//! path containment.
//!
//! Everything here reports failure as a sentinel (`NO_MATCH` or `false`),
//! never as an error; the engine turns sentinels into bucket omission.

use super::distance::EditDistance;
use super::{MAX_EDIT_DISTANCE, NO_MATCH};
use crate::index::{Entity, TypeTerm};
use std::borrow::Cow;

/// Literal type comparison: exact names, one-to-one generic consumption.
///
/// When the names differ, the requested name may still sit among the
/// candidate's own generics (searching for `t` finds `vec<t>`).
pub(crate) fn type_matches(candidate: &TypeTerm, requested: &TypeTerm) -> bool {
    if candidate.name == requested.name {
        if requested.generics.is_empty() {
            return true;
        }
        if candidate.generics.len() < requested.generics.len() {
            return false;
        }
        let mut remaining: Vec<&str> = candidate.generics.iter().map(String::as_str).collect();
        for wanted in &requested.generics {
            match remaining.iter().position(|generic| *generic == wanted.as_str()) {
                Some(at) => {
                    remaining.remove(at);
                }
                None => return false,
            }
        }
        return true;
    }
    candidate
        .generics
        .iter()
        .any(|generic| generic == &requested.name)
}

/// Greedy nearest-first alignment of the requested generics against the
/// candidate's, consuming each best match. Not an optimal assignment, and
/// kept that way deliberately for parity with the established ranking.
fn generics_distance(lev: &mut EditDistance, candidate: &TypeTerm, requested: &TypeTerm) -> usize {
    if requested.generics.is_empty() || candidate.generics.len() < requested.generics.len() {
        return NO_MATCH;
    }
    let mut remaining: Vec<&str> = candidate.generics.iter().map(String::as_str).collect();
    let mut total = 0;
    for wanted in &requested.generics {
        let mut best = NO_MATCH;
        let mut best_at = None;
        for (at, generic) in remaining.iter().enumerate() {
            let distance = lev.distance(generic, wanted);
            if distance < best {
                best = distance;
                best_at = Some(at);
            }
        }
        match best_at {
            Some(at) => {
                remaining.remove(at);
                total += best;
            }
            None => return NO_MATCH,
        }
    }
    total.div_ceil(requested.generics.len())
}

/// Approximate type comparison, capped at `NO_MATCH`.
///
/// Exact-name matches grade on generic alignment alone; everything derived
/// from an inexact name comparison is reported one unit worse, so it ranks
/// behind exact-name matches.
pub(crate) fn type_distance(
    lev: &mut EditDistance,
    candidate: &TypeTerm,
    requested: &TypeTerm,
) -> usize {
    if candidate.name == requested.name {
        if candidate.generics.is_empty() {
            return 0;
        }
        let aligned = generics_distance(lev, candidate, requested);
        if aligned <= MAX_EDIT_DISTANCE {
            return aligned;
        }
        // The name matched but the generics did not; grade it below as an
        // inexact match.
    }
    let mut distance = lev
        .distance(&candidate.name, &requested.name)
        .min(NO_MATCH);
    if distance <= MAX_EDIT_DISTANCE {
        distance = (generics_distance(lev, candidate, requested) + distance).div_ceil(2);
    } else if !candidate.generics.is_empty() {
        for generic in &candidate.generics {
            distance = distance.min(lev.distance(generic, &requested.name));
        }
    }
    distance + 1
}

/// Literal input matching: true on the first input term that matches.
pub(crate) fn input_matches(entity: &Entity, requested: &TypeTerm) -> bool {
    entity.signature.as_ref().is_some_and(|signature| {
        signature
            .inputs
            .iter()
            .any(|input| type_matches(input, requested))
    })
}

/// Minimum approximate distance across input terms; `NO_MATCH` when the
/// entity declares no inputs.
pub(crate) fn input_distance(
    lev: &mut EditDistance,
    entity: &Entity,
    requested: &TypeTerm,
) -> usize {
    let Some(signature) = &entity.signature else {
        return NO_MATCH;
    };
    let mut best = NO_MATCH;
    for input in &signature.inputs {
        best = best.min(type_distance(lev, input, requested));
        if best == 0 {
            return 0;
        }
    }
    best
}

/// Literal output matching; entities with no declared output never match.
pub(crate) fn output_matches(entity: &Entity, requested: &TypeTerm) -> bool {
    entity
        .signature
        .as_ref()
        .and_then(|signature| signature.output.as_ref())
        .is_some_and(|output| type_matches(output, requested))
}

/// Approximate output distance; `NO_MATCH` when no output is declared.
pub(crate) fn output_distance(
    lev: &mut EditDistance,
    entity: &Entity,
    requested: &TypeTerm,
) -> usize {
    match entity
        .signature
        .as_ref()
        .and_then(|signature| signature.output.as_ref())
    {
        Some(output) => type_distance(lev, output, requested),
        None => NO_MATCH,
    }
}

/// Windowed fuzzy path containment.
///
/// Slides a window of the requested length across the candidate's path
/// tokens (with the parent's name appended), sums per-segment distances,
/// abandons a placement as soon as one segment exceeds the cap, and keeps
/// the best rounded per-segment average. `NO_MATCH` means no placement fits
/// at all, which excludes the candidate outright.
pub(crate) fn path_distance(
    lev: &mut EditDistance,
    requested: &[String],
    entity: &Entity,
) -> usize {
    if requested.is_empty() {
        return 0;
    }
    let mut tokens: Vec<Cow<'_, str>> = entity.path.split("::").map(Cow::Borrowed).collect();
    if let Some(parent) = &entity.parent {
        tokens.push(Cow::Owned(parent.name.to_lowercase()));
    }
    if requested.len() > tokens.len() {
        return NO_MATCH;
    }

    let mut best = NO_MATCH;
    for window in tokens.windows(requested.len()) {
        let mut total = 0;
        let mut aborted = false;
        for (token, wanted) in window.iter().zip(requested) {
            let distance = lev.distance(token, wanted);
            if distance > MAX_EDIT_DISTANCE {
                aborted = true;
                break;
            }
            total += distance;
        }
        if !aborted {
            // Round-half-up per-segment average, in integers.
            best = best.min((2 * total + requested.len()) / (2 * requested.len()));
        }
    }
    best
}
