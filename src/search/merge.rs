//! K-way interleave of per-subquery result buckets.

use super::engine::dedup_key;
use super::{MAX_RESULTS, SearchHit};
use crate::index::SearchIndex;
use ahash::AHashSet;

/// Merges one bucket family across subqueries.
///
/// Each round: advance every subquery past heads whose identity was already
/// emitted, find the smallest current-head distance, then emit (and advance)
/// every head tied at that minimum. Stops at the result cap or when all
/// subqueries are exhausted.
pub(crate) fn merge_buckets(index: &SearchIndex, buckets: Vec<Vec<SearchHit>>) -> Vec<SearchHit> {
    let mut positions = vec![0usize; buckets.len()];
    let mut emitted: AHashSet<String> = AHashSet::new();
    let mut out = Vec::new();

    loop {
        for (bucket, position) in buckets.iter().zip(&mut positions) {
            while bucket
                .get(*position)
                .is_some_and(|hit| emitted.contains(&dedup_key(index.entity(hit.id))))
            {
                *position += 1;
            }
        }

        let Some(smallest) = buckets
            .iter()
            .zip(&positions)
            .filter_map(|(bucket, &position)| bucket.get(position).map(|hit| hit.distance))
            .min()
        else {
            break;
        };

        for (bucket, position) in buckets.iter().zip(&mut positions) {
            if let Some(hit) = bucket.get(*position)
                && hit.distance == smallest
            {
                if emitted.insert(dedup_key(index.entity(hit.id))) {
                    out.push(hit.clone());
                    if out.len() >= MAX_RESULTS {
                        return out;
                    }
                }
                *position += 1;
            }
        }
    }
    out
}
