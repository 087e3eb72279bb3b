use std::cmp::Ordering;
use std::collections::HashMap;

use matdb_core::config::SearchOptions;
use matdb_core::types::SearchResult;

/// Merge partial result lists into the final ranking.
///
/// One entry per code survives (highest score, ties toward exact over
/// metadata over fuzzy over semantic). Entries below the similarity threshold
/// are dropped before truncating to `top_k`. With exact-code intent the
/// structured matches lead the list, and without any structured match the
/// result is empty.
pub fn rerank(candidates: Vec<SearchResult>, options: &SearchOptions, exact_intent: bool) -> Vec<SearchResult> {
    let mut best: HashMap<String, SearchResult> = HashMap::new();
    for candidate in candidates {
        let replace = best
            .get(&candidate.document.code)
            .map_or(true, |current| compare(&candidate, current) == Ordering::Less);
        if replace {
            best.insert(candidate.document.code.clone(), candidate);
        }
    }

    let mut merged: Vec<SearchResult> =
        best.into_values().filter(|r| r.score >= options.similarity_threshold).collect();

    if exact_intent {
        if !merged.iter().any(|r| r.match_type.is_structured()) {
            return vec![];
        }
        merged.sort_by(|a, b| {
            b.match_type
                .is_structured()
                .cmp(&a.match_type.is_structured())
                .then_with(|| compare(a, b))
        });
    } else {
        merged.sort_by(compare);
    }
    merged.truncate(options.top_k);
    merged
}

/// `Less` means `a` ranks ahead of `b`.
fn compare(a: &SearchResult, b: &SearchResult) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.match_type.rank().cmp(&b.match_type.rank()))
        .then_with(|| a.document.code.cmp(&b.document.code))
}
