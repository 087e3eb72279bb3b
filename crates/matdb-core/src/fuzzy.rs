//! The one string-similarity measure used across the workspace.
//!
//! Guarantees for `fuzzy_match_score(a, b)`:
//! - result is in `[0, 1]` and symmetric
//! - comparison is case-insensitive and ignores surrounding whitespace
//! - an empty side scores `0.0`
//! - non-empty strings that are equal after trimming and lowercasing score
//!   `1.0`, whitespace-only input included
//! - containment scores `0.7 + 0.3 * shorter/longer`, so at least `0.7`
//! - a single-character edit scores at least `0.85`
//! - anything else is the larger of normalized Levenshtein similarity and
//!   `0.9 *` token-set Jaccard (reordered words never reach `1.0`)

use std::collections::BTreeSet;

const CONTAINMENT_FLOOR: f32 = 0.7;
const SINGLE_EDIT_FLOOR: f32 = 0.85;
const TOKEN_WEIGHT: f32 = 0.9;

pub fn fuzzy_match_score(a: &str, b: &str) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let (len_a, len_b) = (a.chars().count(), b.chars().count());
    let (short, long) = if len_a <= len_b { (len_a, len_b) } else { (len_b, len_a) };

    let mut best = 0.0f32;
    if a.contains(&b) || b.contains(&a) {
        best = CONTAINMENT_FLOOR + (1.0 - CONTAINMENT_FLOOR) * (short as f32 / long as f32);
    }

    let distance = strsim::levenshtein(&a, &b);
    let mut edit = strsim::normalized_levenshtein(&a, &b) as f32;
    if distance == 1 {
        edit = edit.max(SINGLE_EDIT_FLOOR);
    }
    best = best.max(edit);

    best = best.max(TOKEN_WEIGHT * token_jaccard(&a, &b));
    // Only identical strings may reach a perfect score.
    best.clamp(0.0, 0.999)
}

fn token_jaccard(a: &str, b: &str) -> f32 {
    let ta: BTreeSet<&str> = a.split_whitespace().collect();
    let tb: BTreeSet<&str> = b.split_whitespace().collect();
    let union = ta.union(&tb).count();
    if union == 0 {
        return 0.0;
    }
    ta.intersection(&tb).count() as f32 / union as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_is_one_case_insensitive() {
        assert!((fuzzy_match_score("Hyaluronic Acid", "hyaluronic acid") - 1.0).abs() < 1e-6);
        assert_eq!(fuzzy_match_score(" ", " "), 1.0);
        assert_eq!(fuzzy_match_score(" Glycerin", "glycerin "), 1.0);
        assert_eq!(fuzzy_match_score(" ", "glycerin"), 0.0);
    }

    #[test]
    fn single_edit_floor() {
        assert!(fuzzy_match_score("abc", "abd") >= 0.85);
        assert!(fuzzy_match_score("niacinamide", "niacinamid") >= 0.85);
    }

    #[test]
    fn containment_floor_and_symmetry() {
        let s1 = fuzzy_match_score("Tinogard", "Tinogard TT");
        let s2 = fuzzy_match_score("Tinogard TT", "Tinogard");
        assert!(s1 >= 0.7);
        assert!((s1 - s2).abs() < 1e-6);
    }

    #[test]
    fn unrelated_is_low() {
        assert!(fuzzy_match_score("glycerin", "zinc oxide") < 0.5);
        assert_eq!(fuzzy_match_score("", "anything"), 0.0);
    }
}
