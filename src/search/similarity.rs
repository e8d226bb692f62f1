//! Fuzzy similarity scoring
//!
//! A deliberate character-set/length heuristic, not an edit distance: the
//! exact weights below are the contract the fuzzy ranking depends on, so no
//! general-purpose matcher may be substituted here.

use std::collections::HashSet;

/// Score how close two strings are, in [0.0, 1.0].
///
/// Operates on lower-cased input. Combines distinct-character overlap (0.6),
/// length closeness (0.4) and a flat 0.3 bonus when one string contains the
/// other, clamped to 1.0. Identical strings score exactly 1.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    if a == b {
        return 1.0;
    }

    let len_a = a.chars().count();
    let len_b = b.chars().count();
    if len_a == 0 || len_b == 0 {
        return 0.0;
    }

    let chars_a: HashSet<char> = a.chars().collect();
    let chars_b: HashSet<char> = b.chars().collect();
    let common = chars_a.intersection(&chars_b).count();

    let max_len = len_a.max(len_b) as f64;
    let overlap_score = common as f64 / max_len;

    let length_diff = (len_a as f64 - len_b as f64).abs() / max_len;
    let length_score = 1.0 - length_diff;

    let substring_bonus = if a.contains(&b) || b.contains(&a) {
        0.3
    } else {
        0.0
    };

    (overlap_score * 0.6 + length_score * 0.4 + substring_bonus).min(1.0)
}
