//! Token-set similarity scoring
//!
//! Scores are on a 0-100 scale. Token order and repeated tokens do not
//! matter; when one side's tokens are a subset of the other's the score is
//! 100, which is what makes a bare surname match every full name carrying it.

use rapidfuzz::distance::indel;
use std::collections::BTreeSet;

/// Indel similarity, 0-100: `1 - indel / (len_a + len_b)`
///
/// Only insertions and deletions count, so a substitution costs two edits
/// but is spread over both lengths.
pub fn ratio(a: &str, b: &str) -> f64 {
    indel::normalized_similarity(a.chars(), b.chars()) * 100.0
}

/// Token-set overlap ratio, 0-100
///
/// **Algorithm:**
/// 1. Split both strings into token sets
/// 2. Build the sorted intersection and the two sorted differences
/// 3. If the intersection is non-empty and either difference is empty: 100
/// 4. Otherwise the best [`ratio`] among intersection vs intersection+diff
///    (each side) and the two intersection+diff strings against each other
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let sect: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let diff_ab: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let diff_ba: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    if !sect.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 100.0;
    }

    let sect = sect.join(" ");
    let combined_ab = join_nonempty(&sect, &diff_ab.join(" "));
    let combined_ba = join_nonempty(&sect, &diff_ba.join(" "));

    let mut best = ratio(&combined_ab, &combined_ba);
    if !sect.is_empty() {
        best = best
            .max(ratio(&sect, &combined_ab))
            .max(ratio(&sect, &combined_ba));
    }
    best
}

fn join_nonempty(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{} {}", head, tail),
    }
}

/// Best-scoring candidate as `(position, score)`; the earliest wins ties
pub fn extract_one<'a, I>(query: &str, candidates: I) -> Option<(usize, f64)>
where
    I: IntoIterator<Item = (usize, &'a str)>,
{
    let mut best: Option<(usize, f64)> = None;
    for (position, candidate) in candidates {
        let score = token_set_ratio(query, candidate);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((position, score));
        }
    }
    best
}
