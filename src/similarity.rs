//! Name similarity used to decide whether a search hit is the place asked for.

use crate::normalize::normalize;

/// Minimum score for a search hit to count as the requested place.
pub const RELEVANCE_THRESHOLD: f64 = 0.5;

/// Score returned when one name contains the other
const CONTAINMENT_SCORE: f64 = 0.8;

fn fold(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Cheap name similarity in `[0, 1]`.
///
/// Exact match scores 1.0, containment in either direction 0.8; otherwise
/// the share of the shorter name's characters that appear anywhere in the
/// longer name, measured against the longer name's length.
pub fn similarity(a: &str, b: &str) -> f64 {
    let s1 = fold(a);
    let s2 = fold(b);
    if s1 == s2 {
        return 1.0;
    }
    if s1.is_empty() || s2.is_empty() {
        return 0.0;
    }
    if s1.contains(&s2) || s2.contains(&s1) {
        return CONTAINMENT_SCORE;
    }

    let len1 = s1.chars().count();
    let len2 = s2.chars().count();
    let (longer, shorter, longer_len) = if len1 > len2 {
        (&s1, &s2, len1)
    } else {
        (&s2, &s1, len2)
    };
    let matches = shorter.chars().filter(|c| longer.contains(*c)).count();
    matches as f64 / longer_len as f64
}

/// Whether a candidate's name plausibly refers to the queried place
pub fn is_relevant(query: &str, candidate_name: &str) -> bool {
    similarity(&normalize(query), candidate_name) >= RELEVANCE_THRESHOLD
}
