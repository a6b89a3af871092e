//! Fuzzy matching for approximate term comparison.

use serde::{Deserialize, Serialize};

use crate::util::levenshtein::{levenshtein_distance, levenshtein_similarity};

/// Default maximum edit distance accepted as a fuzzy match.
pub const DEFAULT_FUZZY_THRESHOLD: usize = 2;

/// Edit-distance based matcher.
///
/// The match decision uses the raw edit distance against `threshold`; the
/// normalized similarity from [`calculate_similarity`](Self::calculate_similarity)
/// is only used for ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuzzyMatcher {
    /// Maximum edit distance (Levenshtein distance)
    threshold: usize,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_FUZZY_THRESHOLD)
    }
}

impl FuzzyMatcher {
    /// Create a matcher accepting up to `threshold` edits.
    pub fn new(threshold: usize) -> Self {
        FuzzyMatcher { threshold }
    }

    /// Get the maximum accepted edit distance.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Levenshtein distance between two strings.
    pub fn levenshtein_distance(&self, a: &str, b: &str) -> usize {
        levenshtein_distance(a, b)
    }

    /// Check whether `term` is within the edit threshold of `query`.
    pub fn is_match(&self, term: &str, query: &str) -> bool {
        if term == query {
            return true;
        }

        self.levenshtein_distance(term, query) <= self.threshold
    }

    /// Similarity in `[0, 1]` used for ranking fuzzy hits.
    pub fn calculate_similarity(&self, a: &str, b: &str) -> f64 {
        levenshtein_similarity(a, b)
    }

    /// Return the terms that fuzzily match `query`, compared case-insensitively.
    pub fn find_matches<S: AsRef<str>>(&self, terms: &[S], query: &str) -> Vec<String> {
        let query_lower = query.to_lowercase();
        terms
            .iter()
            .map(AsRef::as_ref)
            .filter(|term| self.is_match(&term.to_lowercase(), &query_lower))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_match_uses_raw_distance() {
        let matcher = FuzzyMatcher::default();

        assert!(matcher.is_match("hello", "hello"));
        assert!(matcher.is_match("hello", "helo"));
        assert!(matcher.is_match("hello", "hallo"));
        assert!(!matcher.is_match("kitten", "sitting"));
        // Similarity of "ab" / "cd" is 0.0, but two edits are within the threshold.
        assert!(matcher.is_match("ab", "cd"));
        assert!(matcher.is_match("", ""));
    }

    #[test]
    fn test_threshold() {
        let strict = FuzzyMatcher::new(0);
        assert!(strict.is_match("exact", "exact"));
        assert!(!strict.is_match("exact", "exakt"));

        let lenient = FuzzyMatcher::new(3);
        assert!(lenient.is_match("kitten", "sitting"));
        assert_eq!(lenient.threshold(), 3);
    }

    #[test]
    fn test_calculate_similarity() {
        let matcher = FuzzyMatcher::default();
        assert_eq!(matcher.calculate_similarity("", ""), 1.0);
        assert_eq!(matcher.calculate_similarity("rust", "rust"), 1.0);
        assert!((matcher.calculate_similarity("rust", "bust") - 0.75).abs() < 1e-9);
        assert_eq!(matcher.calculate_similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_find_matches_case_insensitive() {
        let matcher = FuzzyMatcher::default();
        let terms = ["Search", "serach", "research", "engine"];

        let matches = matcher.find_matches(&terms, "SEARCH");
        assert_eq!(matches, vec!["Search", "serach", "research"]);
    }

    #[test]
    fn test_kitten_sitting() {
        assert_eq!(FuzzyMatcher::default().levenshtein_distance("kitten", "sitting"), 3);
    }
}
