//! Highlighting of query term matches in result documents.

use std::collections::{BTreeMap, HashSet};

use regex::Regex;

use crate::document::Document;

/// Field → matched substrings, in first-seen order.
pub type Highlights = BTreeMap<String, Vec<String>>;

/// Finds the case-insensitive occurrences of query terms in field values.
///
/// Matches are substrings, not whole words: the term `rust` highlights the
/// `Rust` of `Rustacean`.
#[derive(Debug, Clone)]
pub struct Highlighter {
    patterns: Vec<Regex>,
}

impl Highlighter {
    /// Compile one pattern per term.
    pub fn new(terms: &[String]) -> Self {
        let patterns = terms
            .iter()
            .filter(|term| !term.is_empty())
            .filter_map(|term| Regex::new(&format!("(?i){}", regex::escape(term))).ok())
            .collect();
        Highlighter { patterns }
    }

    /// Every distinct match of any term in `text`, in the order the terms are
    /// checked and then by position.
    pub fn find_matches(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut matches = Vec::new();
        for pattern in &self.patterns {
            for found in pattern.find_iter(text) {
                if seen.insert(found.as_str()) {
                    matches.push(found.as_str().to_string());
                }
            }
        }
        matches
    }

    /// Highlights of `document` over `fields`; fields without matches are
    /// omitted.
    pub fn highlight(&self, document: &Document, fields: &[String]) -> Highlights {
        let mut highlights = Highlights::new();
        for field in fields {
            let Some(text) = document.present_field(field).and_then(|value| value.render()) else {
                continue;
            };
            let matches = self.find_matches(&text);
            if !matches.is_empty() {
                highlights.insert(field.clone(), matches);
            }
        }
        highlights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(terms: &[&str]) -> Vec<String> {
        terms.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_case_insensitive_dedup_in_order() {
        let highlighter = Highlighter::new(&terms(&["rust", "safe"]));
        let matches = highlighter.find_matches("Rust is SAFE; rust is Rust");

        assert_eq!(matches, vec!["Rust", "rust", "SAFE"]);
    }

    #[test]
    fn test_highlight_omits_fields_without_matches() {
        let doc = Document::builder("1")
            .field("title", "Rustacean handbook")
            .field("body", "nothing here")
            .field("year", 2024)
            .build();
        let fields = terms(&["title", "body", "year", "missing"]);

        let highlights = Highlighter::new(&terms(&["rust", "2024"])).highlight(&doc, &fields);

        assert_eq!(highlights.len(), 2);
        assert_eq!(highlights["title"], vec!["Rust"]);
        assert_eq!(highlights["year"], vec!["2024"]);
    }

    #[test]
    fn test_terms_are_escaped() {
        let highlighter = Highlighter::new(&terms(&["c++", ""]));
        assert_eq!(highlighter.find_matches("C++ and c"), vec!["C++"]);
    }
}
