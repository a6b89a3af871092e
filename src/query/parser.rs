//! Query parser that normalizes and tokenizes text into terms.
//!
//! The same parser is used for query strings and for document field text, so
//! a query term matches an indexed term exactly when both normalize to the same
//! token.
//!
//! ```
//! use ferret::query::parser::QueryParser;
//!
//! let parser = QueryParser::default();
//! assert_eq!(parser.parse("Hello, World!"), vec!["hello", "world"]);
//! ```

use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::Analyzer;

lazy_static! {
    static ref PUNCTUATION: Regex = Regex::new(r"[^\w\s]").unwrap();
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Normalizes and tokenizes text with a configurable analyzer.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParser {
    analyzer: Analyzer,
}

impl QueryParser {
    /// Create a parser for the given analyzer.
    pub fn new(analyzer: Analyzer) -> Self {
        QueryParser { analyzer }
    }

    /// The analyzer this parser tokenizes with.
    pub fn analyzer(&self) -> Analyzer {
        self.analyzer
    }

    /// Lowercase, replace punctuation with spaces, collapse whitespace, trim.
    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let spaced = PUNCTUATION.replace_all(&lowered, " ");
        WHITESPACE_RUN.replace_all(&spaced, " ").trim().to_string()
    }

    /// Split text into tokens with the configured analyzer.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.analyzer.tokenize(text)
    }

    /// Parse a query string into terms.
    pub fn parse(&self, query: &str) -> Vec<String> {
        self.tokenize(&self.normalize(query))
    }

    /// Extract index terms from document field text.
    pub fn extract_terms(&self, text: &str) -> Vec<String> {
        self.parse(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        let parser = QueryParser::default();
        assert_eq!(parser.normalize("  Hello,   WORLD!! "), "hello world");
        assert_eq!(parser.normalize("rust-lang/rust"), "rust lang rust");
        assert_eq!(parser.normalize("snake_case stays"), "snake_case stays");
        assert_eq!(parser.normalize("?!."), "");
    }

    #[test]
    fn test_parse_standard() {
        let parser = QueryParser::new(Analyzer::Standard);
        assert_eq!(parser.parse("The quick, brown fox."), vec!["the", "quick", "brown", "fox"]);
        assert!(parser.parse("   ").is_empty());
        assert!(parser.parse("").is_empty());
    }

    #[test]
    fn test_analyzers_agree_after_normalization() {
        let text = "Full-text search: BM25 & fuzzy_matching (v2)";
        let standard = QueryParser::new(Analyzer::Standard).parse(text);
        let simple = QueryParser::new(Analyzer::Simple).parse(text);
        let whitespace = QueryParser::new(Analyzer::Whitespace).parse(text);

        assert_eq!(standard, vec!["full", "text", "search", "bm25", "fuzzy_matching", "v2"]);
        assert_eq!(standard, simple);
        assert_eq!(standard, whitespace);
    }

    #[test]
    fn test_unicode_words_survive() {
        let parser = QueryParser::default();
        assert_eq!(parser.parse("Café Crème"), vec!["café", "crème"]);
    }

    #[test]
    fn test_extract_terms_matches_parse() {
        let parser = QueryParser::new(Analyzer::Simple);
        assert_eq!(parser.extract_terms("A b. C"), parser.parse("A b. C"));
    }
}
