//! Typeahead suggestions drawn from the indexed vocabulary.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::index::IndexData;
use crate::query::fuzzy::FuzzyMatcher;
use crate::query::parser::QueryParser;

/// Default number of suggestions returned.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

/// Suggestions at or below this similarity are dropped.
const MIN_SUGGESTION_SIMILARITY: f64 = 0.3;

/// A suggestion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionQuery {
    /// Index to draw the vocabulary from.
    pub index_name: String,
    /// Partial user input.
    pub query: String,
    /// Restrict the vocabulary to one field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Maximum number of suggestions, 10 when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl SuggestionQuery {
    /// Create a query over every field with the default limit.
    pub fn new<N: Into<String>, Q: Into<String>>(index_name: N, query: Q) -> Self {
        SuggestionQuery {
            index_name: index_name.into(),
            query: query.into(),
            field: None,
            limit: None,
        }
    }

    /// Restrict the vocabulary to `field`.
    pub fn field<S: Into<String>>(mut self, field: S) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Set the maximum number of suggestions.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One suggested term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub text: String,
    pub score: f64,
}

/// Ranks vocabulary tokens against partial input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Suggester {
    matcher: FuzzyMatcher,
}

impl Suggester {
    pub fn new(matcher: FuzzyMatcher) -> Self {
        Suggester { matcher }
    }

    /// Distinct tokens of `field`, or of every field, across all documents.
    pub fn vocabulary(&self, index: &IndexData, field: Option<&str>) -> BTreeSet<String> {
        let parser = QueryParser::new(index.metadata.analyzer);
        let mut vocabulary = BTreeSet::new();

        for document in index.documents.values() {
            let values: Vec<_> = match field {
                Some(field) => document.present_field(field).into_iter().collect(),
                None => document.fields.values().collect(),
            };
            for text in values.into_iter().filter_map(|value| value.render()) {
                vocabulary.extend(parser.extract_terms(&text));
            }
        }

        vocabulary
    }

    /// Rank the vocabulary against `query`.
    ///
    /// A token starting with the lowercased query scores 1.0; otherwise a
    /// fuzzy match scores its similarity. Results are sorted by descending
    /// score, then by text, and truncated to `limit`.
    pub fn suggest(
        &self,
        index: &IndexData,
        query: &str,
        field: Option<&str>,
        limit: usize,
    ) -> Vec<Suggestion> {
        let query = query.to_lowercase();
        let mut scores: HashMap<String, f64> = HashMap::new();

        for token in self.vocabulary(index, field) {
            let similarity = if token.starts_with(&query) {
                1.0
            } else if self.matcher.is_match(&token, &query) {
                self.matcher.calculate_similarity(&token, &query)
            } else {
                continue;
            };
            if similarity > MIN_SUGGESTION_SIMILARITY {
                let best = scores.entry(token).or_insert(similarity);
                *best = best.max(similarity);
            }
        }

        let mut suggestions: Vec<Suggestion> = scores
            .into_iter()
            .map(|(text, score)| Suggestion { text, score })
            .collect();
        suggestions.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.text.cmp(&b.text)));
        suggestions.truncate(limit);
        suggestions
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::analysis::Analyzer;
    use crate::document::{Document, FieldValue};
    use crate::index::FieldConfigMap;

    fn index(docs: Vec<Document>) -> IndexData {
        let mut data = IndexData::new("s", FieldConfigMap::new(), Analyzer::Standard, Utc::now());
        for doc in docs {
            data.documents.insert(doc.id.clone(), doc);
        }
        data
    }

    #[test]
    fn test_prefix_ranks_above_fuzzy() {
        let data = index(vec![
            Document::builder("1").field("title", "hello").build(),
            Document::builder("2").field("title", "world").build(),
            Document::builder("3").field("title", "hex").build(),
        ]);

        let suggestions = Suggester::default().suggest(&data, "hel", None, 10);

        assert_eq!(suggestions[0], Suggestion { text: "hello".to_string(), score: 1.0 });
        let hex = suggestions.iter().find(|s| s.text == "hex").unwrap();
        assert!(hex.score < 1.0);
        assert!(suggestions.iter().all(|s| s.text != "world"));
    }

    #[test]
    fn test_field_restriction_and_nulls() {
        let data = index(vec![
            Document::builder("1")
                .field("title", "search")
                .field("tag", "seasonal")
                .field("note", FieldValue::Null)
                .build(),
        ]);
        let suggester = Suggester::default();

        let all = suggester.vocabulary(&data, None);
        assert_eq!(all.into_iter().collect::<Vec<_>>(), vec!["search", "seasonal"]);

        let titles = suggester.suggest(&data, "sea", Some("title"), 10);
        assert_eq!(titles.len(), 1);
        assert_eq!(titles[0].text, "search");
        assert!(suggester.suggest(&data, "sea", Some("note"), 10).is_empty());
    }

    #[test]
    fn test_limit_and_ties_by_text() {
        let data = index(vec![
            Document::builder("1").field("body", "card care cart carp").build(),
        ]);

        let suggestions = Suggester::default().suggest(&data, "CAR", None, 3);
        let texts: Vec<&str> = suggestions.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["card", "care", "carp"]);
    }

    #[test]
    fn test_query_builder() {
        let query = SuggestionQuery::new("idx", "he").field("title").limit(3);
        assert_eq!(query.field.as_deref(), Some("title"));
        assert_eq!(query.limit, Some(3));
    }
}
