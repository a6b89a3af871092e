//! Faceted search functionality for categorizing and filtering search results.

use std::collections::{BTreeMap, HashMap};

use crate::document::{Document, FieldValue};

/// Counts of one facet field: rendered value → number of documents.
pub type FacetValueCounts = BTreeMap<String, usize>;

/// Facet field → value counts.
pub type FacetCounts = BTreeMap<String, FacetValueCounts>;

/// Exact-match filters: field → required value.
pub type FacetFilters = BTreeMap<String, FieldValue>;

/// Categorical aggregation and exact-match filtering over documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct FacetProcessor;

impl FacetProcessor {
    /// Create a new facet processor.
    pub fn new() -> Self {
        FacetProcessor
    }

    /// Count the values of each facet field over the candidate documents.
    ///
    /// Values are keyed by their rendered string, so `1` and `"1"` share a
    /// bucket. Null and missing values are not counted, and ids that do not
    /// resolve to a document are skipped. Every requested field appears in the
    /// result, possibly with no buckets.
    pub fn process_facets<S: AsRef<str>>(
        &self,
        documents: &HashMap<String, Document>,
        facet_fields: &[String],
        candidate_ids: &[S],
    ) -> FacetCounts {
        let mut facets = FacetCounts::new();

        for field in facet_fields {
            let counts = facets.entry(field.clone()).or_default();
            for id in candidate_ids {
                let Some(value) = documents
                    .get(id.as_ref())
                    .and_then(|doc| doc.present_field(field))
                    .and_then(FieldValue::render)
                else {
                    continue;
                };
                *counts.entry(value.into_owned()).or_insert(0) += 1;
            }
        }

        facets
    }

    /// Ids of the documents whose value equals the filter value for every
    /// filter, sorted ascending.
    ///
    /// Numbers match by value, so `Integer(4)` matches `Float(4.0)`. Other
    /// values are compared strictly: `Integer(1)` does not match `Text("1")`.
    pub fn filter_by_facets(
        &self,
        documents: &HashMap<String, Document>,
        filters: &FacetFilters,
    ) -> Vec<String> {
        let mut ids: Vec<String> = documents
            .iter()
            .filter(|(_, doc)| {
                filters.iter().all(|(field, expected)| {
                    doc.get_field(field)
                        .is_some_and(|value| value.same_value(expected))
                })
            })
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> HashMap<String, Document> {
        let docs = vec![
            Document::builder("1")
                .field("category", "tools")
                .field("rating", 5)
                .build(),
            Document::builder("2")
                .field("category", "tools")
                .field("rating", 4)
                .build(),
            Document::builder("3")
                .field("category", "garden")
                .field("rating", FieldValue::Null)
                .build(),
            Document::builder("4").field("rating", 4).build(),
        ];
        docs.into_iter().map(|doc| (doc.id.clone(), doc)).collect()
    }

    #[test]
    fn test_process_facets_counts_present_values() {
        let documents = catalog();
        let fields = vec!["category".to_string(), "rating".to_string()];
        let ids = ["1", "2", "3", "4"];

        let facets = FacetProcessor::new().process_facets(&documents, &fields, &ids);

        assert_eq!(facets["category"]["tools"], 2);
        assert_eq!(facets["category"]["garden"], 1);
        assert_eq!(facets["rating"]["4"], 2);
        assert_eq!(facets["rating"]["5"], 1);

        // Counts sum to the number of candidates holding a non-null value.
        assert_eq!(facets["category"].values().sum::<usize>(), 3);
        assert_eq!(facets["rating"].values().sum::<usize>(), 3);
    }

    #[test]
    fn test_process_facets_restricted_to_candidates() {
        let documents = catalog();
        let fields = vec!["category".to_string(), "brand".to_string()];

        let facets = FacetProcessor::new().process_facets(&documents, &fields, &["2", "missing"]);
        assert_eq!(facets["category"].len(), 1);
        assert_eq!(facets["category"]["tools"], 1);
        assert!(facets["brand"].is_empty());
    }

    #[test]
    fn test_filter_by_facets_is_strict_and() {
        let documents = catalog();
        let processor = FacetProcessor::new();

        let mut filters = FacetFilters::new();
        filters.insert("category".to_string(), FieldValue::from("tools"));
        assert_eq!(processor.filter_by_facets(&documents, &filters), vec!["1", "2"]);

        filters.insert("rating".to_string(), FieldValue::Integer(4));
        assert_eq!(processor.filter_by_facets(&documents, &filters), vec!["2"]);

        let mut text_filter = FacetFilters::new();
        text_filter.insert("rating".to_string(), FieldValue::from("4"));
        assert!(processor.filter_by_facets(&documents, &text_filter).is_empty());

        assert_eq!(
            processor.filter_by_facets(&documents, &FacetFilters::new()).len(),
            4
        );
    }

    #[test]
    fn test_float_values_bucket_and_filter_like_integers() {
        let mut documents = catalog();
        let rated = Document::builder("5").field("rating", 4.0).build();
        documents.insert(rated.id.clone(), rated);
        let processor = FacetProcessor::new();

        let facets = processor.process_facets(&documents, &["rating".to_string()], &["2", "5"]);
        assert_eq!(facets["rating"].len(), 1);
        assert_eq!(facets["rating"]["4"], 2);

        let mut filters = FacetFilters::new();
        filters.insert("rating".to_string(), FieldValue::Integer(4));
        assert_eq!(processor.filter_by_facets(&documents, &filters), vec!["2", "4", "5"]);

        filters.insert("rating".to_string(), FieldValue::Float(5.0));
        assert_eq!(processor.filter_by_facets(&documents, &filters), vec!["1"]);
    }
}
