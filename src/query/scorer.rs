//! BM25 relevance scoring against the inverted index.

use std::collections::HashMap;

use crate::document::FieldValue;
use crate::index::IndexData;

/// BM25 k1 parameter (term frequency saturation).
pub const BM25_K1: f64 = 1.5;

/// BM25 b parameter (field length normalization).
pub const BM25_B: f64 = 0.75;

/// BM25 scorer.
///
/// A term contributes to a (document, field) pair only when the term's posting
/// for the document was recorded under that field and the document's value
/// for it is not falsy (see [`FieldValue::is_falsy`]). Field length is the character length of the
/// rendered value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelevanceScorer {
    k1: f64,
    b: f64,
}

impl Default for RelevanceScorer {
    fn default() -> Self {
        RelevanceScorer {
            k1: BM25_K1,
            b: BM25_B,
        }
    }
}

impl RelevanceScorer {
    /// Create a scorer with the standard parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// BM25 contribution of `term` in `field` of document `doc_id`.
    ///
    /// Scans the corpus for the average field length; prefer a
    /// [`ScoringContext`] when scoring many documents.
    pub fn calculate_bm25(&self, term: &str, doc_id: &str, field: &str, index: &IndexData) -> f64 {
        let avg_len = average_field_length(index, field);
        self.bm25(term, doc_id, field, avg_len, index)
    }

    /// Sum of BM25 contributions over every (field, term) pair.
    pub fn score_document(
        &self,
        terms: &[String],
        doc_id: &str,
        fields: &[String],
        index: &IndexData,
    ) -> f64 {
        fields
            .iter()
            .map(|field| {
                terms
                    .iter()
                    .map(|term| self.calculate_bm25(term, doc_id, field, index))
                    .sum::<f64>()
            })
            .sum()
    }

    /// Precompute per-field statistics for scoring many documents of `index`.
    pub fn context<'a>(&self, index: &'a IndexData, fields: &[String]) -> ScoringContext<'a> {
        ScoringContext::new(*self, index, fields)
    }

    fn bm25(&self, term: &str, doc_id: &str, field: &str, avg_len: f64, index: &IndexData) -> f64 {
        let Some(postings) = index.inverted_index.postings(term) else {
            return 0.0;
        };
        let Some(posting) = postings.get(doc_id) else {
            return 0.0;
        };
        if posting.field != field {
            return 0.0;
        }
        let Some(value) = scored_value(index, doc_id, field) else {
            return 0.0;
        };

        let n = index.documents.len() as f64;
        let df = postings.len() as f64;
        if n == 0.0 || df == 0.0 {
            return 0.0;
        }

        let tf = f64::from(posting.frequency);
        let len = value.rendered_len() as f64;
        let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();
        let norm = tf + self.k1 * (1.0 - self.b + self.b * len / avg_len);

        idf * (tf * (self.k1 + 1.0)) / norm * index.metadata.field_weight(field)
    }
}

/// Value of `field` that takes part in scoring, or `None` when it is absent
/// or falsy.
fn scored_value<'a>(index: &'a IndexData, doc_id: &str, field: &str) -> Option<&'a FieldValue> {
    index
        .document(doc_id)?
        .get_field(field)
        .filter(|value| !value.is_falsy())
}

/// Mean rendered length of `field` over all documents; absent and falsy values
/// count as zero. Returns 1.0 for an empty corpus or a zero mean.
pub fn average_field_length(index: &IndexData, field: &str) -> f64 {
    if index.documents.is_empty() {
        return 1.0;
    }

    let total: usize = index
        .documents
        .keys()
        .map(|id| scored_value(index, id, field).map_or(0, FieldValue::rendered_len))
        .sum();
    let avg = total as f64 / index.documents.len() as f64;
    if avg == 0.0 { 1.0 } else { avg }
}

/// Per-search scoring state: the index plus the average length of every
/// searched field, computed once.
#[derive(Debug, Clone)]
pub struct ScoringContext<'a> {
    scorer: RelevanceScorer,
    index: &'a IndexData,
    avg_lengths: HashMap<String, f64>,
}

impl<'a> ScoringContext<'a> {
    /// Build a context for scoring `fields` of `index`.
    pub fn new(scorer: RelevanceScorer, index: &'a IndexData, fields: &[String]) -> Self {
        let avg_lengths = fields
            .iter()
            .map(|field| (field.clone(), average_field_length(index, field)))
            .collect();
        ScoringContext {
            scorer,
            index,
            avg_lengths,
        }
    }

    /// Same result as [`RelevanceScorer::score_document`] over the context fields.
    pub fn score_document(&self, terms: &[String], doc_id: &str, fields: &[String]) -> f64 {
        fields
            .iter()
            .map(|field| {
                let avg_len = match self.avg_lengths.get(field) {
                    Some(avg_len) => *avg_len,
                    None => average_field_length(self.index, field),
                };
                terms
                    .iter()
                    .map(|term| self.scorer.bm25(term, doc_id, field, avg_len, self.index))
                    .sum::<f64>()
            })
            .sum()
    }
}
