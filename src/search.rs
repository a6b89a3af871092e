//! Search, suggestion and facet queries against named indexes.

pub mod engine;
pub mod facet;
pub mod highlight;
pub mod suggest;

use serde::{Deserialize, Serialize};

use crate::document::{Document, FieldValue};
use crate::error::{FerretError, Result};
use crate::query::fuzzy::DEFAULT_FUZZY_THRESHOLD;

pub use self::engine::SearchEngine;
pub use self::facet::{FacetCounts, FacetFilters, FacetProcessor};
pub use self::highlight::{Highlighter, Highlights};
pub use self::suggest::{Suggestion, SuggestionQuery};

/// Default page size.
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// Default minimum score.
pub const DEFAULT_MIN_SCORE: f64 = 0.0;

/// Configuration for search operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum edit distance for fuzzy matches.
    pub fuzzy_threshold: usize,
    /// Page size when a query sets no limit.
    pub max_results: usize,
    /// Score floor when a query sets none.
    pub min_score: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            max_results: DEFAULT_MAX_RESULTS,
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

impl SearchConfig {
    /// Check the configuration for values that cannot be honored.
    pub fn validate(&self) -> Result<()> {
        if self.max_results == 0 {
            return Err(FerretError::invalid_config(
                "search.max_results must be greater than 0",
            ));
        }
        if !self.min_score.is_finite() || self.min_score < 0.0 {
            return Err(FerretError::invalid_config(format!(
                "search.min_score must be a finite, non-negative number (got {})",
                self.min_score
            )));
        }
        Ok(())
    }
}

/// A search request.
///
/// ```
/// use ferret::search::SearchQuery;
///
/// let query = SearchQuery::new("products", "wireless keyboard")
///     .filter("category", "electronics")
///     .facet("brand")
///     .limit(20);
///
/// assert_eq!(query.limit, Some(20));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    /// Index to search.
    pub index_name: String,
    /// Free-text query.
    pub query: String,
    /// Fields to search instead of the index's searchable fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    /// Exact-match filters applied before scoring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<FacetFilters>,
    /// Facet fields to aggregate over the returned page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
    /// Score by edit-distance similarity instead of BM25.
    #[serde(default)]
    pub fuzzy: bool,
}

impl SearchQuery {
    /// Create a query with default options.
    pub fn new<N: Into<String>, Q: Into<String>>(index_name: N, query: Q) -> Self {
        SearchQuery {
            index_name: index_name.into(),
            query: query.into(),
            ..Default::default()
        }
    }

    /// Add a field to search.
    pub fn field<S: Into<String>>(mut self, field: S) -> Self {
        self.fields.get_or_insert_with(Vec::new).push(field.into());
        self
    }

    /// Add an exact-match filter.
    pub fn filter<S: Into<String>, V: Into<FieldValue>>(mut self, field: S, value: V) -> Self {
        self.filters
            .get_or_insert_with(FacetFilters::new)
            .insert(field.into(), value.into());
        self
    }

    /// Request counts for a facet field.
    pub fn facet<S: Into<String>>(mut self, field: S) -> Self {
        self.facets.get_or_insert_with(Vec::new).push(field.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn min_score(mut self, min_score: f64) -> Self {
        self.min_score = Some(min_score);
        self
    }

    /// Enable fuzzy scoring.
    pub fn fuzzy(mut self, fuzzy: bool) -> Self {
        self.fuzzy = fuzzy;
        self
    }
}

/// A scored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub document: Document,
    pub score: f64,
    /// Matched substrings per field.
    #[serde(default, skip_serializing_if = "Highlights::is_empty")]
    pub highlights: Highlights,
}

/// Result of a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// The requested page of hits.
    pub results: Vec<SearchHit>,
    /// Number of hits above the score floor, before pagination.
    pub total: usize,
    /// Facet counts over the returned page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets: Option<FacetCounts>,
    /// The query text as given.
    pub query: String,
    /// Elapsed time in milliseconds.
    #[serde(rename = "took")]
    pub took_ms: u64,
}

impl SearchResponse {
    /// A response without hits.
    pub fn empty<S: Into<String>>(query: S, took_ms: u64) -> Self {
        SearchResponse {
            results: Vec::new(),
            total: 0,
            facets: None,
            query: query.into(),
            took_ms,
        }
    }

    /// Ids of the returned hits, in rank order.
    pub fn ids(&self) -> Vec<&str> {
        self.results.iter().map(|hit| hit.document.id.as_str()).collect()
    }
}
