//! Search orchestration over the indexes held by an [`IndexManager`].

use std::sync::Arc;
use std::time::Instant;

use log::debug;
use rayon::prelude::*;

use crate::error::{FerretError, Result};
use crate::index::{IndexData, IndexManager};
use crate::query::fuzzy::FuzzyMatcher;
use crate::query::parser::QueryParser;
use crate::query::scorer::{RelevanceScorer, ScoringContext};
use crate::search::facet::{FacetCounts, FacetFilters, FacetProcessor};
use crate::search::highlight::Highlighter;
use crate::search::suggest::{DEFAULT_SUGGESTION_LIMIT, Suggester, Suggestion, SuggestionQuery};
use crate::search::{SearchConfig, SearchHit, SearchQuery, SearchResponse};

/// Fuzzy-mode similarity must exceed this to contribute.
const FUZZY_SIMILARITY_CUTOFF: f64 = 0.5;

/// Executes search, suggestion and facet queries.
///
/// Reads go through [`IndexManager::load_index`] and work on an immutable
/// snapshot, so a search never observes a half-applied mutation.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    manager: Arc<IndexManager>,
    config: SearchConfig,
    scorer: RelevanceScorer,
    matcher: FuzzyMatcher,
    facets: FacetProcessor,
}

impl SearchEngine {
    /// Create a search engine with the default configuration.
    pub fn new(manager: Arc<IndexManager>) -> Self {
        Self::with_config(manager, SearchConfig::default())
    }

    /// Create a search engine with the given configuration.
    pub fn with_config(manager: Arc<IndexManager>, config: SearchConfig) -> Self {
        SearchEngine {
            manager,
            matcher: FuzzyMatcher::new(config.fuzzy_threshold),
            config,
            scorer: RelevanceScorer::new(),
            facets: FacetProcessor::new(),
        }
    }

    /// Get the search configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run a search.
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResponse> {
        let start = Instant::now();
        let index = self.require_index(&query.index_name).await?;

        let terms = QueryParser::new(index.metadata.analyzer).parse(&query.query);
        if terms.is_empty() {
            return Ok(SearchResponse::empty(
                query.query.clone(),
                elapsed_ms(start),
            ));
        }

        let fields = match &query.fields {
            Some(fields) => fields.clone(),
            None => searchable_fields(&index),
        };

        let candidates = match &query.filters {
            Some(filters) => self.facets.filter_by_facets(&index.documents, filters),
            None => index.document_ids(),
        };

        let mut scored: Vec<(&str, f64)> = if query.fuzzy {
            candidates
                .par_iter()
                .map(|id| (id.as_str(), self.fuzzy_score(&index, id, &terms, &fields)))
                .filter(|(_, score)| *score > 0.0)
                .collect()
        } else {
            let context = ScoringContext::new(self.scorer, &index, &fields);
            candidates
                .par_iter()
                .map(|id| (id.as_str(), context.score_document(&terms, id, &fields)))
                .filter(|(_, score)| *score > 0.0)
                .collect()
        };
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let min_score = query.min_score.unwrap_or(self.config.min_score);
        scored.retain(|(_, score)| *score >= min_score);
        let total = scored.len();

        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(self.config.max_results);
        let page: Vec<(&str, f64)> = scored.into_iter().skip(offset).take(limit).collect();

        let highlighter = Highlighter::new(&terms);
        let results: Vec<SearchHit> = page
            .iter()
            .filter_map(|(id, score)| {
                let document = index.document(id)?;
                Some(SearchHit {
                    highlights: highlighter.highlight(document, &fields),
                    document: document.clone(),
                    score: *score,
                })
            })
            .collect();

        let facets = query.facets.as_ref().map(|facet_fields| {
            let ids: Vec<&str> = page.iter().map(|(id, _)| *id).collect();
            self.facets
                .process_facets(&index.documents, facet_fields, &ids)
        });

        let took_ms = elapsed_ms(start);
        debug!(
            "Search '{}' on {}: {total} hit(s), {} returned in {took_ms} ms",
            query.query,
            query.index_name,
            results.len()
        );

        Ok(SearchResponse {
            results,
            total,
            facets,
            query: query.query.clone(),
            took_ms,
        })
    }

    /// Suggest completions for partial input.
    pub async fn suggest(&self, query: &SuggestionQuery) -> Result<Vec<Suggestion>> {
        let index = self.require_index(&query.index_name).await?;
        let suggester = Suggester::new(self.matcher);
        Ok(suggester.suggest(
            &index,
            &query.query,
            query.field.as_deref(),
            query.limit.unwrap_or(DEFAULT_SUGGESTION_LIMIT),
        ))
    }

    /// Facet counts over `ids`, or over every document when `ids` is `None`.
    pub async fn get_facets(
        &self,
        index_name: &str,
        facet_fields: &[String],
        ids: Option<&[String]>,
    ) -> Result<FacetCounts> {
        let index = self.require_index(index_name).await?;
        let counts = match ids {
            Some(ids) => self
                .facets
                .process_facets(&index.documents, facet_fields, ids),
            None => self
                .facets
                .process_facets(&index.documents, facet_fields, &index.document_ids()),
        };
        Ok(counts)
    }

    /// Ids of the documents matching every filter, sorted.
    pub async fn filter_by_facets(
        &self,
        index_name: &str,
        filters: &FacetFilters,
    ) -> Result<Vec<String>> {
        let index = self.require_index(index_name).await?;
        Ok(self.facets.filter_by_facets(&index.documents, filters))
    }

    async fn require_index(&self, name: &str) -> Result<Arc<IndexData>> {
        self.manager
            .load_index(name)
            .await?
            .ok_or_else(|| FerretError::index_not_found(name))
    }

    fn fuzzy_score(&self, index: &IndexData, id: &str, terms: &[String], fields: &[String]) -> f64 {
        let Some(document) = index.document(id) else {
            return 0.0;
        };

        let mut score = 0.0;
        for field in fields {
            let value = document
                .present_field(field)
                .and_then(|value| value.render())
                .map(|text| text.to_lowercase())
                .unwrap_or_default();
            let weight = index.metadata.field_weight(field);
            for term in terms {
                let similarity = self.matcher.calculate_similarity(term, &value);
                if similarity > FUZZY_SIMILARITY_CUTOFF {
                    score += similarity * weight;
                }
            }
        }
        score
    }
}

/// Configured fields not marked non-searchable; every field present in the
/// documents when the index has no field configuration.
fn searchable_fields(index: &IndexData) -> Vec<String> {
    if index.metadata.field_config.is_empty() {
        index.field_names()
    } else {
        index.metadata.searchable_fields()
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analyzer;
    use crate::document::Document;
    use crate::index::{FieldConfig, FieldConfigMap};
    use crate::storage::memory::MemoryStorage;

    async fn engine_with(docs: Vec<Document>, field_config: FieldConfigMap) -> SearchEngine {
        let manager = Arc::new(IndexManager::new(Arc::new(MemoryStorage::default())));
        manager
            .create_index("docs", field_config.clone(), Analyzer::Standard)
            .await
            .unwrap();
        manager
            .add_documents("docs", docs, &field_config)
            .await
            .unwrap();
        SearchEngine::new(manager)
    }

    fn doc(id: &str, body: &str) -> Document {
        Document::builder(id).field("body", body).build()
    }

    /// Five documents whose BM25 scores for "apple" strictly decrease from a to e.
    fn ranked_docs() -> Vec<Document> {
        vec![
            doc("a", "apple apple apple apple apple"),
            doc("b", "apple apple apple apple pear"),
            doc("c", "apple apple apple pear pear"),
            doc("d", "apple apple pear pear pear"),
            doc("e", "apple pear pear pear pear"),
            doc("f", "pear pear pear pear pear"),
        ]
    }

    #[tokio::test]
    async fn test_pagination_returns_second_and_third() {
        let engine = engine_with(ranked_docs(), FieldConfigMap::new()).await;

        let all = engine.search(&SearchQuery::new("docs", "apple")).await.unwrap();
        assert_eq!(all.ids(), vec!["a", "b", "c", "d", "e"]);
        assert!(all.results.windows(2).all(|w| w[0].score > w[1].score));

        let page = engine
            .search(&SearchQuery::new("docs", "apple").limit(2).offset(1))
            .await
            .unwrap();
        assert_eq!(page.ids(), vec!["b", "c"]);
        assert_eq!(page.total, 5);
    }

    #[tokio::test]
    async fn test_empty_query_returns_nothing() {
        let engine = engine_with(ranked_docs(), FieldConfigMap::new()).await;

        for text in ["", "   ", "?!"] {
            let response = engine.search(&SearchQuery::new("docs", text)).await.unwrap();
            assert!(response.results.is_empty());
            assert_eq!(response.total, 0);
            assert_eq!(response.query, text);
        }
    }

    #[tokio::test]
    async fn test_missing_index_is_error() {
        let engine = engine_with(Vec::new(), FieldConfigMap::new()).await;

        let err = engine
            .search(&SearchQuery::new("nope", "x"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INDEX_NOT_FOUND");
        assert!(engine.suggest(&SuggestionQuery::new("nope", "x")).await.is_err());
        assert!(engine.get_facets("nope", &[], None).await.is_err());
        assert!(engine.filter_by_facets("nope", &FacetFilters::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_equal_scores_tie_break_by_id() {
        let docs = vec![doc("z", "same text"), doc("m", "same text"), doc("a", "same text")];
        let engine = engine_with(docs, FieldConfigMap::new()).await;

        let response = engine.search(&SearchQuery::new("docs", "same")).await.unwrap();
        assert_eq!(response.ids(), vec!["a", "m", "z"]);
    }

    #[tokio::test]
    async fn test_filters_facets_and_highlights() {
        let docs = vec![
            Document::builder("1")
                .field("title", "Red Lamp")
                .field("color", "red")
                .build(),
            Document::builder("2")
                .field("title", "Blue Lamp")
                .field("color", "blue")
                .build(),
            Document::builder("3")
                .field("title", "Red lamp shade")
                .field("color", "red")
                .build(),
        ];
        let mut config = FieldConfigMap::new();
        config.insert("title".to_string(), FieldConfig::new().weight(2.0));
        config.insert(
            "color".to_string(),
            FieldConfig::new().facet(true).searchable(false),
        );
        let engine = engine_with(docs, config).await;

        let response = engine
            .search(&SearchQuery::new("docs", "lamp").filter("color", "red").facet("color"))
            .await
            .unwrap();

        let mut ids = response.ids();
        ids.sort();
        assert_eq!(ids, vec!["1", "3"]);
        let facets = response.facets.unwrap();
        assert_eq!(facets["color"]["red"], 2);
        assert!(!facets["color"].contains_key("blue"));

        let hit = &response.results[0];
        assert!(hit.highlights["title"].iter().any(|m| m.eq_ignore_ascii_case("lamp")));
        assert!(!hit.highlights.contains_key("color"));
    }

    #[tokio::test]
    async fn test_facets_cover_page_only() {
        let docs = vec![
            Document::builder("1").field("body", "lamp lamp").field("kind", "a").build(),
            Document::builder("2").field("body", "lamp").field("kind", "b").build(),
        ];
        let engine = engine_with(docs, FieldConfigMap::new()).await;

        let response = engine
            .search(&SearchQuery::new("docs", "lamp").field("body").facet("kind").limit(1))
            .await
            .unwrap();

        assert_eq!(response.total, 2);
        let facets = response.facets.unwrap();
        assert_eq!(facets["kind"].values().sum::<usize>(), 1);
    }

    #[tokio::test]
    async fn test_fuzzy_mode_matches_typos() {
        let docs = vec![doc("1", "kitten"), doc("2", "sitting"), doc("3", "dog")];
        let engine = engine_with(docs, FieldConfigMap::new()).await;

        let exact = engine.search(&SearchQuery::new("docs", "kiten")).await.unwrap();
        assert_eq!(exact.total, 0);

        let fuzzy = engine
            .search(&SearchQuery::new("docs", "kiten").fuzzy(true))
            .await
            .unwrap();
        assert_eq!(fuzzy.ids()[0], "1");
        assert!(!fuzzy.ids().contains(&"3"));
    }

    #[tokio::test]
    async fn test_min_score_floor() {
        let engine = engine_with(ranked_docs(), FieldConfigMap::new()).await;
        let all = engine.search(&SearchQuery::new("docs", "apple")).await.unwrap();
        let floor = all.results[2].score;

        let response = engine
            .search(&SearchQuery::new("docs", "apple").min_score(floor))
            .await
            .unwrap();
        assert_eq!(response.ids(), vec!["a", "b", "c"]);
        assert_eq!(response.total, 3);
    }

    #[tokio::test]
    async fn test_suggest_prefix_first() {
        let docs = vec![doc("1", "hello"), doc("2", "world"), doc("3", "help")];
        let engine = engine_with(docs, FieldConfigMap::new()).await;

        let suggestions = engine
            .suggest(&SuggestionQuery::new("docs", "hel"))
            .await
            .unwrap();
        assert_eq!(suggestions[0].text, "hello");
        assert_eq!(suggestions[0].score, 1.0);
        assert_eq!(suggestions[1].text, "help");
    }

    #[tokio::test]
    async fn test_get_facets_defaults_to_all_documents() {
        let docs = vec![
            Document::builder("1").field("kind", "a").build(),
            Document::builder("2").field("kind", "a").build(),
            Document::builder("3").field("kind", "b").build(),
        ];
        let engine = engine_with(docs, FieldConfigMap::new()).await;
        let fields = vec!["kind".to_string()];

        let all = engine.get_facets("docs", &fields, None).await.unwrap();
        assert_eq!(all["kind"]["a"], 2);
        assert_eq!(all["kind"]["b"], 1);

        let some = engine
            .get_facets("docs", &fields, Some(&["3".to_string()]))
            .await
            .unwrap();
        assert_eq!(some["kind"].len(), 1);
    }
}
