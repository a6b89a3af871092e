//! High-level engine that combines index administration and searching.
//!
//! # Example
//!
//! ```
//! use ferret::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> ferret::error::Result<()> {
//! let engine = Engine::new(EngineConfig::default())?;
//!
//! engine
//!     .create_index(
//!         IndexOptions::new("books")
//!             .field("title", FieldConfig::new().weight(2.0))
//!             .field("genre", FieldConfig::new().facet(true).searchable(false)),
//!     )
//!     .await?;
//!
//! let doc = Document::builder("1")
//!     .field("title", "The Rust Programming Language")
//!     .field("genre", "programming")
//!     .build();
//! engine.index("books", doc).await?;
//!
//! let response = engine.search(&SearchQuery::new("books", "rust")).await?;
//! assert_eq!(response.total, 1);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::Analyzer;
use crate::config::EngineConfig;
use crate::document::Document;
use crate::error::{FerretError, Result};
use crate::index::{FieldConfig, FieldConfigMap, IndexInfo, IndexManager};
use crate::search::{
    FacetCounts, FacetFilters, SearchEngine, SearchQuery, SearchResponse, Suggestion,
    SuggestionQuery,
};
use crate::storage::{IndexStorage, StorageFactory};

/// Options for creating an index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexOptions {
    /// Index name.
    pub name: String,
    /// Analyzer; the engine's default analyzer when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<Analyzer>,
    /// Per-field configuration.
    #[serde(default)]
    pub field_config: FieldConfigMap,
}

impl IndexOptions {
    pub fn new<S: Into<String>>(name: S) -> Self {
        IndexOptions {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn analyzer(mut self, analyzer: Analyzer) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Configure one field.
    pub fn field<S: Into<String>>(mut self, name: S, config: FieldConfig) -> Self {
        self.field_config.insert(name.into(), config);
        self
    }

    /// Replace the whole field configuration.
    pub fn field_config(mut self, field_config: FieldConfigMap) -> Self {
        self.field_config = field_config;
        self
    }
}

/// Entry point of the library: index administration, search, suggestions
/// and facets over one storage backend.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    manager: Arc<IndexManager>,
    search: SearchEngine,
}

impl Engine {
    /// Build an engine, creating the storage backend from the configuration.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let storage = StorageFactory::create(config.storage.clone())?;
        Ok(Self::with_storage(config, storage))
    }

    /// Build an engine over an existing storage backend.
    ///
    /// The storage section of `config` is ignored.
    pub fn with_storage(config: EngineConfig, storage: Arc<dyn IndexStorage>) -> Self {
        let manager = Arc::new(IndexManager::with_analyzer(storage, config.analyzer));
        let search = SearchEngine::with_config(Arc::clone(&manager), config.search.clone());
        Engine {
            config,
            manager,
            search,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the index manager.
    pub fn manager(&self) -> &Arc<IndexManager> {
        &self.manager
    }

    /// Create an index, replacing any existing index of the same name.
    pub async fn create_index(&self, options: IndexOptions) -> Result<IndexInfo> {
        let analyzer = options.analyzer.unwrap_or(self.config.analyzer);
        let data = self
            .manager
            .create_index(&options.name, options.field_config, analyzer)
            .await?;
        Ok(IndexInfo::from(data.as_ref()))
    }

    /// Delete an index. Deleting a missing index succeeds.
    pub async fn delete_index(&self, name: &str) -> Result<()> {
        self.manager.delete_index(name).await
    }

    /// Index a document using the index's stored field configuration.
    pub async fn index(&self, name: &str, document: Document) -> Result<()> {
        self.index_with(name, document, &FieldConfigMap::new()).await
    }

    /// Index a document; `field_config` takes precedence over the stored
    /// configuration for this document.
    pub async fn index_with(
        &self,
        name: &str,
        document: Document,
        field_config: &FieldConfigMap,
    ) -> Result<()> {
        self.manager
            .add_document(name, document, field_config)
            .await
            .map(|_| ())
    }

    /// Index several documents in one mutation.
    pub async fn index_batch(&self, name: &str, documents: Vec<Document>) -> Result<()> {
        self.manager
            .add_documents(name, documents, &FieldConfigMap::new())
            .await
            .map(|_| ())
    }

    /// Remove a document; returns whether it existed.
    pub async fn remove(&self, name: &str, id: &str) -> Result<bool> {
        self.manager.remove_document(name, id).await
    }

    /// Replace a document, adding it when absent.
    pub async fn update(&self, name: &str, document: Document) -> Result<()> {
        self.manager
            .update_document(name, document, &FieldConfigMap::new())
            .await
            .map(|_| ())
    }

    /// Summary of an index.
    pub async fn get_index_info(&self, name: &str) -> Result<IndexInfo> {
        let data = self
            .manager
            .load_index(name)
            .await?
            .ok_or_else(|| FerretError::index_not_found(name))?;
        Ok(IndexInfo::from(data.as_ref()))
    }

    /// Names of all stored indexes.
    pub async fn list_indexes(&self) -> Result<Vec<String>> {
        self.manager.list_indexes().await
    }

    /// Look up a document by id.
    pub async fn get_document(&self, name: &str, id: &str) -> Result<Document> {
        let data = self
            .manager
            .load_index(name)
            .await?
            .ok_or_else(|| FerretError::index_not_found(name))?;
        data.document(id)
            .cloned()
            .ok_or_else(|| FerretError::document_not_found(id))
    }

    /// Run a search.
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResponse> {
        self.search.search(query).await
    }

    /// Suggest completions for partial input.
    pub async fn suggest(&self, query: &SuggestionQuery) -> Result<Vec<Suggestion>> {
        self.search.suggest(query).await
    }

    /// Facet counts over `ids`, or over every document.
    pub async fn get_facets(
        &self,
        name: &str,
        facet_fields: &[String],
        ids: Option<&[String]>,
    ) -> Result<FacetCounts> {
        self.search.get_facets(name, facet_fields, ids).await
    }

    /// Ids of the documents matching every filter.
    pub async fn filter_by_facets(&self, name: &str, filters: &FacetFilters) -> Result<Vec<String>> {
        self.search.filter_by_facets(name, filters).await
    }
}
