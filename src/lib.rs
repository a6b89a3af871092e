//! # Ferret
//!
//! An embeddable full-text search library.
//!
//! ## Features
//!
//! - Inverted index with BM25 ranking
//! - Edit-distance fuzzy matching and typeahead suggestions
//! - Facet counts and exact-match filtering
//! - Pluggable storage backends (memory, file) with gzip compression
//! - Serialized writes per index, lock-free snapshot reads

pub mod analysis;
pub mod cli;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod index;
pub mod query;
pub mod search;
pub mod storage;
pub mod util;

pub mod prelude {
    pub use crate::analysis::Analyzer;
    pub use crate::config::EngineConfig;
    pub use crate::document::{Document, FieldValue};
    pub use crate::engine::{Engine, IndexOptions};
    pub use crate::error::{FerretError, Result};
    pub use crate::index::{FieldConfig, FieldConfigMap, IndexInfo};
    pub use crate::search::{
        FacetCounts, FacetFilters, SearchConfig, SearchHit, SearchQuery, SearchResponse,
        Suggestion, SuggestionQuery,
    };
    pub use crate::storage::{IndexStorage, StorageConfig};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
