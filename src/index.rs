//! Index data model and lifecycle management.
//!
//! An [`IndexData`] bundles the documents, the inverted index and the metadata
//! of one named index. It is the atomic unit of persistence and caching: the
//! [`IndexManager`](manager::IndexManager) always reads, mutates and writes it
//! as a whole.
//!
//! # Serialized form
//!
//! ```json
//! {
//!   "documents": [["id", {"id": "id", "fields": {...}, "createdAt": "...", "updatedAt": "..."}]],
//!   "invertedIndex": {"term": {"id": {"field": "title", "frequency": 1, "positions": [0]}}},
//!   "metadata": {"name": "...", "createdAt": "...", "updatedAt": "...", "documentCount": 1,
//!                "fieldConfig": {...}, "analyzer": "standard"}
//! }
//! ```
//!
//! Documents are written as an id-ordered sequence of `[id, document]` pairs and
//! all timestamps as RFC 3339 strings.

pub mod inverted;
pub mod manager;
pub mod metadata;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::Analyzer;
use crate::document::Document;

pub use inverted::{InvertedIndex, Posting};
pub use manager::IndexManager;
pub use metadata::{FieldConfig, FieldConfigMap, IndexMetadata};

/// Documents, inverted index and metadata of one index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexData {
    /// Documents keyed by id.
    #[serde(with = "document_pairs")]
    pub documents: HashMap<String, Document>,
    /// Term → document → posting.
    pub inverted_index: InvertedIndex,
    /// Index metadata.
    pub metadata: IndexMetadata,
}

impl IndexData {
    /// Create an empty index.
    pub fn new<S: Into<String>>(
        name: S,
        field_config: FieldConfigMap,
        analyzer: Analyzer,
        now: DateTime<Utc>,
    ) -> Self {
        IndexData {
            documents: HashMap::new(),
            inverted_index: InvertedIndex::new(),
            metadata: IndexMetadata::new(name, field_config, analyzer, now),
        }
    }

    /// Index name.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Number of documents currently held.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check whether the index holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Get a document by id.
    pub fn document(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    /// All document ids in ascending order.
    pub fn document_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.documents.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Every distinct field name used by any document, sorted.
    pub fn field_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .documents
            .values()
            .flat_map(|doc| doc.fields.keys().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

/// Summary of an index, as reported by index info queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexInfo {
    pub name: String,
    pub document_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&IndexData> for IndexInfo {
    fn from(data: &IndexData) -> Self {
        IndexInfo {
            name: data.metadata.name.clone(),
            document_count: data.metadata.document_count,
            created_at: data.metadata.created_at,
            updated_at: data.metadata.updated_at,
        }
    }
}

/// (De)serializes the document map as an id-ordered sequence of pairs.
mod document_pairs {
    use std::collections::HashMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::document::Document;

    pub fn serialize<S: Serializer>(
        documents: &HashMap<String, Document>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut pairs: Vec<(&String, &Document)> = documents.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        pairs.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<HashMap<String, Document>, D::Error> {
        let pairs: Vec<(String, Document)> = Vec::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}
