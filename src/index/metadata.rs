//! Index metadata and per-field configuration.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::Analyzer;

/// Per-field indexing and ranking options.
///
/// Every option is optional; unset options fall back to their defaults
/// (weight 1.0, not a facet, searchable, index analyzer).
///
/// ```
/// use ferret::index::metadata::FieldConfig;
///
/// let title = FieldConfig::new().weight(2.0);
/// let category = FieldConfig::new().facet(true).searchable(false);
///
/// assert_eq!(title.effective_weight(), 2.0);
/// assert!(!category.is_searchable());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    /// Score multiplier for matches in this field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Whether the field is a categorical facet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet: Option<bool>,
    /// `Some(false)` excludes the field from the inverted index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub searchable: Option<bool>,
    /// Analyzer override for this field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<Analyzer>,
}

impl FieldConfig {
    /// Create a configuration with every option unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the field weight.
    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Mark the field as a facet.
    pub fn facet(mut self, facet: bool) -> Self {
        self.facet = Some(facet);
        self
    }

    /// Set whether the field is searchable.
    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = Some(searchable);
        self
    }

    /// Override the analyzer for this field.
    pub fn analyzer(mut self, analyzer: Analyzer) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Weight used for scoring.
    pub fn effective_weight(&self) -> f64 {
        self.weight.unwrap_or(1.0)
    }

    /// A field is searchable unless explicitly marked otherwise.
    pub fn is_searchable(&self) -> bool {
        self.searchable != Some(false)
    }

    /// Check whether the field is a facet.
    pub fn is_facet(&self) -> bool {
        self.facet == Some(true)
    }
}

/// Field name → configuration mapping supplied by the caller.
pub type FieldConfigMap = HashMap<String, FieldConfig>;

/// Descriptive metadata of an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexMetadata {
    /// Index name.
    pub name: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time of the last mutation.
    pub updated_at: DateTime<Utc>,
    /// Number of documents; equals the size of the document map after every mutation.
    pub document_count: usize,
    /// Per-field configuration.
    #[serde(default)]
    pub field_config: FieldConfigMap,
    /// Analyzer used for tokenization.
    #[serde(default)]
    pub analyzer: Analyzer,
}

impl IndexMetadata {
    /// Create metadata for a new, empty index.
    pub fn new<S: Into<String>>(
        name: S,
        field_config: FieldConfigMap,
        analyzer: Analyzer,
        now: DateTime<Utc>,
    ) -> Self {
        IndexMetadata {
            name: name.into(),
            created_at: now,
            updated_at: now,
            document_count: 0,
            field_config,
            analyzer,
        }
    }

    /// Weight of a field, 1.0 when unconfigured.
    pub fn field_weight(&self, field: &str) -> f64 {
        self.field_config
            .get(field)
            .map_or(1.0, FieldConfig::effective_weight)
    }

    /// Configured fields that are not marked non-searchable, sorted by name.
    pub fn searchable_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = self
            .field_config
            .iter()
            .filter(|(_, config)| config.is_searchable())
            .map(|(name, _)| name.clone())
            .collect();
        fields.sort();
        fields
    }

    /// Configured facet fields, sorted by name.
    pub fn facet_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = self
            .field_config
            .iter()
            .filter(|(_, config)| config.is_facet())
            .map(|(name, _)| name.clone())
            .collect();
        fields.sort();
        fields
    }
}
