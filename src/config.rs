//! Engine configuration.
//!
//! Every field has a default, so an empty JSON object is a valid
//! configuration:
//!
//! ```json
//! {
//!   "storage": {"type": "file", "path": "./indexes"},
//!   "analyzer": "standard",
//!   "search": {"fuzzy_threshold": 2, "max_results": 100, "min_score": 0.0}
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::Analyzer;
use crate::error::{FerretError, Result};
use crate::search::SearchConfig;
use crate::storage::StorageConfig;

/// Configuration of an [`Engine`](crate::engine::Engine).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Storage backend.
    pub storage: StorageConfig,
    /// Analyzer of indexes created implicitly by the first add.
    pub analyzer: Analyzer,
    /// Search defaults.
    pub search: SearchConfig,
}

impl EngineConfig {
    /// Load and validate a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values that cannot be honored.
    pub fn validate(&self) -> Result<()> {
        if let StorageConfig::File(file) = &self.storage {
            if file.path.as_os_str().is_empty() {
                return Err(FerretError::invalid_config("storage.path must not be empty"));
            }
            if file.compression.level > 9 {
                return Err(FerretError::invalid_config(format!(
                    "storage.compression.level must be between 0 and 9 (got {})",
                    file.compression.level
                )));
            }
        }
        self.search.validate()
    }

    /// Set the storage backend.
    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    /// Set the default analyzer.
    pub fn with_analyzer(mut self, analyzer: Analyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Set the search defaults.
    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }
}
