//! In-memory storage implementation for testing and embedding.

use std::collections::HashMap;

use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::IndexData;
use crate::storage::IndexStorage;
use crate::storage::codec::{self, CompressionConfig};

/// Configuration specific to memory-based storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryStorageConfig {
    /// Compression applied to the stored blobs.
    pub compression: CompressionConfig,
}

/// An in-memory storage implementation.
///
/// Blobs are kept encoded, so every read returns an independent copy and a
/// caller mutating a returned [`IndexData`] never affects the stored one.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
    config: MemoryStorageConfig,
}

impl MemoryStorage {
    /// Create a new memory storage.
    pub fn new(config: MemoryStorageConfig) -> Self {
        MemoryStorage {
            blobs: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Number of stored indexes.
    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    /// Check whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }

    /// Total size of the stored blobs in bytes.
    pub fn total_size(&self) -> usize {
        self.blobs.read().values().map(Vec::len).sum()
    }
}

#[async_trait]
impl IndexStorage for MemoryStorage {
    async fn read(&self, name: &str) -> Result<Option<IndexData>> {
        let blobs = self.blobs.read();
        blobs.get(name).map(|bytes| codec::decode(bytes)).transpose()
    }

    async fn write(&self, name: &str, data: &IndexData) -> Result<()> {
        let bytes = codec::encode(data, self.config.compression)?;
        debug!("Stored index {name} in memory ({} bytes)", bytes.len());
        self.blobs.write().insert(name.to_string(), bytes);
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.blobs.write().remove(name);
        Ok(())
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.blobs.read().contains_key(name))
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.blobs.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
