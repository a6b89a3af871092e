//! Storage abstraction layer for Ferret.
//!
//! The index manager persists every index as one blob through the
//! [`IndexStorage`] contract. Backends are swapped without touching the
//! higher-level code.
//!
//! # Architecture
//!
//! - **IndexStorage trait**: read/write/delete/exists/list of whole index blobs
//! - **StorageConfig enum**: Type-safe configuration for supported backends
//! - **StorageFactory**: Helper for constructing concrete storage instances
//!
//! # Storage Types
//!
//! ## FileStorage
//! - One `<name>.ferret` file per index under a root directory
//! - Atomic replace via temporary file and rename
//! - Gzip compression enabled by default
//!
//! ## MemoryStorage
//! - In-memory storage for testing and temporary data
//! - Fast but non-persistent
//!
//! # Example
//!
//! ```
//! use ferret::storage::{StorageConfig, StorageFactory};
//! use ferret::storage::memory::MemoryStorageConfig;
//!
//! # fn main() -> ferret::error::Result<()> {
//! let storage = StorageFactory::create(StorageConfig::Memory(MemoryStorageConfig::default()))?;
//! # Ok(())
//! # }
//! ```

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::IndexData;

pub mod codec;
pub mod file;
pub mod memory;

pub use codec::CompressionConfig;
pub use file::{FileStorage, FileStorageConfig};
pub use memory::{MemoryStorage, MemoryStorageConfig};

/// Persistence contract for whole index blobs.
///
/// Implementations translate "not found" into `Ok(None)` on [`read`](Self::read)
/// and treat deleting a missing blob as success. Each operation is atomic per
/// blob; read-modify-write sequences spanning several calls are the caller's
/// responsibility.
#[async_trait]
pub trait IndexStorage: Send + Sync + Debug {
    /// Read an index, `None` when it has never been written or was deleted.
    async fn read(&self, name: &str) -> Result<Option<IndexData>>;

    /// Write (create or replace) an index.
    async fn write(&self, name: &str, data: &IndexData) -> Result<()>;

    /// Delete an index. Deleting a missing index succeeds.
    async fn delete(&self, name: &str) -> Result<()>;

    /// Check whether an index has been written.
    async fn exists(&self, name: &str) -> Result<bool>;

    /// Names of all stored indexes, sorted.
    async fn list(&self) -> Result<Vec<String>>;
}

/// Storage configuration enum that holds type-specific settings.
///
/// Serialized with a `type` tag:
///
/// ```json
/// {"type": "memory"}
/// {"type": "file", "path": "./indexes", "compression": {"enabled": true, "level": 6}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Memory-based storage configuration
    Memory(MemoryStorageConfig),

    /// File-based storage configuration (includes path)
    File(FileStorageConfig),
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Memory(MemoryStorageConfig::default())
    }
}

/// Factory for creating storage instances.
pub struct StorageFactory;

impl StorageFactory {
    /// Create a new storage instance with the given configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use ferret::storage::{StorageConfig, StorageFactory};
    /// use ferret::storage::file::FileStorageConfig;
    ///
    /// # fn main() -> ferret::error::Result<()> {
    /// let dir = std::env::temp_dir().join("ferret-doc-factory");
    /// let storage = StorageFactory::create(StorageConfig::File(FileStorageConfig::new(&dir)))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn create(config: StorageConfig) -> Result<Arc<dyn IndexStorage>> {
        match config {
            StorageConfig::Memory(mem_config) => Ok(Arc::new(MemoryStorage::new(mem_config))),
            StorageConfig::File(file_config) => Ok(Arc::new(FileStorage::new(file_config)?)),
        }
    }
}
