//! File-based storage implementation.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{FerretError, Result};
use crate::index::IndexData;
use crate::storage::IndexStorage;
use crate::storage::codec::{self, CompressionConfig, DEFAULT_COMPRESSION_LEVEL};

/// Extension of index files.
pub const INDEX_FILE_EXTENSION: &str = "ferret";

/// Configuration specific to file-based storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileStorageConfig {
    /// Root directory holding the index files.
    pub path: PathBuf,

    /// Compression applied to the index files.
    #[serde(default = "default_file_compression")]
    pub compression: CompressionConfig,
}

fn default_file_compression() -> CompressionConfig {
    CompressionConfig::gzip(DEFAULT_COMPRESSION_LEVEL)
}

impl FileStorageConfig {
    /// Create a new FileStorageConfig with the given path and gzip enabled.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileStorageConfig {
            path: path.as_ref().to_path_buf(),
            compression: default_file_compression(),
        }
    }

    /// Set the compression settings.
    pub fn with_compression(mut self, compression: CompressionConfig) -> Self {
        self.compression = compression;
        self
    }
}

/// A file-based storage implementation.
///
/// Each index lives in `<root>/<name>.ferret`. The root directory is created
/// on the first write.
#[derive(Debug)]
pub struct FileStorage {
    /// The root directory for storage.
    directory: PathBuf,
    /// Storage configuration.
    config: FileStorageConfig,
}

impl FileStorage {
    /// Create a new file storage rooted at `config.path`.
    pub fn new(config: FileStorageConfig) -> Result<Self> {
        if config.path.as_os_str().is_empty() {
            return Err(FerretError::invalid_config(
                "file storage path must not be empty",
            ));
        }

        Ok(FileStorage {
            directory: config.path.clone(),
            config,
        })
    }

    /// Root directory of this storage.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Get the full path for an index name.
    fn index_path(&self, name: &str) -> Result<PathBuf> {
        validate_index_name(name)?;
        Ok(self
            .directory
            .join(format!("{name}.{INDEX_FILE_EXTENSION}")))
    }
}

/// Reject names that would escape the storage root.
fn validate_index_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.contains('\0')
    {
        return Err(FerretError::invalid_argument(format!(
            "invalid index name '{name}'"
        )));
    }
    Ok(())
}

#[async_trait]
impl IndexStorage for FileStorage {
    async fn read(&self, name: &str) -> Result<Option<IndexData>> {
        let path = self.index_path(name)?;
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(FerretError::storage_with_source(
                    format!("Failed to read index {name} from {}", path.display()),
                    e,
                ));
            }
        };

        debug!("Read index {name} ({} bytes)", bytes.len());
        codec::decode(&bytes).map(Some)
    }

    async fn write(&self, name: &str, data: &IndexData) -> Result<()> {
        let path = self.index_path(name)?;
        let bytes = codec::encode(data, self.config.compression)?;

        fs::create_dir_all(&self.directory).await.map_err(|e| {
            FerretError::storage_with_source(
                format!("Failed to create directory {}", self.directory.display()),
                e,
            )
        })?;

        let temp_path = path.with_extension(format!("{INDEX_FILE_EXTENSION}.tmp"));
        if let Err(e) = fs::write(&temp_path, &bytes).await {
            return Err(FerretError::storage_with_source(
                format!("Failed to write index {name}"),
                e,
            ));
        }
        if let Err(e) = fs::rename(&temp_path, &path).await {
            if let Err(cleanup) = fs::remove_file(&temp_path).await {
                warn!("Failed to remove {}: {cleanup}", temp_path.display());
            }
            return Err(FerretError::storage_with_source(
                format!("Failed to replace index {name}"),
                e,
            ));
        }

        debug!("Wrote index {name} to {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let path = self.index_path(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FerretError::storage_with_source(
                format!("Failed to delete index {name}"),
                e,
            )),
        }
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        let path = self.index_path(name)?;
        fs::try_exists(&path)
            .await
            .map_err(|e| FerretError::storage_with_source(format!("Failed to stat index {name}"), e))
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(FerretError::storage_with_source(
                    format!("Failed to list {}", self.directory.display()),
                    e,
                ));
            }
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| FerretError::storage_with_source("Failed to list indexes", e))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(INDEX_FILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tempfile::TempDir;

    use super::*;
    use crate::analysis::Analyzer;
    use crate::document::Document;
    use crate::index::FieldConfigMap;

    fn index(name: &str) -> IndexData {
        let mut data = IndexData::new(name, FieldConfigMap::new(), Analyzer::Simple, Utc::now());
        let mut doc = Document::builder("1").field("title", "Persisted").build();
        doc.created_at = Some(Utc::now());
        doc.updated_at = doc.created_at;
        data.documents.insert("1".to_string(), doc);
        data.inverted_index.add_occurrence("persisted", "1", "title", 0);
        data.metadata.document_count = 1;
        data
    }

    #[tokio::test]
    async fn test_compressed_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(FileStorageConfig::new(temp_dir.path().join("idx"))).unwrap();
        let data = index("books");

        storage.write("books", &data).await.unwrap();

        let raw = std::fs::read(temp_dir.path().join("idx").join("books.ferret")).unwrap();
        assert!(codec::is_compressed(&raw));
        assert_eq!(storage.read("books").await.unwrap(), Some(data));
        assert!(storage.exists("books").await.unwrap());
    }

    #[tokio::test]
    async fn test_reads_legacy_uncompressed_file() {
        let temp_dir = TempDir::new().unwrap();
        let data = index("legacy");
        std::fs::write(
            temp_dir.path().join("legacy.ferret"),
            serde_json::to_vec(&data).unwrap(),
        )
        .unwrap();

        let storage = FileStorage::new(FileStorageConfig::new(temp_dir.path())).unwrap();
        assert_eq!(storage.read("legacy").await.unwrap(), Some(data));
    }

    #[tokio::test]
    async fn test_missing_reads_none_and_deletes_ok() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(FileStorageConfig::new(temp_dir.path().join("none"))).unwrap();

        assert!(storage.read("ghost").await.unwrap().is_none());
        assert!(!storage.exists("ghost").await.unwrap());
        storage.delete("ghost").await.unwrap();
        assert!(storage.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_ignores_other_files() {
        let temp_dir = TempDir::new().unwrap();
        let config = FileStorageConfig::new(temp_dir.path()).with_compression(CompressionConfig::none());
        let storage = FileStorage::new(config).unwrap();

        storage.write("b", &index("b")).await.unwrap();
        storage.write("a", &index("a")).await.unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), b"x").unwrap();

        assert_eq!(storage.list().await.unwrap(), vec!["a", "b"]);

        storage.delete("a").await.unwrap();
        assert_eq!(storage.list().await.unwrap(), vec!["b"]);
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(FileStorageConfig::new(temp_dir.path())).unwrap();

        for name in ["../escape", "a/b", "a\\b", ""] {
            let err = storage.write(name, &index("x")).await.unwrap_err();
            assert_eq!(err.code(), "INVALID_ARGUMENT", "{name}");
        }
    }

    #[test]
    fn test_empty_path_is_invalid_config() {
        let err = FileStorage::new(FileStorageConfig::new("")).unwrap_err();
        assert_eq!(err.code(), "INVALID_CONFIG");
    }
}
