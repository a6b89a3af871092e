//! Index lifecycle: the canonical in-memory copy of every index and all
//! mutation and persistence through the storage contract.
//!
//! # Concurrency
//!
//! At most one read-modify-write cycle (load → apply → persist → publish) runs
//! per index name at any time. Each cycle holds a per-name async mutex for its
//! whole duration, so concurrent writers to one index are serialized and never
//! lose updates, while writers to different indexes proceed in parallel.
//!
//! Readers receive immutable [`Arc<IndexData>`] snapshots from the cache and
//! never wait on a writer's storage I/O. A new snapshot is published only after
//! it has been persisted.
//!
//! Every publish and every delete advances a cache epoch. A cache miss only
//! fills the cache if the epoch is unchanged since its storage read began, so
//! a slow read can never bring back a snapshot that was deleted or replaced
//! in the meantime.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, info};
use parking_lot::{Mutex, RwLock};

use crate::analysis::Analyzer;
use crate::document::Document;
use crate::error::Result;
use crate::index::{FieldConfigMap, IndexData};
use crate::query::parser::QueryParser;
use crate::storage::IndexStorage;

/// Owns the index cache and serializes mutations per index name.
#[derive(Debug)]
pub struct IndexManager {
    storage: Arc<dyn IndexStorage>,
    default_analyzer: Analyzer,
    cache: RwLock<IndexCache>,
    write_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

#[derive(Debug, Default)]
struct IndexCache {
    snapshots: HashMap<String, Arc<IndexData>>,
    epoch: u64,
}

impl IndexCache {
    fn publish(&mut self, name: String, data: Arc<IndexData>) {
        self.snapshots.insert(name, data);
        self.epoch += 1;
    }

    fn evict(&mut self, name: &str) {
        self.snapshots.remove(name);
        self.epoch += 1;
    }
}

impl IndexManager {
    /// Create a manager over `storage`, auto-creating indexes with the standard analyzer.
    pub fn new(storage: Arc<dyn IndexStorage>) -> Self {
        Self::with_analyzer(storage, Analyzer::default())
    }

    /// Create a manager whose auto-created indexes use `default_analyzer`.
    pub fn with_analyzer(storage: Arc<dyn IndexStorage>, default_analyzer: Analyzer) -> Self {
        IndexManager {
            storage,
            default_analyzer,
            cache: RwLock::new(IndexCache::default()),
            write_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Analyzer used for indexes created implicitly by the first add.
    pub fn default_analyzer(&self) -> Analyzer {
        self.default_analyzer
    }

    /// The underlying storage.
    pub fn storage(&self) -> &Arc<dyn IndexStorage> {
        &self.storage
    }

    /// Load an index from the cache, falling back to storage.
    ///
    /// Returns `None` when the index exists in neither.
    pub async fn load_index(&self, name: &str) -> Result<Option<Arc<IndexData>>> {
        let epoch = {
            let cache = self.cache.read();
            if let Some(cached) = cache.snapshots.get(name) {
                return Ok(Some(Arc::clone(cached)));
            }
            cache.epoch
        };

        debug!("Index cache miss: {name}");
        let Some(data) = self.storage.read(name).await? else {
            return Ok(None);
        };

        let mut cache = self.cache.write();
        if let Some(cached) = cache.snapshots.get(name) {
            return Ok(Some(Arc::clone(cached)));
        }
        let data = Arc::new(data);
        if cache.epoch == epoch {
            cache.snapshots.insert(name.to_string(), Arc::clone(&data));
        } else {
            debug!("Index {name} changed during load, not caching");
        }
        Ok(Some(data))
    }

    /// Create (or replace) an empty index.
    pub async fn create_index(
        &self,
        name: &str,
        field_config: FieldConfigMap,
        analyzer: Analyzer,
    ) -> Result<Arc<IndexData>> {
        let lock = self.write_lock(name);
        let _guard = lock.lock().await;

        let data = IndexData::new(name, field_config, analyzer, Utc::now());
        let data = self.persist(data).await?;
        info!("Created index {name} (analyzer: {analyzer})");
        Ok(data)
    }

    /// Add (or overwrite) a document, creating the index on first use.
    pub async fn add_document(
        &self,
        name: &str,
        document: Document,
        field_config: &FieldConfigMap,
    ) -> Result<Arc<IndexData>> {
        self.add_documents(name, vec![document], field_config).await
    }

    /// Add a batch of documents in a single mutation cycle.
    pub async fn add_documents(
        &self,
        name: &str,
        documents: Vec<Document>,
        field_config: &FieldConfigMap,
    ) -> Result<Arc<IndexData>> {
        let lock = self.write_lock(name);
        let _guard = lock.lock().await;

        let mut data = self.snapshot_or_create(name, field_config).await?;
        let count = documents.len();
        for document in documents {
            insert_document(&mut data, document, field_config);
        }
        touch(&mut data);

        let data = self.persist(data).await?;
        debug!("Indexed {count} document(s) into {name}");
        Ok(data)
    }

    /// Remove a document and its postings.
    ///
    /// Returns `false` without touching storage when the index or the
    /// document does not exist.
    pub async fn remove_document(&self, name: &str, id: &str) -> Result<bool> {
        let lock = self.write_lock(name);
        let _guard = lock.lock().await;

        let Some(current) = self.load_index(name).await? else {
            return Ok(false);
        };
        if !current.documents.contains_key(id) {
            return Ok(false);
        }

        let mut data = IndexData::clone(&current);
        remove_from(&mut data, id);
        touch(&mut data);

        self.persist(data).await?;
        debug!("Removed document {id} from {name}");
        Ok(true)
    }

    /// Replace a document: remove then add, in one mutation cycle.
    ///
    /// A document that did not exist is simply added.
    pub async fn update_document(
        &self,
        name: &str,
        document: Document,
        field_config: &FieldConfigMap,
    ) -> Result<Arc<IndexData>> {
        let lock = self.write_lock(name);
        let _guard = lock.lock().await;

        let mut data = self.snapshot_or_create(name, field_config).await?;
        remove_from(&mut data, &document.id);
        insert_document(&mut data, document, field_config);
        touch(&mut data);

        self.persist(data).await
    }

    /// Evict an index from the cache and delete it from storage.
    pub async fn delete_index(&self, name: &str) -> Result<()> {
        let lock = self.write_lock(name);
        let guard = lock.lock().await;

        self.cache.write().evict(name);
        let deleted = self.storage.delete(name).await;
        // Evicting again covers a reader that filled the cache mid-delete.
        self.cache.write().evict(name);

        drop(guard);
        self.release_write_lock(name, lock);
        deleted?;
        info!("Deleted index {name}");
        Ok(())
    }

    /// Names of all stored indexes.
    pub async fn list_indexes(&self) -> Result<Vec<String>> {
        self.storage.list().await
    }

    /// Drop every cached snapshot; the next load reads storage again.
    pub fn clear_cache(&self) {
        self.cache.write().snapshots.clear();
    }

    fn write_lock(&self, name: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.write_locks.lock();
        Arc::clone(locks.entry(name.to_string()).or_default())
    }

    /// Forget the lock for `name` unless another task still holds a clone.
    fn release_write_lock(&self, name: &str, lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self.write_locks.lock();
        drop(lock);
        if locks.get(name).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(name);
        }
    }

    /// Owned copy of the current index, or a fresh one when none exists.
    async fn snapshot_or_create(
        &self,
        name: &str,
        field_config: &FieldConfigMap,
    ) -> Result<IndexData> {
        match self.load_index(name).await? {
            Some(current) => Ok(IndexData::clone(&current)),
            None => {
                info!("Auto-creating index {name}");
                Ok(IndexData::new(
                    name,
                    field_config.clone(),
                    self.default_analyzer,
                    Utc::now(),
                ))
            }
        }
    }

    /// Write `data` to storage, then publish it to the cache.
    async fn persist(&self, data: IndexData) -> Result<Arc<IndexData>> {
        let name = data.metadata.name.clone();
        self.storage.write(&name, &data).await?;

        let data = Arc::new(data);
        self.cache.write().publish(name, Arc::clone(&data));
        Ok(data)
    }
}

fn touch(data: &mut IndexData) {
    data.metadata.document_count = data.documents.len();
    data.metadata.updated_at = Utc::now();
}

fn remove_from(data: &mut IndexData, id: &str) {
    if data.documents.remove(id).is_some() {
        data.inverted_index.remove_document(id);
    }
}

/// Store `document` and record postings for its searchable fields.
///
/// Searchability and analyzer overrides come from `field_config` first, then
/// from the index's stored configuration.
fn insert_document(data: &mut IndexData, mut document: Document, field_config: &FieldConfigMap) {
    let now = Utc::now();
    if document.created_at.is_none() {
        document.created_at = Some(now);
    }
    document.updated_at = Some(now);

    let mut fields: Vec<(&String, _)> = document.fields.iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    for (field, value) in fields {
        let config = field_config
            .get(field)
            .or_else(|| data.metadata.field_config.get(field));
        if config.is_some_and(|config| !config.is_searchable()) {
            continue;
        }
        let Some(text) = value.render() else {
            continue;
        };

        let analyzer = config
            .and_then(|config| config.analyzer)
            .unwrap_or(data.metadata.analyzer);
        let terms = QueryParser::new(analyzer).extract_terms(&text);
        for (position, term) in terms.iter().enumerate() {
            data.inverted_index
                .add_occurrence(term, &document.id, field, position as u32);
        }
    }

    data.documents.insert(document.id.clone(), document);
}
