//! In-memory storage implementation for document stores.
//!
//! This module provides a simple in-memory backend that stores documents as BSON
//! documents in maps guarded by async-safe read-write locks. Collections created
//! with a schema validate every write the way a database server's validator would.

use std::{collections::{BTreeMap, HashMap}, sync::Arc};
use async_trait::async_trait;
use futures::{StreamExt, stream};
use mea::rwlock::RwLock;
use bson::{Bson, Document, oid::ObjectId};
use tracing::debug;

use roster_core::{
    backend::{DocumentStream, StoreBackend, StoreBackendBuilder},
    collection::ID_FIELD,
    error::{DocumentStoreError, DocumentStoreResult},
    id::RecordId,
    query::{Projection, Query},
    schema::Schema,
};

use crate::evaluator::DocumentEvaluator;

/// Documents of one collection plus the rule they must satisfy.
///
/// Documents are keyed by an insertion sequence so scans follow insertion
/// order; `index` maps identifiers to their sequence.
#[derive(Debug, Default)]
struct MemoryCollection {
    schema: Option<Schema>,
    documents: BTreeMap<u64, Document>,
    index: HashMap<ObjectId, u64>,
    next_seq: u64,
}

impl MemoryCollection {
    fn validate(&self, document: &Document) -> DocumentStoreResult<()> {
        match &self.schema {
            Some(schema) => Ok(schema.validate(document)?),
            None => Ok(()),
        }
    }

    fn get(&self, id: &RecordId) -> Option<&Document> {
        self.index
            .get(id.as_object_id())
            .and_then(|seq| self.documents.get(seq))
    }

    fn push(&mut self, id: &RecordId, document: Document) {
        let seq = self.next_seq;
        self.next_seq += 1;

        self.index.insert(*id.as_object_id(), seq);
        self.documents.insert(seq, document);
    }

    fn replace(&mut self, id: &RecordId, document: Document) {
        if let Some(seq) = self.index.get(id.as_object_id()) {
            self.documents.insert(*seq, document);
        }
    }

    fn remove(&mut self, id: &RecordId) -> Option<Document> {
        let seq = self.index.remove(id.as_object_id())?;
        self.documents.remove(&seq)
    }
}

type StoreMap = HashMap<String, MemoryCollection>;


/// Thread-safe in-memory document storage backend.
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state, allowing
/// it to be safely shared across async tasks. Multiple clones of the same instance
/// share the same underlying data.
///
/// Every write holds the store's write lock for its whole read-merge-validate-commit
/// cycle, so a rejected write never leaves a partially applied document behind.
///
/// # Performance
///
/// Queries scan all documents in a collection (no indexing).
///
/// # Example
///
/// ```ignore
/// use roster_memory::InMemoryStore;
/// use roster_core::backend::StoreBackend;
/// use bson::doc;
///
/// let store = InMemoryStore::new();
/// let id = store.insert_document("students", doc! { "name": "Alice" }).await?;
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// The main storage map: collection_name -> collection
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    /// Creates a builder for constructing an `InMemoryStore`.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }
}


#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn create_collection(&self, name: &str, schema: Option<&Schema>) -> DocumentStoreResult<()> {
        self.store
            .write()
            .await
            .entry(name.to_string())
            .or_default()
            .schema = schema.cloned();

        Ok(())
    }

    async fn insert_document(&self, collection: &str, document: Document) -> DocumentStoreResult<RecordId> {
        let mut store = self.store.write().await;
        let collection_map = store
            .entry(collection.to_string())
            .or_default();

        let id = RecordId::new();
        let mut stored = Document::new();
        stored.insert(ID_FIELD, id);

        for (key, value) in document {
            stored.insert(key, value);
        }

        collection_map.validate(&stored)?;
        collection_map.push(&id, stored);

        Ok(id)
    }

    async fn update_document(&self, collection: &str, id: &RecordId, fields: Document) -> DocumentStoreResult<u64> {
        let mut store = self.store.write().await;
        let Some(collection_map) = store.get_mut(collection) else {
            return Ok(0);
        };
        let Some(current) = collection_map.get(id) else {
            return Ok(0);
        };

        let mut merged = current.clone();

        for (path, value) in fields {
            set_path(&mut merged, &path, value)?;
        }

        collection_map.validate(&merged)?;
        collection_map.replace(id, merged);

        Ok(1)
    }

    async fn delete_document(&self, collection: &str, id: &RecordId) -> DocumentStoreResult<u64> {
        let mut store = self.store.write().await;

        let removed = store
            .get_mut(collection)
            .and_then(|collection_map| collection_map.remove(id));

        Ok(u64::from(removed.is_some()))
    }

    async fn find_one(
        &self,
        collection: &str,
        id: &RecordId,
        projection: &Projection,
    ) -> DocumentStoreResult<Option<Document>> {
        let store = self.store.read().await;

        Ok(
            store
                .get(collection)
                .and_then(|collection_map| collection_map.get(id))
                .map(|document| projection.apply(document.clone()))
        )
    }

    async fn find(&self, collection: &str, query: Query) -> DocumentStoreResult<DocumentStream> {
        let store = self.store.read().await;
        let Some(collection_map) = store.get(collection) else {
            return Ok(stream::empty().boxed());
        };

        // Apply filter expressions if present
        let matched = match &query.filter {
            Some(filter) => DocumentEvaluator::filter_documents(
                collection_map.documents.values(),
                filter,
            )?,
            None => collection_map
                .documents
                .values()
                .collect::<Vec<_>>(),
        };

        debug!(collection, matched = matched.len(), "scanned in-memory collection");

        let documents = matched
            .into_iter()
            .map(|document| Ok(query.projection.apply(document.clone())))
            .collect::<Vec<_>>();

        Ok(stream::iter(documents).boxed())
    }
}

/// Writes `value` at a dotted `path`, creating missing embedded documents on the way.
fn set_path(document: &mut Document, path: &str, value: Bson) -> DocumentStoreResult<()> {
    let Some((head, rest)) = path.split_once('.') else {
        document.insert(path, value);
        return Ok(());
    };

    let nested = document
        .entry(head.to_string())
        .or_insert_with(|| Bson::Document(Document::new()));

    match nested {
        Bson::Document(nested) => set_path(nested, rest, value),
        other => Err(DocumentStoreError::Backend(format!(
            "Cannot create field '{rest}' in element {{{head}: {other}}}"
        ))),
    }
}


/// Builder for constructing [`InMemoryStore`] instances.
///
/// ```ignore
/// use roster_memory::InMemoryStore;
/// use roster_core::backend::StoreBackendBuilder;
///
/// let store = InMemoryStore::builder().build().await?;
/// ```
#[derive(Default)]
pub struct InMemoryStoreBuilder;

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    /// Builds and returns a new [`InMemoryStore`] instance.
    ///
    /// This always succeeds and returns a freshly initialized store.
    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        Ok(InMemoryStore::new())
    }
}
