//! Main document store interface for interacting with document backends.
//!
//! [`DocumentStore`] owns a shared handle to a [`StoreBackend`] chosen at runtime and
//! hands out [`Collection`] handles bound to a collection name. Both are cheap to clone
//! and safe to share across concurrent requests.
//!
//! # Example
//!
//! ```ignore
//! use roster_core::store::DocumentStore;
//!
//! let store = DocumentStore::new(backend);
//! store.create_collection("students", Some(&schema)).await?;
//! let students = store.collection("students");
//! ```

use std::sync::Arc;

use tracing::info;

use crate::{
    backend::StoreBackend,
    collection::Collection,
    error::DocumentStoreResult,
    schema::Schema,
};

/// A document store bound to a dynamically dispatched backend.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    backend: Arc<dyn StoreBackend>,
}

impl DocumentStore {
    /// Creates a new document store with the given backend.
    pub fn new(backend: impl StoreBackend + 'static) -> Self {
        Self { backend: Arc::new(backend) }
    }

    /// Creates a document store sharing an existing backend handle.
    pub fn from_shared(backend: Arc<dyn StoreBackend>) -> Self {
        Self { backend }
    }

    /// Gets a handle to the collection with the given name.
    pub fn collection(&self, name: &str) -> Collection {
        Collection::new(name.to_string(), Arc::clone(&self.backend))
    }

    /// Creates a collection, or refreshes an existing one, with `schema` installed
    /// as its validation rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot create or modify the collection.
    pub async fn create_collection(&self, name: &str, schema: Option<&Schema>) -> DocumentStoreResult<Collection> {
        self.backend
            .create_collection(name, schema)
            .await?;

        info!(collection = name, validated = schema.is_some(), "collection ready");

        Ok(self.collection(name))
    }

    /// Shuts down the underlying backend.
    pub async fn shutdown(&self) -> DocumentStoreResult<()> {
        self.backend.shutdown().await
    }
}
