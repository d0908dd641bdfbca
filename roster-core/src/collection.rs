//! Collection handles for document store operations.
//!
//! A [`Collection`] is the adapter every request handler talks to. It addresses
//! one named collection of a shared backend and exposes the single-record
//! operations plus filtered queries. Identifiers are store-owned: writes that
//! try to set `_id` are rejected before they reach the backend.

use std::sync::Arc;

use bson::Document;
use tracing::debug;

use crate::{
    backend::{DocumentStream, StoreBackend},
    error::{DocumentStoreError, DocumentStoreResult},
    id::RecordId,
    query::{Projection, Query},
};

/// The field under which backends store a record's identifier.
pub const ID_FIELD: &str = "_id";

/// A handle to one collection of a shared backend.
#[derive(Debug, Clone)]
pub struct Collection {
    name: String,
    backend: Arc<dyn StoreBackend>,
}

impl Collection {
    pub(crate) fn new(name: String, backend: Arc<dyn StoreBackend>) -> Self {
        Self { name, backend }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inserts a new document and returns its store-assigned identifier.
    ///
    /// # Errors
    ///
    /// - [`DocumentStoreError::ImmutableField`] if the document carries `_id`.
    /// - [`DocumentStoreError::SchemaViolation`] if the collection's schema rejects it.
    pub async fn insert(&self, document: Document) -> DocumentStoreResult<RecordId> {
        reject_id_writes(&document)?;

        let id = self
            .backend
            .insert_document(&self.name, document)
            .await?;

        debug!(collection = %self.name, %id, "inserted document");

        Ok(id)
    }

    /// Merges `fields` into the document with the given identifier.
    ///
    /// Returns the number of matched documents; a miss is not an error.
    ///
    /// # Errors
    ///
    /// - [`DocumentStoreError::ImmutableField`] if `fields` touches `_id`.
    /// - [`DocumentStoreError::SchemaViolation`] if the merged document breaks the schema.
    pub async fn update(&self, id: &RecordId, fields: Document) -> DocumentStoreResult<u64> {
        reject_id_writes(&fields)?;

        let matched = self
            .backend
            .update_document(&self.name, id, fields)
            .await?;

        debug!(collection = %self.name, %id, matched, "updated document");

        Ok(matched)
    }

    /// Deletes the document with the given identifier.
    ///
    /// Returns the number of removed documents; a miss is not an error.
    pub async fn delete(&self, id: &RecordId) -> DocumentStoreResult<u64> {
        let deleted = self
            .backend
            .delete_document(&self.name, id)
            .await?;

        debug!(collection = %self.name, %id, deleted, "deleted document");

        Ok(deleted)
    }

    /// Retrieves one document by identifier, applying `projection`.
    pub async fn find_one(&self, id: &RecordId, projection: &Projection) -> DocumentStoreResult<Option<Document>> {
        self.backend
            .find_one(&self.name, id, projection)
            .await
    }

    /// Streams every document matching `query`.
    pub async fn find(&self, query: Query) -> DocumentStoreResult<DocumentStream> {
        debug!(collection = %self.name, filter = ?query.filter, "querying documents");

        self.backend
            .find(&self.name, query)
            .await
    }
}

fn reject_id_writes(document: &Document) -> DocumentStoreResult<()> {
    match document
        .keys()
        .find(|key| *key == ID_FIELD || key.starts_with("_id."))
    {
        Some(key) => Err(DocumentStoreError::ImmutableField(key.clone())),
        None => Ok(()),
    }
}
