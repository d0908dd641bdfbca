//! Storage backend abstraction for the document store.
//!
//! This module defines the traits that abstract over different storage implementations,
//! allowing the document store to work with an in-process engine or a database server.
//!
//! # Overview
//!
//! The [`StoreBackend`] trait provides a unified async interface for single-record
//! writes and reads, filtered queries, and collection setup. Implementations are
//! required to be thread-safe (`Send + Sync`) because one backend instance serves every
//! in-flight request.
//!
//! # Schema Enforcement
//!
//! A collection created with a [`Schema`] must reject every insert or update whose
//! resulting document does not satisfy it, failing with
//! [`DocumentStoreError::SchemaViolation`](crate::error::DocumentStoreError::SchemaViolation).
//! Enforcement happens inside the backend so no write path can bypass it.
//!
//! # Traits
//!
//! - [`StoreBackend`]: The core trait for storage backends
//! - [`StoreBackendBuilder`]: Factory trait for creating backend instances

use std::fmt::Debug;

use async_trait::async_trait;
use bson::Document;
use futures::stream::BoxStream;

use crate::{
    error::DocumentStoreResult,
    id::RecordId,
    query::{Projection, Query},
    schema::Schema,
};

/// A lazily evaluated sequence of documents returned by [`StoreBackend::find`].
pub type DocumentStream = BoxStream<'static, DocumentStoreResult<Document>>;

/// Abstract interface for document storage backends.
///
/// # Thread Safety
///
/// All implementations must be thread-safe and support concurrent access from multiple
/// async tasks. Atomicity of a single write and isolation between concurrent writers
/// to the same record are whatever the backend natively provides.
///
/// # Identifiers
///
/// Backends assign a fresh [`RecordId`] to every inserted document and store it under
/// the `_id` field. Documents handed to [`insert_document`](StoreBackend::insert_document)
/// or [`update_document`](StoreBackend::update_document) never carry `_id` themselves;
/// the [`Collection`](crate::collection::Collection) handle rejects such writes first.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Creates a collection, installing `schema` as its validation rule.
    ///
    /// If the collection already exists its validation rule is replaced, so calling
    /// this at every startup is safe. Passing `None` leaves documents unvalidated.
    async fn create_collection(&self, name: &str, schema: Option<&Schema>) -> DocumentStoreResult<()>;

    /// Inserts a new document and returns the identifier assigned to it.
    ///
    /// Inserting into a collection that does not exist creates it without a schema.
    ///
    /// # Errors
    ///
    /// Fails with `SchemaViolation` if the document does not satisfy the collection's schema.
    async fn insert_document(&self, collection: &str, document: Document) -> DocumentStoreResult<RecordId>;

    /// Merges `fields` into the document with the given identifier.
    ///
    /// Fields named in `fields` overwrite the stored values; dotted names address
    /// embedded fields. Everything else is left untouched.
    ///
    /// # Returns
    ///
    /// The number of documents matched (0 or 1). A miss is not an error.
    ///
    /// # Errors
    ///
    /// Fails with `SchemaViolation` if the merged document does not satisfy the
    /// collection's schema; the stored document is then left unchanged.
    async fn update_document(
        &self,
        collection: &str,
        id: &RecordId,
        fields: Document,
    ) -> DocumentStoreResult<u64>;

    /// Deletes the document with the given identifier.
    ///
    /// # Returns
    ///
    /// The number of documents removed (0 or 1). A miss is not an error.
    async fn delete_document(&self, collection: &str, id: &RecordId) -> DocumentStoreResult<u64>;

    /// Retrieves a single document by identifier, applying `projection`.
    async fn find_one(
        &self,
        collection: &str,
        id: &RecordId,
        projection: &Projection,
    ) -> DocumentStoreResult<Option<Document>>;

    /// Streams every document matching `query`, in natural (insertion) order.
    ///
    /// Querying a collection that does not exist yields an empty stream.
    async fn find(&self, collection: &str, query: Query) -> DocumentStoreResult<DocumentStream>;

    /// Cleanly shuts down the backend, releasing connections and other resources.
    ///
    /// The default implementation is a no-op.
    async fn shutdown(&self) -> DocumentStoreResult<()> {
        Ok(())
    }
}

#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> DocumentStoreResult<Self::Backend>;
}
