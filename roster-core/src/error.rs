//! Error types and result types for document store operations.
//!
//! This module provides the error handling shared by every backend.
//! Use [`DocumentStoreResult<T>`] as the return type for fallible operations.

use std::fmt;

use bson::{Document, error::Error as BsonError};
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a document store.
#[derive(Error, Debug)]
pub enum DocumentStoreError {
    /// Serialization/deserialization error when converting between document formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during store initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// A write attempted to set a field the store owns, such as `_id`.
    #[error("Performing a write on the path '{0}' would modify an immutable field")]
    ImmutableField(String),
    /// The written document does not satisfy the collection's schema.
    #[error("{0}")]
    SchemaViolation(SchemaViolation),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for document store operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl From<BsonError> for DocumentStoreError {
    fn from(err: BsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for DocumentStoreError {
    fn from(err: SerdeJsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}

impl From<SchemaViolation> for DocumentStoreError {
    fn from(violation: SchemaViolation) -> Self {
        DocumentStoreError::SchemaViolation(violation)
    }
}

/// A storage-engine report that a written document broke its collection's schema.
///
/// Mirrors the shape MongoDB uses for `DocumentValidationFailure`: an engine
/// message plus every rule that was not satisfied, in evaluation order.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaViolation {
    /// The engine message, e.g. `"Document failed validation"`.
    pub message: String,
    /// Each unsatisfied top-level rule, as reported by the engine.
    pub rules_not_satisfied: Vec<Document>,
}

impl SchemaViolation {
    pub const DEFAULT_MESSAGE: &'static str = "Document failed validation";

    pub fn new(rules_not_satisfied: Vec<Document>) -> Self {
        Self {
            message: Self::DEFAULT_MESSAGE.to_string(),
            rules_not_satisfied,
        }
    }

    /// Returns the first unsatisfied rule, if the engine reported any.
    pub fn first_rule(&self) -> Option<&Document> {
        self.rules_not_satisfied.first()
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
