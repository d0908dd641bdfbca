//! Store-agnostic core of the roster service.
//!
//! This crate provides:
//!
//! - **Identifiers** ([`id`]) - The opaque record identifier and its external encoding
//! - **Payloads** ([`payload`]) - Tagged values for untyped request bodies
//! - **Schemas** ([`schema`]) - Declarative structural contracts enforced by backends
//! - **Query and filtering API** ([`query`]) - Filter expressions, projections and visitors
//! - **Store backend abstraction** ([`backend`]) - Traits for implementing storage backends
//! - **Document store** ([`store`]) and **collections** ([`collection`]) - Handles used by callers
//! - **Error handling** ([`error`]) - Error types and result types
//!
//! # Example
//!
//! ```ignore
//! use roster_core::{store::DocumentStore, query::Query};
//! use futures::TryStreamExt;
//!
//! let store = DocumentStore::new(backend);
//! let students = store.create_collection("students", Some(&schema)).await?;
//! let id = students.insert(payload.into_document()).await?;
//! let all = students.find(Query::new()).await?.try_collect::<Vec<_>>().await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as roster_core;

pub mod backend;
pub mod collection;
pub mod error;
pub mod id;
pub mod payload;
pub mod query;
pub mod schema;
pub mod store;
