//! In-memory document storage backend for roster.
//!
//! This crate provides a thread-safe, in-memory implementation of the `StoreBackend` trait.
//! It uses async-aware read-write locks for concurrent access and is ideal for development,
//! testing, and running the service without a database server.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **Schema enforcement** - Rejects writes with the same violation report a server validator produces
//! - **Dotted field paths** - Filters, projections and updates address embedded fields
//!
//! # Quick Start
//!
//! ```ignore
//! use roster_core::store::DocumentStore;
//! use roster_memory::InMemoryStore;
//! use bson::doc;
//!
//! let backend = InMemoryStore::builder().build().await?;
//! let store = DocumentStore::new(backend);
//! let students = store.create_collection("students", None).await?;
//!
//! let id = students.insert(doc! { "name": "Alice" }).await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as roster_memory;

pub mod store;
mod evaluator;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
