//! MongoDB backend implementation for roster.
//!
//! This crate provides a MongoDB-based implementation of the `StoreBackend` trait,
//! enabling persistent document storage using MongoDB's query engine and its
//! native `$jsonSchema` collection validation.
//!
//! The service binary enables it through its default `mongodb` feature:
//!
//! ```toml
//! [dependencies]
//! roster = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Features
//!
//! - **Persistent storage** - Data is persisted to MongoDB Atlas or self-hosted MongoDB
//! - **Native validation** - Schemas are installed as collection validators, and
//!   validator rejections are reported as schema violations with the server's rule report
//! - **Async/await** - Fully asynchronous API built on MongoDB's async driver
//!
//! # Example
//!
//! ```ignore
//! use roster_core::backend::StoreBackendBuilder;
//! use roster_mongodb::MongoDbStore;
//!
//! let store = MongoDbStore::builder("mongodb://localhost:27017", "my_database")
//!     .build()
//!     .await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as roster_mongodb;

pub mod store;
pub mod error;
mod query;

pub use store::{MongoDbStore, MongoDbStoreBuilder};
