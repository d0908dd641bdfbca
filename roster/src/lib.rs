//! HTTP service for schema-validated student records.
//!
//! Exposes create/read/update/delete over one collection of student documents.
//! The collection is configured at startup with the student schema as its
//! validation rule, so every write is checked by the store itself; this crate adds
//! presence checks with precise messages, listing filters, identifier decoding and
//! the mapping of store failures to HTTP responses.
//!
//! # Routes
//!
//! | Method | Path | Success |
//! |---|---|---|
//! | `GET` | `/students?country=&age=` | 200 `{"data": [...]}` |
//! | `POST` | `/students` | 201 `{"id": "..."}` |
//! | `GET` | `/students/:id` | 200 record |
//! | `PATCH` | `/students/:id` | 204 |
//! | `DELETE` | `/students/:id` | 200 |
//!
//! # Quick Start
//!
//! ```ignore
//! use roster::server::{AppState, router};
//! use roster_core::store::DocumentStore;
//! use roster_memory::InMemoryStore;
//!
//! let store = DocumentStore::new(InMemoryStore::new());
//! let state = AppState::initialize(&store, "students_data").await?;
//! let app = router(state);
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod server;
pub mod student;
pub mod validator;
