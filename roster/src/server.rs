//! # HTTP Server
//!
//! Router construction, backend bootstrap and the serve loop.

use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use roster_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    collection::Collection,
    store::DocumentStore,
};
use roster_memory::InMemoryStore;

use crate::{
    config::{BackendSelection, ServiceConfig},
    error::ServiceError,
    handlers::{create_student, delete_student, get_student, list_students, update_student},
    student::student_schema,
};

/// State shared by every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub students: Collection,
}

impl AppState {
    pub fn new(students: Collection) -> Self {
        Self { students }
    }

    /// Ensures the student collection exists with its validator installed.
    pub async fn initialize(store: &DocumentStore, collection: &str) -> Result<Self, ServiceError> {
        let students = store
            .create_collection(collection, Some(&student_schema()))
            .await?;

        Ok(Self::new(students))
    }
}

/// Build the student routes
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/students", get(list_students).post(create_student))
        .route(
            "/students/:id",
            get(get_student).patch(update_student).delete(delete_student),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Builds the storage backend named by `selection`.
pub async fn connect(selection: &BackendSelection, database: &str) -> Result<DocumentStore, ServiceError> {
    let backend: Arc<dyn StoreBackend> = match selection {
        BackendSelection::Memory => Arc::new(InMemoryStore::builder().build().await?),
        BackendSelection::MongoDb { url } => connect_mongodb(url, database).await?,
    };

    Ok(DocumentStore::from_shared(backend))
}

#[cfg(feature = "mongodb")]
async fn connect_mongodb(url: &str, database: &str) -> Result<Arc<dyn StoreBackend>, ServiceError> {
    let backend = roster_mongodb::MongoDbStore::builder(url, database)
        .build()
        .await?;

    Ok(Arc::new(backend))
}

#[cfg(not(feature = "mongodb"))]
async fn connect_mongodb(_url: &str, _database: &str) -> Result<Arc<dyn StoreBackend>, ServiceError> {
    Err(ServiceError::BackendUnavailable("mongodb"))
}

/// Runs the service until a shutdown signal arrives, then releases the backend.
pub async fn run(config: ServiceConfig) -> Result<(), ServiceError> {
    let selection = config.backend_selection()?;

    info!(
        backend = selection.name(),
        database = %config.database,
        collection = %config.collection,
        "starting roster"
    );

    let store = connect(&selection, &config.database).await?;
    let state = AppState::initialize(&store, &config.collection).await?;

    let addr = config.socket_addr();
    let listener = TcpListener::bind(&addr).await?;

    info!(%addr, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutting down store");
    store.shutdown().await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Ctrl+C received, shutting down");
        }
        _ = terminate => {
            info!("SIGTERM received, shutting down");
        }
    }
}
