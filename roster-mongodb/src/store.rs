use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use bson::{Document, doc};
use mongodb::{
    Client, Collection as MongoCollection, Database,
    options::{ClientOptions, CreateCollectionOptions, FindOneOptions, FindOptions},
};
use tracing::{debug, info};

use roster_core::{
    backend::{DocumentStream, StoreBackend, StoreBackendBuilder},
    error::{DocumentStoreError, DocumentStoreResult},
    id::RecordId,
    query::{Projection, Query},
    schema::Schema,
};

use crate::{error::translate_error, query::MongoQueryTranslator};


#[derive(Debug)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    fn database(&self) -> Database {
        self.client.database(&self.database)
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.database().collection(collection_name)
    }

    async fn collection_exists(&self, name: &str) -> DocumentStoreResult<bool> {
        Ok(
            !self.database()
                .list_collection_names()
                .filter(doc! { "name": name })
                .await
                .map_err(translate_error)?
                .is_empty()
        )
    }
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    async fn create_collection(&self, name: &str, schema: Option<&Schema>) -> DocumentStoreResult<()> {
        let validator = schema.map(Schema::validator).unwrap_or_default();

        if self.collection_exists(name).await? {
            self.database()
                .run_command(doc! {
                    "collMod": name,
                    "validator": validator,
                    "validationLevel": "strict",
                })
                .await
                .map_err(translate_error)?;

            info!(collection = name, "applied validator to existing collection");
        } else {
            let mut options = CreateCollectionOptions::default();
            options.validator = Some(validator);

            self.database()
                .create_collection(name)
                .with_options(options)
                .await
                .map_err(translate_error)?;

            info!(collection = name, "created collection");
        }

        Ok(())
    }

    async fn insert_document(&self, collection: &str, document: Document) -> DocumentStoreResult<RecordId> {
        let result = self.get_collection(collection)
            .insert_one(document)
            .await
            .map_err(translate_error)?;

        result
            .inserted_id
            .as_object_id()
            .map(RecordId::from)
            .ok_or_else(|| DocumentStoreError::Backend(format!(
                "Unexpected identifier type returned by insert: {}",
                result.inserted_id
            )))
    }

    async fn update_document(&self, collection: &str, id: &RecordId, fields: Document) -> DocumentStoreResult<u64> {
        // An empty `$set` is rejected by the server, so a no-op update only checks existence.
        if fields.is_empty() {
            return Ok(
                self.get_collection(collection)
                    .count_documents(doc! { "_id": *id })
                    .await
                    .map_err(translate_error)?
            );
        }

        let result = self.get_collection(collection)
            .update_one(
                doc! { "_id": *id },
                doc! { "$set": fields },
            )
            .await
            .map_err(translate_error)?;

        debug!(collection, matched = result.matched_count, modified = result.modified_count, "mongodb update");

        Ok(result.matched_count)
    }

    async fn delete_document(&self, collection: &str, id: &RecordId) -> DocumentStoreResult<u64> {
        Ok(
            self.get_collection(collection)
                .delete_one(doc! { "_id": *id })
                .await
                .map_err(translate_error)?
                .deleted_count
        )
    }

    async fn find_one(
        &self,
        collection: &str,
        id: &RecordId,
        projection: &Projection,
    ) -> DocumentStoreResult<Option<Document>> {
        let mut options = FindOneOptions::default();
        options.projection = MongoQueryTranslator::projection_document(projection);

        self.get_collection(collection)
            .find_one(doc! { "_id": *id })
            .with_options(options)
            .await
            .map_err(translate_error)
    }

    async fn find(&self, collection: &str, query: Query) -> DocumentStoreResult<DocumentStream> {
        let mut options = FindOptions::default();
        options.projection = MongoQueryTranslator::projection_document(&query.projection);

        let cursor = self.get_collection(collection)
            .find(MongoQueryTranslator::filter_document(query.filter.as_ref())?)
            .with_options(options)
            .await
            .map_err(translate_error)?;

        Ok(cursor.map_err(translate_error).boxed())
    }

    async fn shutdown(&self) -> DocumentStoreResult<()> {
        self.client.clone().shutdown().await;

        info!(database = %self.database, "mongodb client shut down");

        Ok(())
    }
}

pub struct MongoDbStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        Ok(MongoDbStore::new(
            Client::with_options(
                ClientOptions::parse(&self.dsn)
                    .await
                    .map_err(|e| DocumentStoreError::Initialization(e.to_string()))?,
            )
            .map_err(|e| DocumentStoreError::Initialization(e.to_string()))?,
            self.database,
        ))
    }
}
