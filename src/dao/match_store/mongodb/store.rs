use std::sync::Arc;

use futures::{StreamExt, future::BoxFuture};
use mongodb::{Client, Collection, Database, IndexModel, bson::doc, options::IndexOptions};
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult, is_decode_error, is_duplicate_key},
    models::{MongoMatchDocument, decode_listed, doc_id},
};
use crate::dao::{match_store::MatchStore, models::MatchEntity, storage::StorageResult};

const MATCH_COLLECTION_NAME: &str = "matches";

/// [`MatchStore`] over a MongoDB collection, reconnectable in place.
#[derive(Clone)]
pub struct MongoMatchStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    // Kept alive alongside the database handle.
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoMatchStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let collection = self.collection().await;

        let share_code_index = IndexModel::builder()
            .keys(doc! {"share_code": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("match_share_code_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();

        collection
            .create_index(share_code_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: MATCH_COLLECTION_NAME,
                index: "share_code",
                source,
            })?;

        let created_index = IndexModel::builder()
            .keys(doc! {"created_at": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("match_created_at_idx".to_owned()))
                    .build(),
            )
            .build();

        collection
            .create_index(created_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: MATCH_COLLECTION_NAME,
                index: "created_at",
                source,
            })?;

        Ok(())
    }

    async fn collection(&self) -> Collection<MongoMatchDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoMatchDocument>(MATCH_COLLECTION_NAME)
    }

    async fn insert(&self, record: MatchEntity) -> MongoResult<()> {
        let id = record.id;
        let document: MongoMatchDocument = record.into();
        self.collection()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| {
                if is_duplicate_key(&source) {
                    MongoDaoError::DuplicateMatch { id, source }
                } else {
                    MongoDaoError::InsertMatch { id, source }
                }
            })?;
        Ok(())
    }

    async fn save(&self, record: MatchEntity) -> MongoResult<()> {
        let id = record.id;
        let document: MongoMatchDocument = record.into();
        self.collection()
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| {
                if is_duplicate_key(&source) {
                    MongoDaoError::DuplicateMatch { id, source }
                } else {
                    MongoDaoError::SaveMatch { id, source }
                }
            })?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> MongoResult<Option<MatchEntity>> {
        let document = self
            .collection()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadMatch { id, source })?;

        document.map(TryInto::try_into).transpose()
    }

    async fn find_by_code(&self, code: String) -> MongoResult<Option<MatchEntity>> {
        let document = self
            .collection()
            .await
            .find_one(doc! {"share_code": code})
            .await
            .map_err(|source| MongoDaoError::LoadShareCode { source })?;

        document.map(TryInto::try_into).transpose()
    }

    /// Every decodable match in creation order; documents that fail to decode are
    /// logged and skipped.
    async fn list(&self) -> MongoResult<Vec<MatchEntity>> {
        let mut cursor = self
            .collection()
            .await
            .find(doc! {})
            .sort(doc! {"created_at": 1, "_id": 1})
            .await
            .map_err(|source| MongoDaoError::ListMatches { source })?;

        let mut records = Vec::new();
        while let Some(next) = cursor.next().await {
            match next {
                Ok(document) => records.extend(decode_listed(document)),
                Err(err) if is_decode_error(&err) => {
                    warn!(error = %err, "skipping undecodable match document");
                }
                Err(source) => return Err(MongoDaoError::ListMatches { source }),
            }
        }
        Ok(records)
    }
}

impl MatchStore for MongoMatchStore {
    fn insert_match(&self, record: MatchEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert(record).await.map_err(Into::into) })
    }

    fn save_match(&self, record: MatchEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save(record).await.map_err(Into::into) })
    }

    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find(id).await.map_err(Into::into) })
    }

    fn find_by_share_code(
        &self,
        code: String,
    ) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_by_code(code).await.map_err(Into::into) })
    }

    fn list_matches(&self) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list().await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
