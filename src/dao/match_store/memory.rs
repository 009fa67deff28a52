//! Process-local [`MatchStore`] used when no database is configured and in tests.

use std::{collections::HashMap, sync::Arc};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dao::{
    match_store::MatchStore,
    models::MatchEntity,
    storage::{StorageError, StorageResult},
};

/// Matches kept in process memory; cloning shares the same map.
#[derive(Clone, Default)]
pub struct InMemoryMatchStore {
    inner: Arc<RwLock<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    /// Insertion order doubles as creation order.
    matches: IndexMap<Uuid, MatchEntity>,
    share_index: HashMap<String, Uuid>,
}

impl InMemoryMatchStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    async fn insert(&self, record: MatchEntity) -> StorageResult<()> {
        let mut guard = self.inner.write().await;
        if guard.matches.contains_key(&record.id) {
            return Err(StorageError::conflict(format!(
                "match `{}` already exists",
                record.id
            )));
        }
        if guard.share_index.contains_key(&record.share_code) {
            return Err(StorageError::conflict("share code already issued"));
        }

        guard.share_index.insert(record.share_code.clone(), record.id);
        guard.matches.insert(record.id, record);
        Ok(())
    }

    async fn save(&self, record: MatchEntity) -> StorageResult<()> {
        let mut guard = self.inner.write().await;
        if let Some(owner) = guard.share_index.get(&record.share_code) {
            if *owner != record.id {
                return Err(StorageError::conflict("share code already issued"));
            }
        }

        guard.share_index.insert(record.share_code.clone(), record.id);
        guard.matches.insert(record.id, record);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Option<MatchEntity> {
        let guard = self.inner.read().await;
        guard.matches.get(&id).cloned()
    }

    async fn find_by_code(&self, code: &str) -> Option<MatchEntity> {
        let guard = self.inner.read().await;
        guard
            .share_index
            .get(code)
            .and_then(|id| guard.matches.get(id))
            .cloned()
    }

    async fn list(&self) -> Vec<MatchEntity> {
        let guard = self.inner.read().await;
        guard.matches.values().cloned().collect()
    }
}

impl MatchStore for InMemoryMatchStore {
    fn insert_match(&self, record: MatchEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert(record).await })
    }

    fn save_match(&self, record: MatchEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save(record).await })
    }

    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.find(id).await) })
    }

    fn find_by_share_code(
        &self,
        code: String,
    ) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.find_by_code(&code).await) })
    }

    fn list_matches(&self) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.list().await) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
