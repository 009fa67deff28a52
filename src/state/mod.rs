/// Status lifecycle.
pub mod lifecycle;
pub mod live_match;
pub mod share_code;
pub mod sport;

use std::sync::Arc;

use dashmap::DashMap;
use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock, watch};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::{match_store::MatchStore, models::MatchEntity},
    error::ServiceError,
    state::live_match::LiveMatch,
};

/// State handle shared by every handler and background task.
pub type SharedState = Arc<AppState>;

/// Central application state: the storage handle, degraded flag and per-match write locks.
pub struct AppState {
    match_store: RwLock<Option<Arc<dyn MatchStore>>>,
    degraded: watch::Sender<bool>,
    match_locks: DashMap<Uuid, Arc<Mutex<()>>>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            match_store: RwLock::new(None),
            degraded: degraded_tx,
            match_locks: DashMap::new(),
            config,
        })
    }

    /// Obtain a handle to the current match store, if one is installed.
    pub async fn match_store(&self) -> Option<Arc<dyn MatchStore>> {
        let guard = self.match_store.read().await;
        guard.as_ref().cloned()
    }

    /// Like [`AppState::match_store`] but fails with [`ServiceError::Degraded`].
    pub async fn require_match_store(&self) -> Result<Arc<dyn MatchStore>, ServiceError> {
        if self.is_degraded().await {
            return Err(ServiceError::Degraded);
        }
        self.match_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new match store implementation and leave degraded mode.
    pub async fn set_match_store(&self, store: Arc<dyn MatchStore>) {
        {
            let mut guard = self.match_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current match store and enter degraded mode.
    pub async fn clear_match_store(&self) {
        {
            let mut guard = self.match_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Configuration loaded at startup.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Load a match, apply `mutate` and persist the result while holding the match's lock.
    ///
    /// Concurrent writers to the same match are serialized, so deltas compose. If
    /// `mutate` fails nothing is written.
    pub async fn mutate_match<T, F>(&self, id: Uuid, mutate: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut LiveMatch, OffsetDateTime) -> Result<T, ServiceError>,
    {
        let store = self.require_match_store().await?;
        let lease = self.lease_match_lock(id);
        let _guard = lease.lock.lock().await;

        let entity = store
            .find_match(id)
            .await?
            .ok_or_else(ServiceError::match_not_found)?;
        let mut live = LiveMatch::try_from(entity)?;

        let outcome = mutate(&mut live, OffsetDateTime::now_utc())?;
        store.save_match(MatchEntity::from(live)).await?;
        Ok(outcome)
    }

    fn lease_match_lock(&self, id: Uuid) -> LockLease<'_> {
        let lock = self
            .match_locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        LockLease {
            locks: &self.match_locks,
            id,
            lock,
        }
    }
}

/// Shared handle on one match's write lock. The map entry is dropped with the
/// last lease, so ids that are never mutated again do not accumulate.
struct LockLease<'a> {
    locks: &'a DashMap<Uuid, Arc<Mutex<()>>>,
    id: Uuid,
    lock: Arc<Mutex<()>>,
}

impl Drop for LockLease<'_> {
    fn drop(&mut self) {
        // The map and this lease account for two references; any more means
        // another writer holds or awaits the lock.
        self.locks.remove_if(&self.id, |_, lock| {
            Arc::ptr_eq(lock, &self.lock) && Arc::strong_count(lock) <= 2
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::match_store::memory::InMemoryMatchStore;

    #[tokio::test]
    async fn starts_degraded_until_store_installed() {
        let state = AppState::new(AppConfig::default());
        let mut watcher = state.degraded_watcher();
        assert!(state.is_degraded().await);
        assert!(matches!(
            state.require_match_store().await,
            Err(ServiceError::Degraded)
        ));

        state
            .set_match_store(Arc::new(InMemoryMatchStore::new()))
            .await;
        assert!(!state.is_degraded().await);
        assert!(watcher.has_changed().unwrap());
        assert!(!*watcher.borrow_and_update());

        state.clear_match_store().await;
        assert!(state.is_degraded().await);
    }

    #[tokio::test]
    async fn mutate_unknown_match_is_not_found() {
        let state = AppState::new(AppConfig::default());
        state
            .set_match_store(Arc::new(InMemoryMatchStore::new()))
            .await;
        let err = state
            .mutate_match(Uuid::new_v4(), |_, _| Ok(()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert!(state.match_locks.is_empty());
    }

    #[tokio::test]
    async fn random_ids_do_not_grow_the_lock_map() {
        let state = AppState::new(AppConfig::default());
        state
            .set_match_store(Arc::new(InMemoryMatchStore::new()))
            .await;
        for _ in 0..1_000 {
            let _ = state.mutate_match(Uuid::new_v4(), |_, _| Ok(())).await;
        }
        assert!(state.match_locks.is_empty());
    }

    #[tokio::test]
    async fn lock_entry_survives_while_another_writer_waits() {
        let state = AppState::new(AppConfig::default());
        let id = Uuid::new_v4();

        let first = state.lease_match_lock(id);
        let second = state.lease_match_lock(id);
        assert!(Arc::ptr_eq(&first.lock, &second.lock));

        drop(first);
        assert_eq!(state.match_locks.len(), 1);
        drop(second);
        assert!(state.match_locks.is_empty());
    }
}
