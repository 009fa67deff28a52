use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{match_store::MatchStore, storage::StorageError},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Doubling delay capped at [`MAX_DELAY`].
struct Backoff {
    current: Duration,
}

impl Backoff {
    fn new() -> Self {
        Self {
            current: INITIAL_DELAY,
        }
    }

    fn reset(&mut self) {
        self.current = INITIAL_DELAY;
    }

    async fn wait(&mut self) {
        sleep(self.current).await;
        self.current = (self.current * 2).min(MAX_DELAY);
    }
}

/// Connect to the match store, then keep it healthy. Requests are answered
/// with 503 while the shared state is degraded.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn MatchStore>, StorageError>> + Send,
{
    let mut backoff = Backoff::new();

    loop {
        match connect().await {
            Ok(store) => {
                info!("match store connected; leaving degraded mode");
                state.set_match_store(store.clone()).await;
                backoff.reset();

                watch_store(&state, store.as_ref()).await;

                warn!("match store lost; dropping it and reconnecting from scratch");
                state.clear_match_store().await;
                backoff.wait().await;
            }
            Err(err) => {
                warn!(error = %err, "match store connection attempt failed");
                backoff.wait().await;
            }
        }
    }
}

/// Ping `store` until it fails and a bounded reconnect burst cannot revive it.
async fn watch_store(state: &SharedState, store: &dyn MatchStore) {
    loop {
        if store.health_check().await.is_ok() {
            if state.is_degraded().await {
                info!("match store healthy again; leaving degraded mode");
                state.update_degraded(false).await;
            }
            sleep(HEALTH_POLL_INTERVAL).await;
            continue;
        }

        if !reconnect(state, store).await {
            return;
        }
        state.update_degraded(false).await;
        sleep(HEALTH_POLL_INTERVAL).await;
    }
}

async fn reconnect(state: &SharedState, store: &dyn MatchStore) -> bool {
    let mut backoff = Backoff::new();

    for attempt in 0..MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(attempt, "match store reconnected after failed health check");
                return true;
            }
            Err(err) => {
                if attempt == 0 {
                    warn!(attempt, error = %err, "match store reconnect failed; entering degraded mode");
                    state.update_degraded(true).await;
                } else {
                    warn!(attempt, error = %err, "match store reconnect failed");
                }
                backoff.wait().await;
            }
        }
    }

    warn!("exhausted match store reconnect attempts");
    false
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use futures::future::BoxFuture;
    use uuid::Uuid;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{match_store::memory::InMemoryMatchStore, models::MatchEntity, storage::StorageResult},
        state::AppState,
    };

    /// In-memory store whose health can be toggled from the test.
    #[derive(Default)]
    struct FlakyStore {
        inner: InMemoryMatchStore,
        healthy: AtomicBool,
    }

    impl FlakyStore {
        fn healthy() -> Arc<Self> {
            Arc::new(Self {
                inner: InMemoryMatchStore::new(),
                healthy: AtomicBool::new(true),
            })
        }

        fn answer(&self) -> BoxFuture<'static, StorageResult<()>> {
            let healthy = self.healthy.load(Ordering::SeqCst);
            Box::pin(async move {
                if healthy {
                    Ok(())
                } else {
                    Err(StorageError::unavailable(
                        "store offline".into(),
                        std::io::Error::other("offline"),
                    ))
                }
            })
        }
    }

    impl MatchStore for FlakyStore {
        fn insert_match(&self, record: MatchEntity) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.insert_match(record)
        }
        fn save_match(&self, record: MatchEntity) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.save_match(record)
        }
        fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
            self.inner.find_match(id)
        }
        fn find_by_share_code(
            &self,
            code: String,
        ) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
            self.inner.find_by_share_code(code)
        }
        fn list_matches(&self) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
            self.inner.list_matches()
        }
        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.answer()
        }
        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.answer()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_connected_then_tracks_health() {
        let state = AppState::new(AppConfig::default());
        let store = FlakyStore::healthy();
        let attempts = Arc::new(AtomicUsize::new(0));

        let task = {
            let store = store.clone();
            let attempts = attempts.clone();
            tokio::spawn(run(state.clone(), move || {
                let store = store.clone();
                let attempt = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 2 {
                        Err(StorageError::unavailable(
                            "refused".into(),
                            std::io::Error::other("refused"),
                        ))
                    } else {
                        Ok(store as Arc<dyn MatchStore>)
                    }
                }
            }))
        };

        let mut degraded = state.degraded_watcher();
        degraded.wait_for(|value| !*value).await.unwrap();
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert!(state.require_match_store().await.is_ok());

        store.healthy.store(false, Ordering::SeqCst);
        degraded.wait_for(|value| *value).await.unwrap();

        store.healthy.store(true, Ordering::SeqCst);
        degraded.wait_for(|value| !*value).await.unwrap();
        assert!(state.require_match_store().await.is_ok());

        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_reconnects_drop_the_store() {
        let state = AppState::new(AppConfig::default());
        let store = FlakyStore::healthy();

        let task = {
            let store = store.clone();
            let connects = Arc::new(AtomicUsize::new(0));
            tokio::spawn(run(state.clone(), move || {
                let store = store.clone();
                let first = connects.fetch_add(1, Ordering::SeqCst) == 0;
                async move {
                    if first {
                        Ok(store as Arc<dyn MatchStore>)
                    } else {
                        Err(StorageError::unavailable(
                            "refused".into(),
                            std::io::Error::other("refused"),
                        ))
                    }
                }
            }))
        };

        let mut degraded = state.degraded_watcher();
        degraded.wait_for(|value| !*value).await.unwrap();

        store.healthy.store(false, Ordering::SeqCst);
        tokio::time::sleep(HEALTH_POLL_INTERVAL + MAX_DELAY * MAX_RECONNECT_ATTEMPTS).await;

        assert!(state.is_degraded().await);
        assert!(state.match_store().await.is_none());

        task.abort();
    }
}
