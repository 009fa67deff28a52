use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Ping the installed store (if any) and report the degraded flag alongside it.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let storage_reachable = match state.match_store().await {
        Some(store) => match store.health_check().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "storage health check failed");
                false
            }
        },
        None => {
            warn!("no storage installed (degraded mode)");
            false
        }
    };

    HealthResponse::new(
        state.is_degraded().await,
        storage_reachable,
        state.config().poll_interval().as_secs(),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig, dao::match_store::memory::InMemoryMatchStore, state::AppState,
    };

    #[tokio::test]
    async fn reports_degraded_without_store() {
        let state = AppState::new(AppConfig::default());
        let health = health_status(&state).await;
        assert_eq!(health.status, "degraded");
        assert!(!health.storage_reachable);
        assert_eq!(health.poll_interval_secs, 5);

        state
            .set_match_store(Arc::new(InMemoryMatchStore::new()))
            .await;
        let health = health_status(&state).await;
        assert_eq!(health.status, "ok");
        assert!(health.storage_reachable);
    }
}
