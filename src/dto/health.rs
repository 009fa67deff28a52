use serde::Serialize;
use utoipa::ToSchema;

/// Payload of the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok" or "degraded".
    pub status: String,
    /// Whether the last storage ping succeeded.
    pub storage_reachable: bool,
    /// Refresh cadence public viewers should use while a match is live.
    pub poll_interval_secs: u64,
}

impl HealthResponse {
    /// Build the payload; `degraded` decides the `status` string.
    pub fn new(degraded: bool, storage_reachable: bool, poll_interval_secs: u64) -> Self {
        Self {
            status: if degraded { "degraded" } else { "ok" }.into(),
            storage_reachable,
            poll_interval_secs,
        }
    }
}
