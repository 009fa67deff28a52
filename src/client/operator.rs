//! Submission guards for operator controls.

use std::{future::Future, sync::Arc};

use tokio::sync::Mutex;
use tracing::debug;

use super::ClientError;
use crate::dto::live::AppendEventRequest;

/// Lets one submission through at a time; overlapping ones fail fast with
/// [`ClientError::Busy`] instead of queueing.
#[derive(Debug, Clone, Default)]
pub struct SubmissionGate {
    in_flight: Arc<Mutex<()>>,
}

impl SubmissionGate {
    /// Gate with nothing in flight.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `work` unless another submission through this gate is outstanding.
    pub async fn submit<F, T>(&self, work: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!("submission rejected; previous one still in flight");
            return Err(ClientError::Busy);
        };
        work.await
    }

    /// Whether a submission is currently outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }
}

/// Event form state that survives failed appends.
#[derive(Debug, Clone, Default)]
pub struct EventComposer {
    draft: AppendEventRequest,
}

impl EventComposer {
    /// Composer holding an empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// Event as currently entered.
    pub fn draft(&self) -> &AppendEventRequest {
        &self.draft
    }

    /// Mutable access for form edits.
    pub fn draft_mut(&mut self) -> &mut AppendEventRequest {
        &mut self.draft
    }

    /// Send the current draft through `gate`. The draft is reset only when
    /// `send` succeeds.
    pub async fn submit<F, Fut, T>(
        &mut self,
        gate: &SubmissionGate,
        send: F,
    ) -> Result<T, ClientError>
    where
        F: FnOnce(AppendEventRequest) -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let outcome = gate.submit(send(self.draft.clone())).await?;
        self.draft = AppendEventRequest::default();
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::oneshot;

    use super::*;

    #[tokio::test]
    async fn second_submission_is_rejected_while_first_is_pending() {
        let gate = SubmissionGate::new();
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let first = {
            let gate = gate.clone();
            tokio::spawn(async move {
                gate.submit(async move {
                    let _ = release_rx.await;
                    Ok::<_, ClientError>(1)
                })
                .await
            })
        };

        while !gate.is_busy() {
            tokio::task::yield_now().await;
        }
        let second = gate.submit(async { Ok::<_, ClientError>(2) }).await;
        assert!(matches!(second, Err(ClientError::Busy)));

        release_tx.send(()).unwrap();
        assert_eq!(first.await.unwrap().unwrap(), 1);
        assert!(!gate.is_busy());

        let third = gate.submit(async { Ok::<_, ClientError>(3) }).await;
        assert_eq!(third.unwrap(), 3);
    }

    #[tokio::test]
    async fn failed_append_keeps_draft() {
        let gate = SubmissionGate::new();
        let mut composer = EventComposer::new();
        composer.draft_mut().description = "Corner to Home".into();
        composer.draft_mut().team_index = Some(0);

        let result: Result<(), _> = composer
            .submit(&gate, |_draft| async {
                Err(ClientError::Api {
                    status: 503,
                    body: "degraded".into(),
                })
            })
            .await;

        assert!(result.is_err());
        assert_eq!(composer.draft().description, "Corner to Home");
        assert_eq!(composer.draft().team_index, Some(0));
        assert!(!gate.is_busy());
    }

    #[tokio::test]
    async fn successful_append_clears_draft() {
        let gate = SubmissionGate::new();
        let mut composer = EventComposer::new();
        composer.draft_mut().description = "Goal".into();

        let sent = composer
            .submit(&gate, |draft| async move {
                tokio::time::sleep(Duration::from_millis(1)).await;
                Ok(draft.description)
            })
            .await
            .unwrap();

        assert_eq!(sent, "Goal");
        assert!(composer.draft().description.is_empty());
    }
}
