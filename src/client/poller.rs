//! Keeps one share-code viewer in sync with a live match by periodic refetch.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tracing::{debug, info, warn};

use super::{ClientError, MatchSource};
use crate::{dto::matches::PublicMatchView, state::lifecycle::MatchStatus};

/// Why a poller is no longer fetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The last snapshot reported this non-live status.
    NotLive(MatchStatus),
    /// The consumer called [`MatchPoller::stop`] or dropped the poller.
    Cancelled,
}

/// Whether the background refresh is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// A background task refetches on every tick.
    Polling,
    /// No further fetches will happen.
    Stopped(StopReason),
}

/// Snapshot holder plus the optional background task refreshing it.
pub struct MatchPoller {
    snapshot: watch::Receiver<PublicMatchView>,
    state: watch::Receiver<PollState>,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl MatchPoller {
    /// Fetch once, then keep refetching every `period` while the match is live.
    pub async fn load<S>(
        source: Arc<S>,
        code: impl Into<String>,
        period: Duration,
    ) -> Result<Self, ClientError>
    where
        S: MatchSource + ?Sized,
    {
        let code = code.into();
        let first = source.fetch(&code).await?;
        let initial_status = first.status;

        let (snapshot_tx, snapshot) = watch::channel(first);
        let (shutdown, shutdown_rx) = watch::channel(false);

        if initial_status != MatchStatus::Live {
            debug!(status = ?initial_status, "match not live; polling not started");
            let (_, state) = watch::channel(PollState::Stopped(StopReason::NotLive(initial_status)));
            return Ok(Self {
                snapshot,
                state,
                shutdown,
                task: None,
            });
        }

        let (state_tx, state) = watch::channel(PollState::Polling);
        let task = tokio::spawn(run(
            source,
            code,
            period,
            snapshot_tx,
            state_tx,
            shutdown_rx,
        ));

        Ok(Self {
            snapshot,
            state,
            shutdown,
            task: Some(task),
        })
    }

    /// Latest successfully fetched view.
    pub fn snapshot(&self) -> PublicMatchView {
        self.snapshot.borrow().clone()
    }

    /// Receiver notified on every snapshot replacement.
    pub fn subscribe(&self) -> watch::Receiver<PublicMatchView> {
        self.snapshot.clone()
    }

    /// Current polling state.
    pub fn state(&self) -> PollState {
        *self.state.borrow()
    }

    /// Receiver notified when polling stops.
    pub fn state_watcher(&self) -> watch::Receiver<PollState> {
        self.state.clone()
    }

    /// Cancel the background refresh and wait for it to exit.
    pub async fn stop(&mut self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                warn!(error = %err, "poller task ended abnormally");
            }
        }
    }
}

impl Drop for MatchPoller {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

async fn run<S>(
    source: Arc<S>,
    code: String,
    period: Duration,
    snapshot_tx: watch::Sender<PublicMatchView>,
    state_tx: watch::Sender<PollState>,
    mut shutdown_rx: watch::Receiver<bool>,
) where
    S: MatchSource + ?Sized,
{
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let reason = loop {
        tokio::select! {
            biased;

            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break StopReason::Cancelled;
                }
            }

            _ = ticker.tick() => {
                match source.fetch(&code).await {
                    Ok(view) => {
                        let status = view.status;
                        snapshot_tx.send_replace(view);
                        if status != MatchStatus::Live {
                            info!(status = ?status, "match left live status; polling stopped");
                            break StopReason::NotLive(status);
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "match refresh failed; keeping previous snapshot");
                    }
                }
            }
        }
    };

    state_tx.send_replace(PollState::Stopped(reason));
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use futures::future::BoxFuture;
    use time::macros::datetime;

    use super::*;
    use crate::state::{
        live_match::{LiveMatch, TeamIndex, tests::new_match},
        share_code::ShareCode,
        sport::SportType,
    };

    const PERIOD: Duration = Duration::from_secs(5);

    /// Serves queued responses in order, then repeats `fallback`.
    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<PublicMatchView, ClientError>>>,
        fallback: PublicMatchView,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(
            responses: Vec<Result<PublicMatchView, ClientError>>,
            fallback: PublicMatchView,
        ) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                fallback,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl MatchSource for ScriptedSource {
        fn fetch(&self, _code: &str) -> BoxFuture<'static, Result<PublicMatchView, ClientError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(self.fallback.clone()));
            Box::pin(async move { next })
        }
    }

    fn view(status: MatchStatus, home_score: u32) -> PublicMatchView {
        let now = datetime!(2026-10-17 18:00 UTC);
        let mut live =
            LiveMatch::create(new_match(SportType::Football), ShareCode::generate(), now).unwrap();
        live.status = status;
        live.apply_score_delta(TeamIndex::FIRST, i64::from(home_score), now);
        PublicMatchView::from(&live)
    }

    fn failure() -> Result<PublicMatchView, ClientError> {
        Err(ClientError::Api {
            status: 503,
            body: "degraded".into(),
        })
    }

    async fn wait_stopped(poller: &MatchPoller) -> PollState {
        let mut watcher = poller.state_watcher();
        *watcher
            .wait_for(|state| matches!(state, PollState::Stopped(_)))
            .await
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn polls_until_match_is_no_longer_live() {
        let source = ScriptedSource::new(
            vec![
                Ok(view(MatchStatus::Live, 0)),
                Ok(view(MatchStatus::Live, 1)),
                Ok(view(MatchStatus::Completed, 2)),
            ],
            view(MatchStatus::Completed, 2),
        );
        let started = Instant::now();
        let poller = MatchPoller::load(source.clone(), "code", PERIOD)
            .await
            .unwrap();
        assert_eq!(poller.state(), PollState::Polling);

        let state = wait_stopped(&poller).await;
        assert_eq!(
            state,
            PollState::Stopped(StopReason::NotLive(MatchStatus::Completed))
        );
        assert_eq!(poller.snapshot().status, MatchStatus::Completed);
        assert_eq!(poller.snapshot().teams[0].score, 2);
        assert_eq!(source.calls(), 3);
        assert!(started.elapsed() >= PERIOD * 2);

        tokio::time::sleep(PERIOD * 10).await;
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn scheduled_match_is_fetched_once() {
        let source = ScriptedSource::new(vec![], view(MatchStatus::Scheduled, 0));
        let poller = MatchPoller::load(source.clone(), "code", PERIOD)
            .await
            .unwrap();

        assert_eq!(
            poller.state(),
            PollState::Stopped(StopReason::NotLive(MatchStatus::Scheduled))
        );
        tokio::time::sleep(PERIOD * 6).await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refresh_keeps_snapshot_and_keeps_ticking() {
        let source = ScriptedSource::new(
            vec![
                Ok(view(MatchStatus::Live, 3)),
                failure(),
                failure(),
                Ok(view(MatchStatus::Live, 4)),
            ],
            view(MatchStatus::Live, 4),
        );
        let poller = MatchPoller::load(source.clone(), "code", PERIOD)
            .await
            .unwrap();

        tokio::time::sleep(PERIOD * 2 + Duration::from_millis(10)).await;
        assert_eq!(source.calls(), 3);
        assert_eq!(poller.snapshot().teams[0].score, 3);
        assert_eq!(poller.state(), PollState::Polling);

        tokio::time::sleep(PERIOD).await;
        assert_eq!(source.calls(), 4);
        assert_eq!(poller.snapshot().teams[0].score, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_refresh() {
        let source = ScriptedSource::new(vec![], view(MatchStatus::Live, 0));
        let mut poller = MatchPoller::load(source.clone(), "code", PERIOD)
            .await
            .unwrap();

        tokio::time::sleep(PERIOD + Duration::from_millis(10)).await;
        assert_eq!(source.calls(), 2);

        poller.stop().await;
        assert_eq!(
            poller.state(),
            PollState::Stopped(StopReason::Cancelled)
        );

        tokio::time::sleep(PERIOD * 10).await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn initial_failure_is_returned() {
        let source = ScriptedSource::new(vec![failure()], view(MatchStatus::Live, 0));
        let err = MatchPoller::load(source, "code", PERIOD).await.err().unwrap();
        assert!(matches!(err, ClientError::Api { status: 503, .. }));
    }
}
