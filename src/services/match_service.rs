//! The single writer for match records: creation, lifecycle moves, score, statistics and feed appends.

use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::{models::MatchEntity, storage::StorageError},
    dto::{
        live::{EventSummary, ScoreUpdateResponse, StatisticsResponse, StatusChangeResponse},
        matches::{MatchSummary, statistic_summaries},
    },
    error::ServiceError,
    state::{
        SharedState,
        lifecycle::MatchStatus,
        live_match::{EventDraft, LiveMatch, NewMatch, TeamIndex},
        share_code::ShareCode,
        sport::StatisticKind,
    },
};

const SHARE_CODE_ATTEMPTS: usize = 5;

/// Persist a new scheduled match, drawing a fresh share code on collision.
pub async fn create_match(
    state: &SharedState,
    new: NewMatch,
) -> Result<MatchSummary, ServiceError> {
    let store = state.require_match_store().await?;

    for attempt in 1..=SHARE_CODE_ATTEMPTS {
        let live = LiveMatch::create(new.clone(), ShareCode::generate(), OffsetDateTime::now_utc())?;
        let summary = MatchSummary::from(&live);

        match store.insert_match(MatchEntity::from(live)).await {
            Ok(()) => {
                info!(
                    match_id = %summary.id,
                    sport = %summary.sport_type,
                    owner_id = %summary.owner_id,
                    "match created"
                );
                return Ok(summary);
            }
            Err(StorageError::Conflict { message }) => {
                warn!(attempt, %message, "share code collision; retrying");
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(ServiceError::Conflict(
        "could not allocate a unique share code".into(),
    ))
}

/// Load and validate a match record.
pub async fn load_match(state: &SharedState, id: Uuid) -> Result<LiveMatch, ServiceError> {
    let store = state.require_match_store().await?;
    let entity = store
        .find_match(id)
        .await?
        .ok_or_else(ServiceError::match_not_found)?;
    Ok(LiveMatch::try_from(entity)?)
}

/// Parse a match id taken from a URL. Malformed ids fail exactly like unknown ones.
pub fn parse_match_id(raw: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ServiceError::match_not_found())
}

/// Full view of one match.
pub async fn get_match(state: &SharedState, id: Uuid) -> Result<MatchSummary, ServiceError> {
    let live = load_match(state, id).await?;
    Ok(MatchSummary::from(&live))
}

/// Apply a lifecycle move; invalid pairs leave the record untouched.
pub async fn set_status(
    state: &SharedState,
    id: Uuid,
    to: MatchStatus,
) -> Result<StatusChangeResponse, ServiceError> {
    let change = state
        .mutate_match(id, |live, now| {
            live.transition(to, now).map_err(ServiceError::from)
        })
        .await
        .inspect_err(|err| {
            if let ServiceError::InvalidTransition(invalid) = err {
                warn!(match_id = %id, from = ?invalid.from, to = ?invalid.to, "rejected status change");
            }
        })?;

    info!(
        match_id = %id,
        status = ?to,
        change = ?change,
        terminal = to.is_terminal(),
        "match status changed"
    );
    Ok(StatusChangeResponse {
        id,
        status: to,
        change,
    })
}

/// Add `delta` to one team's score, clamped at zero. Allowed in every status.
pub async fn adjust_score(
    state: &SharedState,
    id: Uuid,
    team_index: usize,
    delta: i64,
) -> Result<ScoreUpdateResponse, ServiceError> {
    let team = TeamIndex::new(team_index)?;
    let score = state
        .mutate_match(id, |live, now| Ok(live.apply_score_delta(team, delta, now)))
        .await?;

    info!(match_id = %id, team_index, delta, score, "score adjusted");
    Ok(ScoreUpdateResponse { team_index, score })
}

/// Add `delta` to one statistic for one team and return the whole block.
pub async fn adjust_statistic(
    state: &SharedState,
    id: Uuid,
    kind: StatisticKind,
    team_index: usize,
    delta: i64,
) -> Result<StatisticsResponse, ServiceError> {
    let team = TeamIndex::new(team_index)?;
    let statistics = state
        .mutate_match(id, |live, now| {
            live.apply_statistic(kind, team, delta, now)?;
            Ok(statistic_summaries(&live.statistics))
        })
        .await?;

    info!(match_id = %id, %kind, team_index, delta, "statistic adjusted");
    Ok(StatisticsResponse { statistics })
}

/// Append one entry to the feed; score and status are not touched.
pub async fn append_event(
    state: &SharedState,
    id: Uuid,
    draft: EventDraft,
) -> Result<EventSummary, ServiceError> {
    let event = state
        .mutate_match(id, |live, now| Ok(live.append_event(draft, now)?))
        .await?;

    info!(match_id = %id, sequence = event.sequence, kind = %event.kind, "event appended");
    Ok(EventSummary::from(&event))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::match_store::memory::InMemoryMatchStore,
        state::{
            AppState,
            live_match::{POSSESSION_TOTAL, tests::new_match},
            sport::{EventKind, SportType},
        },
    };

    async fn ready_state() -> SharedState {
        let state = AppState::new(AppConfig::default());
        state
            .set_match_store(Arc::new(InMemoryMatchStore::new()))
            .await;
        state
    }

    fn possession(response: &StatisticsResponse) -> (u32, u32) {
        let entry = response
            .statistics
            .iter()
            .find(|s| s.kind == StatisticKind::Possession)
            .unwrap();
        (entry.team1, entry.team2)
    }

    #[tokio::test]
    async fn degraded_state_rejects_writes() {
        let state = AppState::new(AppConfig::default());
        let err = create_match(&state, new_match(SportType::Football))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Degraded));
    }

    #[tokio::test]
    async fn football_score_scenario() {
        let state = ready_state().await;
        let created = create_match(&state, new_match(SportType::Football))
            .await
            .unwrap();
        assert_eq!(created.status, MatchStatus::Scheduled);

        let up = adjust_score(&state, created.id, 0, 1).await.unwrap();
        assert_eq!(up.score, 1);
        let summary = get_match(&state, created.id).await.unwrap();
        assert_eq!(
            summary.teams.iter().map(|t| t.score).collect::<Vec<_>>(),
            vec![1, 0]
        );

        let down = adjust_score(&state, created.id, 0, -5).await.unwrap();
        assert_eq!(down.score, 0);
    }

    #[tokio::test]
    async fn bad_team_index_is_validation() {
        let state = ready_state().await;
        let created = create_match(&state, new_match(SportType::Football))
            .await
            .unwrap();
        let err = adjust_score(&state, created.id, 2, 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn possession_scenario() {
        let state = ready_state().await;
        let created = create_match(&state, new_match(SportType::Football))
            .await
            .unwrap();

        let stats = adjust_statistic(&state, created.id, StatisticKind::Possession, 0, 10)
            .await
            .unwrap();
        assert_eq!(possession(&stats), (60, 40));

        let stats = adjust_statistic(&state, created.id, StatisticKind::Possession, 0, 50)
            .await
            .unwrap();
        assert_eq!(possession(&stats), (100, 0));
        let (a, b) = possession(&stats);
        assert_eq!(a + b, POSSESSION_TOTAL);
    }

    #[tokio::test]
    async fn statistic_outside_vocabulary_is_validation() {
        let state = ready_state().await;
        let created = create_match(&state, new_match(SportType::Tennis))
            .await
            .unwrap();
        let err = adjust_statistic(&state, created.id, StatisticKind::Corners, 0, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(get_match(&state, created.id).await.unwrap().statistics.is_empty());
    }

    #[tokio::test]
    async fn lifecycle_scenario() {
        let state = ready_state().await;
        let created = create_match(&state, new_match(SportType::Football))
            .await
            .unwrap();

        let err = set_status(&state, created.id, MatchStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidTransition(_)));
        assert_eq!(
            get_match(&state, created.id).await.unwrap().status,
            MatchStatus::Scheduled
        );

        set_status(&state, created.id, MatchStatus::Live).await.unwrap();
        let done = set_status(&state, created.id, MatchStatus::Completed)
            .await
            .unwrap();
        assert_eq!(done.status, MatchStatus::Completed);
    }

    #[tokio::test]
    async fn rejected_event_is_not_stored() {
        let state = ready_state().await;
        let created = create_match(&state, new_match(SportType::Cricket))
            .await
            .unwrap();
        let draft = EventDraft {
            team_index: None,
            kind: EventKind::Goal,
            player: None,
            description: "Not cricket".into(),
            time_label: String::new(),
        };
        let err = append_event(&state, created.id, draft).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(get_match(&state, created.id).await.unwrap().events.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_deltas_compose() {
        let state = ready_state().await;
        let created = create_match(&state, new_match(SportType::Basketball))
            .await
            .unwrap();

        let tasks = (0..32)
            .map(|_| {
                let state = state.clone();
                tokio::spawn(async move { adjust_score(&state, created.id, 1, 2).await })
            })
            .collect::<Vec<_>>();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let summary = get_match(&state, created.id).await.unwrap();
        assert_eq!(summary.teams[1].score, 64);
    }
}
