//! Listing filters and dashboard buckets evaluated over whole match records.

use serde::Deserialize;
use time::{Duration, OffsetDateTime, Time, UtcOffset};
use tracing::warn;
use utoipa::ToSchema;

use crate::{
    dao::models::MatchEntity,
    dto::matches::{BucketsResponse, MatchListItem},
    error::ServiceError,
    state::{SharedState, lifecycle::MatchStatus, live_match::LiveMatch, sport::SportType},
};

/// Named time filter applied on top of the field filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    #[default]
    None,
    /// Starts between local midnight and the next local midnight.
    Today,
    /// Still scheduled and starting in the future.
    Upcoming,
    /// Currently live, whatever the date.
    Live,
}

/// Conjunction of optional predicates; unset fields do not constrain.
#[derive(Debug, Clone, Default)]
pub struct MatchFilter {
    pub status: Option<MatchStatus>,
    pub sport_type: Option<SportType>,
    pub owner_id: Option<String>,
    pub customer_id: Option<String>,
    /// Case-insensitive substring of the match or turf name.
    pub text: Option<String>,
    pub window: TimeWindow,
}

/// `[local midnight, next local midnight)` around `now` in `offset`.
pub fn day_bounds(now: OffsetDateTime, offset: UtcOffset) -> (OffsetDateTime, OffsetDateTime) {
    let midnight = now.to_offset(offset).replace_time(Time::MIDNIGHT);
    (midnight, midnight + Duration::days(1))
}

fn in_window(
    candidate: &LiveMatch,
    window: TimeWindow,
    now: OffsetDateTime,
    offset: UtcOffset,
) -> bool {
    match window {
        TimeWindow::None => true,
        TimeWindow::Today => {
            let (start, end) = day_bounds(now, offset);
            candidate.start_time >= start && candidate.start_time < end
        }
        TimeWindow::Upcoming => {
            candidate.status == MatchStatus::Scheduled && candidate.start_time > now
        }
        TimeWindow::Live => candidate.status == MatchStatus::Live,
    }
}

/// Evaluate every predicate of `filter` against one match.
pub fn matches_filter(
    candidate: &LiveMatch,
    filter: &MatchFilter,
    now: OffsetDateTime,
    offset: UtcOffset,
) -> bool {
    if filter.status.is_some_and(|status| status != candidate.status) {
        return false;
    }
    if filter
        .sport_type
        .is_some_and(|sport| sport != candidate.sport_type)
    {
        return false;
    }
    if filter
        .owner_id
        .as_deref()
        .is_some_and(|owner| owner != candidate.owner_id)
    {
        return false;
    }
    if let Some(customer) = filter.customer_id.as_deref() {
        if candidate.customer_id.as_deref() != Some(customer) {
            return false;
        }
    }
    if let Some(text) = filter.text.as_deref() {
        let needle = text.trim().to_lowercase();
        let hit = candidate.name.to_lowercase().contains(&needle)
            || candidate.turf_name.to_lowercase().contains(&needle);
        if !hit {
            return false;
        }
    }

    in_window(candidate, filter.window, now, offset)
}

/// Keep the matches accepted by `filter`, preserving input order.
pub fn filter_matches(
    matches: Vec<LiveMatch>,
    filter: &MatchFilter,
    now: OffsetDateTime,
    offset: UtcOffset,
) -> Vec<LiveMatch> {
    matches
        .into_iter()
        .filter(|candidate| matches_filter(candidate, filter, now, offset))
        .collect()
}

/// Dashboard split; a match may land in several buckets or in none.
#[derive(Debug, Default)]
pub struct MatchBuckets<'a> {
    pub today: Vec<&'a LiveMatch>,
    pub upcoming: Vec<&'a LiveMatch>,
    pub live: Vec<&'a LiveMatch>,
    pub completed: Vec<&'a LiveMatch>,
}

/// Sort matches into dashboard buckets. A match may land in more than one.
pub fn bucketize(matches: &[LiveMatch], now: OffsetDateTime, offset: UtcOffset) -> MatchBuckets<'_> {
    let mut buckets = MatchBuckets::default();
    for candidate in matches {
        if in_window(candidate, TimeWindow::Today, now, offset) {
            buckets.today.push(candidate);
        }
        if in_window(candidate, TimeWindow::Upcoming, now, offset) {
            buckets.upcoming.push(candidate);
        }
        if in_window(candidate, TimeWindow::Live, now, offset) {
            buckets.live.push(candidate);
        }
        if candidate.status == MatchStatus::Completed {
            buckets.completed.push(candidate);
        }
    }
    buckets
}

/// Load every readable match in creation order; corrupt records are logged and skipped.
async fn load_all(state: &SharedState) -> Result<Vec<LiveMatch>, ServiceError> {
    let store = state.require_match_store().await?;
    let records = store.list_matches().await?;
    Ok(records.into_iter().filter_map(readable).collect())
}

fn readable(record: MatchEntity) -> Option<LiveMatch> {
    LiveMatch::try_from(record)
        .inspect_err(|err| warn!(match_id = %err.id, error = %err, "skipping corrupt match record"))
        .ok()
}

/// Filtered listing for operators and participants.
pub async fn list_matches(
    state: &SharedState,
    filter: MatchFilter,
) -> Result<Vec<MatchListItem>, ServiceError> {
    let offset = state.config().utc_offset();
    let matches = filter_matches(load_all(state).await?, &filter, OffsetDateTime::now_utc(), offset);
    Ok(matches.iter().map(MatchListItem::from).collect())
}

/// Dashboard buckets over the matches accepted by `filter` (its window is ignored).
pub async fn list_buckets(
    state: &SharedState,
    filter: MatchFilter,
) -> Result<BucketsResponse, ServiceError> {
    let offset = state.config().utc_offset();
    let now = OffsetDateTime::now_utc();
    let filter = MatchFilter {
        window: TimeWindow::None,
        ..filter
    };
    let matches = filter_matches(load_all(state).await?, &filter, now, offset);
    let buckets = bucketize(&matches, now, offset);

    let rows = |bucket: Vec<&LiveMatch>| -> Vec<MatchListItem> {
        bucket.into_iter().map(MatchListItem::from).collect()
    };
    Ok(BucketsResponse {
        today: rows(buckets.today),
        upcoming: rows(buckets.upcoming),
        live: rows(buckets.live),
        completed: rows(buckets.completed),
    })
}
