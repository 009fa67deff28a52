use uuid::Uuid;

use crate::{
    dto::live::EventSummary,
    error::ServiceError,
    services::match_service,
    state::{SharedState, live_match::LiveEvent},
};

/// Trailing window of the feed, still oldest first. `None` keeps everything.
pub fn tail(events: &[LiveEvent], last: Option<usize>) -> &[LiveEvent] {
    match last {
        Some(count) => &events[events.len().saturating_sub(count)..],
        None => events,
    }
}

/// Display order for viewers.
pub fn newest_first(events: &[LiveEvent]) -> Vec<&LiveEvent> {
    events.iter().rev().collect()
}

/// Feed of one match in append order.
pub async fn list_events(
    state: &SharedState,
    id: Uuid,
    last: Option<usize>,
) -> Result<Vec<EventSummary>, ServiceError> {
    let live = match_service::load_match(state, id).await?;
    Ok(tail(&live.events, last)
        .iter()
        .map(EventSummary::from)
        .collect())
}
