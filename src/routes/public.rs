use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::{
        live::{EventListQuery, EventSummary},
        matches::PublicMatchView,
    },
    error::AppError,
    services::{event_feed, share_resolver},
    state::SharedState,
};

/// Anonymous read routes keyed by share code. There is no anonymous listing:
/// a viewer only reaches the match whose code it was given.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/public/matches/{code}", get(get_by_share_code))
        .route("/public/matches/{code}/events", get(list_events_by_share_code))
}

/// Read one match through its share code.
#[utoipa::path(
    get,
    path = "/public/matches/{code}",
    tag = "public",
    params(("code" = String, Path, description = "Share code handed out by the operator")),
    responses(
        (status = 200, description = "Public match view", body = PublicMatchView),
        (status = 404, description = "Unknown or malformed code")
    )
)]
pub async fn get_by_share_code(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<PublicMatchView>, AppError> {
    Ok(Json(share_resolver::get_public_match(&state, &code).await?))
}

/// Event feed of the match behind a share code, oldest first.
#[utoipa::path(
    get,
    path = "/public/matches/{code}/events",
    tag = "public",
    params(
        ("code" = String, Path, description = "Share code handed out by the operator"),
        EventListQuery
    ),
    responses(
        (status = 200, description = "Events, oldest first", body = [EventSummary]),
        (status = 404, description = "Unknown or malformed code")
    )
)]
pub async fn list_events_by_share_code(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Query(query): Query<EventListQuery>,
) -> Result<Json<Vec<EventSummary>>, AppError> {
    let id = share_resolver::resolve(&state, &code).await?;
    Ok(Json(event_feed::list_events(&state, id, query.last).await?))
}
