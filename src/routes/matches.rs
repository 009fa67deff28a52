use axum::{
    Json, Router,
    extract::{Path, Query, State},
    middleware,
    routing::get,
};

use crate::{
    dto::{
        live::{EventListQuery, EventSummary},
        matches::{BucketsResponse, MatchListItem, MatchListQuery, MatchSummary},
    },
    error::AppError,
    routes::auth::require_reader_token,
    services::{event_feed, match_service, query_engine},
    state::SharedState,
};

/// Read-only match routes for operators and participants.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/matches", get(list_matches))
        .route("/matches/buckets", get(list_buckets))
        .route("/matches/{id}", get(get_match))
        .route("/matches/{id}/events", get(list_events))
        .route_layer(middleware::from_fn_with_state(state, require_reader_token))
}

/// List matches matching the optional filters, in creation order.
#[utoipa::path(
    get,
    path = "/matches",
    tag = "matches",
    params(MatchListQuery),
    responses(
        (status = 200, description = "Matching matches", body = [MatchListItem]),
        (status = 401, description = "Missing or invalid access token")
    )
)]
pub async fn list_matches(
    State(state): State<SharedState>,
    Query(query): Query<MatchListQuery>,
) -> Result<Json<Vec<MatchListItem>>, AppError> {
    Ok(Json(query_engine::list_matches(&state, query.into()).await?))
}

/// Dashboard view split into today, upcoming, live and completed.
#[utoipa::path(
    get,
    path = "/matches/buckets",
    tag = "matches",
    params(MatchListQuery),
    responses(
        (status = 200, description = "Bucketed matches", body = BucketsResponse),
        (status = 401, description = "Missing or invalid access token")
    )
)]
pub async fn list_buckets(
    State(state): State<SharedState>,
    Query(query): Query<MatchListQuery>,
) -> Result<Json<BucketsResponse>, AppError> {
    Ok(Json(query_engine::list_buckets(&state, query.into()).await?))
}

#[utoipa::path(
    get,
    path = "/matches/{id}",
    tag = "matches",
    params(("id" = String, Path, description = "Identifier of the match")),
    responses(
        (status = 200, description = "Match", body = MatchSummary),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "Unknown or malformed match id")
    )
)]
pub async fn get_match(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<MatchSummary>, AppError> {
    let id = match_service::parse_match_id(&id)?;
    Ok(Json(match_service::get_match(&state, id).await?))
}

/// Event feed in append order.
#[utoipa::path(
    get,
    path = "/matches/{id}/events",
    tag = "matches",
    params(("id" = String, Path, description = "Identifier of the match"), EventListQuery),
    responses(
        (status = 200, description = "Events, oldest first", body = [EventSummary]),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "Unknown or malformed match id")
    )
)]
pub async fn list_events(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<EventListQuery>,
) -> Result<Json<Vec<EventSummary>>, AppError> {
    let id = match_service::parse_match_id(&id)?;
    Ok(Json(event_feed::list_events(&state, id, query.last).await?))
}
