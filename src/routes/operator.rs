use axum::{
    Json, Router,
    extract::{Path, State},
    middleware,
    routing::post,
};
use axum_valid::Valid;

use crate::{
    dto::{
        live::{
            AppendEventRequest, EventSummary, ScoreAdjustmentRequest, ScoreUpdateResponse,
            StatisticAdjustmentRequest, StatisticsResponse, StatusChangeRequest,
            StatusChangeResponse, parse_statistic,
        },
        matches::{CreateMatchRequest, MatchSummary},
    },
    error::{AppError, ServiceError},
    routes::auth::require_operator_token,
    services::match_service,
    state::SharedState,
};

/// Mutating routes reserved to the facility operator.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/operator/matches", post(create_match))
        .route("/operator/matches/{id}/status", post(set_status))
        .route("/operator/matches/{id}/score", post(adjust_score))
        .route("/operator/matches/{id}/statistics", post(adjust_statistic))
        .route("/operator/matches/{id}/events", post(append_event))
        .route_layer(middleware::from_fn_with_state(state, require_operator_token))
}

/// Open a scheduled match for a booked slot.
#[utoipa::path(
    post,
    path = "/operator/matches",
    tag = "operator",
    params(("X-Operator-Token" = String, Header, description = "Operator capability token")),
    request_body = CreateMatchRequest,
    responses(
        (status = 200, description = "Match created", body = MatchSummary),
        (status = 400, description = "Invalid payload or unknown sport")
    )
)]
pub async fn create_match(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateMatchRequest>>,
) -> Result<Json<MatchSummary>, AppError> {
    let new = payload.into_new_match().map_err(ServiceError::from)?;
    Ok(Json(match_service::create_match(&state, new).await?))
}

/// Move the match through its lifecycle.
#[utoipa::path(
    post,
    path = "/operator/matches/{id}/status",
    tag = "operator",
    params(
        ("X-Operator-Token" = String, Header, description = "Operator capability token"),
        ("id" = String, Path, description = "Identifier of the match")
    ),
    request_body = StatusChangeRequest,
    responses(
        (status = 200, description = "Status changed", body = StatusChangeResponse),
        (status = 404, description = "Unknown or malformed match id"),
        (status = 409, description = "Transition not allowed from the current status")
    )
)]
pub async fn set_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<StatusChangeRequest>,
) -> Result<Json<StatusChangeResponse>, AppError> {
    let id = match_service::parse_match_id(&id)?;
    Ok(Json(
        match_service::set_status(&state, id, payload.status).await?,
    ))
}

/// Apply a relative score change to one team.
#[utoipa::path(
    post,
    path = "/operator/matches/{id}/score",
    tag = "operator",
    params(
        ("X-Operator-Token" = String, Header, description = "Operator capability token"),
        ("id" = String, Path, description = "Identifier of the match")
    ),
    request_body = ScoreAdjustmentRequest,
    responses(
        (status = 200, description = "Updated score", body = ScoreUpdateResponse),
        (status = 400, description = "Team index out of range"),
        (status = 404, description = "Unknown or malformed match id")
    )
)]
pub async fn adjust_score(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<ScoreAdjustmentRequest>,
) -> Result<Json<ScoreUpdateResponse>, AppError> {
    let id = match_service::parse_match_id(&id)?;
    let response =
        match_service::adjust_score(&state, id, payload.team_index, payload.delta).await?;
    Ok(Json(response))
}

/// Apply a relative change to one statistic.
#[utoipa::path(
    post,
    path = "/operator/matches/{id}/statistics",
    tag = "operator",
    params(
        ("X-Operator-Token" = String, Header, description = "Operator capability token"),
        ("id" = String, Path, description = "Identifier of the match")
    ),
    request_body = StatisticAdjustmentRequest,
    responses(
        (status = 200, description = "Updated statistics", body = StatisticsResponse),
        (status = 400, description = "Statistic not tracked for this sport"),
        (status = 404, description = "Unknown or malformed match id")
    )
)]
pub async fn adjust_statistic(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<StatisticAdjustmentRequest>,
) -> Result<Json<StatisticsResponse>, AppError> {
    let id = match_service::parse_match_id(&id)?;
    let kind = parse_statistic(&payload.kind)?;
    let response =
        match_service::adjust_statistic(&state, id, kind, payload.team_index, payload.delta)
            .await?;
    Ok(Json(response))
}

/// Append a live update to the feed.
#[utoipa::path(
    post,
    path = "/operator/matches/{id}/events",
    tag = "operator",
    params(
        ("X-Operator-Token" = String, Header, description = "Operator capability token"),
        ("id" = String, Path, description = "Identifier of the match")
    ),
    request_body = AppendEventRequest,
    responses(
        (status = 200, description = "Stored event", body = EventSummary),
        (status = 400, description = "Empty description or kind not allowed"),
        (status = 404, description = "Unknown or malformed match id")
    )
)]
pub async fn append_event(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<AppendEventRequest>>,
) -> Result<Json<EventSummary>, AppError> {
    let id = match_service::parse_match_id(&id)?;
    let draft = payload.into_draft()?;
    Ok(Json(match_service::append_event(&state, id, draft).await?))
}
