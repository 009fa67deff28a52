use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Turf Live.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::matches::list_matches,
        crate::routes::matches::list_buckets,
        crate::routes::matches::get_match,
        crate::routes::matches::list_events,
        crate::routes::operator::create_match,
        crate::routes::operator::set_status,
        crate::routes::operator::adjust_score,
        crate::routes::operator::adjust_statistic,
        crate::routes::operator::append_event,
        crate::routes::public::get_by_share_code,
        crate::routes::public::list_events_by_share_code,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::matches::CreateMatchRequest,
            crate::dto::matches::TeamInput,
            crate::dto::matches::MatchSummary,
            crate::dto::matches::MatchListItem,
            crate::dto::matches::BucketsResponse,
            crate::dto::matches::PublicMatchView,
            crate::dto::matches::TeamSummary,
            crate::dto::matches::StatisticSummary,
            crate::dto::live::StatusChangeRequest,
            crate::dto::live::StatusChangeResponse,
            crate::dto::live::ScoreAdjustmentRequest,
            crate::dto::live::ScoreUpdateResponse,
            crate::dto::live::StatisticAdjustmentRequest,
            crate::dto::live::StatisticsResponse,
            crate::dto::live::AppendEventRequest,
            crate::dto::live::EventSummary,
            crate::services::query_engine::TimeWindow,
            crate::state::lifecycle::MatchStatus,
            crate::state::lifecycle::StatusChange,
            crate::state::sport::SportType,
            crate::state::sport::StatisticKind,
            crate::state::sport::EventKind,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "matches", description = "Match listings and details for operators and participants"),
        (name = "operator", description = "Live scoring actions; require the operator token"),
        (name = "public", description = "Anonymous share-code access"),
    )
)]
pub struct ApiDoc;
