use uuid::Uuid;

use crate::{
    dto::matches::PublicMatchView,
    error::ServiceError,
    state::{SharedState, live_match::LiveMatch, share_code::ShareCode},
};

/// Store availability is checked before the code is parsed so a degraded
/// service answers malformed and well-formed codes the same way.
async fn load_by_code(state: &SharedState, raw: &str) -> Result<LiveMatch, ServiceError> {
    let store = state.require_match_store().await?;
    let code = ShareCode::parse(raw.trim()).ok_or_else(ServiceError::match_not_found)?;
    let entity = store
        .find_by_share_code(code.into_inner())
        .await?
        .ok_or_else(ServiceError::match_not_found)?;
    Ok(LiveMatch::try_from(entity)?)
}

/// Map a share code to the match it was issued for.
pub async fn resolve(state: &SharedState, code: &str) -> Result<Uuid, ServiceError> {
    Ok(load_by_code(state, code).await?.id)
}

/// Public projection of the match behind `code`.
pub async fn get_public_match(
    state: &SharedState,
    code: &str,
) -> Result<PublicMatchView, ServiceError> {
    let live = load_by_code(state, code).await?;
    Ok(PublicMatchView::from(&live))
}
