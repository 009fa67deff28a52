//! Capability-token guards for the operator and participant route trees.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, state::SharedState};

pub(crate) const OPERATOR_TOKEN_HEADER: &str = "x-operator-token";
pub(crate) const PARTICIPANT_TOKEN_HEADER: &str = "x-participant-token";

/// Let the request through only when `X-Operator-Token` matches the configured token.
pub(crate) async fn require_operator_token(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = header(req.headers(), OPERATOR_TOKEN_HEADER).ok_or_else(|| {
        AppError::Unauthorized("missing operator token header `X-Operator-Token`".into())
    })?;

    match state.config().operator_token() {
        Some(token) if tokens_match(token, provided) => Ok(next.run(req).await),
        Some(_) => Err(AppError::Unauthorized("invalid operator token".into())),
        None => Err(AppError::Unauthorized(
            "operator access is not configured".into(),
        )),
    }
}

/// Match reads accept either the operator token or the participant token.
pub(crate) async fn require_reader_token(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let config = state.config();
    let operator = header(req.headers(), OPERATOR_TOKEN_HEADER);
    let participant = header(req.headers(), PARTICIPANT_TOKEN_HEADER);

    if operator.is_none() && participant.is_none() {
        return Err(AppError::Unauthorized(
            "missing `X-Participant-Token` or `X-Operator-Token` header".into(),
        ));
    }

    let granted = granted(config.operator_token(), operator)
        || granted(config.participant_token(), participant);
    if granted {
        Ok(next.run(req).await)
    } else {
        Err(AppError::Unauthorized("invalid access token".into()))
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn granted(expected: Option<&str>, provided: Option<&str>) -> bool {
    match (expected, provided) {
        (Some(expected), Some(provided)) => tokens_match(expected, provided),
        _ => false,
    }
}

/// Compare without short-circuiting on the first differing byte.
fn tokens_match(expected: &str, provided: &str) -> bool {
    let (expected, provided) = (expected.as_bytes(), provided.as_bytes());
    let mut diff = expected.len() ^ provided.len();
    for (index, byte) in expected.iter().enumerate() {
        let other = provided.get(index).copied().unwrap_or(!byte);
        diff |= usize::from(byte ^ other);
    }
    diff == 0
}
