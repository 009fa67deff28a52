//! Consumer-side helpers: the share-code poller and operator submission guards.
//!
//! The HTTP implementations live behind the `sync-client` feature so the server
//! build does not need `reqwest`.

#[cfg(feature = "sync-client")]
pub mod http;
pub mod operator;
pub mod poller;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::dto::matches::PublicMatchView;

/// Errors produced by the client helpers.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, ...).
    #[cfg(feature = "sync-client")]
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("api error: status {status}, body: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body, usually the server's `{message}` JSON.
        body: String,
    },

    /// Response body could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The same control already has a submission in flight.
    #[error("a submission is already in flight")]
    Busy,
}

/// Anything able to fetch the public view of a match by share code.
pub trait MatchSource: Send + Sync + 'static {
    /// Fetch the current view of the match behind `code`.
    fn fetch(&self, code: &str) -> BoxFuture<'static, Result<PublicMatchView, ClientError>>;
}
