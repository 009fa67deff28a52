//! `reqwest` clients for the public read path and the operator routes.

use futures::future::BoxFuture;
use reqwest::Client;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::{ClientError, MatchSource};
use crate::dto::{
    live::{
        AppendEventRequest, EventSummary, ScoreAdjustmentRequest, ScoreUpdateResponse,
        StatisticAdjustmentRequest, StatisticsResponse, StatusChangeRequest,
        StatusChangeResponse,
    },
    matches::PublicMatchView,
};
use crate::state::lifecycle::MatchStatus;

const OPERATOR_TOKEN_HEADER: &str = "x-operator-token";

/// Reads `GET /public/matches/{code}` from a running server.
#[derive(Debug, Clone)]
pub struct HttpMatchSource {
    http: Client,
    base_url: String,
}

impl HttpMatchSource {
    /// `base_url` is the server root, e.g. `http://localhost:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: trim_base(base_url.into()),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }
}

impl MatchSource for HttpMatchSource {
    fn fetch(&self, code: &str) -> BoxFuture<'static, Result<PublicMatchView, ClientError>> {
        let http = self.http.clone();
        let url = format!("{}/public/matches/{}", self.base_url, code.trim());
        Box::pin(async move {
            let resp = http.get(url).send().await?;
            parse_response(resp).await
        })
    }
}

/// Typed client for the operator routes.
#[derive(Debug, Clone)]
pub struct OperatorClient {
    http: Client,
    base_url: String,
    token: String,
}

impl OperatorClient {
    /// Client for the server at `base_url`, sending `token` as `X-Operator-Token`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: trim_base(base_url.into()),
            token: token.into(),
        }
    }

    /// `POST /operator/matches/{id}/status`
    pub async fn set_status(
        &self,
        id: Uuid,
        status: MatchStatus,
    ) -> Result<StatusChangeResponse, ClientError> {
        self.post(&format!("/operator/matches/{id}/status"), &StatusChangeRequest { status })
            .await
    }

    /// `POST /operator/matches/{id}/score`
    pub async fn adjust_score(
        &self,
        id: Uuid,
        team_index: usize,
        delta: i64,
    ) -> Result<ScoreUpdateResponse, ClientError> {
        self.post(
            &format!("/operator/matches/{id}/score"),
            &ScoreAdjustmentRequest { team_index, delta },
        )
        .await
    }

    /// `POST /operator/matches/{id}/statistics`
    pub async fn adjust_statistic(
        &self,
        id: Uuid,
        kind: &str,
        team_index: usize,
        delta: i64,
    ) -> Result<StatisticsResponse, ClientError> {
        self.post(
            &format!("/operator/matches/{id}/statistics"),
            &StatisticAdjustmentRequest {
                kind: kind.to_owned(),
                team_index,
                delta,
            },
        )
        .await
    }

    /// `POST /operator/matches/{id}/events`
    pub async fn append_event(
        &self,
        id: Uuid,
        event: &AppendEventRequest,
    ) -> Result<EventSummary, ClientError> {
        self.post(&format!("/operator/matches/{id}/events"), event)
            .await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header(OPERATOR_TOKEN_HEADER, &self.token)
            .json(body)
            .send()
            .await?;
        parse_response(resp).await
    }
}

fn trim_base(base_url: String) -> String {
    base_url.trim_end_matches('/').to_owned()
}

async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api {
            status: status.as_u16(),
            body,
        });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}
