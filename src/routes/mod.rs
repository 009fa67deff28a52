use axum::Router;

use crate::state::SharedState;

mod auth;
/// Swagger UI.
pub mod docs;
/// Liveness and storage health.
pub mod health;
/// Reads for operators and participants.
pub mod matches;
/// Live scoring writes.
pub mod operator;
/// Share-code reads for anonymous viewers.
pub mod public;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(matches::router(state.clone()))
        .merge(public::router())
        .merge(operator::router(state.clone()));

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header::CONTENT_TYPE},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::{
        config::AppConfig, dao::match_store::memory::InMemoryMatchStore, state::AppState,
    };

    const TOKEN: &str = "pitch-side";
    const PARTICIPANT: &str = "dugout";

    async fn app() -> Router<()> {
        let state = AppState::new(
            AppConfig::default()
                .with_operator_token(TOKEN)
                .with_participant_token(PARTICIPANT),
        );
        state
            .set_match_store(Arc::new(InMemoryMatchStore::new()))
            .await;
        router(state)
    }

    fn post(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::post(uri).header(CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header("x-operator-token", token);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn get_as_participant(uri: &str) -> Request<Body> {
        Request::get(uri)
            .header("x-participant-token", PARTICIPANT)
            .body(Body::empty())
            .unwrap()
    }

    async fn create_live_match(app: &Router<()>) -> (String, String) {
        let created = app
            .clone()
            .oneshot(post("/operator/matches", Some(TOKEN), create_payload()))
            .await
            .unwrap();
        let created = json_body(created).await;
        let id = created["id"].as_str().unwrap().to_owned();
        let code = created["share_code"].as_str().unwrap().to_owned();

        let started = app
            .clone()
            .oneshot(post(
                &format!("/operator/matches/{id}/status"),
                Some(TOKEN),
                json!({"status": "live"}),
            ))
            .await
            .unwrap();
        assert_eq!(started.status(), StatusCode::OK);
        (id, code)
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn create_payload() -> Value {
        json!({
            "name": "Evening kickabout",
            "sport_type": "football",
            "start_time": "2026-10-17T18:00:00Z",
            "end_time": "2026-10-17T19:00:00Z",
            "turf_id": "turf-1",
            "turf_name": "North Field",
            "owner_id": "owner-1",
            "teams": [{"name": "Home"}, {"name": "Away"}]
        })
    }

    #[tokio::test]
    async fn operator_routes_require_token() {
        let app = app().await;

        let missing = app
            .clone()
            .oneshot(post("/operator/matches", None, create_payload()))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let wrong = app
            .oneshot(post("/operator/matches", Some("nope"), create_payload()))
            .await
            .unwrap();
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_then_read_publicly() {
        let app = app().await;

        let created = app
            .clone()
            .oneshot(post("/operator/matches", Some(TOKEN), create_payload()))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::OK);
        let created = json_body(created).await;
        let code = created["share_code"].as_str().unwrap().to_owned();
        let id = created["id"].as_str().unwrap().to_owned();

        let scored = app
            .clone()
            .oneshot(post(
                &format!("/operator/matches/{id}/score"),
                Some(TOKEN),
                json!({"team_index": 0, "delta": 1}),
            ))
            .await
            .unwrap();
        assert_eq!(scored.status(), StatusCode::OK);

        let public = app
            .clone()
            .oneshot(get(&format!("/public/matches/{code}")))
            .await
            .unwrap();
        assert_eq!(public.status(), StatusCode::OK);
        let public = json_body(public).await;
        assert_eq!(public["teams"][0]["score"], 1);
        assert!(public.get("id").is_none());

        let listed = app
            .oneshot(get_as_participant("/matches?q=north"))
            .await
            .unwrap();
        assert_eq!(json_body(listed).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_transition_is_conflict() {
        let app = app().await;
        let created = app
            .clone()
            .oneshot(post("/operator/matches", Some(TOKEN), create_payload()))
            .await
            .unwrap();
        let id = json_body(created).await["id"].as_str().unwrap().to_owned();

        let response = app
            .oneshot(post(
                &format!("/operator/matches/{id}/status"),
                Some(TOKEN),
                json!({"status": "completed"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn unknown_sport_is_bad_request() {
        let mut payload = create_payload();
        payload["sport_type"] = json!("quidditch");
        let response = app()
            .await
            .oneshot(post("/operator/matches", Some(TOKEN), payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn share_code_lookup_misses_look_the_same() {
        let app = app().await;
        let malformed = app
            .clone()
            .oneshot(get("/public/matches/NOT-A-CODE"))
            .await
            .unwrap();
        let unknown = app
            .oneshot(get("/public/matches/abcdefghjkmnpqrs"))
            .await
            .unwrap();

        assert_eq!(malformed.status(), StatusCode::NOT_FOUND);
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(malformed).await, json_body(unknown).await);
    }

    #[tokio::test]
    async fn anonymous_callers_cannot_discover_share_codes() {
        let app = app().await;
        let (id, code) = create_live_match(&app).await;

        for uri in [
            "/public/matches".to_owned(),
            "/matches".to_owned(),
            "/matches/buckets".to_owned(),
            format!("/matches/{id}"),
            format!("/matches/{id}/events"),
        ] {
            let response = app.clone().oneshot(get(&uri)).await.unwrap();
            assert_ne!(response.status(), StatusCode::OK, "{uri}");
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert!(!String::from_utf8_lossy(&bytes).contains(&code), "{uri}");
        }

        let wrong = app
            .clone()
            .oneshot(
                Request::get("/matches")
                    .header("x-participant-token", "guess")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

        let participant = app
            .clone()
            .oneshot(get_as_participant(&format!("/matches/{id}")))
            .await
            .unwrap();
        assert_eq!(participant.status(), StatusCode::OK);

        let operator = app
            .oneshot(
                Request::get("/matches/buckets")
                    .header("x-operator-token", TOKEN)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(operator.status(), StatusCode::OK);
        assert_eq!(json_body(operator).await["live"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn malformed_match_id_is_the_same_not_found() {
        let app = app().await;

        let malformed = app
            .clone()
            .oneshot(get_as_participant("/matches/not-a-uuid"))
            .await
            .unwrap();
        let unknown = app
            .clone()
            .oneshot(get_as_participant(&format!("/matches/{}", Uuid::new_v4())))
            .await
            .unwrap();
        assert_eq!(malformed.status(), StatusCode::NOT_FOUND);
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(malformed).await, json_body(unknown).await);

        let write = app
            .oneshot(post(
                "/operator/matches/not-a-uuid/score",
                Some(TOKEN),
                json!({"team_index": 0, "delta": 1}),
            ))
            .await
            .unwrap();
        assert_eq!(write.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(write).await["message"], "not found: match not found");
    }

    #[tokio::test]
    async fn share_code_reads_the_event_feed() {
        let app = app().await;
        let (id, code) = create_live_match(&app).await;

        for description in ["Kick-off", "Early chance", "Opening goal"] {
            let appended = app
                .clone()
                .oneshot(post(
                    &format!("/operator/matches/{id}/events"),
                    Some(TOKEN),
                    json!({"description": description, "time_label": "1'"}),
                ))
                .await
                .unwrap();
            assert_eq!(appended.status(), StatusCode::OK);
        }

        let feed = app
            .clone()
            .oneshot(get(&format!("/public/matches/{code}/events?last=2")))
            .await
            .unwrap();
        assert_eq!(feed.status(), StatusCode::OK);
        let feed = json_body(feed).await;
        let descriptions: Vec<_> = feed
            .as_array()
            .unwrap()
            .iter()
            .map(|event| event["description"].as_str().unwrap().to_owned())
            .collect();
        assert_eq!(descriptions, ["Early chance", "Opening goal"]);

        let unknown = app
            .oneshot(get("/public/matches/abcdefghjkmnpqrs/events"))
            .await
            .unwrap();
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    }
}
