//! Axum router configuration with middleware.
//!
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/sessions", post(handlers::session::upsert_session))
        .route("/sessions/{session_id}", get(handlers::session::get_session))
        .route(
            "/sessions/{session_id}/complete",
            post(handlers::session::complete_session),
        )
        .route(
            "/sessions/{session_id}/events",
            post(handlers::event::add_event),
        )
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use parley_infra::sqlite::pool::DatabasePool;
    use parley_types::config::ParleyConfig;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let data_dir = dir.path().to_path_buf();
        std::mem::forget(dir);
        let pool = DatabasePool::new(&url).await.unwrap();
        build_router(AppState::from_pool(pool, ParleyConfig::default(), data_dir))
    }

    async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn create_session(router: &Router, session_id: &str) {
        let (status, _) = send(
            router,
            Method::POST,
            "/sessions",
            Some(json!({ "sessionId": session_id, "language": "en" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    fn event_body(event_id: &str, text: &str, timestamp: &str) -> Value {
        json!({
            "eventId": event_id,
            "type": "user_speech",
            "payload": { "text": text },
            "timestamp": timestamp,
        })
    }

    #[tokio::test]
    async fn test_health() {
        let router = test_router().await;
        let (status, body) = send(&router, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_upsert_session_returns_existing_unchanged() {
        let router = test_router().await;

        let (status, first) = send(
            &router,
            Method::POST,
            "/sessions",
            Some(json!({ "sessionId": "s1", "language": "en" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["data"]["sessionId"], "s1");
        assert_eq!(first["data"]["status"], "initiated");
        assert!(first["data"]["endedAt"].is_null());

        let (status, second) = send(
            &router,
            Method::POST,
            "/sessions",
            Some(json!({ "sessionId": "s1", "language": "fr", "metadata": { "a": 1 } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["data"]["language"], "en");
        assert_eq!(second["data"]["metadata"], json!({}));
        assert_eq!(second["data"]["startedAt"], first["data"]["startedAt"]);
    }

    #[tokio::test]
    async fn test_upsert_session_rejects_empty_fields() {
        let router = test_router().await;

        let (status, body) = send(
            &router,
            Method::POST,
            "/sessions",
            Some(json!({ "sessionId": "", "language": "en" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");

        let (status, _) = send(
            &router,
            Method::POST,
            "/sessions",
            Some(json!({ "sessionId": "s1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_add_event_duplicate_returns_original_with_201() {
        let router = test_router().await;
        create_session(&router, "s1").await;

        let (status, first) = send(
            &router,
            Method::POST,
            "/sessions/s1/events",
            Some(event_body("e1", "hello", "2026-01-01T00:00:00Z")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(first["data"]["payload"]["text"], "hello");
        assert_eq!(first["data"]["type"], "user_speech");

        let (status, second) = send(
            &router,
            Method::POST,
            "/sessions/s1/events",
            Some(event_body("e1", "changed", "2026-01-02T00:00:00Z")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(second["data"]["payload"]["text"], "hello");
        assert_eq!(second["data"]["timestamp"], first["data"]["timestamp"]);

        let (_, detail) = send(&router, Method::GET, "/sessions/s1", None).await;
        assert_eq!(detail["data"]["pagination"]["total"], 1);
    }

    #[tokio::test]
    async fn test_add_event_unknown_session_is_404() {
        let router = test_router().await;

        let (status, body) = send(
            &router,
            Method::POST,
            "/sessions/ghost/events",
            Some(event_body("e1", "hello", "2026-01-01T00:00:00Z")),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errors"][0]["code"], "SESSION_NOT_FOUND");

        create_session(&router, "ghost").await;
        let (_, detail) = send(&router, Method::GET, "/sessions/ghost", None).await;
        assert_eq!(detail["data"]["pagination"]["total"], 0);
    }

    #[tokio::test]
    async fn test_get_unknown_session_is_404() {
        let router = test_router().await;
        let (status, _) = send(&router, Method::GET, "/sessions/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&router, Method::POST, "/sessions/nope/complete", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_session_paginates_newest_first() {
        let router = test_router().await;
        create_session(&router, "s1").await;

        for i in 0..25 {
            let ts = format!("2026-01-01T00:00:{i:02}Z");
            let (status, _) = send(
                &router,
                Method::POST,
                "/sessions/s1/events",
                Some(event_body(&format!("e{i}"), "hi", &ts)),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = send(&router, Method::GET, "/sessions/s1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["sessionId"], "s1");
        assert_eq!(body["data"]["events"].as_array().unwrap().len(), 20);
        assert_eq!(body["data"]["pagination"]["page"], 1);
        assert_eq!(body["data"]["pagination"]["limit"], 20);
        assert_eq!(body["data"]["pagination"]["totalPages"], 2);

        let (_, body) = send(&router, Method::GET, "/sessions/s1?page=1&limit=10", None).await;
        let events = body["data"]["events"].as_array().unwrap();
        assert_eq!(events.len(), 10);
        assert_eq!(events[0]["eventId"], "e24");
        assert_eq!(events[9]["eventId"], "e15");
        assert!(events[0].get("sessionId").is_none());
        assert_eq!(body["data"]["pagination"]["total"], 25);
        assert_eq!(body["data"]["pagination"]["totalPages"], 3);
        assert_eq!(body["_links"]["next"], "/sessions/s1?page=2&limit=10");
        assert_eq!(body["_links"]["add_event"], "/sessions/s1/events");
        assert!(body["_links"].get("events").is_none());

        let (_, body) = send(&router, Method::GET, "/sessions/s1?page=3&limit=10", None).await;
        let events = body["data"]["events"].as_array().unwrap();
        assert_eq!(events.len(), 5);
        assert_eq!(events[4]["eventId"], "e0");
        assert!(body["_links"].get("next").is_none());
    }

    fn timeline_ids(body: &Value) -> Vec<String> {
        body["data"]["events"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["eventId"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_far_future_timestamp_keeps_timeline_readable() {
        let router = test_router().await;
        create_session(&router, "s1").await;

        for (id, ts) in [
            ("now", "2026-01-01T00:00:00Z"),
            ("far", "+10000-01-01T00:00:00Z"),
        ] {
            let (status, body) = send(
                &router,
                Method::POST,
                "/sessions/s1/events",
                Some(event_body(id, "hi", ts)),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED, "{id}");
            assert_eq!(body["data"]["eventId"], id);
        }

        let (status, resent) = send(
            &router,
            Method::POST,
            "/sessions/s1/events",
            Some(event_body("far", "again", "2026-01-02T00:00:00Z")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(resent["data"]["payload"]["text"], "hi");

        let (status, body) = send(&router, Method::GET, "/sessions/s1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["pagination"]["total"], 2);
        assert_eq!(timeline_ids(&body), vec!["far", "now"]);
    }

    #[tokio::test]
    async fn test_offset_timestamps_are_normalized_and_ordered() {
        let router = test_router().await;
        create_session(&router, "s1").await;

        // 10:00+05:00 is 05:00Z, between the other two.
        for (id, ts) in [
            ("early", "2026-01-01T04:00:00Z"),
            ("offset", "2026-01-01T10:00:00+05:00"),
            ("late", "2026-01-01T06:00:00Z"),
        ] {
            let (status, _) = send(
                &router,
                Method::POST,
                "/sessions/s1/events",
                Some(event_body(id, "hi", ts)),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED, "{id}");
        }

        let (_, body) = send(&router, Method::GET, "/sessions/s1", None).await;
        assert_eq!(timeline_ids(&body), vec!["late", "offset", "early"]);

        let stored: chrono::DateTime<chrono::Utc> =
            serde_json::from_value(body["data"]["events"][1]["timestamp"].clone()).unwrap();
        let expected = chrono::DateTime::parse_from_rfc3339("2026-01-01T05:00:00Z").unwrap();
        assert_eq!(stored, expected);
    }

    #[tokio::test]
    async fn test_get_session_rejects_bad_paging() {
        let router = test_router().await;
        create_session(&router, "s1").await;

        for uri in [
            "/sessions/s1?page=0",
            "/sessions/s1?limit=0",
            "/sessions/s1?limit=101",
            "/sessions/s1?page=abc",
        ] {
            let (status, _) = send(&router, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_complete_session_is_idempotent() {
        let router = test_router().await;
        create_session(&router, "s1").await;

        let (status, first) = send(&router, Method::POST, "/sessions/s1/complete", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["data"]["status"], "completed");
        assert!(first["data"]["endedAt"].is_string());

        let (status, second) = send(&router, Method::POST, "/sessions/s1/complete", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["data"]["endedAt"], first["data"]["endedAt"]);
    }
}
