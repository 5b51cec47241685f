use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post, put},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/current", get(handlers::get_current))
        .route("/api/current/counter", post(handlers::counter))
        .route("/api/current/date", post(handlers::set_date))
        .route("/api/current/location", post(handlers::set_location))
        .route("/api/current/finish", post(handlers::finish))
        .route(
            "/api/sessions",
            get(handlers::list_sessions).delete(handlers::clear_sessions),
        )
        .route("/api/sessions/:id", delete(handlers::delete_session))
        .route("/api/locations", get(handlers::get_locations))
        .route("/api/locations/:slot", put(handlers::rename_location))
        .route("/api/export", get(handlers::export_sessions))
        .route("/api/assets", get(handlers::asset_status))
        .fallback(handlers::assets)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offline::tests::spawn_echo_upstream;
    use crate::offline::{CacheStorage, EmbeddedFetcher, HttpFetcher, OfflineCache};
    use crate::state::Tally;
    use crate::storage::Store;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn test_state() -> AppState {
        let store = Store::in_memory();
        let tally = Tally::load(&store).await;
        let assets = OfflineCache::new(
            "test",
            Arc::new(CacheStorage::default()),
            Arc::new(EmbeddedFetcher),
        );
        assets.install().await.unwrap();
        assets.activate().await.unwrap();
        AppState::new(store, tally, assets)
    }

    async fn call(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn call_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Value {
        let (status, bytes) = call(app, method, uri, body).await;
        assert!(status.is_success(), "{method} {uri} -> {status}");
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn counting_session_flow() {
        let app = router(test_state().await);

        let new_one = json!({"counter": "new", "action": "increment"});
        let old_one = json!({"counter": "old", "action": "increment"});

        let current = call_json(&app, "POST", "/api/current/counter", Some(new_one.clone())).await;
        assert_eq!(current["new_count"], 0);
        assert_eq!(current["can_count"], false);

        call_json(&app, "POST", "/api/current/date", Some(json!({"date": "2024-01-01"}))).await;
        call_json(&app, "POST", "/api/current/location", Some(json!({"location": "Dhaka"}))).await;
        for _ in 0..3 {
            call_json(&app, "POST", "/api/current/counter", Some(new_one.clone())).await;
        }
        let current = call_json(&app, "POST", "/api/current/counter", Some(old_one)).await;
        assert_eq!(current["total"], 4);
        assert_eq!(current["locked"], true);

        let khulna = json!({"location": "Khulna"});
        let locked = call_json(&app, "POST", "/api/current/location", Some(khulna)).await;
        assert_eq!(locked["location"], "Dhaka");

        let finished = call_json(&app, "POST", "/api/current/finish", None).await;
        assert_eq!(finished["session"]["total"], 4);
        assert_eq!(finished["session"]["date"], "2024-01-01");
        assert_eq!(finished["current"]["locked"], false);
        assert_eq!(finished["current"]["total"], 0);

        let empty = call_json(&app, "POST", "/api/current/finish", None).await;
        assert!(empty["session"].is_null());

        let uri = "/api/sessions?location=Dhaka&year=2024&month=&from=&to=";
        let history = call_json(&app, "GET", uri, None).await;
        assert_eq!(history["sessions"].as_array().unwrap().len(), 1);
        assert_eq!(history["grand_total"], 4);
        assert_eq!(history["years"], json!([2024]));
    }

    #[tokio::test]
    async fn bad_counter_is_rejected() {
        let app = router(test_state().await);
        let body = json!({"counter": "both", "action": "increment"});
        let (status, _) = call(&app, "POST", "/api/current/counter", Some(body)).await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn delete_and_clear_sessions() {
        let state = test_state().await;
        let id = {
            let mut tally = state.tally.lock().await;
            let now = chrono::Utc::now();
            tally.ledger.merge_or_append("2024-01-01".parse().unwrap(), "Dhaka", 2, now);
            tally.ledger.merge_or_append("2024-01-02".parse().unwrap(), "Dhaka", 3, now).session_id
        };
        let app = router(state);

        let (status, _) = call(&app, "DELETE", &format!("/api/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&app, "DELETE", &format!("/api/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&app, "DELETE", "/api/sessions", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let history = call_json(&app, "GET", "/api/sessions", None).await;
        assert_eq!(history["sessions"], json!([]));
    }

    #[tokio::test]
    async fn location_slots_rename() {
        let app = router(test_state().await);
        let body = json!({"label": "Sylhet"});
        let labels = call_json(&app, "PUT", "/api/locations/2", Some(body)).await;
        assert_eq!(labels[2], "Sylhet");
        assert_eq!(labels.as_array().unwrap().len(), 5);

        let (status, _) = call(&app, "PUT", "/api/locations/9", Some(json!({"label": "x"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn export_lists_filtered_sessions() {
        let state = test_state().await;
        {
            let mut tally = state.tally.lock().await;
            let now = chrono::Utc::now();
            tally.ledger.merge_or_append("2024-01-05".parse().unwrap(), "Dhaka", 8, now);
            tally.ledger.merge_or_append("2024-01-05".parse().unwrap(), "Khulna", 1, now);
        }
        let app = router(state);

        let uri = "/api/export?scope=FILTERED&location=Dhaka&from=&to=";
        let (status, body) = call(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let text = String::from_utf8(body).unwrap();
        assert!(text.contains("1. 05/01/2024 — Dhaka — Total: 8"));
        assert!(!text.contains("Khulna"));
    }

    #[tokio::test]
    async fn shell_is_served_from_cache() {
        let app = router(test_state().await);
        let (status, body) = call(&app, "GET", "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("Patient Tally"));

        let status = call_json(&app, "GET", "/api/assets", None).await;
        assert_eq!(status["version"], "test");
        assert_eq!(status["state"], "active");
        assert_eq!(status["caches"], json!(["patient-tally-test"]));
    }

    #[tokio::test]
    async fn fallback_forwards_request_headers() {
        let origin = spawn_echo_upstream().await;
        let store = Store::in_memory();
        let tally = Tally::load(&store).await;
        let storage = Arc::new(CacheStorage::default());
        let assets = OfflineCache::new("test", storage, Arc::new(HttpFetcher::new(origin)));
        let app = router(AppState::new(store, tally, assets));

        let request = Request::builder()
            .method("POST")
            .uri("/submit")
            .header("content-type", "application/json")
            .header("authorization", "Bearer token-2")
            .body(Body::from("{}"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get("x-upstream").unwrap(), "echo");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let seen = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(seen.contains("content-type=application/json"), "{seen}");
        assert!(seen.contains("authorization=Bearer token-2"), "{seen}");
    }
}
