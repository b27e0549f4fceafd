//! Route table

use axum::{
    routing::{delete, get},
    Router,
};

use crate::{handlers, health, state::AppState};

/// Build the application router
///
/// | Method | Path          | Handler                      |
/// |--------|---------------|------------------------------|
/// | GET    | `/goals`      | [`handlers::list_goals`]     |
/// | POST   | `/goals`      | [`handlers::create_goal`]    |
/// | DELETE | `/goals/{id}` | [`handlers::delete_goal`]    |
/// | GET    | `/health`     | [`health::health`]           |
/// | GET    | `/ready`      | [`health::readiness`]        |
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/goals",
            get(handlers::list_goals).post(handlers::create_goal),
        )
        .route("/goals/{id}", delete(handlers::delete_goal))
        .route("/health", get(health::health))
        .route("/ready", get(health::readiness))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{Config, StoreConfig},
        store::{create_client, resolve, StoreHandle},
    };
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    async fn mem_store() -> StoreHandle {
        let config = StoreConfig {
            url: Some("mem://".to_string()),
            ..StoreConfig::default()
        };
        let connection = resolve(&config).unwrap();
        StoreHandle::connected(create_client(&connection, &config).await.unwrap())
    }

    fn app(store: StoreHandle) -> Router {
        router(AppState::new(Config::default(), store))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response: Response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get_goals() -> Request<Body> {
        Request::builder().uri("/goals").body(Body::empty()).unwrap()
    }

    fn post_goal(body: Value) -> Request<Body> {
        post_raw(&body.to_string())
    }

    fn post_raw(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/goals")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn delete_goal(id: &str) -> Request<Body> {
        Request::builder()
            .method(Method::DELETE)
            .uri(format!("/goals/{}", id))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_goal_lifecycle() {
        let app = app(mem_store().await);

        let (status, body) = send(&app, get_goals()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "goals": [] }));

        let (status, body) = send(&app, post_goal(json!({ "text": "Learn Node" }))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Goal saved");
        assert_eq!(body["goal"]["text"], "Learn Node");
        let id = body["goal"]["id"].as_str().unwrap().to_string();
        assert!(!id.is_empty());

        let (status, body) = send(&app, get_goals()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "goals": [{ "id": id, "text": "Learn Node" }] }));

        let (status, body) = send(&app, delete_goal(&id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Deleted goal!" }));

        let (_, body) = send(&app, get_goals()).await;
        assert_eq!(body, json!({ "goals": [] }));
    }

    #[tokio::test]
    async fn test_created_goal_has_location() {
        let app = app(mem_store().await);

        let response = app
            .oneshot(post_goal(json!({ "text": "Learn Rust" })))
            .await
            .unwrap();
        let location = response.headers()[header::LOCATION].to_str().unwrap().to_string();
        assert!(location.starts_with("/goals/"));
    }

    #[tokio::test]
    async fn test_text_is_stored_untrimmed() {
        let app = app(mem_store().await);

        let (_, body) = send(&app, post_goal(json!({ "text": "  padded  " }))).await;
        assert_eq!(body["goal"]["text"], "  padded  ");
    }

    #[tokio::test]
    async fn test_invalid_goal_text_is_rejected() {
        let app = app(mem_store().await);
        send(&app, post_goal(json!({ "text": "keep me" }))).await;

        let rejected = [
            post_goal(json!({})),
            post_goal(json!({ "text": "" })),
            post_goal(json!({ "text": "   " })),
            post_goal(json!({ "text": null })),
            post_goal(json!({ "text": 42 })),
            post_raw("not json"),
        ];
        for request in rejected {
            let (status, body) = send(&app, request).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(body, json!({ "message": "Invalid goal text." }));
        }

        let (_, body) = send(&app, get_goals()).await;
        assert_eq!(body["goals"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_content_type_is_rejected() {
        let app = app(mem_store().await);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/goals")
            .body(Body::from(r#"{"text":"Learn Node"}"#))
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body, json!({ "message": "Invalid goal text." }));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let app = app(mem_store().await);
        let (_, body) = send(&app, post_goal(json!({ "text": "once" }))).await;
        let id = body["goal"]["id"].as_str().unwrap().to_string();

        for _ in 0..2 {
            let (status, body) = send(&app, delete_goal(&id)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!({ "message": "Deleted goal!" }));
        }

        let (status, _) = send(&app, delete_goal("never-existed")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_degraded_mode_fails_with_fixed_messages() {
        let app = app(StoreHandle::disconnected());

        let (status, body) = send(&app, get_goals()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "message": "Failed to load goals." }));

        let (status, body) = send(&app, post_goal(json!({ "text": "Learn Node" }))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "message": "Failed to save goal." }));

        let (status, body) = send(&app, delete_goal("abc")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "message": "Failed to delete goal." }));
    }

    #[tokio::test]
    async fn test_unreachable_store_serves_failures_immediately() {
        // Nothing listens on port 1
        let mut config = Config::default();
        config.store.url = Some("ws://127.0.0.1:1".to_string());
        let app = router(AppState::builder().config(config).build());

        let requests = [
            (get_goals(), "Failed to load goals."),
            (post_goal(json!({ "text": "Learn Node" })), "Failed to save goal."),
            (delete_goal("abc"), "Failed to delete goal."),
        ];
        for (request, message) in requests {
            let (status, body) = tokio::time::timeout(Duration::from_secs(1), send(&app, request))
                .await
                .expect("request waited on the store connection");
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, json!({ "message": message }));
        }

        // Still degraded once the connection attempt has given up
        tokio::time::sleep(Duration::from_millis(200)).await;
        let (status, body) = send(&app, get_goals()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "message": "Failed to load goals." }));

        let ready = Request::builder().uri("/ready").body(Body::empty()).unwrap();
        let (status, body) = send(&app, ready).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["ready"], false);
    }

    #[tokio::test]
    async fn test_validation_runs_before_store_in_degraded_mode() {
        let app = app(StoreHandle::disconnected());

        let (status, body) = send(&app, post_goal(json!({ "text": " " }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body, json!({ "message": "Invalid goal text." }));
    }

    #[tokio::test]
    async fn test_health_always_ok() {
        let app = app(StoreHandle::disconnected());
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "goals-service");
    }

    #[tokio::test]
    async fn test_readiness_reflects_store() {
        let ready = || Request::builder().uri("/ready").body(Body::empty()).unwrap();

        let (status, body) = send(&app(mem_store().await), ready()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ready"], true);
        assert_eq!(body["dependencies"]["store"]["healthy"], true);

        let (status, body) = send(&app(StoreHandle::disconnected()), ready()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["dependencies"]["store"]["message"], "Not configured");

        let store = mem_store().await;
        store.close().await;
        let (status, body) = send(&app(store), ready()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["ready"], false);
        assert_eq!(body["dependencies"]["store"]["healthy"], false);
    }
}
