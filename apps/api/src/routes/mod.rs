pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::quiz::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interview API
        .route("/api/v1/interview/domains", get(handlers::handle_list_domains))
        .route(
            "/api/v1/interview/sessions",
            post(handlers::handle_create_session),
        )
        .route(
            "/api/v1/interview/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_end_session),
        )
        .route(
            "/api/v1/interview/sessions/:id/domain",
            post(handlers::handle_select_domain),
        )
        .route(
            "/api/v1/interview/sessions/:id/start",
            post(handlers::handle_start_test),
        )
        .route(
            "/api/v1/interview/sessions/:id/answer",
            post(handlers::handle_select_answer),
        )
        .route(
            "/api/v1/interview/sessions/:id/answer/cancel",
            post(handlers::handle_cancel_confirmation),
        )
        .route(
            "/api/v1/interview/sessions/:id/warning/ack",
            post(handlers::handle_acknowledge_warning),
        )
        .route(
            "/api/v1/interview/sessions/:id/confirm",
            post(handlers::handle_confirm_answer),
        )
        .route(
            "/api/v1/interview/sessions/:id/next",
            post(handlers::handle_next_question),
        )
        .route(
            "/api/v1/interview/sessions/:id/explanation",
            post(handlers::handle_request_explanation),
        )
        .route(
            "/api/v1/interview/sessions/:id/retry",
            post(handlers::handle_retry),
        )
        .route(
            "/api/v1/interview/sessions/:id/events",
            post(handlers::handle_environment_event),
        )
        .route("/api/v1/interview/history", get(handlers::handle_history))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::quiz::service::tests::{service_with, MockExplainer, MockGenerator, MockStore};
    use crate::quiz::session::tests::question_set;

    fn app(generator: MockGenerator) -> Router {
        let quiz = service_with(generator, MockExplainer::default(), Arc::new(MockStore::default()));
        build_router(AppState { quiz })
    }

    fn working_app() -> Router {
        app(MockGenerator {
            questions: question_set(),
            ..Default::default()
        })
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create_session(app: &Router) -> String {
        let (status, body) = send(app, "POST", "/api/v1/interview/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        body["session"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&working_app(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_domain_catalog() {
        let (status, body) = send(&working_app(), "GET", "/api/v1/interview/domains", None).await;
        assert_eq!(status, StatusCode::OK);
        let domains = body.as_array().unwrap();
        assert_eq!(domains.len(), 5);
        assert_eq!(domains[0]["domain"], "frontend");
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_hides_correct_answer() {
        let app = working_app();
        let id = create_session(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/interview/sessions/{id}/domain"),
            Some(json!({"domain": "data-science"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session"]["domain_label"], "Data Scientist");

        let (status, body) =
            send(&app, "POST", &format!("/api/v1/interview/sessions/{id}/start"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session"]["phase"], "testing");
        assert_eq!(body["session"]["navigation_guard"], true);
        assert_eq!(body["notices"][0]["kind"], "test_started");
        assert!(body["session"]["question"].get("correct_answer").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_answer_index_out_of_range_is_bad_request() {
        let app = working_app();
        let id = create_session(&app).await;
        send(
            &app,
            "POST",
            &format!("/api/v1/interview/sessions/{id}/domain"),
            Some(json!({"domain": "backend"})),
        )
        .await;
        send(&app, "POST", &format!("/api/v1/interview/sessions/{id}/start"), None).await;

        let uri = format!("/api/v1/interview/sessions/{id}/answer");
        for index in [-1, 4] {
            let (status, body) = send(&app, "POST", &uri, Some(json!({ "index": index }))).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "index {index}");
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_session_is_evicted() {
        let quiz = service_with(
            MockGenerator {
                questions: question_set(),
                ..Default::default()
            },
            MockExplainer::default(),
            Arc::new(MockStore::default()),
        );
        let app = build_router(AppState { quiz: quiz.clone() });
        let id = create_session(&app).await;
        let uri = format!("/api/v1/interview/sessions/{id}");

        let ttl = std::time::Duration::from_secs(30 * 60);
        tokio::time::advance(ttl).await;
        assert_eq!(quiz.evict_idle(ttl).await, 1);

        let (status, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_operation_is_conflict() {
        let app = working_app();
        let id = create_session(&app).await;
        let (status, body) =
            send(&app, "POST", &format!("/api/v1/interview/sessions/{id}/confirm"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "INVALID_OPERATION");
    }

    #[tokio::test]
    async fn test_unknown_domain_is_bad_request() {
        let app = working_app();
        let id = create_session(&app).await;
        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/interview/sessions/{id}/domain"),
            Some(json!({"domain": "astrology"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let (status, body) = send(
            &working_app(),
            "GET",
            &format!("/api/v1/interview/sessions/{}", Uuid::new_v4()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_generation_failure_is_bad_gateway() {
        let app = app(MockGenerator {
            fail: true,
            ..Default::default()
        });
        let id = create_session(&app).await;
        send(
            &app,
            "POST",
            &format!("/api/v1/interview/sessions/{id}/domain"),
            Some(json!({"domain": "backend"})),
        )
        .await;
        let (status, body) =
            send(&app, "POST", &format!("/api/v1/interview/sessions/{id}/start"), None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "GENERATION_FAILED");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unload_event_is_blocked_while_testing() {
        let app = working_app();
        let id = create_session(&app).await;
        let events = format!("/api/v1/interview/sessions/{id}/events");

        let (_, idle) = send(&app, "POST", &events, Some(json!({"event": "unload"}))).await;
        assert!(idle.get("blocked").is_none());

        send(
            &app,
            "POST",
            &format!("/api/v1/interview/sessions/{id}/domain"),
            Some(json!({"domain": "frontend"})),
        )
        .await;
        send(&app, "POST", &format!("/api/v1/interview/sessions/{id}/start"), None).await;

        let (status, body) = send(&app, "POST", &events, Some(json!({"event": "unload"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["blocked"], true);
        assert_eq!(body["notices"][0]["kind"], "leave_confirmation");
    }

    #[tokio::test]
    async fn test_delete_session() {
        let app = working_app();
        let id = create_session(&app).await;
        let uri = format!("/api/v1/interview/sessions/{id}");
        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_history_requires_user_id() {
        let app = working_app();
        let (status, _) = send(&app, "GET", "/api/v1/interview/history", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            "GET",
            &format!("/api/v1/interview/history?user_id={}", Uuid::new_v4()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }
}
