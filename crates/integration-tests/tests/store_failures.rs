use std::sync::Arc;

use axum::http::{Method, StatusCode};
use domains::{MockThreadRepository, RepositoryError};
use integration_tests::TestApp;
use serde_json::json;
use uuid::Uuid;

fn unavailable() -> RepositoryError {
    RepositoryError::Unavailable("pool timed out".into())
}

fn failing_store() -> TestApp {
    let mut repo = MockThreadRepository::new();
    repo.expect_insert_thread().returning(|_, _| Err(unavailable()));
    repo.expect_recent_threads().returning(|_, _| Err(unavailable()));
    repo.expect_find_thread().returning(|_| Err(unavailable()));
    repo.expect_find_thread_on_board().returning(|_, _| Err(unavailable()));
    repo.expect_report_thread().returning(|_| Err(unavailable()));
    repo.expect_append_reply().returning(|_, _, _| Err(unavailable()));
    TestApp::with_repository(Arc::new(repo))
}

#[tokio::test]
async fn thread_report_answers_with_hint() {
    let app = failing_store();
    let response = app
        .send_json(
            Method::PUT,
            "/api/threads/test",
            json!({ "board": "test", "thread_id": Uuid::new_v4() }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "Error: please double check thread-id");
}

#[tokio::test]
async fn text_endpoints_answer_generic_500() {
    let app = failing_store();
    let thread_id = Uuid::new_v4();

    let responses = [
        app.send_json(
            Method::DELETE,
            "/api/threads/test",
            json!({ "thread_id": thread_id, "delete_password": "pw" }),
        )
        .await,
        app.send_json(
            Method::DELETE,
            "/api/replies/test",
            json!({ "thread_id": thread_id, "reply_id": Uuid::new_v4(), "delete_password": "pw" }),
        )
        .await,
        app.send_json(
            Method::PUT,
            "/api/replies/test",
            json!({ "thread_id": thread_id, "reply_id": Uuid::new_v4() }),
        )
        .await,
        app.post_reply("test", &thread_id.to_string(), "r1", "rp").await,
    ];

    for response in responses {
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body, "internal server error");
        assert!(response.location().is_none());
    }
}

#[tokio::test]
async fn json_endpoints_answer_500_with_error_body() {
    let app = failing_store();

    let create = app
        .send_json(
            Method::POST,
            "/api/threads/test",
            json!({ "text": "hello", "delete_password": "pw" }),
        )
        .await;
    let list = app.get("/api/threads/test").await;
    let view = app
        .get(&format!("/api/replies/test?thread_id={}", Uuid::new_v4()))
        .await;

    for response in [create, list, view] {
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.json(), json!({ "error": "internal server error" }));
    }
}
