//! Shared harness for the HTTP test suites.
//!
//! `TestApp` drives the real router, by default against an in-memory store,
//! and keeps a handle on the store so tests can inspect what the API wrote.

use std::sync::Arc;

use api_adapters::{router, AppState};
use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use domains::{Thread, ThreadRepository};
use serde_json::{json, Value};
use services::{ListingLimits, ThreadService};
use storage_adapters::InMemoryThreadRepository;
use tower::ServiceExt;
use uuid::Uuid;

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or_else(|e| panic!("not JSON ({e}): {}", self.body))
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION)?.to_str().ok()
    }
}

pub struct TestApp {
    pub router: Router,
    pub repo: Arc<dyn ThreadRepository>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_limits(ListingLimits::default())
    }

    pub fn with_limits(limits: ListingLimits) -> Self {
        Self::build(Arc::new(InMemoryThreadRepository::new()), limits)
    }

    /// Serves the API over any store, e.g. a mock that fails on demand.
    pub fn with_repository(repo: Arc<dyn ThreadRepository>) -> Self {
        Self::build(repo, ListingLimits::default())
    }

    fn build(repo: Arc<dyn ThreadRepository>, limits: ListingLimits) -> Self {
        let service = ThreadService::with_limits(repo.clone(), limits);
        Self {
            router: router(AppState::new(service)),
            repo,
        }
    }

    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub async fn send_json(&self, method: Method, uri: &str, body: Value) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("valid request");
        self.request(request).await
    }

    pub async fn send_form(&self, method: Method, uri: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .expect("valid request");
        self.request(request).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("valid request");
        self.request(request).await
    }

    /// Creates a thread through the API and returns the echoed record.
    pub async fn create_thread(&self, board: &str, text: &str, password: &str) -> Value {
        let response = self
            .send_json(
                Method::POST,
                &format!("/api/threads/{board}"),
                json!({ "board": board, "text": text, "delete_password": password }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.json()["message"].clone()
    }

    /// Posts a reply through the API and returns the raw response.
    pub async fn post_reply(
        &self,
        board: &str,
        thread_id: &str,
        text: &str,
        password: &str,
    ) -> TestResponse {
        self.send_json(
            Method::POST,
            &format!("/api/replies/{board}"),
            json!({
                "board": board,
                "thread_id": thread_id,
                "text": text,
                "delete_password": password,
            }),
        )
        .await
    }

    /// Reads a thread straight from the store, bypassing projection.
    pub async fn stored(&self, thread_id: &str) -> Option<Thread> {
        let id = Uuid::parse_str(thread_id).ok()?;
        self.repo.find_thread(id).await.expect("store lookup failed")
    }
}

/// The `_id` of an API object as a string.
pub fn id_of(value: &Value) -> String {
    value["_id"]
        .as_str()
        .unwrap_or_else(|| panic!("no _id in {value}"))
        .to_string()
}
