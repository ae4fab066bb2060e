//! # api-adapters
//!
//! The web routing layer for the message board.

pub mod forms;
pub mod metrics;

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod middleware;
#[cfg(feature = "web-axum")]
pub mod state;

#[cfg(feature = "web-axum")]
pub use error::{ApiError, JsonError};
#[cfg(feature = "web-axum")]
pub use state::AppState;

/// Builds the router with every board route and the standard middleware.
///
/// Layers run outermost first: request id, trace, id propagation,
/// compression, CORS.
#[cfg(feature = "web-axum")]
pub fn router(state: AppState) -> axum::Router {
    use axum::routing::get;
    use handlers::{replies, system, threads};

    axum::Router::new()
        .route(
            "/api/threads/{board}",
            get(threads::list_threads)
                .post(threads::create_thread)
                .put(threads::report_thread)
                .delete(threads::delete_thread),
        )
        .route(
            "/api/replies/{board}",
            get(replies::view_thread)
                .post(replies::create_reply)
                .put(replies::report_reply)
                .delete(replies::delete_reply),
        )
        .route("/health", get(system::health))
        .route("/metrics", get(system::metrics))
        .layer(middleware::cors_policy())
        .layer(middleware::compression())
        .layer(middleware::propagate_request_id())
        .layer(middleware::trace_layer())
        .layer(middleware::set_request_id())
        .with_state(state)
}
