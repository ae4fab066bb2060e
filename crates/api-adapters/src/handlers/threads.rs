//! Handlers for `/api/threads/{board}`.

use axum::extract::{Path, State};
use axum::Json;
use domains::{NewThread, Thread, ThreadSummary};
use serde::Serialize;
use services::ServiceError;

use crate::error::{ApiError, JsonError};
use crate::extract::JsonOrForm;
use crate::forms::{resolve_board, CreateThreadBody, ThreadActionBody};
use crate::metrics::Operation;
use crate::state::AppState;

/// Answer to a report that matched nothing or could not be stored.
pub const REPORT_HINT: &str = "Error: please double check thread-id";

#[derive(Debug, Serialize)]
pub struct CreatedThread {
    pub message: Thread,
}

/// POST: creates a thread and echoes the stored record.
pub async fn create_thread(
    State(state): State<AppState>,
    Path(board): Path<String>,
    body: Result<JsonOrForm<CreateThreadBody>, ApiError>,
) -> Result<Json<CreatedThread>, JsonError> {
    let result = async {
        let JsonOrForm(body) = body?;
        let input = NewThread::new(
            resolve_board(board, body.board),
            body.text.unwrap_or_default(),
            body.delete_password.unwrap_or_default(),
        )
        .map_err(ServiceError::from)?;
        let thread = state.service.create_thread(input).await?;
        Ok::<_, ApiError>(thread)
    }
    .await;

    let thread = state.observe(Operation::CreateThread, result)?;
    Ok(Json(CreatedThread { message: thread }))
}

/// GET: the most recently bumped threads with a reply preview.
pub async fn list_threads(
    State(state): State<AppState>,
    Path(board): Path<String>,
) -> Result<Json<Vec<ThreadSummary>>, JsonError> {
    let result = state.service.list_board(&board).await.map_err(ApiError::from);
    Ok(Json(state.observe(Operation::ListThreads, result)?))
}

/// DELETE: removes a thread after a password check. The board is not
/// checked against the thread.
pub async fn delete_thread(
    State(state): State<AppState>,
    body: Result<JsonOrForm<ThreadActionBody>, ApiError>,
) -> Result<&'static str, ApiError> {
    let result = async {
        let JsonOrForm(body) = body?;
        state
            .service
            .delete_thread(
                body.thread_id.as_deref().unwrap_or_default(),
                body.delete_password.as_deref().unwrap_or_default(),
            )
            .await?;
        Ok::<_, ApiError>("success")
    }
    .await;

    state.observe(Operation::DeleteThread, result)
}

/// PUT: flags a thread. No password is required.
pub async fn report_thread(
    State(state): State<AppState>,
    body: Result<JsonOrForm<ThreadActionBody>, ApiError>,
) -> Result<&'static str, ApiError> {
    let result = async {
        let JsonOrForm(body) = body?;
        state
            .service
            .report_thread(body.thread_id.as_deref().unwrap_or_default())
            .await?;
        Ok::<_, ApiError>("reported")
    }
    .await;

    match state.observe(Operation::ReportThread, result) {
        Err(ApiError::Service(ServiceError::ThreadNotFound)) => Ok(REPORT_HINT),
        Err(ApiError::Service(ServiceError::Store(e))) => {
            tracing::error!(error = %e, "thread report failed");
            Ok(REPORT_HINT)
        }
        other => other,
    }
}
