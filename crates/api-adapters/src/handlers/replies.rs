//! Handlers for `/api/replies/{board}`.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::{NewReply, ThreadView};
use services::ServiceError;
use uuid::Uuid;

use crate::error::{ApiError, JsonError};
use crate::extract::JsonOrForm;
use crate::forms::{resolve_board, CreateReplyBody, ReplyActionBody, ThreadQuery};
use crate::metrics::Operation;
use crate::state::AppState;

/// Page the board front end serves a single thread on. The board is
/// percent-encoded so the result is always a valid `Location`.
pub fn thread_page_path(board: &str, thread_id: Uuid) -> String {
    format!("/b/{}/{thread_id}", urlencoding::encode(board))
}

/// POST: appends a reply, bumps the thread and redirects to its page.
pub async fn create_reply(
    State(state): State<AppState>,
    Path(board): Path<String>,
    body: Result<JsonOrForm<CreateReplyBody>, ApiError>,
) -> Result<Response, ApiError> {
    let result = async {
        let JsonOrForm(body) = body?;
        let board = resolve_board(board, body.board);
        let input = NewReply::new(
            body.text.unwrap_or_default(),
            body.delete_password.unwrap_or_default(),
        )
        .map_err(ServiceError::from)?;

        let posted = state
            .service
            .add_reply(body.thread_id.as_deref().unwrap_or_default(), input)
            .await?;
        Ok::<_, ApiError>(thread_page_path(&board, posted.thread_id))
    }
    .await;

    let location = state.observe(Operation::CreateReply, result)?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

/// GET: one thread with all of its replies.
pub async fn view_thread(
    State(state): State<AppState>,
    Path(board): Path<String>,
    query: Result<Query<ThreadQuery>, QueryRejection>,
) -> Result<Json<ThreadView>, JsonError> {
    let result = async {
        let Query(query) = query.map_err(|e| ApiError::Malformed(e.body_text()))?;
        let thread_id = query.thread_id.ok_or(ApiError::MissingQuery("thread_id"))?;
        let view = state.service.view_thread(&board, &thread_id).await?;
        Ok::<_, ApiError>(view)
    }
    .await;

    Ok(Json(state.observe(Operation::ViewThread, result)?))
}

/// DELETE: redacts a reply after a password check.
pub async fn delete_reply(
    State(state): State<AppState>,
    body: Result<JsonOrForm<ReplyActionBody>, ApiError>,
) -> Result<&'static str, ApiError> {
    let result = async {
        let JsonOrForm(body) = body?;
        state
            .service
            .delete_reply(
                body.thread_id.as_deref().unwrap_or_default(),
                body.reply_id.as_deref().unwrap_or_default(),
                body.delete_password.as_deref().unwrap_or_default(),
            )
            .await?;
        Ok::<_, ApiError>("success")
    }
    .await;

    state.observe(Operation::DeleteReply, result)
}

/// PUT: flags a reply. No password is required.
pub async fn report_reply(
    State(state): State<AppState>,
    body: Result<JsonOrForm<ReplyActionBody>, ApiError>,
) -> Result<&'static str, ApiError> {
    let result = async {
        let JsonOrForm(body) = body?;
        state
            .service
            .report_reply(
                body.thread_id.as_deref().unwrap_or_default(),
                body.reply_id.as_deref().unwrap_or_default(),
            )
            .await?;
        Ok::<_, ApiError>("reported")
    }
    .await;

    state.observe(Operation::ReportReply, result)
}
