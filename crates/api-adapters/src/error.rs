//! # ApiError
//!
//! Maps service outcomes onto HTTP responses. Most endpoints answer in plain
//! text; the JSON endpoints wrap the same error in `JsonError`.
//!
//! Not-found and password outcomes are ordinary answers: they keep status 200
//! on the text endpoints and carry the exact message clients match on.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use services::ServiceError;
use thiserror::Error;

use crate::metrics::Outcome;

const INTERNAL_MESSAGE: &str = "internal server error";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("unsupported content type: expected application/json or application/x-www-form-urlencoded")]
    UnsupportedMediaType,

    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("missing query parameter: {0}")]
    MissingQuery(&'static str),
}

impl ApiError {
    pub fn outcome(&self) -> Outcome {
        match self {
            Self::Service(ServiceError::ThreadNotFound | ServiceError::ReplyNotFound) => {
                Outcome::NotFound
            }
            Self::Service(ServiceError::IncorrectPassword) => Outcome::Unauthorized,
            Self::Service(ServiceError::Store(_)) => Outcome::StoreFailure,
            Self::Service(ServiceError::Validation(_))
            | Self::UnsupportedMediaType
            | Self::Malformed(_)
            | Self::MissingQuery(_) => Outcome::Invalid,
        }
    }

    /// Status and client-facing message. Store failures are logged here and
    /// never leak their details.
    fn parts(&self, not_found: StatusCode) -> (StatusCode, String) {
        match self {
            Self::Service(ServiceError::ThreadNotFound | ServiceError::ReplyNotFound) => {
                (not_found, self.to_string())
            }
            Self::Service(ServiceError::IncorrectPassword) => (StatusCode::OK, self.to_string()),
            Self::Service(ServiceError::Store(e)) => {
                tracing::error!(error = %e, "store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
            }
            Self::Service(ServiceError::Validation(_))
            | Self::Malformed(_)
            | Self::MissingQuery(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::UnsupportedMediaType => (StatusCode::UNSUPPORTED_MEDIA_TYPE, self.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.parts(StatusCode::OK).into_response()
    }
}

/// `ApiError` rendered as `{"error": "..."}`, with 404 for missing threads.
#[derive(Debug)]
pub struct JsonError(pub ApiError);

impl From<ApiError> for JsonError {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

impl From<ServiceError> for JsonError {
    fn from(e: ServiceError) -> Self {
        Self(ApiError::Service(e))
    }
}

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        let (status, message) = self.0.parts(StatusCode::NOT_FOUND);
        (status, Json(json!({ "error": message }))).into_response()
    }
}
