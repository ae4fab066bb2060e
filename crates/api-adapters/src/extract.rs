//! Custom Axum extractors

use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Deserializes a body sent either as JSON or as an urlencoded HTML form.
pub struct JsonOrForm<T>(pub T);

enum BodyKind {
    Json,
    Form,
}

fn body_kind(req: &Request) -> Option<BodyKind> {
    let mime: mime::Mime = req
        .headers()
        .get(CONTENT_TYPE)?
        .to_str()
        .ok()?
        .parse()
        .ok()?;

    if mime.type_() != mime::APPLICATION {
        return None;
    }
    if mime.subtype() == mime::JSON || mime.suffix() == Some(mime::JSON) {
        Some(BodyKind::Json)
    } else if mime.subtype() == mime::WWW_FORM_URLENCODED {
        Some(BodyKind::Form)
    } else {
        None
    }
}

impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match body_kind(&req) {
            Some(BodyKind::Json) => {
                let Json(value) = Json::<T>::from_request(req, state)
                    .await
                    .map_err(|e| ApiError::Malformed(e.body_text()))?;
                Ok(Self(value))
            }
            Some(BodyKind::Form) => {
                let Form(value) = Form::<T>::from_request(req, state)
                    .await
                    .map_err(|e| ApiError::Malformed(e.body_text()))?;
                Ok(Self(value))
            }
            None => Err(ApiError::UnsupportedMediaType),
        }
    }
}
