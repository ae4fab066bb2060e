use domains::{RepositoryError, ValidationError};
use thiserror::Error;

/// Outcome of a failed service call.
///
/// The `Display` text of the not-found and password variants is the exact
/// message returned to clients.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("no such thread exists")]
    ThreadNotFound,

    #[error("no such comment exists")]
    ReplyNotFound,

    #[error("incorrect password")]
    IncorrectPassword,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] RepositoryError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
