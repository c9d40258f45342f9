use crate::middleware::error_handling;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error_handling::into_response(self).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("server start failure: {0}")]
    StartServer(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("not found: {0}")]
    NotFound(&'static str),

    /// A concurrent get-or-create won the insert race. Never surfaced to
    /// callers; the service resolves it by re-fetching the winner's record.
    #[error("conversation already exists for this participant pair")]
    DuplicateConversation,

    #[error("transaction aborted: {0}")]
    TransactionAborted(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal server error")]
    Internal,
}

impl AppError {
    /// Returns HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::BadRequest(_) => 400,
            AppError::Unauthorized => 401,
            AppError::Forbidden => 403,
            AppError::NotFound(_) => 404,
            AppError::DuplicateConversation => 409,
            AppError::Unavailable(_) => 503,
            AppError::Config(_)
            | AppError::StartServer(_)
            | AppError::TransactionAborted(_)
            | AppError::Database(_)
            | AppError::Internal => 500,
        }
    }

    /// Retryable errors are safe to re-issue from the client: the send path
    /// guarantees no partial state survives an aborted transaction.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::TransactionAborted(_) | AppError::Unavailable(_) => true,
            AppError::Database(e) => matches!(
                e,
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
            ),
            _ => false,
        }
    }
}
