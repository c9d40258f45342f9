use crate::error::AppError;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Machine-readable error body returned for every failure.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    pub status: u16,
    pub code: String,
}

/// Map domain errors to HTTP responses
pub fn map_error(err: &AppError) -> (StatusCode, ErrorBody) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let code = match err {
        AppError::BadRequest(_) => "INVALID_ARGUMENT",
        AppError::Unauthorized => "UNAUTHORIZED",
        AppError::Forbidden => "FORBIDDEN",
        AppError::NotFound(_) => "NOT_FOUND",
        // resolved inside the service; kept here so an escaped one is still
        // a well-formed response
        AppError::DuplicateConversation => "DUPLICATE_CONVERSATION",
        AppError::TransactionAborted(_) => "TRANSACTION_ABORTED",
        AppError::Unavailable(_) => "UNAVAILABLE",
        AppError::Config(_)
        | AppError::StartServer(_)
        | AppError::Database(_)
        | AppError::Internal => "INTERNAL_ERROR",
    };

    let body = ErrorBody {
        error: status
            .canonical_reason()
            .unwrap_or("Error")
            .to_string(),
        message: err.to_string(),
        status: status.as_u16(),
        code: code.to_string(),
    };

    (status, body)
}

pub fn into_response(err: AppError) -> impl IntoResponse {
    if err.status_code() >= 500 {
        tracing::error!(error = %err, "request failed");
    }
    let (status, body) = map_error(&err);
    (status, Json(body))
}
