use crate::middleware::guards::User;
use crate::models::MessageView;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub text: String,
}

/// GET /api/v1/conversations/{id}/messages
/// Returns the full history oldest-first. Side effect: opening the
/// conversation marks the other participant's messages as read.
pub async fn get_messages(
    State(state): State<AppState>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<MessageView>>, crate::error::AppError> {
    let messages = state.service.list_messages(user.id, id).await?;
    Ok(Json(messages))
}

/// POST /api/v1/conversations/{id}/messages
/// Sends a message. 400 on empty text, 403 when the requester is not a
/// participant.
pub async fn send_message(
    State(state): State<AppState>,
    user: User,
    Path(id): Path<Uuid>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageView>), crate::error::AppError> {
    let view = state.service.send_message(user.id, id, &body.text).await?;
    Ok((StatusCode::CREATED, Json(view)))
}
