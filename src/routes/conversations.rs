use crate::middleware::guards::User;
use crate::models::ConversationView;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct MarkReadResponse {
    pub count: u64,
}

/// GET /api/v1/conversations
/// Conversations of the requester, most recently active first.
pub async fn list_conversations(
    State(state): State<AppState>,
    user: User,
) -> Result<Json<Vec<ConversationView>>, crate::error::AppError> {
    let views = state.service.list_conversations(user.id).await?;
    Ok(Json(views))
}

/// GET /api/v1/conversations/user/{user_id}
/// Returns the conversation with the given user, creating it on first
/// contact. 400 on self-chat, 404 when the user does not exist.
pub async fn get_or_create_conversation(
    State(state): State<AppState>,
    user: User,
    Path(other_user_id): Path<Uuid>,
) -> Result<Json<ConversationView>, crate::error::AppError> {
    let view = state
        .service
        .get_or_create_conversation(user.id, other_user_id)
        .await?;
    Ok(Json(view))
}

/// PUT /api/v1/conversations/{id}/read
/// Marks all messages from the other participant as read.
pub async fn mark_as_read(
    State(state): State<AppState>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<MarkReadResponse>, crate::error::AppError> {
    let count = state.service.mark_read(user.id, id).await?;
    Ok(Json(MarkReadResponse { count }))
}
