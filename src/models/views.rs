use crate::models::UserProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Read-optimized projection of a conversation for the requesting user:
/// the other participant's profile, a last-message preview and the number of
/// their messages the requester has not read yet.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationView {
    pub id: Uuid,
    pub user: UserProfile,
    pub last_message: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub unread: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender: UserProfile,
    pub text: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
