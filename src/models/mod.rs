pub mod conversation;
pub mod message;
pub mod views;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub use conversation::Conversation;
pub use message::Message;
pub use views::{ConversationView, MessageView};

/// Public profile fields resolved from the user directory.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub profile_picture: Option<String>,
}
