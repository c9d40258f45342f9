//! Repository interfaces over the conversation and message collections.
//! The service layer only ever talks to these traits; `PgStore` is the
//! production implementation, `MemoryStore` backs the test suite.

pub mod memory;
pub mod postgres;

use crate::error::AppError;
use crate::models::{Conversation, Message};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Normalizes an unordered participant pair to storage order (low, high).
pub fn canonical_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// The unique conversation for this pair, in either argument order.
    async fn find_by_participant_pair(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> Result<Option<Conversation>, AppError>;

    /// Inserts a new conversation for the pair. Fails with
    /// `DuplicateConversation` if one already exists; the uniqueness check is
    /// a storage constraint, not a prior read, so concurrent creators cannot
    /// both win.
    async fn create(&self, user_a: Uuid, user_b: Uuid) -> Result<Conversation, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Conversation>, AppError>;

    /// All conversations the user participates in, most recently active first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Conversation>, AppError>;

    /// Points `last_message_id` at `message_id` and bumps `updated_at`.
    async fn update_last_message(
        &self,
        conversation_id: Uuid,
        message_id: Uuid,
        timestamp: DateTime<Utc>,
    ) -> Result<(), AppError>;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Inserts a message with `read = false`. The text is trimmed; empty
    /// after trimming fails with `BadRequest`.
    async fn create(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        text: &str,
    ) -> Result<Message, AppError>;

    async fn find_message(&self, id: Uuid) -> Result<Option<Message>, AppError>;

    /// Messages of the conversation, oldest first.
    async fn list_by_conversation(&self, conversation_id: Uuid)
        -> Result<Vec<Message>, AppError>;

    /// Unread messages in the conversation not sent by `excluding_sender`.
    async fn count_unread(
        &self,
        conversation_id: Uuid,
        excluding_sender: Uuid,
    ) -> Result<i64, AppError>;

    /// Marks every unread message not sent by `excluding_sender` as read.
    /// Idempotent; returns the number of rows changed.
    async fn mark_all_read_except_sender(
        &self,
        conversation_id: Uuid,
        excluding_sender: Uuid,
    ) -> Result<u64, AppError>;
}

/// The combined store the service runs against. `send_transactional` commits
/// the message insert together with the conversation's last-message pointer
/// update as a single unit: either both persist or neither does.
#[async_trait]
pub trait MessagingStore: ConversationStore + MessageStore {
    async fn send_transactional(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        text: &str,
    ) -> Result<Message, AppError>;
}

pub(crate) fn trimmed_text(text: &str) -> Result<&str, AppError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("message text cannot be empty".into()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::canonical_pair;
    use uuid::Uuid;

    #[test]
    fn canonical_pair_is_order_independent() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(canonical_pair(a, b), canonical_pair(b, a));
        let (low, high) = canonical_pair(a, b);
        assert!(low <= high);
    }
}
