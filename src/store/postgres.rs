use crate::error::AppError;
use crate::models::{Conversation, Message};
use crate::store::{canonical_pair, trimmed_text, ConversationStore, MessageStore, MessagingStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct PgStore {
    db: Pool<Postgres>,
}

impl PgStore {
    pub fn new(db: Pool<Postgres>) -> Self {
        Self { db }
    }
}

fn conversation_from_row(row: &PgRow) -> Conversation {
    Conversation {
        id: row.get("id"),
        participants: [row.get("participant_low"), row.get("participant_high")],
        last_message_id: row.get("last_message_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn message_from_row(row: &PgRow) -> Message {
    Message {
        id: row.get("id"),
        conversation_id: row.get("conversation_id"),
        sender_id: row.get("sender_id"),
        text: row.get("text"),
        read: row.get("read"),
        created_at: row.get("created_at"),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation)
    )
}

const CONVERSATION_COLS: &str =
    "id, participant_low, participant_high, last_message_id, created_at, updated_at";

#[async_trait]
impl ConversationStore for PgStore {
    async fn find_by_participant_pair(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> Result<Option<Conversation>, AppError> {
        let (low, high) = canonical_pair(user_a, user_b);
        let row = sqlx::query(&format!(
            "SELECT {CONVERSATION_COLS} FROM conversations \
             WHERE participant_low = $1 AND participant_high = $2"
        ))
        .bind(low)
        .bind(high)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.as_ref().map(conversation_from_row))
    }

    async fn create(&self, user_a: Uuid, user_b: Uuid) -> Result<Conversation, AppError> {
        let (low, high) = canonical_pair(user_a, user_b);
        let id = Uuid::new_v4();
        let row = sqlx::query(&format!(
            "INSERT INTO conversations (id, participant_low, participant_high) \
             VALUES ($1, $2, $3) \
             RETURNING {CONVERSATION_COLS}"
        ))
        .bind(id)
        .bind(low)
        .bind(high)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::DuplicateConversation
            } else {
                AppError::Database(e)
            }
        })?;
        Ok(conversation_from_row(&row))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Conversation>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {CONVERSATION_COLS} FROM conversations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.as_ref().map(conversation_from_row))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Conversation>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {CONVERSATION_COLS} FROM conversations \
             WHERE participant_low = $1 OR participant_high = $1 \
             ORDER BY updated_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.iter().map(conversation_from_row).collect())
    }

    async fn update_last_message(
        &self,
        conversation_id: Uuid,
        message_id: Uuid,
        timestamp: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE conversations SET last_message_id = $1, updated_at = $2 WHERE id = $3",
        )
        .bind(message_id)
        .bind(timestamp)
        .bind(conversation_id)
        .execute(&self.db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("conversation"));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageStore for PgStore {
    async fn create(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        text: &str,
    ) -> Result<Message, AppError> {
        let text = trimmed_text(text)?;
        let row = sqlx::query(
            "INSERT INTO messages (id, conversation_id, sender_id, text) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, conversation_id, sender_id, text, read, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(conversation_id)
        .bind(sender_id)
        .bind(text)
        .fetch_one(&self.db)
        .await?;
        Ok(message_from_row(&row))
    }

    async fn find_message(&self, id: Uuid) -> Result<Option<Message>, AppError> {
        let row = sqlx::query(
            "SELECT id, conversation_id, sender_id, text, read, created_at \
             FROM messages WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.as_ref().map(message_from_row))
    }

    async fn list_by_conversation(
        &self,
        conversation_id: Uuid,
    ) -> Result<Vec<Message>, AppError> {
        let rows = sqlx::query(
            "SELECT id, conversation_id, sender_id, text, read, created_at \
             FROM messages WHERE conversation_id = $1 \
             ORDER BY created_at ASC",
        )
        .bind(conversation_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.iter().map(message_from_row).collect())
    }

    async fn count_unread(
        &self,
        conversation_id: Uuid,
        excluding_sender: Uuid,
    ) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages \
             WHERE conversation_id = $1 AND read = FALSE AND sender_id <> $2",
        )
        .bind(conversation_id)
        .bind(excluding_sender)
        .fetch_one(&self.db)
        .await?;
        Ok(count)
    }

    async fn mark_all_read_except_sender(
        &self,
        conversation_id: Uuid,
        excluding_sender: Uuid,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE messages SET read = TRUE \
             WHERE conversation_id = $1 AND read = FALSE AND sender_id <> $2",
        )
        .bind(conversation_id)
        .bind(excluding_sender)
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl MessagingStore for PgStore {
    async fn send_transactional(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        text: &str,
    ) -> Result<Message, AppError> {
        let text = trimmed_text(text)?;
        let mut tx = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::TransactionAborted(format!("begin: {e}")))?;

        let row = sqlx::query(
            "INSERT INTO messages (id, conversation_id, sender_id, text) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, conversation_id, sender_id, text, read, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(conversation_id)
        .bind(sender_id)
        .bind(text)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::TransactionAborted(format!("insert message: {e}")))?;
        let message = message_from_row(&row);

        let updated = sqlx::query(
            "UPDATE conversations SET last_message_id = $1, updated_at = $2 WHERE id = $3",
        )
        .bind(message.id)
        .bind(message.created_at)
        .bind(conversation_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::TransactionAborted(format!("update conversation: {e}")))?;
        if updated.rows_affected() == 0 {
            // Dropping tx rolls the insert back
            return Err(AppError::NotFound("conversation"));
        }

        tx.commit()
            .await
            .map_err(|e| AppError::TransactionAborted(format!("commit: {e}")))?;

        Ok(message)
    }
}
