//! In-memory store used by the test suite and for local development without
//! Postgres. Mutations take a single lock, which gives the same atomicity
//! the Postgres implementation gets from transactions.

use crate::error::AppError;
use crate::models::{Conversation, Message};
use crate::store::{canonical_pair, trimmed_text, ConversationStore, MessageStore, MessagingStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    conversations: HashMap<Uuid, Conversation>,
    pair_index: HashMap<(Uuid, Uuid), Uuid>,
    messages: HashMap<Uuid, Vec<Message>>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_next_commit: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `send_transactional` abort after the message insert is
    /// staged but before the conversation is updated. The staged insert is
    /// rolled back, as a failed commit would do.
    pub fn inject_commit_failure(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    pub fn conversation_count(&self) -> usize {
        self.inner.lock().unwrap().conversations.len()
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn find_by_participant_pair(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> Result<Option<Conversation>, AppError> {
        let inner = self.inner.lock().unwrap();
        let id = inner.pair_index.get(&canonical_pair(user_a, user_b));
        Ok(id.and_then(|id| inner.conversations.get(id)).cloned())
    }

    async fn create(&self, user_a: Uuid, user_b: Uuid) -> Result<Conversation, AppError> {
        let (low, high) = canonical_pair(user_a, user_b);
        let mut inner = self.inner.lock().unwrap();
        if inner.pair_index.contains_key(&(low, high)) {
            return Err(AppError::DuplicateConversation);
        }
        let now = Utc::now();
        let conversation = Conversation {
            id: Uuid::new_v4(),
            participants: [low, high],
            last_message_id: None,
            created_at: now,
            updated_at: now,
        };
        inner.pair_index.insert((low, high), conversation.id);
        inner
            .conversations
            .insert(conversation.id, conversation.clone());
        Ok(conversation)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Conversation>, AppError> {
        Ok(self.inner.lock().unwrap().conversations.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Conversation>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut out: Vec<Conversation> = inner
            .conversations
            .values()
            .filter(|c| c.has_participant(user_id))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(out)
    }

    async fn update_last_message(
        &self,
        conversation_id: Uuid,
        message_id: Uuid,
        timestamp: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        let conversation = inner
            .conversations
            .get_mut(&conversation_id)
            .ok_or(AppError::NotFound("conversation"))?;
        conversation.last_message_id = Some(message_id);
        conversation.updated_at = timestamp;
        Ok(())
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn create(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        text: &str,
    ) -> Result<Message, AppError> {
        let text = trimmed_text(text)?;
        let mut inner = self.inner.lock().unwrap();
        if !inner.conversations.contains_key(&conversation_id) {
            return Err(AppError::NotFound("conversation"));
        }
        let message = Message {
            id: Uuid::new_v4(),
            conversation_id,
            sender_id,
            text: text.to_string(),
            read: false,
            created_at: Utc::now(),
        };
        inner
            .messages
            .entry(conversation_id)
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    async fn find_message(&self, id: Uuid) -> Result<Option<Message>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .messages
            .values()
            .flatten()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn list_by_conversation(
        &self,
        conversation_id: Uuid,
    ) -> Result<Vec<Message>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .messages
            .get(&conversation_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn count_unread(
        &self,
        conversation_id: Uuid,
        excluding_sender: Uuid,
    ) -> Result<i64, AppError> {
        let inner = self.inner.lock().unwrap();
        let count = inner
            .messages
            .get(&conversation_id)
            .map(|msgs| {
                msgs.iter()
                    .filter(|m| !m.read && m.sender_id != excluding_sender)
                    .count()
            })
            .unwrap_or(0);
        Ok(count as i64)
    }

    async fn mark_all_read_except_sender(
        &self,
        conversation_id: Uuid,
        excluding_sender: Uuid,
    ) -> Result<u64, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let mut marked = 0u64;
        if let Some(msgs) = inner.messages.get_mut(&conversation_id) {
            for m in msgs.iter_mut() {
                if !m.read && m.sender_id != excluding_sender {
                    m.read = true;
                    marked += 1;
                }
            }
        }
        Ok(marked)
    }
}

#[async_trait]
impl MessagingStore for MemoryStore {
    async fn send_transactional(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        text: &str,
    ) -> Result<Message, AppError> {
        let text = trimmed_text(text)?;
        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;
        let conversation = inner
            .conversations
            .get_mut(&conversation_id)
            .ok_or(AppError::NotFound("conversation"))?;
        let message = Message {
            id: Uuid::new_v4(),
            conversation_id,
            sender_id,
            text: text.to_string(),
            read: false,
            created_at: Utc::now(),
        };
        let staged = inner.messages.entry(conversation_id).or_default();
        staged.push(message.clone());
        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            // roll the staged insert back; the conversation was never touched
            staged.pop();
            return Err(AppError::TransactionAborted("injected failure".into()));
        }
        conversation.last_message_id = Some(message.id);
        conversation.updated_at = message.created_at;
        Ok(message)
    }
}
