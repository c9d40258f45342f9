use crate::directory::UserDirectory;
use crate::error::AppError;
use crate::models::{Conversation, ConversationView, MessageView, UserProfile};
use crate::store::{ConversationStore, MessagingStore};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Orchestration layer over the conversation/message stores and the user
/// directory. Holds no state of its own; safe to share across requests and
/// across instances behind a load balancer.
pub struct ConversationService {
    store: Arc<dyn MessagingStore>,
    users: Arc<dyn UserDirectory>,
}

impl ConversationService {
    pub fn new(store: Arc<dyn MessagingStore>, users: Arc<dyn UserDirectory>) -> Self {
        Self { store, users }
    }

    /// Returns the conversation between `requester_id` and `other_user_id`,
    /// creating it if none exists yet. Losing a create race to a concurrent
    /// caller is resolved by re-fetching the winner's record, so the
    /// operation is idempotent under concurrency.
    pub async fn get_or_create_conversation(
        &self,
        requester_id: Uuid,
        other_user_id: Uuid,
    ) -> Result<ConversationView, AppError> {
        if requester_id == other_user_id {
            return Err(AppError::BadRequest(
                "cannot start a conversation with yourself".into(),
            ));
        }
        if !self.users.exists(other_user_id).await? {
            return Err(AppError::NotFound("user"));
        }

        if let Some(conversation) = self
            .store
            .find_by_participant_pair(requester_id, other_user_id)
            .await?
        {
            return self.conversation_view(&conversation, requester_id).await;
        }

        let conversation =
            match ConversationStore::create(&*self.store, requester_id, other_user_id).await {
                Ok(conversation) => conversation,
                Err(AppError::DuplicateConversation) => {
                    // Lost the insert race; the winner's record is the
                    // conversation both callers must observe.
                    tracing::debug!(%requester_id, %other_user_id, "conversation insert race lost, re-fetching");
                    self.store
                        .find_by_participant_pair(requester_id, other_user_id)
                        .await?
                        .ok_or(AppError::Internal)?
                }
                Err(e) => return Err(e),
            };

        self.conversation_view(&conversation, requester_id).await
    }

    /// Conversations of the requester, most recently active first, each with
    /// the other participant's profile, last-message preview and unread count.
    pub async fn list_conversations(
        &self,
        requester_id: Uuid,
    ) -> Result<Vec<ConversationView>, AppError> {
        let conversations = self.store.list_for_user(requester_id).await?;
        let mut views = Vec::with_capacity(conversations.len());
        for conversation in &conversations {
            views.push(self.conversation_view(conversation, requester_id).await?);
        }
        Ok(views)
    }

    /// Returns the conversation's messages oldest-first with sender profiles
    /// attached. Opening a conversation acknowledges it: every message not
    /// sent by the requester is marked read before the page is built.
    pub async fn list_messages(
        &self,
        requester_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<Vec<MessageView>, AppError> {
        let conversation = self
            .require_participant(requester_id, conversation_id)
            .await?;

        self.store
            .mark_all_read_except_sender(conversation_id, requester_id)
            .await?;

        let messages = self.store.list_by_conversation(conversation_id).await?;

        // Both participants' profiles cover every sender in a 1:1 thread
        let mut profiles: HashMap<Uuid, UserProfile> = HashMap::new();
        for participant in conversation.participants {
            if let Some(profile) = self.users.find(participant).await? {
                profiles.insert(participant, profile);
            }
        }

        messages
            .into_iter()
            .map(|message| {
                let sender = profiles
                    .get(&message.sender_id)
                    .cloned()
                    .ok_or(AppError::NotFound("user"))?;
                Ok(MessageView {
                    id: message.id,
                    conversation_id: message.conversation_id,
                    sender,
                    text: message.text,
                    read: message.read,
                    created_at: message.created_at,
                })
            })
            .collect()
    }

    /// Persists a message and bumps the conversation's preview pointer as one
    /// atomic unit. A failed send leaves no trace; callers may retry.
    pub async fn send_message(
        &self,
        requester_id: Uuid,
        conversation_id: Uuid,
        text: &str,
    ) -> Result<MessageView, AppError> {
        if text.trim().is_empty() {
            return Err(AppError::BadRequest("message text cannot be empty".into()));
        }
        self.require_participant(requester_id, conversation_id)
            .await?;

        let message = self
            .store
            .send_transactional(conversation_id, requester_id, text)
            .await?;

        let sender = self
            .users
            .find(requester_id)
            .await?
            .ok_or(AppError::NotFound("user"))?;

        Ok(MessageView {
            id: message.id,
            conversation_id: message.conversation_id,
            sender,
            text: message.text,
            read: message.read,
            created_at: message.created_at,
        })
    }

    /// Marks every message from the other participant as read. Returns the
    /// number of messages changed; 0 when there was nothing unread.
    pub async fn mark_read(
        &self,
        requester_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<u64, AppError> {
        self.require_participant(requester_id, conversation_id)
            .await?;
        self.store
            .mark_all_read_except_sender(conversation_id, requester_id)
            .await
    }

    /// Membership is checked against the store, never against
    /// client-supplied identifiers.
    async fn require_participant(
        &self,
        requester_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<Conversation, AppError> {
        let conversation = self
            .store
            .find_by_id(conversation_id)
            .await?
            .ok_or(AppError::NotFound("conversation"))?;
        if !conversation.has_participant(requester_id) {
            return Err(AppError::Forbidden);
        }
        Ok(conversation)
    }

    async fn conversation_view(
        &self,
        conversation: &Conversation,
        requester_id: Uuid,
    ) -> Result<ConversationView, AppError> {
        let other_id = conversation
            .other_participant(requester_id)
            .ok_or(AppError::Forbidden)?;
        let user = self
            .users
            .find(other_id)
            .await?
            .ok_or(AppError::NotFound("user"))?;

        // last_message_id is a weak reference; a missing target simply means
        // no preview
        let last_message = match conversation.last_message_id {
            Some(message_id) => self.store.find_message(message_id).await?.map(|m| m.text),
            None => None,
        };

        let unread = self
            .store
            .count_unread(conversation.id, requester_id)
            .await?;

        Ok(ConversationView {
            id: conversation.id,
            user,
            last_message,
            timestamp: conversation.updated_at,
            unread,
        })
    }
}
