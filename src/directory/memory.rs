use crate::directory::UserDirectory;
use crate::error::AppError;
use crate::models::UserProfile;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Fixed set of users for tests and local development.
#[derive(Default)]
pub struct MemoryDirectory {
    users: Mutex<HashMap<Uuid, UserProfile>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, profile: UserProfile) {
        self.users.lock().unwrap().insert(profile.id, profile);
    }

    /// Registers a user with a fresh id and returns it.
    pub fn add_user(&self, username: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.insert(UserProfile {
            id,
            username: username.to_string(),
            profile_picture: None,
        });
        id
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn find(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
        Ok(self.users.lock().unwrap().get(&user_id).cloned())
    }
}
