//! Lookup interface over the externally-owned user directory. The directory
//! service owns credentials and profile data; this service only resolves
//! existence and public profile fields.

pub mod memory;
pub mod postgres;

use crate::error::AppError;
use crate::models::UserProfile;
use async_trait::async_trait;
use uuid::Uuid;

pub use memory::MemoryDirectory;
pub use postgres::PgUserDirectory;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError>;

    async fn exists(&self, user_id: Uuid) -> Result<bool, AppError> {
        Ok(self.find(user_id).await?.is_some())
    }
}
