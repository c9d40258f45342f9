use crate::directory::UserDirectory;
use crate::error::AppError;
use crate::models::UserProfile;
use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

/// Reads the `users` table owned by the user directory service. Do not write
/// to it from here; accounts are created and maintained elsewhere.
#[derive(Clone)]
pub struct PgUserDirectory {
    db: Pool<Postgres>,
}

impl PgUserDirectory {
    pub fn new(db: Pool<Postgres>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
        let row = sqlx::query("SELECT id, username, profile_picture FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(|r| UserProfile {
            id: r.get("id"),
            username: r.get("username"),
            profile_picture: r.get("profile_picture"),
        }))
    }
}
