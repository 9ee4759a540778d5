use flashcard_core::{Credentials, DomainError};
use uuid::Uuid;

use super::Database;
use crate::error::Result;
use crate::models::*;

impl Database {
    // === User Repository ===

    /// Create a user; the username must be free
    pub async fn create_user(&self, credentials: &Credentials, password_hash: &str) -> Result<DbUser> {
        let mut tx = self.pool.begin().await?;

        let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(&credentials.username)
            .fetch_one(&mut *tx)
            .await?;
        if taken {
            return Err(DomainError::UsernameTaken.into());
        }

        let user = sqlx::query_as::<_, DbUser>(
            r#"
            INSERT INTO users (id, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, is_admin, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&credentials.username)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user)
    }

    /// Get user by id
    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<DbUser>> {
        let user = sqlx::query_as::<_, DbUser>(
            r#"
            SELECT id, username, password_hash, is_admin, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Get user by username
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<DbUser>> {
        let user = sqlx::query_as::<_, DbUser>(
            r#"
            SELECT id, username, password_hash, is_admin, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Profile with the user's flashcards and tags
    pub async fn get_user_profile(&self, user_id: Uuid) -> Result<Option<UserResponse>> {
        let Some(user) = self.get_user(user_id).await? else {
            return Ok(None);
        };

        let flashcards = sqlx::query_as::<_, DbFlashcard>(
            r#"
            SELECT id, question, answer, user_id, created_at, updated_at
            FROM flashcards
            WHERE user_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let tags = self.list_tags(user_id).await?;

        Ok(Some(UserResponse {
            id: user.id,
            username: user.username,
            is_admin: user.is_admin,
            created_at: user.created_at,
            flashcards: flashcards.iter().map(DbFlashcard::to_plain).collect(),
            tags,
        }))
    }

    /// Delete a user; flashcards, tags and links go with it
    pub async fn delete_user(&self, user_id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
