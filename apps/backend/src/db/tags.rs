use flashcard_core::{
    ensure_can_link, ensure_can_unlink, ensure_deletable, ensure_owner, DomainError, ResourceKind,
};
use sqlx::PgConnection;
use uuid::Uuid;

use super::flashcards::{owned_flashcard, tags_for_flashcards};
use super::Database;
use crate::error::{ApiError, Result};
use crate::models::*;

async fn owned_tag(conn: &mut PgConnection, tag_id: Uuid, caller: Uuid) -> Result<DbTag> {
    let tag = sqlx::query_as::<_, DbTag>("SELECT id, name, user_id FROM tags WHERE id = $1")
        .bind(tag_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tag not found.".to_string()))?;

    ensure_owner(ResourceKind::Tag, tag.user_id, caller)?;
    Ok(tag)
}

async fn find_tag_by_name(conn: &mut PgConnection, user_id: Uuid, name: &str) -> Result<Option<DbTag>> {
    let tag = sqlx::query_as::<_, DbTag>(
        "SELECT id, name, user_id FROM tags WHERE user_id = $1 AND name = $2",
    )
    .bind(user_id)
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(tag)
}

async fn insert_tag(conn: &mut PgConnection, user_id: Uuid, name: &str) -> Result<DbTag> {
    let tag = sqlx::query_as::<_, DbTag>(
        r#"
        INSERT INTO tags (id, name, user_id)
        VALUES ($1, $2, $3)
        RETURNING id, name, user_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(tag)
}

/// Reuse the user's tag with this name or create it
pub(super) async fn find_or_create_tag(conn: &mut PgConnection, user_id: Uuid, name: &str) -> Result<DbTag> {
    match find_tag_by_name(conn, user_id, name).await? {
        Some(tag) => Ok(tag),
        None => insert_tag(conn, user_id, name).await,
    }
}

async fn is_linked(conn: &mut PgConnection, flashcard_id: Uuid, tag_id: Uuid) -> Result<bool> {
    let linked = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM flashcards_tags WHERE flashcard_id = $1 AND tag_id = $2)",
    )
    .bind(flashcard_id)
    .bind(tag_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(linked)
}

pub(super) async fn insert_link(conn: &mut PgConnection, flashcard_id: Uuid, tag_id: Uuid) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO flashcards_tags (id, flashcard_id, tag_id)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(flashcard_id)
    .bind(tag_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

impl Database {
    // === Tag Repository ===

    /// Create a tag; names are unique per user
    pub async fn create_tag(&self, user_id: Uuid, name: &str) -> Result<DbTag> {
        let mut tx = self.pool.begin().await?;

        if find_tag_by_name(&mut tx, user_id, name).await?.is_some() {
            return Err(DomainError::DuplicateTag.into());
        }
        let tag = insert_tag(&mut tx, user_id, name).await?;

        tx.commit().await?;
        Ok(tag)
    }

    /// Tags owned by a user
    pub async fn list_tags(&self, user_id: Uuid) -> Result<Vec<DbTag>> {
        let tags = sqlx::query_as::<_, DbTag>(
            r#"
            SELECT id, name, user_id
            FROM tags
            WHERE user_id = $1
            ORDER BY name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    /// Tag with the flashcards linked to it
    pub async fn get_tag(&self, tag_id: Uuid, caller: Uuid) -> Result<TagDetailResponse> {
        let mut conn = self.pool.acquire().await?;
        let tag = owned_tag(&mut conn, tag_id, caller).await?;

        let flashcards = sqlx::query_as::<_, DbFlashcard>(
            r#"
            SELECT f.id, f.question, f.answer, f.user_id, f.created_at, f.updated_at
            FROM flashcards f
            JOIN flashcards_tags ft ON ft.flashcard_id = f.id
            WHERE ft.tag_id = $1
            ORDER BY f.created_at, f.id
            "#,
        )
        .bind(tag_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(TagDetailResponse {
            id: tag.id,
            name: tag.name,
            user_id: tag.user_id,
            flashcards: flashcards.iter().map(DbFlashcard::to_plain).collect(),
        })
    }

    /// Delete a tag that no flashcard references
    pub async fn delete_tag(&self, tag_id: Uuid, caller: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        owned_tag(&mut tx, tag_id, caller).await?;

        let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM flashcards_tags WHERE tag_id = $1")
            .bind(tag_id)
            .fetch_one(&mut *tx)
            .await?;
        ensure_deletable(links)?;

        sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(tag_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Link an existing tag to a flashcard
    pub async fn link_tag(&self, flashcard_id: Uuid, tag_id: Uuid, caller: Uuid) -> Result<DbTag> {
        let mut tx = self.pool.begin().await?;

        owned_flashcard(&mut tx, flashcard_id, caller).await?;
        let tag = owned_tag(&mut tx, tag_id, caller).await?;

        ensure_can_link(is_linked(&mut tx, flashcard_id, tag_id).await?)?;
        insert_link(&mut tx, flashcard_id, tag_id).await?;

        tx.commit().await?;
        Ok(tag)
    }

    /// Remove the link between a flashcard and a tag
    pub async fn unlink_tag(&self, flashcard_id: Uuid, tag_id: Uuid, caller: Uuid) -> Result<UnlinkResponse> {
        let mut tx = self.pool.begin().await?;

        let flashcard = owned_flashcard(&mut tx, flashcard_id, caller).await?;
        let tag = owned_tag(&mut tx, tag_id, caller).await?;

        ensure_can_unlink(is_linked(&mut tx, flashcard_id, tag_id).await?)?;
        sqlx::query("DELETE FROM flashcards_tags WHERE flashcard_id = $1 AND tag_id = $2")
            .bind(flashcard_id)
            .bind(tag_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(UnlinkResponse {
            message: "Flashcard removed from the tag.".to_string(),
            flashcard: flashcard.to_plain(),
            tag,
        })
    }

    /// Tags linked to a flashcard
    pub async fn list_flashcard_tags(&self, flashcard_id: Uuid, caller: Uuid) -> Result<Vec<DbTag>> {
        let mut conn = self.pool.acquire().await?;
        owned_flashcard(&mut conn, flashcard_id, caller).await?;

        let mut tags = tags_for_flashcards(&mut conn, &[flashcard_id]).await?;
        Ok(tags.remove(&flashcard_id).unwrap_or_default())
    }

    /// Attach a tag by name, creating it for the caller when missing
    pub async fn assign_tag(&self, flashcard_id: Uuid, caller: Uuid, name: &str) -> Result<DbTag> {
        let mut tx = self.pool.begin().await?;

        owned_flashcard(&mut tx, flashcard_id, caller).await?;
        let tag = find_or_create_tag(&mut tx, caller, name).await?;

        ensure_can_link(is_linked(&mut tx, flashcard_id, tag.id).await?)?;
        insert_link(&mut tx, flashcard_id, tag.id).await?;

        tx.commit().await?;
        Ok(tag)
    }
}
