use std::collections::HashMap;

use flashcard_core::{ensure_owner, DomainError, FlashcardContent, FlashcardPatch, ResourceKind};
use sqlx::PgConnection;
use uuid::Uuid;

use super::tags::{find_or_create_tag, insert_link};
use super::Database;
use crate::error::{ApiError, Result};
use crate::models::*;

/// Load a flashcard the caller owns, distinguishing missing from foreign
pub(super) async fn owned_flashcard(
    conn: &mut PgConnection,
    flashcard_id: Uuid,
    caller: Uuid,
) -> Result<DbFlashcard> {
    let flashcard = sqlx::query_as::<_, DbFlashcard>(
        r#"
        SELECT id, question, answer, user_id, created_at, updated_at
        FROM flashcards
        WHERE id = $1
        "#,
    )
    .bind(flashcard_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| ApiError::NotFound("Flashcard not found.".to_string()))?;

    ensure_owner(ResourceKind::Flashcard, flashcard.user_id, caller)?;
    Ok(flashcard)
}

async fn question_in_use(conn: &mut PgConnection, user_id: Uuid, question: &str) -> Result<bool> {
    let exists = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM flashcards WHERE user_id = $1 AND question = $2)",
    )
    .bind(user_id)
    .bind(question)
    .fetch_one(&mut *conn)
    .await?;
    Ok(exists)
}

/// Tags of each given flashcard, fetched in one query
pub(super) async fn tags_for_flashcards(
    conn: &mut PgConnection,
    flashcard_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<DbTag>>> {
    let rows = sqlx::query_as::<_, FlashcardTagRow>(
        r#"
        SELECT ft.flashcard_id, t.id, t.name, t.user_id
        FROM flashcards_tags ft
        JOIN tags t ON t.id = ft.tag_id
        WHERE ft.flashcard_id = ANY($1)
        ORDER BY t.name
        "#,
    )
    .bind(flashcard_ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut grouped: HashMap<Uuid, Vec<DbTag>> = HashMap::new();
    for row in rows {
        let (flashcard_id, tag) = row.into_tag();
        grouped.entry(flashcard_id).or_default().push(tag);
    }
    Ok(grouped)
}

async fn with_tags(conn: &mut PgConnection, flashcard: DbFlashcard) -> Result<FlashcardResponse> {
    let mut tags = tags_for_flashcards(conn, &[flashcard.id]).await?;
    let tags = tags.remove(&flashcard.id).unwrap_or_default();
    Ok(flashcard.with_tags(tags))
}

impl Database {
    // === Flashcard Repository ===

    /// Create a flashcard and link it to the named tags, creating missing ones.
    ///
    /// `tag_names` must already be normalized and deduplicated.
    pub async fn create_flashcard(
        &self,
        user_id: Uuid,
        content: &FlashcardContent,
        tag_names: &[String],
    ) -> Result<FlashcardResponse> {
        let mut tx = self.pool.begin().await?;

        if question_in_use(&mut tx, user_id, &content.question).await? {
            return Err(DomainError::DuplicateFlashcard.into());
        }

        let flashcard = sqlx::query_as::<_, DbFlashcard>(
            r#"
            INSERT INTO flashcards (id, question, answer, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, question, answer, user_id, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&content.question)
        .bind(&content.answer)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut tags = Vec::with_capacity(tag_names.len());
        for name in tag_names {
            let tag = find_or_create_tag(&mut tx, user_id, name).await?;
            insert_link(&mut tx, flashcard.id, tag.id).await?;
            tags.push(tag);
        }
        tags.sort_by(|a, b| a.name.cmp(&b.name));

        tx.commit().await?;
        Ok(flashcard.with_tags(tags))
    }

    /// Get a flashcard owned by the caller, with tags
    pub async fn get_flashcard(&self, flashcard_id: Uuid, caller: Uuid) -> Result<FlashcardResponse> {
        let mut conn = self.pool.acquire().await?;
        let flashcard = owned_flashcard(&mut conn, flashcard_id, caller).await?;
        with_tags(&mut conn, flashcard).await
    }

    /// All flashcards of a user with their tags
    pub async fn list_flashcards(&self, user_id: Uuid) -> Result<Vec<FlashcardResponse>> {
        let mut conn = self.pool.acquire().await?;

        let flashcards = sqlx::query_as::<_, DbFlashcard>(
            r#"
            SELECT id, question, answer, user_id, created_at, updated_at
            FROM flashcards
            WHERE user_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;

        let ids: Vec<Uuid> = flashcards.iter().map(|f| f.id).collect();
        let mut tags = tags_for_flashcards(&mut conn, &ids).await?;

        Ok(flashcards
            .into_iter()
            .map(|f| {
                let card_tags = tags.remove(&f.id).unwrap_or_default();
                f.with_tags(card_tags)
            })
            .collect())
    }

    /// Apply a partial update to a flashcard
    pub async fn update_flashcard(
        &self,
        flashcard_id: Uuid,
        caller: Uuid,
        patch: &FlashcardPatch,
    ) -> Result<FlashcardResponse> {
        let mut tx = self.pool.begin().await?;

        let current = owned_flashcard(&mut tx, flashcard_id, caller).await?;
        let content = patch.apply(&current.content())?;

        if patch.renames_question(&current.content())
            && question_in_use(&mut tx, caller, &content.question).await?
        {
            return Err(DomainError::DuplicateFlashcard.into());
        }

        let flashcard = sqlx::query_as::<_, DbFlashcard>(
            r#"
            UPDATE flashcards
            SET question = $2, answer = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, question, answer, user_id, created_at, updated_at
            "#,
        )
        .bind(flashcard_id)
        .bind(&content.question)
        .bind(&content.answer)
        .fetch_one(&mut *tx)
        .await?;

        let response = with_tags(&mut tx, flashcard).await?;
        tx.commit().await?;
        Ok(response)
    }

    /// Delete a flashcard; its tag links cascade
    pub async fn delete_flashcard(&self, flashcard_id: Uuid, caller: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        owned_flashcard(&mut tx, flashcard_id, caller).await?;
        sqlx::query("DELETE FROM flashcards WHERE id = $1")
            .bind(flashcard_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
