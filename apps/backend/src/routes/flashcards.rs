//! Flashcard endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use flashcard_core::{resolve_tag_names, FlashcardContent};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// GET /flashcard
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<FlashcardResponse>>> {
    let flashcards = state.db.list_flashcards(auth.user_id).await?;
    Ok(Json(flashcards))
}

/// POST /flashcard
/// Creates the flashcard and links its tags in one transaction
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<CreateFlashcardRequest>,
) -> Result<(StatusCode, Json<FlashcardResponse>)> {
    let content = FlashcardContent::new(&payload.question, &payload.answer)?;
    let tag_names = resolve_tag_names(payload.tags.as_deref())?;

    let flashcard = state
        .db
        .create_flashcard(auth.user_id, &content, &tag_names)
        .await?;

    Ok((StatusCode::CREATED, Json(flashcard)))
}

/// GET /flashcard/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(flashcard_id): Path<Uuid>,
) -> Result<Json<FlashcardResponse>> {
    let flashcard = state.db.get_flashcard(flashcard_id, auth.user_id).await?;
    Ok(Json(flashcard))
}

/// PUT /flashcard/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(flashcard_id): Path<Uuid>,
    Json(patch): Json<UpdateFlashcardRequest>,
) -> Result<Json<FlashcardResponse>> {
    patch.validate()?;
    let flashcard = state
        .db
        .update_flashcard(flashcard_id, auth.user_id, &patch)
        .await?;
    Ok(Json(flashcard))
}

/// DELETE /flashcard/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(flashcard_id): Path<Uuid>,
) -> Result<Json<MessageResponse>> {
    state.db.delete_flashcard(flashcard_id, auth.user_id).await?;
    Ok(Json(MessageResponse::new("Flashcard deleted successfully.")))
}
