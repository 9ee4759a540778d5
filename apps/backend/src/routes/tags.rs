//! Tag endpoints and flashcard-tag links

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use flashcard_core::validation;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// GET /tag
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<DbTag>>> {
    let tags = state.db.list_tags(auth.user_id).await?;
    Ok(Json(tags))
}

/// POST /tag
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<DbTag>)> {
    let name = validation::tag_name(&payload.name)?;
    let tag = state.db.create_tag(auth.user_id, &name).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

/// GET /tag/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(tag_id): Path<Uuid>,
) -> Result<Json<TagDetailResponse>> {
    let tag = state.db.get_tag(tag_id, auth.user_id).await?;
    Ok(Json(tag))
}

/// DELETE /tag/:id
/// Only tags without linked flashcards can be deleted
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(tag_id): Path<Uuid>,
) -> Result<Json<MessageResponse>> {
    state.db.delete_tag(tag_id, auth.user_id).await?;
    Ok(Json(MessageResponse::new("Tag deleted successfully.")))
}

/// POST /flashcard/:id/tag/:tag_id
pub async fn link(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path((flashcard_id, tag_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<DbTag>> {
    let tag = state.db.link_tag(flashcard_id, tag_id, auth.user_id).await?;
    Ok(Json(tag))
}

/// DELETE /flashcard/:id/tag/:tag_id
pub async fn unlink(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path((flashcard_id, tag_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<UnlinkResponse>> {
    let response = state.db.unlink_tag(flashcard_id, tag_id, auth.user_id).await?;
    Ok(Json(response))
}

/// GET /flashcard/:id/tag
pub async fn list_for_flashcard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(flashcard_id): Path<Uuid>,
) -> Result<Json<Vec<DbTag>>> {
    let tags = state.db.list_flashcard_tags(flashcard_id, auth.user_id).await?;
    Ok(Json(tags))
}

/// POST /flashcard/:id/tag
/// Reuses the caller's tag with that name or creates it
pub async fn assign(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(flashcard_id): Path<Uuid>,
    Json(payload): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<DbTag>)> {
    let name = validation::tag_name(&payload.name)?;
    let tag = state.db.assign_tag(flashcard_id, auth.user_id, &name).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}
