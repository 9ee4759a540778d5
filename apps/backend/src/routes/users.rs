//! Registration, login, token and profile endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use flashcard_core::{ensure_self, Credentials};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::services::password::{hash_password, verify_password};
use crate::services::tokens::TokenError;
use crate::AppState;

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let credentials = Credentials::new(&payload.username, &payload.password)?;
    let password_hash = hash_password(&credentials.password)?;

    let user = state.db.create_user(&credentials, &password_hash).await?;

    tracing::info!("Registered new user: {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User created successfully.".to_string(),
            user_id: user.id,
        }),
    ))
}

/// POST /login
/// Returns a fresh access token and a refresh token
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<LoginResponse>> {
    let credentials = Credentials::new(&payload.username, &payload.password)?;

    let user = state
        .db
        .get_user_by_username(&credentials.username)
        .await?;

    let user = match user {
        Some(user) if verify_password(&credentials.password, &user.password_hash)? => user,
        _ => {
            tracing::warn!("Failed login for username {}", credentials.username);
            return Err(ApiError::InvalidCredentials);
        }
    };

    let tokens = state.tokens.issue_pair(user.id, user.is_admin)?;

    tracing::info!("User {} logged in", user.id);

    Ok(Json(LoginResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        user_id: user.id,
    }))
}

/// POST /refresh
/// Trades a refresh token for a non-fresh access token; the refresh token is single-use
pub async fn refresh(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<RefreshResponse>> {
    let user = state
        .db
        .get_user(auth.user_id)
        .await?
        .ok_or(TokenError::Invalid)?;

    let access_token = state.tokens.issue_access(user.id, user.is_admin, false)?;
    state.tokens.revoke(&auth.claims);

    Ok(Json(RefreshResponse { access_token }))
}

/// POST /logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<MessageResponse>> {
    state.tokens.revoke(&auth.claims);
    Ok(Json(MessageResponse::new("Successfully logged out.")))
}

/// GET /user/:id
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>> {
    ensure_self(user_id, auth.user_id)?;

    let profile = state
        .db
        .get_user_profile(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    Ok(Json(profile))
}

/// DELETE /user/:id
/// Requires a fresh token; the caller's token is revoked with the account
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<MessageResponse>> {
    ensure_self(user_id, auth.user_id)?;
    auth.require_fresh()?;

    if !state.db.delete_user(user_id).await? {
        return Err(ApiError::NotFound("User not found.".to_string()));
    }
    state.tokens.revoke(&auth.claims);

    tracing::info!("Deleted user {}", user_id);

    Ok(Json(MessageResponse::new("User deleted.")))
}
