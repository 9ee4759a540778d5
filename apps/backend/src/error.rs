//! Error handling for the backend API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use flashcard_core::{DomainError, ErrorClass};
use serde::Serialize;
use thiserror::Error;

use crate::services::tokens::TokenError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Invalid credentials.")]
    InvalidCredentials,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        // Unique constraints are the last line against concurrent duplicates.
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unique constraint").to_string();
                return ApiError::Conflict(format!("{} violated", constraint));
            }
            // A live token can outlive its user; the owner row is gone.
            if db_err.is_foreign_key_violation() {
                return foreign_key_error(db_err.constraint());
            }
        }
        ApiError::Database(err)
    }
}

fn foreign_key_error(constraint: Option<&str>) -> ApiError {
    match constraint {
        Some(name) if name.ends_with("user_id_fkey") => ApiError::Token(TokenError::Invalid),
        _ => ApiError::NotFound("Referenced record no longer exists.".to_string()),
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ApiError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Domain(err) => {
                let status = match err.class() {
                    ErrorClass::Validation | ErrorClass::Rejected => StatusCode::BAD_REQUEST,
                    ErrorClass::Forbidden => StatusCode::FORBIDDEN,
                    ErrorClass::Conflict => StatusCode::CONFLICT,
                };
                (status, err.code())
            }
            ApiError::Token(err) => (StatusCode::UNAUTHORIZED, err.code()),
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            ApiError::Migration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "migration_error"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_code();

        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "An unexpected error occurred.".to_string()
        } else {
            self.to_string()
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use flashcard_core::ResourceKind;

    #[test]
    fn test_token_error_status() {
        let response = ApiError::from(TokenError::Revoked).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_invalid_credentials_status() {
        let response = ApiError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_not_found_status() {
        let error = ApiError::NotFound("Flashcard not found.".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_status() {
        let error = ApiError::from(DomainError::validation("question", "must not be empty"));
        assert_eq!(error.status_and_code(), (StatusCode::BAD_REQUEST, "validation_error"));
    }

    #[test]
    fn test_forbidden_status() {
        let error = ApiError::from(DomainError::NotOwner(ResourceKind::Flashcard));
        assert_eq!(error.status_and_code(), (StatusCode::FORBIDDEN, "forbidden"));
    }

    #[test]
    fn test_duplicate_flashcard_is_bad_request() {
        let error = ApiError::from(DomainError::DuplicateFlashcard);
        assert_eq!(error.status_and_code(), (StatusCode::BAD_REQUEST, "already_exists"));
    }

    #[test]
    fn test_tag_in_use_is_bad_request() {
        let error = ApiError::from(DomainError::TagInUse { links: 1 });
        assert_eq!(error.status_and_code(), (StatusCode::BAD_REQUEST, "tag_in_use"));
    }

    #[test]
    fn test_username_taken_is_conflict() {
        let response = ApiError::from(DomainError::UsernameTaken).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_unique_violation_fallback_is_conflict() {
        let error = ApiError::Conflict("uq_question_user violated".to_string());
        assert_eq!(error.status_and_code(), (StatusCode::CONFLICT, "conflict"));
    }

    #[test]
    fn test_missing_owner_is_invalid_token() {
        let error = foreign_key_error(Some("tags_user_id_fkey"));
        assert_eq!(error.status_and_code(), (StatusCode::UNAUTHORIZED, "invalid_token"));
    }

    #[test]
    fn test_missing_link_target_is_not_found() {
        let error = foreign_key_error(Some("flashcards_tags_tag_id_fkey"));
        assert_eq!(error.status_and_code(), (StatusCode::NOT_FOUND, "not_found"));
    }

    #[tokio::test]
    async fn test_server_error_body_hides_details() {
        let response = ApiError::Internal("connection refused at 10.0.0.5".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], "An unexpected error occurred.");
    }

    #[test]
    fn test_non_database_sqlx_error_is_server_error() {
        let error = ApiError::from(sqlx::Error::RowNotFound);
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_error_status() {
        let error = ApiError::Internal("unexpected error".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_migration_error_status() {
        let error = ApiError::Migration("migration failed".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_display_domain_is_transparent() {
        let error = ApiError::from(DomainError::AlreadyLinked);
        assert_eq!(error.to_string(), "Tag is already linked to this flashcard.");
    }

    #[test]
    fn test_error_display_not_found() {
        let error = ApiError::NotFound("Tag not found.".to_string());
        assert_eq!(error.to_string(), "Not found: Tag not found.");
    }

    #[test]
    fn test_error_display_internal() {
        let error = ApiError::Internal("connection lost".to_string());
        assert_eq!(error.to_string(), "Internal error: connection lost");
    }
}
