//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub use flashcard_core::{FlashcardContent, FlashcardPatch};

// === Database Entity Types ===

/// User account
#[derive(Debug, Clone, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Flashcard row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbFlashcard {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DbFlashcard {
    pub fn content(&self) -> FlashcardContent {
        FlashcardContent {
            question: self.question.clone(),
            answer: self.answer.clone(),
        }
    }

    pub fn to_plain(&self) -> PlainFlashcard {
        PlainFlashcard {
            id: self.id,
            question: self.question.clone(),
            answer: self.answer.clone(),
        }
    }

    pub fn with_tags(self, tags: Vec<DbTag>) -> FlashcardResponse {
        FlashcardResponse {
            id: self.id,
            question: self.question,
            answer: self.answer,
            user_id: self.user_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            tags,
        }
    }
}

/// Tag row; serialized as-is in responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DbTag {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
}

/// Tag joined through `flashcards_tags`, keyed by the flashcard it belongs to
#[derive(Debug, Clone, FromRow)]
pub struct FlashcardTagRow {
    pub flashcard_id: Uuid,
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
}

impl FlashcardTagRow {
    pub fn into_tag(self) -> (Uuid, DbTag) {
        (
            self.flashcard_id,
            DbTag {
                id: self.id,
                name: self.name,
                user_id: self.user_id,
            },
        )
    }
}

// === API Request/Response Types ===

/// POST /register and POST /login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// POST /register
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: Uuid,
}

/// POST /login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: Uuid,
}

/// POST /refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Plain acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// GET /user/:id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub flashcards: Vec<PlainFlashcard>,
    pub tags: Vec<DbTag>,
}

/// Flashcard without relations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainFlashcard {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
}

/// POST /flashcard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFlashcardRequest {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// PUT /flashcard/:id
pub type UpdateFlashcardRequest = FlashcardPatch;

/// Flashcard with its tags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashcardResponse {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub tags: Vec<DbTag>,
}

/// POST /tag and POST /flashcard/:id/tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
}

/// GET /tag/:id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagDetailResponse {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
    pub flashcards: Vec<PlainFlashcard>,
}

/// DELETE /flashcard/:id/tag/:tag_id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlinkResponse {
    pub message: String,
    pub flashcard: PlainFlashcard,
    pub tag: DbTag,
}
