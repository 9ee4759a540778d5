//! Error types for flashcard-core.

use thiserror::Error;

use crate::types::ResourceKind;

/// Result type alias using DomainError.
pub type Result<T> = std::result::Result<T, DomainError>;

/// Violations of the flashcard/tag/user rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("A user with that username already exists.")]
    UsernameTaken,

    #[error("A flashcard with the same question already exists for this user.")]
    DuplicateFlashcard,

    #[error("A tag with this name already exists for this user.")]
    DuplicateTag,

    #[error("Could not delete tag. It is still linked to {links} flashcard(s).")]
    TagInUse { links: i64 },

    #[error("Tag is already linked to this flashcard.")]
    AlreadyLinked,

    #[error("Tag is not linked to this flashcard.")]
    NotLinked,

    #[error("You do not have access to this {0}.")]
    NotOwner(ResourceKind),
}

/// Coarse classification used by transports to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    Forbidden,
    /// Rejected because of existing state (duplicates, links).
    Rejected,
    Conflict,
}

impl DomainError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::UsernameTaken => "conflict",
            Self::DuplicateFlashcard | Self::DuplicateTag => "already_exists",
            Self::TagInUse { .. } => "tag_in_use",
            Self::AlreadyLinked => "already_linked",
            Self::NotLinked => "not_linked",
            Self::NotOwner(_) => "forbidden",
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Validation { .. } => ErrorClass::Validation,
            Self::UsernameTaken => ErrorClass::Conflict,
            Self::NotOwner(_) => ErrorClass::Forbidden,
            Self::DuplicateFlashcard
            | Self::DuplicateTag
            | Self::TagInUse { .. }
            | Self::AlreadyLinked
            | Self::NotLinked => ErrorClass::Rejected,
        }
    }
}
