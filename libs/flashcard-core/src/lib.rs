//! Domain rules for the multi-tenant flashcard API.
//!
//! Provides:
//! - Input validation for users, flashcards and tags
//! - Tag name normalization and the default-tag rule
//! - Link/unlink/delete rules for the flashcard-tag relation
//! - Ownership checks
//! - The domain error taxonomy

pub mod error;
pub mod ownership;
pub mod tags;
pub mod types;
pub mod validation;

pub use error::{DomainError, ErrorClass, Result};
pub use ownership::{ensure_owner, ensure_self};
pub use tags::{
    ensure_can_link, ensure_can_unlink, ensure_deletable, resolve_tag_names, DEFAULT_TAG_NAME,
};
pub use types::{Credentials, FlashcardContent, FlashcardPatch, ResourceKind};
