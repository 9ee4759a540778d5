//! Tag assignment rules.
//!
//! Flashcards reference tags by name. Names are resolved against the owner's
//! existing tags and created on demand, so the list handed to persistence must
//! already be normalized and free of duplicates.

use crate::error::{DomainError, Result};
use crate::validation;

/// Tag assigned to a flashcard created without any tags.
pub const DEFAULT_TAG_NAME: &str = "default";

/// Normalize the tag names supplied with a new flashcard.
///
/// Names are trimmed and validated, repeated names collapse onto their first
/// occurrence, and an absent or empty list becomes `["default"]`.
pub fn resolve_tag_names(names: Option<&[String]>) -> Result<Vec<String>> {
    let names = names.unwrap_or_default();
    if names.is_empty() {
        return Ok(vec![DEFAULT_TAG_NAME.to_string()]);
    }

    let mut resolved: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = validation::tag_name(name)?;
        if !resolved.contains(&name) {
            resolved.push(name);
        }
    }
    Ok(resolved)
}

/// A pair may only be linked once.
pub fn ensure_can_link(already_linked: bool) -> Result<()> {
    if already_linked {
        return Err(DomainError::AlreadyLinked);
    }
    Ok(())
}

pub fn ensure_can_unlink(linked: bool) -> Result<()> {
    if !linked {
        return Err(DomainError::NotLinked);
    }
    Ok(())
}

/// A tag can be deleted only when no flashcard references it.
pub fn ensure_deletable(link_count: i64) -> Result<()> {
    if link_count > 0 {
        return Err(DomainError::TagInUse { links: link_count });
    }
    Ok(())
}
