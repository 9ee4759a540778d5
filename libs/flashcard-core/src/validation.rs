//! Input validation shared by every write path.
//!
//! Limits mirror the column widths of the relational schema so that a value
//! accepted here never fails on insert because of its length.

use crate::error::{DomainError, Result};

pub const MAX_USERNAME_LEN: usize = 80;
pub const MAX_QUESTION_LEN: usize = 255;
pub const MAX_ANSWER_LEN: usize = 255;
pub const MAX_TAG_NAME_LEN: usize = 80;

/// Postgres text columns cannot store NUL.
fn reject_nul(field: &'static str, value: &str) -> Result<()> {
    if value.contains('\0') {
        return Err(DomainError::validation(field, "must not contain NUL characters"));
    }
    Ok(())
}

/// Trim and bound a required text field.
fn required(field: &'static str, value: &str, max_len: usize) -> Result<String> {
    reject_nul(field, value)?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    if trimmed.chars().count() > max_len {
        return Err(DomainError::validation(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }
    Ok(trimmed.to_string())
}

pub fn username(value: &str) -> Result<String> {
    required("username", value, MAX_USERNAME_LEN)
}

/// Passwords are kept verbatim; only emptiness is rejected.
pub fn password(value: &str) -> Result<String> {
    if value.is_empty() {
        return Err(DomainError::validation("password", "must not be empty"));
    }
    reject_nul("password", value)?;
    Ok(value.to_string())
}

pub fn question(value: &str) -> Result<String> {
    required("question", value, MAX_QUESTION_LEN)
}

pub fn answer(value: &str) -> Result<String> {
    required("answer", value, MAX_ANSWER_LEN)
}

pub fn tag_name(value: &str) -> Result<String> {
    required("tag name", value, MAX_TAG_NAME_LEN)
}
