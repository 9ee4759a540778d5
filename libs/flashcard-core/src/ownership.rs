//! Ownership checks.
//!
//! Every flashcard and tag belongs to exactly one user, and profiles are only
//! visible to the user they describe.

use uuid::Uuid;

use crate::error::{DomainError, Result};
use crate::types::ResourceKind;

/// Fail unless `caller` owns a resource of `kind` owned by `owner`.
pub fn ensure_owner(kind: ResourceKind, owner: Uuid, caller: Uuid) -> Result<()> {
    if owner != caller {
        return Err(DomainError::NotOwner(kind));
    }
    Ok(())
}

/// A user may view or delete only their own profile.
pub fn ensure_self(target: Uuid, caller: Uuid) -> Result<()> {
    ensure_owner(ResourceKind::User, target, caller)
}
