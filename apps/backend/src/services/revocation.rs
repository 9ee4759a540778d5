//! Revoked token ids.
//!
//! The store lives for the lifetime of the process and is never persisted, so
//! a restart forgets every revocation.

use std::collections::HashSet;
use std::sync::RwLock;

use uuid::Uuid;

/// Set of revoked token ids consulted on every authenticated request
pub trait RevocationStore: Send + Sync {
    fn revoke(&self, jti: Uuid);

    fn is_revoked(&self, jti: Uuid) -> bool;
}

/// Process-local revocation set
#[derive(Debug, Default)]
pub struct InMemoryRevocationStore {
    revoked: RwLock<HashSet<Uuid>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RevocationStore for InMemoryRevocationStore {
    fn revoke(&self, jti: Uuid) {
        self.revoked
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(jti);
    }

    fn is_revoked(&self, jti: Uuid) -> bool {
        self.revoked
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&jti)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revoke_and_check() {
        let store = InMemoryRevocationStore::new();
        let jti = Uuid::new_v4();

        assert!(!store.is_revoked(jti));
        store.revoke(jti);
        assert!(store.is_revoked(jti));
        assert!(!store.is_revoked(Uuid::new_v4()));
    }

    #[test]
    fn test_revoking_twice_is_idempotent() {
        let store = InMemoryRevocationStore::new();
        let jti = Uuid::new_v4();
        store.revoke(jti);
        store.revoke(jti);
        assert!(store.is_revoked(jti));
        assert_eq!(store.revoked.read().unwrap().len(), 1);
    }
}
