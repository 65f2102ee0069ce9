/// Refresh Token Revocation
///
/// Logout adds a refresh token to the revocation store; `verify_refresh`
/// consults it before any signature work. The store is injected into the
/// token service so deployments with more than one instance can plug in a
/// shared backend.
///
/// `InMemoryRevocationStore` is single-instance only: it starts empty, is
/// lost on restart and never prunes entries, even after the revoked tokens
/// have expired.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::Mutex;

use crate::error::AppError;

#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Marks `token` as revoked. Returns `false` if it already was.
    async fn revoke(&self, token: &str) -> Result<bool, AppError>;

    async fn is_revoked(&self, token: &str) -> Result<bool, AppError>;
}

/// Fingerprint a token with SHA-256 so the store never holds usable tokens.
fn fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Default)]
pub struct InMemoryRevocationStore {
    revoked: Mutex<HashSet<String>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.revoked.lock().map(|set| set.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn revoke(&self, token: &str) -> Result<bool, AppError> {
        let mut revoked = self
            .revoked
            .lock()
            .map_err(|_| AppError::Internal("Revocation store lock poisoned".to_string()))?;
        Ok(revoked.insert(fingerprint(token)))
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, AppError> {
        let revoked = self
            .revoked
            .lock()
            .map_err(|_| AppError::Internal("Revocation store lock poisoned".to_string()))?;
        Ok(revoked.contains(&fingerprint(token)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_starts_empty() {
        let store = InMemoryRevocationStore::new();

        assert!(store.is_empty());
        assert!(!store.is_revoked("any-token").await.unwrap());
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let store = InMemoryRevocationStore::new();

        assert!(store.revoke("token-a").await.unwrap());
        assert_eq!(store.len(), 1);

        assert!(!store.revoke("token-a").await.unwrap());
        assert_eq!(store.len(), 1);
        assert!(store.is_revoked("token-a").await.unwrap());
    }

    #[tokio::test]
    async fn test_membership_is_exact_string_match() {
        let store = InMemoryRevocationStore::new();
        store.revoke("token-a").await.unwrap();

        assert!(!store.is_revoked("token-a ").await.unwrap());
        assert!(!store.is_revoked("token-b").await.unwrap());
    }

    #[test]
    fn test_fingerprint_hides_token() {
        let print = fingerprint("header.payload.signature");

        assert_eq!(print.len(), 64);
        assert!(!print.contains("payload"));
        assert_eq!(print, fingerprint("header.payload.signature"));
    }

    #[tokio::test]
    async fn test_concurrent_revocations_are_not_lost() {
        let store = Arc::new(InMemoryRevocationStore::new());

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store.revoke(&format!("token-{}", i % 16)).await.unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.len(), 16);
    }

    #[tokio::test]
    async fn test_state_does_not_survive_a_new_instance() {
        // A fresh store stands in for a process restart.
        let store = InMemoryRevocationStore::new();
        store.revoke("token-a").await.unwrap();

        let restarted = InMemoryRevocationStore::new();
        assert!(!restarted.is_revoked("token-a").await.unwrap());
    }
}
