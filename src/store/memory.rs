use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::UserStore;
use crate::error::{AppError, DUPLICATE_ENTRY_MESSAGE};
use crate::models::{NewUser, User};

#[derive(Default)]
struct Inner {
    next_id: i64,
    users: BTreeMap<i64, User>,
}

/// Process-local user store with the same uniqueness rules as the
/// `users` table. Used by tests and local runs without PostgreSQL.
#[derive(Default)]
pub struct InMemoryUserStore {
    inner: Mutex<Inner>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, AppError> {
        self.inner
            .lock()
            .map_err(|_| AppError::Internal("User store lock poisoned".to_string()))
    }

    fn find<F>(&self, predicate: F) -> Result<Option<User>, AppError>
    where
        F: Fn(&User) -> bool,
    {
        let inner = self.lock()?;
        Ok(inner.users.values().find(|u| predicate(*u)).cloned())
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let mut inner = self.lock()?;

        if inner
            .users
            .values()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(AppError::conflict(DUPLICATE_ENTRY_MESSAGE));
        }

        inner.next_id += 1;
        let now = Utc::now();
        let created = User {
            id: inner.next_id,
            fullname: user.fullname,
            username: user.username,
            email: user.email,
            phone_number: user.phone_number,
            password_hash: user.password_hash,
            user_type: user.user_type,
            is_active: true,
            domisili: user.domisili,
            image_profile_url: user.image_profile_url,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(created.id, created.clone());

        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let inner = self.lock()?;
        Ok(inner.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.find(|u| u.email == email)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        self.find(|u| u.username == username)
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, AppError> {
        if let Some(user) = self.find(|u| u.email == identifier)? {
            return Ok(Some(user));
        }
        if let Some(user) = self.find(|u| u.username == identifier)? {
            return Ok(Some(user));
        }

        let inner = self.lock()?;
        let mut by_phone = inner
            .users
            .values()
            .filter(|u| u.phone_number.as_deref() == Some(identifier));
        let found = match (by_phone.next(), by_phone.next()) {
            (Some(user), None) => Some(user.clone()),
            _ => None,
        };
        Ok(found)
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let inner = self.lock()?;
        let mut users: Vec<User> = inner.users.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(users)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut inner = self.lock()?;
        Ok(inner.users.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn new_user(username: &str, email: &str, phone: Option<&str>) -> NewUser {
        NewUser {
            fullname: "Test User".to_string(),
            username: username.to_string(),
            email: email.to_string(),
            phone_number: phone.map(str::to_string),
            password_hash: "$2b$04$hash".to_string(),
            user_type: Role::Member,
            domisili: None,
            image_profile_url: None,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_ids_and_defaults() {
        let store = InMemoryUserStore::new();

        let alice = store
            .insert(new_user("alice", "alice@example.com", None))
            .await
            .unwrap();
        let bob = store
            .insert(new_user("bob", "bob@example.com", None))
            .await
            .unwrap();

        assert_eq!(alice.id, 1);
        assert_eq!(bob.id, 2);
        assert!(alice.is_active);
        assert_eq!(alice.user_type, Role::Member);
    }

    #[tokio::test]
    async fn test_duplicates_are_conflicts() {
        let store = InMemoryUserStore::new();
        store
            .insert(new_user("alice", "alice@example.com", None))
            .await
            .unwrap();

        let same_email = store
            .insert(new_user("alice2", "alice@example.com", None))
            .await;
        let same_username = store
            .insert(new_user("alice", "other@example.com", None))
            .await;

        assert!(matches!(same_email, Err(AppError::Database(_))));
        assert!(matches!(same_username, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_find_by_identifier() {
        let store = InMemoryUserStore::new();
        let alice = store
            .insert(new_user("alice", "alice@example.com", Some("08123456789")))
            .await
            .unwrap();

        for identifier in ["alice@example.com", "alice", "08123456789"] {
            let found = store.find_by_identifier(identifier).await.unwrap();
            assert_eq!(found.map(|u| u.id), Some(alice.id), "{}", identifier);
        }

        assert!(store.find_by_identifier("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_shared_phone_number_matches_nobody() {
        let store = InMemoryUserStore::new();
        store
            .insert(new_user("alice", "alice@example.com", Some("08123456789")))
            .await
            .unwrap();
        store
            .insert(new_user("bob", "bob@example.com", Some("08123456789")))
            .await
            .unwrap();

        assert!(store.find_by_identifier("08123456789").await.unwrap().is_none());
        assert!(store.find_by_identifier("bob").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryUserStore::new();
        let alice = store
            .insert(new_user("alice", "alice@example.com", None))
            .await
            .unwrap();

        assert!(store.delete(alice.id).await.unwrap());
        assert!(!store.delete(alice.id).await.unwrap());
        assert!(store.find_by_email("alice@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = InMemoryUserStore::new();
        store
            .insert(new_user("alice", "alice@example.com", None))
            .await
            .unwrap();
        store
            .insert(new_user("bob", "bob@example.com", None))
            .await
            .unwrap();

        let users = store.list().await.unwrap();
        let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["bob", "alice"]);
    }
}
