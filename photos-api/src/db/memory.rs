/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 */

//! In-process [`UserStore`] for tests and development runs without PostgreSQL.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::{StoreError, User, UserStore, PROVIDER_GOOGLE};
use crate::oauth::ExternalIdentity;

#[derive(Debug, Default)]
struct Inner {
    users: Vec<User>,
    next_id: i64,
}

/// Users kept in a `Vec` behind a mutex. Each upsert runs under one lock
/// acquisition, which gives the same idempotency as the unique constraints
/// of the SQL store.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    inner: Mutex<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a user, as an account deletion would.
    pub fn remove(&self, id: i64) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let before = inner.users.len();
        inner.users.retain(|u| u.id != id);
        inner.users.len() != before
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Inner {
    fn insert(
        &mut self,
        google_id: Option<String>,
        email: &str,
        name: &str,
        picture_url: Option<String>,
        provider: &str,
    ) -> User {
        self.next_id += 1;
        let now = Utc::now();
        let user = User {
            id: self.next_id,
            google_id,
            email: email.to_string(),
            name: name.to_string(),
            picture_url,
            auth_provider: provider.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.users.push(user.clone());
        user
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_or_create_by_external_identity(
        &self,
        identity: &ExternalIdentity,
    ) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(user) = inner
            .users
            .iter()
            .find(|u| u.google_id.as_deref() == Some(identity.sub.as_str()))
        {
            return Ok(user.clone());
        }

        let picture = identity.picture.clone().filter(|p| !p.is_empty());
        if let Some(user) = inner.users.iter_mut().find(|u| u.email == identity.email) {
            if user.google_id.is_some() {
                return Err(StoreError::IdentityConflict { user_id: user.id });
            }
            user.google_id = Some(identity.sub.clone());
            if user.picture_url.is_none() {
                user.picture_url = picture;
            }
            user.updated_at = Utc::now();
            return Ok(user.clone());
        }

        Ok(inner.insert(
            Some(identity.sub.clone()),
            &identity.email,
            &identity.display_name(),
            picture,
            PROVIDER_GOOGLE,
        ))
    }

    async fn find_or_create_by_email(
        &self,
        email: &str,
        name: &str,
        provider: &str,
    ) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(user) = inner.users.iter().find(|u| u.email == email) {
            return Ok(user.clone());
        }
        Ok(inner.insert(None, email, name, None, provider))
    }

    async fn get_user_by_id(&self, id: i64) -> Result<User, StoreError> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::PROVIDER_DEV;

    fn identity(sub: &str, email: &str) -> ExternalIdentity {
        ExternalIdentity {
            sub: sub.to_string(),
            email: email.to_string(),
            email_verified: true,
            name: Some("Alice Example".to_string()),
            given_name: None,
            family_name: None,
            picture: Some("https://example.com/a.png".to_string()),
        }
    }

    #[tokio::test]
    async fn same_subject_resolves_to_same_user() {
        let store = MemoryUserStore::new();
        let first = store
            .find_or_create_by_external_identity(&identity("sub-1", "a@example.com"))
            .await
            .unwrap();
        let second = store
            .find_or_create_by_external_identity(&identity("sub-1", "a@example.com"))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.len(), 1);
        assert_eq!(first.auth_provider, "google");
    }

    #[tokio::test]
    async fn dev_account_is_linked_on_first_google_login() {
        let store = MemoryUserStore::new();
        let dev = store
            .find_or_create_by_email("a@example.com", "Dev User", PROVIDER_DEV)
            .await
            .unwrap();
        let google = store
            .find_or_create_by_external_identity(&identity("sub-1", "a@example.com"))
            .await
            .unwrap();
        assert_eq!(dev.id, google.id);
        assert_eq!(google.google_id.as_deref(), Some("sub-1"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn other_subject_with_same_email_is_refused() {
        let store = MemoryUserStore::new();
        let first = store
            .find_or_create_by_external_identity(&identity("sub-A", "x@example.com"))
            .await
            .unwrap();

        let err = store
            .find_or_create_by_external_identity(&identity("sub-B", "x@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::IdentityConflict { user_id } if user_id == first.id));

        let owner = store.get_user_by_id(first.id).await.unwrap();
        assert_eq!(owner.google_id.as_deref(), Some("sub-A"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn find_or_create_by_email_is_idempotent() {
        let store = MemoryUserStore::new();
        let a = store
            .find_or_create_by_email("b@example.com", "Bob", PROVIDER_DEV)
            .await
            .unwrap();
        let b = store
            .find_or_create_by_email("b@example.com", "Someone Else", PROVIDER_DEV)
            .await
            .unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(b.name, "Bob");
    }

    #[tokio::test]
    async fn removed_user_is_not_found() {
        let store = MemoryUserStore::new();
        let user = store
            .find_or_create_by_email("c@example.com", "Carol", PROVIDER_DEV)
            .await
            .unwrap();
        assert!(store.remove(user.id));
        assert!(matches!(
            store.get_user_by_id(user.id).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
