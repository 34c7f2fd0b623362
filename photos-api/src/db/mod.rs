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

//! Local user records and the identity-resolution capability the auth core
//! depends on.
//!
//! Handlers only ever see `Arc<dyn UserStore>`; [`PgUserStore`] backs it in
//! deployments and [`MemoryUserStore`] in tests and database-less
//! development runs.

pub mod memory;
pub mod users;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::oauth::ExternalIdentity;

pub use memory::MemoryUserStore;
pub use users::PgUserStore;

/// Provider name recorded for users created through Google login.
pub const PROVIDER_GOOGLE: &str = "google";
/// Provider name recorded for users created through the development login.
pub const PROVIDER_DEV: &str = "dev";

/// Row of the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub google_id: Option<String>,
    pub email: String,
    pub name: String,
    pub picture_url: Option<String>,
    pub auth_provider: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user {0} not found")]
    NotFound(i64),

    /// The email belongs to a user already bound to another Google subject.
    #[error("user {user_id} is linked to a different external identity")]
    IdentityConflict { user_id: i64 },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Find-or-create of local users keyed by an external identity or an email.
///
/// Both upserts must be idempotent under concurrent calls for the same key:
/// two racing first logins resolve to one row.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Resolve the user behind a provider identity, creating it on first login.
    /// The subject is the key. An existing account with the same email and no
    /// subject yet (e.g. from dev login) is linked instead of duplicated; one
    /// already bound to another subject yields [`StoreError::IdentityConflict`].
    async fn find_or_create_by_external_identity(
        &self,
        identity: &ExternalIdentity,
    ) -> Result<User, StoreError>;

    async fn find_or_create_by_email(
        &self,
        email: &str,
        name: &str,
        provider: &str,
    ) -> Result<User, StoreError>;

    async fn get_user_by_id(&self, id: i64) -> Result<User, StoreError>;
}
