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

//! PostgreSQL-backed [`UserStore`].

use async_trait::async_trait;
use sqlx::PgPool;

use super::{StoreError, User, UserStore, PROVIDER_GOOGLE};
use crate::oauth::ExternalIdentity;

const USER_COLUMNS: &str =
    "id, google_id, email, name, picture_url, auth_provider, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE google_id = $1"
        ))
        .bind(google_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_or_create_by_external_identity(
        &self,
        identity: &ExternalIdentity,
    ) -> Result<User, StoreError> {
        if let Some(user) = self.find_by_google_id(&identity.sub).await? {
            return Ok(user);
        }

        // An email row is only claimed while it has no subject; a row bound
        // to another subject makes the update a no-op and RETURNING empty.
        let inserted = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (google_id, email, name, picture_url, auth_provider)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO UPDATE SET
                google_id = EXCLUDED.google_id,
                picture_url = COALESCE(users.picture_url, EXCLUDED.picture_url),
                updated_at = NOW()
            WHERE users.google_id IS NULL
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&identity.sub)
        .bind(&identity.email)
        .bind(identity.display_name())
        .bind(identity.picture.as_deref().filter(|p| !p.is_empty()))
        .bind(PROVIDER_GOOGLE)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(user) = inserted {
            tracing::debug!("Resolved google subject to user {}", user.id);
            return Ok(user);
        }

        // A concurrent login for the same subject may have linked the row.
        if let Some(user) = self.find_by_google_id(&identity.sub).await? {
            return Ok(user);
        }

        let owner: (i64,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
            .bind(&identity.email)
            .fetch_one(&self.pool)
            .await?;
        Err(StoreError::IdentityConflict { user_id: owner.0 })
    }

    async fn find_or_create_by_email(
        &self,
        email: &str,
        name: &str,
        provider: &str,
    ) -> Result<User, StoreError> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, name, auth_provider)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(name)
        .bind(provider)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn get_user_by_id(&self, id: i64) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))
    }
}
