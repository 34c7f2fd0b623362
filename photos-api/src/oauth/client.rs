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

//! Configured Google OAuth client shared by the auth handlers.

use std::time::Duration;

use url::Url;

use super::exchange::{self, UpstreamToken};
use super::userinfo::{self, ExternalIdentity};
use super::OAuthError;
use crate::config::OAuthConfig;

/// Upper bound for each call to Google.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Holds the OAuth client registration and a pooled HTTP client.
///
/// Dropping the in-flight future (client disconnect) aborts the upstream
/// request; no locks are held across these calls.
pub struct GoogleClient {
    http: reqwest::Client,
    auth_url: Url,
    config: OAuthConfig,
}

impl GoogleClient {
    pub fn new(config: OAuthConfig) -> Result<Self, OAuthError> {
        let auth_url = Url::parse(&config.auth_url)
            .map_err(|e| OAuthError::Setup(format!("invalid authorization URL: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .map_err(|e| OAuthError::Setup(e.to_string()))?;
        Ok(Self {
            http,
            auth_url,
            config,
        })
    }

    pub fn authorization_url(&self, state: &str) -> String {
        exchange::build_auth_url(
            &self.auth_url,
            &self.config.client_id,
            &self.config.redirect_url,
            state,
        )
    }

    pub async fn exchange_code(&self, code: &str) -> Result<UpstreamToken, OAuthError> {
        exchange::exchange_code(
            &self.http,
            &self.config.token_url,
            &self.config.client_id,
            &self.config.client_secret,
            &self.config.redirect_url,
            code,
        )
        .await
    }

    pub async fn fetch_identity(&self, token: &UpstreamToken) -> Result<ExternalIdentity, OAuthError> {
        userinfo::fetch_userinfo(&self.http, &self.config.userinfo_url, &token.access_token).await
    }
}
