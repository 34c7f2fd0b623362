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

//! Shared application state passed to every Axum handler via `State`.

use std::sync::Arc;

use thiserror::Error;

use crate::config::{Config, LoginResponseMode};
use crate::cookies::CookieSettings;
use crate::db::UserStore;
use crate::oauth::{GoogleClient, OAuthError};
use crate::revocation::RevocationStore;
use crate::token::{TokenCodec, TokenError};

#[derive(Debug, Error)]
pub enum StateError {
    #[error("token codec: {0}")]
    Token(#[from] TokenError),

    #[error("OAuth client: {0}")]
    OAuth(#[from] OAuthError),
}

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub codec: Arc<TokenCodec>,
    pub users: Arc<dyn UserStore>,
    pub google: Arc<GoogleClient>,
    pub revocations: Arc<RevocationStore>,
    pub cookies: CookieSettings,
    /// Post-login redirect target.
    pub frontend_url: String,
    pub login_response_mode: LoginResponseMode,
    pub allow_bearer_auth: bool,
    /// Runtime half of the dev-login gate; the `dev-login` feature is the other.
    pub dev_login_enabled: bool,
}

impl AppState {
    pub fn new(config: &Config, users: Arc<dyn UserStore>) -> Result<Self, StateError> {
        let revocations = Arc::new(RevocationStore::new());
        let codec = TokenCodec::new(
            &config.jwt_secret,
            &config.jwt_refresh_secret,
            config.token_duration,
            Arc::clone(&revocations),
        )?;
        let google = GoogleClient::new(config.oauth.clone())?;
        let development = config.environment.is_development();

        Ok(Self {
            codec: Arc::new(codec),
            users,
            google: Arc::new(google),
            revocations,
            cookies: CookieSettings::new(!development, config.cookie_domain.clone()),
            frontend_url: config.frontend_url.clone(),
            login_response_mode: config.login_response_mode,
            allow_bearer_auth: config.allow_bearer_auth && development,
            dev_login_enabled: development,
        })
    }
}
