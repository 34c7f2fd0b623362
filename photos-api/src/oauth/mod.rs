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

//! Google OAuth2 authorization-code flow: state generation, authorization
//! URL construction, code exchange and userinfo retrieval.

pub mod client;
pub mod exchange;
pub mod userinfo;

use thiserror::Error;

pub use client::GoogleClient;
pub use exchange::{build_auth_url, generate_state, UpstreamToken, SCOPES};
pub use userinfo::ExternalIdentity;

/// Failures of the login handshake, one per step that can go wrong.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// State cookie missing, or the query `state` is empty or different.
    #[error("invalid OAuth state")]
    InvalidState,

    /// The provider redirected back with `error=...`.
    #[error("provider denied authorization: {error}")]
    ProviderDenied {
        error: String,
        description: Option<String>,
    },

    #[error("authorization code missing")]
    MissingCode,

    #[error("code exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("userinfo request failed: {0}")]
    IdentityFetchFailed(String),

    /// Userinfo lacked a subject or email, or the email is unverified.
    #[error("identity incomplete: {0}")]
    IdentityIncomplete(&'static str),

    #[error("OAuth client setup failed: {0}")]
    Setup(String),
}
