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

//! Session token issuance, validation and revocation.
//!
//! Access and refresh tokens are HS256 JWTs signed with two independent
//! secrets, so a leaked access secret cannot be used to mint refresh tokens.
//! Validation consults the shared [`RevocationStore`] before anything else.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use photos_api_types::{SessionClaims, TokenKind};
use serde::Deserialize;
use thiserror::Error;

use crate::db::User;
use crate::revocation::RevocationStore;

/// Refresh tokens live this many times longer than access tokens.
pub const REFRESH_TTL_FACTOR: i64 = 7;

/// Longest lifetime any token may carry, keeping `now + ttl` far from overflow.
const MAX_TTL_SECS: i64 = i32::MAX as i64;

/// Errors produced while minting, checking or revoking session tokens.
///
/// The `String` payloads carry library detail for server logs only; they are
/// never copied into a response body.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has been revoked")]
    Blacklisted,

    #[error("token has expired")]
    Expired,

    #[error("token is not valid yet")]
    NotYetValid,

    #[error("token is malformed or its signature is invalid: {0}")]
    Malformed(String),

    #[error("expected a {expected} token")]
    WrongKind { expected: &'static str },

    #[error("token does not identify a user")]
    MissingSubject,

    #[error("failed to sign token: {0}")]
    SigningFailed(String),

    #[error("failed to parse token for revocation: {0}")]
    ParseFailed(String),

    #[error("signing secret must not be empty")]
    EmptySecret,

    #[error("token lifetime out of range: {0}s")]
    InvalidLifetime(u64),
}

/// An access token and its matching refresh token.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Mints and verifies session tokens.
pub struct TokenCodec {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
    revocations: Arc<RevocationStore>,
}

impl TokenCodec {
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl: Duration,
        revocations: Arc<RevocationStore>,
    ) -> Result<Self, TokenError> {
        if access_secret.is_empty() || refresh_secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        let requested = access_ttl.as_secs();
        let access_ttl_secs = i64::try_from(requested)
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(TokenError::InvalidLifetime(requested))?;
        let refresh_ttl_secs = access_ttl_secs
            .checked_mul(REFRESH_TTL_FACTOR)
            .filter(|secs| *secs <= MAX_TTL_SECS)
            .ok_or(TokenError::InvalidLifetime(requested))?;
        Ok(Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
            access_ttl_secs,
            refresh_ttl_secs,
            revocations,
        })
    }

    /// Access-token lifetime in seconds.
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_secs
    }

    /// Refresh-token lifetime in seconds.
    pub fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_ttl_secs
    }

    pub fn issue_access_token(&self, user: &User) -> Result<String, TokenError> {
        let claims = build_claims(user, TokenKind::Access, self.access_ttl_secs());
        sign(&claims, &self.access_encoding)
    }

    pub fn issue_refresh_token(&self, user: &User) -> Result<String, TokenError> {
        let claims = build_claims(user, TokenKind::Refresh, self.refresh_ttl_secs());
        sign(&claims, &self.refresh_encoding)
    }

    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue_access_token(user)?,
            refresh_token: self.issue_refresh_token(user)?,
        })
    }

    pub fn validate_access_token(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.validate(token, &self.access_decoding, TokenKind::Access)
    }

    pub fn validate_refresh_token(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.validate(token, &self.refresh_decoding, TokenKind::Refresh)
    }

    /// Add `token` to the denylist until its own `exp`.
    ///
    /// The signature is deliberately not checked: this only ever makes a
    /// token less usable. Tokens without `exp` are held for one access-token
    /// lifetime.
    pub fn revoke(&self, token: &str) -> Result<(), TokenError> {
        #[derive(Deserialize)]
        struct Expiry {
            #[serde(default)]
            exp: Option<i64>,
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<Expiry>(token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|e| TokenError::ParseFailed(e.to_string()))?;

        let fallback = Utc::now() + chrono::Duration::seconds(self.access_ttl_secs);
        let expires_at = data
            .claims
            .exp
            .and_then(|exp| chrono::DateTime::from_timestamp(exp, 0))
            .unwrap_or(fallback);

        self.revocations.insert(token, expires_at);
        Ok(())
    }

    pub fn is_revoked(&self, token: &str) -> bool {
        self.revocations.contains(token)
    }

    /// `true` when fewer than `threshold` remain before `claims.exp`.
    pub fn is_about_to_expire(&self, claims: &SessionClaims, threshold: chrono::Duration) -> bool {
        claims.exp - Utc::now().timestamp() < threshold.num_seconds()
    }

    fn validate(
        &self,
        token: &str,
        key: &DecodingKey,
        expected: TokenKind,
    ) -> Result<SessionClaims, TokenError> {
        if self.revocations.contains(token) {
            return Err(TokenError::Blacklisted);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[SessionClaims::ISSUER]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "sub"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        let claims = decode::<SessionClaims>(token, key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::ImmatureSignature => TokenError::NotYetValid,
                _ => TokenError::Malformed(e.to_string()),
            })?
            .claims;

        if claims.token_type != expected {
            return Err(TokenError::WrongKind {
                expected: expected.as_str(),
            });
        }
        if claims.sub.is_empty() || claims.user_id <= 0 || claims.email.is_empty() {
            return Err(TokenError::MissingSubject);
        }

        Ok(claims)
    }
}

fn build_claims(user: &User, kind: TokenKind, ttl_secs: i64) -> SessionClaims {
    let now = Utc::now().timestamp();
    SessionClaims {
        user_id: user.id,
        email: user.email.clone(),
        name: Some(user.name.clone()).filter(|n| !n.is_empty()),
        picture_url: user.picture_url.clone(),
        token_type: kind,
        iat: now,
        nbf: now,
        exp: now + ttl_secs,
        iss: SessionClaims::ISSUER.to_string(),
        sub: user.id.to_string(),
    }
}

fn sign(claims: &SessionClaims, key: &EncodingKey) -> Result<String, TokenError> {
    encode(&Header::new(Algorithm::HS256), claims, key).map_err(|e| {
        tracing::error!("Failed to sign {} token: {e}", claims.token_type.as_str());
        TokenError::SigningFailed(e.to_string())
    })
}
