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

//! Session token (JWT) claims.
//!
//! The API server signs two kinds of session tokens with HMAC-SHA256 and two
//! independent secrets: short-lived access tokens that authorize API calls,
//! and longer-lived refresh tokens that can only mint new access tokens.

use serde::{Deserialize, Serialize};

/// Which validator a token is meant for.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// JWT payload shared by access and refresh tokens.
///
/// # Example payload
///
/// ```json
/// {
///   "user_id": 42,
///   "email": "user@example.com",
///   "name": "Alice",
///   "picture_url": "https://lh3.googleusercontent.com/a/xyz",
///   "token_type": "access",
///   "iat": 1707001200,
///   "nbf": 1707001200,
///   "exp": 1707087600,
///   "iss": "photos-api",
///   "sub": "42"
/// }
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    /// Local user id.
    pub user_id: i64,

    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,

    pub token_type: TokenKind,

    /// Issued-at (Unix seconds).
    pub iat: i64,

    /// Not-before (Unix seconds).
    pub nbf: i64,

    /// Expiration (Unix seconds).
    pub exp: i64,

    /// Always [`SessionClaims::ISSUER`].
    pub iss: String,

    /// The local user id rendered as a string.
    pub sub: String,
}

impl SessionClaims {
    /// The issuer value for tokens produced by the API server.
    pub const ISSUER: &'static str = "photos-api";
}
