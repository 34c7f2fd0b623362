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

//! Response payloads for the auth endpoints.

use serde::{Deserialize, Serialize};

/// `GET /api/auth/google/login` when the server runs in JSON login mode.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthUrlResponse {
    pub auth_url: String,
}

/// Generic `{ "message": "..." }` acknowledgement (logout).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `POST /api/auth/google/refresh`.
///
/// The new access token is also set as the `auth_token` cookie; `token` is
/// returned for clients that do not keep cookies.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshResponse {
    pub message: String,
    pub token: String,
}

/// `GET /api/me`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MeResponse {
    pub user_id: i64,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
    /// Access token expiry (Unix seconds).
    pub expires_at: i64,
    /// `true` when the access token is close enough to expiry that the
    /// client should call the refresh endpoint.
    pub refresh_recommended: bool,
}

/// `POST /api/auth/dev/login`. Development builds only.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DevLoginResponse {
    pub message: String,
    pub user_id: i64,
    pub email: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub token: String,
    pub refresh_token: String,
}

/// `GET /health`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HealthResponse {
    pub status: String,
}
