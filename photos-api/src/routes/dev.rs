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

//! Development-only login that skips Google entirely.
//!
//! Compiled only with the `dev-login` feature and routed only when the server
//! runs in the development environment.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use photos_api_types::requests::DevLoginRequest;
use photos_api_types::responses::DevLoginResponse;

use super::oauth::set_session_cookies;
use crate::db::PROVIDER_DEV;
use crate::error::AppError;
use crate::state::AppState;

pub const DEFAULT_DEV_NAME: &str = "Dev User";

/// POST /api/auth/dev/login `{ "email": "...", "name": "..." }`
pub async fn dev_login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<DevLoginRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!("Malformed dev login body: {e}");
        AppError::bad_request("Invalid request body")
    })?;

    let email = request.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::bad_request("A valid email is required"));
    }
    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_DEV_NAME);

    let user = state
        .users
        .find_or_create_by_email(email, name, PROVIDER_DEV)
        .await?;
    let pair = state.codec.issue_pair(&user)?;
    tracing::warn!("Development login for user {} ({})", user.id, user.email);

    let jar = set_session_cookies(jar, &state, &pair);
    Ok((
        jar,
        Json(DevLoginResponse {
            message: "Development login successful".to_string(),
            user_id: user.id,
            email: user.email,
            expires_in: state.codec.access_ttl_secs(),
            token: pair.access_token,
            refresh_token: pair.refresh_token,
        }),
    )
        .into_response())
}
