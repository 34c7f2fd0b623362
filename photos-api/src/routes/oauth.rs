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

//! Google OAuth route handlers: login, callback, logout, refresh.
//!
//! A successful callback sets the access token as the `auth_token` cookie and
//! the refresh token as `refresh_token`, then redirects to the frontend.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use photos_api_types::requests::CallbackQuery;
use photos_api_types::responses::{AuthUrlResponse, MessageResponse, RefreshResponse};

use crate::auth::{self, AuthUser};
use crate::config::LoginResponseMode;
use crate::cookies::{self, ACCESS_COOKIE, REFRESH_COOKIE, STATE_COOKIE};
use crate::db::User;
use crate::error::{AppError, MSG_INVALID_REFRESH_TOKEN, MSG_NO_REFRESH_TOKEN};
use crate::oauth::{self, OAuthError};
use crate::state::AppState;
use crate::token::TokenPair;

/// GET /api/auth/google/login
///
/// Issues a fresh state cookie and hands the browser the provider URL, either
/// as JSON or as a redirect depending on `LOGIN_RESPONSE_MODE`.
pub async fn login(State(state): State<AppState>, jar: CookieJar) -> Response {
    let csrf_state = oauth::generate_state();
    let auth_url = state.google.authorization_url(&csrf_state);
    let jar = jar.add(state.cookies.state(&csrf_state));

    match state.login_response_mode {
        LoginResponseMode::Json => (jar, Json(AuthUrlResponse { auth_url })).into_response(),
        LoginResponseMode::Redirect => (jar, Redirect::temporary(&auth_url)).into_response(),
    }
}

/// GET /api/auth/google/callback?state=...&code=...
///
/// The state cookie is consumed on every outcome, so a state value can be
/// presented at most once.
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let expected_state = cookies::non_empty(&jar, STATE_COOKIE);
    let jar = jar.add(state.cookies.clear(STATE_COOKIE));

    match complete_login(&state, expected_state.as_deref(), query).await {
        Ok((user, pair)) => {
            tracing::info!(
                "OAuth login successful for user {} ({}), redirecting to {}",
                user.id,
                user.email,
                state.frontend_url
            );
            let jar = set_session_cookies(jar, &state, &pair);
            (jar, Redirect::temporary(&state.frontend_url)).into_response()
        }
        Err(err) => (jar, err).into_response(),
    }
}

async fn complete_login(
    state: &AppState,
    expected_state: Option<&str>,
    query: CallbackQuery,
) -> Result<(User, TokenPair), AppError> {
    let expected_state = expected_state.ok_or(OAuthError::InvalidState)?;
    match query.state.as_deref() {
        Some(received) if !received.is_empty() && received == expected_state => {}
        _ => return Err(OAuthError::InvalidState.into()),
    }

    if let Some(error) = query.error {
        return Err(OAuthError::ProviderDenied {
            error,
            description: query.error_description,
        }
        .into());
    }

    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or(OAuthError::MissingCode)?;

    let upstream = state.google.exchange_code(&code).await?;
    let identity = state.google.fetch_identity(&upstream).await?;
    let user = state
        .users
        .find_or_create_by_external_identity(&identity)
        .await?;
    let pair = state.codec.issue_pair(&user)?;
    Ok((user, pair))
}

/// POST /api/auth/google/logout
///
/// Revokes whatever session tokens the caller presented and clears both
/// cookies. Revocation failures are logged and otherwise ignored.
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    jar: CookieJar,
    headers: HeaderMap,
) -> Response {
    let access = auth::access_token(&jar, &headers, state.allow_bearer_auth);
    let refresh = cookies::non_empty(&jar, REFRESH_COOKIE);

    for token in [access, refresh].into_iter().flatten() {
        if let Err(e) = state.codec.revoke(&token) {
            tracing::warn!("Failed to revoke token on logout: {e}");
        }
    }

    tracing::info!("User {} logged out", claims.user_id);

    let jar = jar
        .add(state.cookies.clear(ACCESS_COOKIE))
        .add(state.cookies.clear(REFRESH_COOKIE));

    (
        jar,
        [
            (header::CACHE_CONTROL, "no-store"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(MessageResponse::new("Logged out successfully")),
    )
        .into_response()
}

/// POST /api/auth/google/refresh
///
/// Mints a new access token from a valid refresh token. The refresh token
/// itself is not rotated.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let token = cookies::non_empty(&jar, REFRESH_COOKIE).or_else(|| {
        if state.allow_bearer_auth {
            auth::bearer_token(&headers).map(str::to_string)
        } else {
            None
        }
    });
    let token = token.ok_or_else(|| AppError::unauthorized(MSG_NO_REFRESH_TOKEN))?;

    let claims = match state.codec.validate_refresh_token(&token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!("Refresh rejected: {e}");
            let jar = jar.add(state.cookies.clear(REFRESH_COOKIE));
            return Ok((jar, AppError::unauthorized(MSG_INVALID_REFRESH_TOKEN)).into_response());
        }
    };

    let user = state.users.get_user_by_id(claims.user_id).await?;
    let access_token = state.codec.issue_access_token(&user)?;
    tracing::debug!("Issued refreshed access token for user {}", user.id);

    let jar = jar.add(
        state
            .cookies
            .access(&access_token, state.codec.access_ttl_secs()),
    );
    Ok((
        jar,
        Json(RefreshResponse {
            message: "Token refreshed successfully".to_string(),
            token: access_token,
        }),
    )
        .into_response())
}

/// Attach both session cookies with lifetimes matching the tokens.
pub(crate) fn set_session_cookies(jar: CookieJar, state: &AppState, pair: &TokenPair) -> CookieJar {
    jar.add(
        state
            .cookies
            .access(&pair.access_token, state.codec.access_ttl_secs()),
    )
    .add(
        state
            .cookies
            .refresh(&pair.refresh_token, state.codec.refresh_ttl_secs()),
    )
}
