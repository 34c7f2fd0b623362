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

//! Session middleware and the extractor that exposes its result.
//!
//! [`require_session`] sits in front of every protected route. On success the
//! validated [`SessionClaims`] are stored in the request extensions; handlers
//! read them back through [`AuthUser`] or [`current_claims`].

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, Extensions, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use photos_api_types::SessionClaims;

use crate::cookies::{self, ACCESS_COOKIE};
use crate::error::{AppError, MSG_AUTH_REQUIRED};
use crate::state::AppState;

/// Extractor for the claims placed by [`require_session`].
///
/// Usage in a handler:
/// ```ignore
/// async fn my_handler(AuthUser(claims): AuthUser) { ... }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionClaims);

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_claims(&parts.extensions)
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::unauthorized(MSG_AUTH_REQUIRED))
    }
}

/// Claims of the authenticated caller, if the session middleware ran.
pub fn current_claims(extensions: &Extensions) -> Option<&SessionClaims> {
    extensions.get::<SessionClaims>()
}

/// The token from `Authorization: Bearer <token>`, if present and non-empty.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// The access token for this request: the `auth_token` cookie, else the
/// bearer header when `allow_bearer` is set.
pub fn access_token(jar: &CookieJar, headers: &HeaderMap, allow_bearer: bool) -> Option<String> {
    cookies::non_empty(jar, ACCESS_COOKIE).or_else(|| {
        allow_bearer
            .then(|| bearer_token(headers).map(str::to_string))
            .flatten()
    })
}

/// Reject unauthenticated requests before the handler runs.
///
/// Failures answer 401 with a cause-specific message and clear the access
/// cookie so the browser stops replaying a dead token.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = access_token(&jar, req.headers(), state.allow_bearer_auth) else {
        tracing::debug!("Rejected {}: no session token", req.uri().path());
        return reject(jar, &state, AppError::unauthorized(MSG_AUTH_REQUIRED));
    };

    match state.codec.validate_access_token(&token) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(err) => {
            tracing::debug!("Rejected {}: {err}", req.uri().path());
            reject(jar, &state, AppError::from(err))
        }
    }
}

fn reject(jar: CookieJar, state: &AppState, err: AppError) -> Response {
    (jar.add(state.cookies.clear(ACCESS_COOKIE)), err).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request as HttpRequest};

    fn headers_with(auth: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        headers
    }

    fn jar_with(cookie: &str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn bearer_token_is_parsed() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers_with("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers_with("Basic abc")), None);
        assert_eq!(bearer_token(&headers_with("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn cookie_wins_over_bearer() {
        let jar = jar_with("auth_token=from-cookie");
        let token = access_token(&jar, &headers_with("Bearer from-header"), true);
        assert_eq!(token.as_deref(), Some("from-cookie"));
    }

    #[test]
    fn bearer_ignored_unless_allowed() {
        let jar = CookieJar::new();
        let headers = headers_with("Bearer from-header");
        assert_eq!(access_token(&jar, &headers, false), None);
        assert_eq!(
            access_token(&jar, &headers, true).as_deref(),
            Some("from-header")
        );
    }

    #[test]
    fn empty_cookie_counts_as_missing() {
        let jar = jar_with("auth_token=");
        assert_eq!(access_token(&jar, &HeaderMap::new(), false), None);
    }

    #[tokio::test]
    async fn extractor_without_middleware_is_unauthorized() {
        let req = HttpRequest::builder().uri("/api/me").body(()).unwrap();
        let (mut parts, _body) = req.into_parts();
        let err = AuthUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::UNAUTHORIZED);
        assert_eq!(err.message(), MSG_AUTH_REQUIRED);
    }
}
