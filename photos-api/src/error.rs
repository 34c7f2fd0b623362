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

//! Application error type that implements Axum's `IntoResponse`.
//!
//! Every error is returned as an [`ErrorBody`] paired with the appropriate
//! HTTP status code. Module errors convert into [`AppError`] here, which is
//! the single place that decides what a client is allowed to see.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use photos_api_types::ErrorBody;

use crate::db::StoreError;
use crate::oauth::OAuthError;
use crate::token::TokenError;

pub const MSG_AUTH_REQUIRED: &str = "Authentication required";
pub const MSG_SESSION_INVALIDATED: &str = "Session has been invalidated, please log in again";
pub const MSG_SESSION_EXPIRED: &str = "Session expired, please refresh your token or log in again";
pub const MSG_INVALID_TOKEN: &str = "Invalid authentication token";
pub const MSG_INVALID_STATE: &str = "Invalid OAuth state";
pub const MSG_NO_REFRESH_TOKEN: &str = "Refresh token required";
pub const MSG_INVALID_REFRESH_TOKEN: &str = "Invalid or expired refresh token";
pub const MSG_USER_GONE: &str = "User no longer exists";
pub const MSG_IDENTITY_CONFLICT: &str =
    "This email is already linked to a different Google account";

/// Application-level error that pairs an HTTP status code with an [`ErrorBody`].
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody::new(message),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    pub fn message(&self) -> &str {
        &self.body.error
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Blacklisted => Self::unauthorized(MSG_SESSION_INVALIDATED),
            TokenError::Expired => Self::unauthorized(MSG_SESSION_EXPIRED),
            TokenError::SigningFailed(_)
            | TokenError::EmptySecret
            | TokenError::InvalidLifetime(_) => {
                tracing::error!("Token signing error: {err}");
                Self::internal()
            }
            other => {
                tracing::debug!("Rejected token: {other}");
                Self::unauthorized(MSG_INVALID_TOKEN)
            }
        }
    }
}

impl From<OAuthError> for AppError {
    fn from(err: OAuthError) -> Self {
        match &err {
            OAuthError::InvalidState => {
                tracing::warn!("OAuth callback rejected: state mismatch");
                Self::unauthorized(MSG_INVALID_STATE)
            }
            OAuthError::ProviderDenied { error, description } => {
                tracing::warn!(
                    "OAuth provider returned error {error}: {}",
                    description.as_deref().unwrap_or("no description")
                );
                let message = match description.as_deref().filter(|d| !d.is_empty()) {
                    Some(d) => format!("Authorization failed: {error} ({d})"),
                    None => format!("Authorization failed: {error}"),
                };
                Self::unauthorized(message)
            }
            OAuthError::MissingCode => Self::bad_request("Missing authorization code"),
            OAuthError::ExchangeFailed(detail) => {
                tracing::error!("OAuth code exchange failed: {detail}");
                Self::bad_gateway("Failed to exchange authorization code")
            }
            OAuthError::IdentityFetchFailed(detail) => {
                tracing::error!("OAuth userinfo fetch failed: {detail}");
                Self::bad_gateway("Failed to fetch user information")
            }
            OAuthError::IdentityIncomplete(reason) => {
                tracing::warn!("OAuth identity rejected: {reason}");
                Self::unauthorized("Unable to verify account identity")
            }
            OAuthError::Setup(detail) => {
                tracing::error!("OAuth client misconfigured: {detail}");
                Self::internal()
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => {
                tracing::warn!("User {id} not found");
                Self::unauthorized(MSG_USER_GONE)
            }
            StoreError::IdentityConflict { user_id } => {
                tracing::warn!("Login refused: user {user_id} is bound to another Google account");
                Self::new(StatusCode::CONFLICT, MSG_IDENTITY_CONFLICT)
            }
            StoreError::Database(e) => {
                tracing::error!("Database error: {e}");
                Self::internal()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;

    /// Consume the response body and deserialize it to [`ErrorBody`].
    async fn read_error_body(resp: Response) -> (StatusCode, ErrorBody) {
        let status = resp.status();
        let bytes = Body::new(resp.into_body())
            .collect()
            .await
            .expect("collect body")
            .to_bytes();
        let parsed: ErrorBody = serde_json::from_slice(&bytes).expect("deserialize error body");
        (status, parsed)
    }

    #[tokio::test]
    async fn blacklisted_token_produces_invalidated_message() {
        let resp = AppError::from(TokenError::Blacklisted).into_response();
        let (status, body) = read_error_body(resp).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.error, MSG_SESSION_INVALIDATED);
    }

    #[tokio::test]
    async fn malformed_token_hides_parser_detail() {
        let resp =
            AppError::from(TokenError::Malformed("InvalidSignature".to_string())).into_response();
        let (status, body) = read_error_body(resp).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.error, MSG_INVALID_TOKEN);
        assert!(!body.error.contains("Signature"));
    }

    #[tokio::test]
    async fn signing_failure_is_500() {
        let resp = AppError::from(TokenError::SigningFailed("boom".to_string())).into_response();
        let (status, body) = read_error_body(resp).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.error.contains("boom"));
    }

    #[test]
    fn oauth_errors_map_to_their_status_class() {
        assert_eq!(
            AppError::from(OAuthError::InvalidState).status,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(OAuthError::ProviderDenied {
                error: "access_denied".to_string(),
                description: None,
            })
            .status,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(OAuthError::MissingCode).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(OAuthError::ExchangeFailed("x".to_string())).status,
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::from(OAuthError::IdentityFetchFailed("x".to_string())).status,
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::from(OAuthError::IdentityIncomplete("email not verified")).status,
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn provider_denial_carries_provider_reason() {
        let err = AppError::from(OAuthError::ProviderDenied {
            error: "access_denied".to_string(),
            description: Some("User cancelled".to_string()),
        });
        assert_eq!(err.message(), "Authorization failed: access_denied (User cancelled)");

        let err = AppError::from(OAuthError::ProviderDenied {
            error: "access_denied".to_string(),
            description: None,
        });
        assert_eq!(err.message(), "Authorization failed: access_denied");
    }

    #[tokio::test]
    async fn exchange_failure_does_not_leak_upstream_body() {
        let err = OAuthError::ExchangeFailed("invalid_grant: secret=abc".to_string());
        let (status, body) = read_error_body(AppError::from(err).into_response()).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!body.error.contains("secret"));
    }

    #[test]
    fn identity_conflict_is_409() {
        let err = AppError::from(StoreError::IdentityConflict { user_id: 7 });
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.message(), MSG_IDENTITY_CONFLICT);
    }

    #[test]
    fn missing_user_is_unauthorized() {
        let err = AppError::from(StoreError::NotFound(42));
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.message(), MSG_USER_GONE);
    }
}
