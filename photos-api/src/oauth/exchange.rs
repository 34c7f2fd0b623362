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

//! Anti-CSRF state, authorization URL construction and the
//! authorization code → access token exchange.

use oauth2::CsrfToken;
use serde::Deserialize;
use url::Url;

use super::OAuthError;

/// Scopes requested from Google.
pub const SCOPES: &str = "openid email profile";

/// Random bytes behind each state value.
const STATE_BYTES: u32 = 32;

/// Token endpoint response. Only the access token is used: it authorizes the
/// single userinfo call and is then dropped.
#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// A fresh single-use state value (32 random bytes, base64url).
pub fn generate_state() -> String {
    CsrfToken::new_random_len(STATE_BYTES).secret().clone()
}

/// Build the authorization URL. Parameters are URL-encoded.
pub fn build_auth_url(
    auth_url: &Url,
    client_id: &str,
    redirect_url: &str,
    state: &str,
) -> String {
    let mut url = auth_url.clone();
    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_url)
        .append_pair("response_type", "code")
        .append_pair("scope", SCOPES)
        .append_pair("state", state)
        .append_pair("access_type", "offline");
    url.to_string()
}

/// Exchange an authorization code for an upstream access token.
///
/// Codes are single-use, so a failure here is final for this login attempt.
pub async fn exchange_code(
    http: &reqwest::Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    redirect_url: &str,
    code: &str,
) -> Result<UpstreamToken, OAuthError> {
    let params = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", redirect_url),
        ("client_id", client_id),
        ("client_secret", client_secret),
    ];

    let response = http
        .post(token_url)
        .form(&params)
        .send()
        .await
        .map_err(|e| OAuthError::ExchangeFailed(format!("token request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let reason = serde_json::from_str::<UpstreamErrorBody>(&body)
            .ok()
            .and_then(|b| match (b.error, b.error_description) {
                (Some(e), Some(d)) => Some(format!("{e}: {d}")),
                (Some(e), None) => Some(e),
                _ => None,
            })
            .unwrap_or(body);
        return Err(OAuthError::ExchangeFailed(format!(
            "token endpoint returned HTTP {status}: {reason}"
        )));
    }

    let token: UpstreamToken = response
        .json()
        .await
        .map_err(|e| OAuthError::ExchangeFailed(format!("unparseable token response: {e}")))?;

    if token.access_token.is_empty() {
        return Err(OAuthError::ExchangeFailed(
            "token response has an empty access_token".to_string(),
        ));
    }
    match token.expires_in {
        Some(secs) => tracing::debug!("Authorization code exchanged, upstream token valid for {secs}s"),
        None => tracing::debug!("Authorization code exchanged"),
    }
    Ok(token)
}
