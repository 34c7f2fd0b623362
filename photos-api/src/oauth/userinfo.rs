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

//! Userinfo endpoint: the external identity behind a login.

use serde::Deserialize;

use super::OAuthError;

/// Profile returned by Google's OpenID Connect userinfo endpoint.
#[derive(Debug, Deserialize, Clone)]
pub struct ExternalIdentity {
    /// Google's stable subject identifier.
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

impl ExternalIdentity {
    /// Return a display name, coalescing `name`, `given_name + family_name`, or email.
    pub fn display_name(&self) -> String {
        match self.name.as_deref() {
            Some(n) if !n.is_empty() => return n.to_string(),
            _ => {}
        }
        match (&self.given_name, &self.family_name) {
            (Some(g), Some(f)) if !g.is_empty() && !f.is_empty() => format!("{g} {f}"),
            (Some(g), _) if !g.is_empty() => g.clone(),
            _ => self.email.clone(),
        }
    }

    /// Reject identities the auth core cannot safely bind to a local user.
    pub fn ensure_complete(&self) -> Result<(), OAuthError> {
        if self.sub.is_empty() {
            return Err(OAuthError::IdentityIncomplete("missing subject id"));
        }
        if self.email.is_empty() {
            return Err(OAuthError::IdentityIncomplete("missing email"));
        }
        if !self.email_verified {
            return Err(OAuthError::IdentityIncomplete("email not verified"));
        }
        Ok(())
    }
}

/// Fetch the user's profile with the upstream access token and check that it
/// identifies a verified account.
pub async fn fetch_userinfo(
    http: &reqwest::Client,
    userinfo_url: &str,
    access_token: &str,
) -> Result<ExternalIdentity, OAuthError> {
    let resp = http
        .get(userinfo_url)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| OAuthError::IdentityFetchFailed(format!("request failed: {e}")))?;

    if resp.status() != reqwest::StatusCode::OK {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(OAuthError::IdentityFetchFailed(format!(
            "userinfo endpoint returned HTTP {status}: {body}"
        )));
    }

    let identity: ExternalIdentity = resp
        .json()
        .await
        .map_err(|e| OAuthError::IdentityFetchFailed(format!("unparseable body: {e}")))?;

    identity.ensure_complete()?;
    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn base() -> ExternalIdentity {
        ExternalIdentity {
            sub: "sub-1".to_string(),
            email: "a@b.com".to_string(),
            email_verified: true,
            name: None,
            given_name: None,
            family_name: None,
            picture: None,
        }
    }

    #[test]
    fn display_name_prefers_name() {
        let identity = ExternalIdentity {
            name: Some("Alice".to_string()),
            given_name: Some("Al".to_string()),
            family_name: Some("Ice".to_string()),
            ..base()
        };
        assert_eq!(identity.display_name(), "Alice");
    }

    #[test]
    fn display_name_falls_back_to_given_family_then_email() {
        let identity = ExternalIdentity {
            given_name: Some("Al".to_string()),
            family_name: Some("Ice".to_string()),
            ..base()
        };
        assert_eq!(identity.display_name(), "Al Ice");
        assert_eq!(base().display_name(), "a@b.com");
    }

    #[test]
    fn unverified_email_is_incomplete() {
        let identity = ExternalIdentity {
            email_verified: false,
            ..base()
        };
        assert!(matches!(
            identity.ensure_complete(),
            Err(OAuthError::IdentityIncomplete("email not verified"))
        ));
    }

    #[test]
    fn missing_subject_is_incomplete() {
        let identity = ExternalIdentity {
            sub: String::new(),
            ..base()
        };
        assert!(identity.ensure_complete().is_err());
    }

    #[tokio::test]
    async fn fetch_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .and(header("authorization", "Bearer upstream-at"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sub": "1234567890",
                "email": "alice@example.com",
                "email_verified": true,
                "name": "Alice Example",
                "picture": "https://example.com/alice.png"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let identity = fetch_userinfo(
            &reqwest::Client::new(),
            &format!("{}/userinfo", server.uri()),
            "upstream-at",
        )
        .await
        .expect("userinfo");
        assert_eq!(identity.sub, "1234567890");
        assert_eq!(identity.email, "alice@example.com");
        assert_eq!(identity.display_name(), "Alice Example");
    }

    #[tokio::test]
    async fn non_200_is_a_fetch_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = fetch_userinfo(
            &reqwest::Client::new(),
            &format!("{}/userinfo", server.uri()),
            "expired",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, OAuthError::IdentityFetchFailed(_)));
    }
}
