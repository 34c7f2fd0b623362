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

//! Session and OAuth-state cookies.
//!
//! All cookies are `HttpOnly; SameSite=Lax; Path=/`, `Secure` outside
//! development, and carry the configured `Domain` when one is set. JavaScript
//! never sees any of them; the browser sends them automatically.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

/// Single-use anti-CSRF state for the OAuth handshake.
pub const STATE_COOKIE: &str = "oauthstate";
/// Access token.
pub const ACCESS_COOKIE: &str = "auth_token";
/// Refresh token.
pub const REFRESH_COOKIE: &str = "refresh_token";

/// The state cookie outlives any reasonable consent screen, nothing more.
pub const STATE_TTL_SECS: i64 = 10 * 60;

/// Attributes shared by every cookie the service sets.
#[derive(Debug, Clone, Default)]
pub struct CookieSettings {
    pub secure: bool,
    pub domain: Option<String>,
}

impl CookieSettings {
    pub fn new(secure: bool, domain: Option<String>) -> Self {
        Self { secure, domain }
    }

    fn build(&self, name: &'static str, value: String, max_age_secs: i64) -> Cookie<'static> {
        let mut builder = Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(Duration::seconds(max_age_secs));
        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.clone());
        }
        builder.build()
    }

    pub fn state(&self, state: &str) -> Cookie<'static> {
        self.build(STATE_COOKIE, state.to_string(), STATE_TTL_SECS)
    }

    pub fn access(&self, token: &str, ttl_secs: i64) -> Cookie<'static> {
        self.build(ACCESS_COOKIE, token.to_string(), ttl_secs)
    }

    pub fn refresh(&self, token: &str, ttl_secs: i64) -> Cookie<'static> {
        self.build(REFRESH_COOKIE, token.to_string(), ttl_secs)
    }

    /// An empty, already-expired cookie that makes the browser drop `name`.
    ///
    /// Built explicitly rather than through `CookieJar::remove`, which only
    /// emits a removal for cookies present on the incoming request.
    pub fn clear(&self, name: &'static str) -> Cookie<'static> {
        self.build(name, String::new(), 0)
    }
}

/// Read a non-empty cookie value from the request jar.
pub fn non_empty(jar: &axum_extra::extract::CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_cookie_attributes() {
        let settings = CookieSettings::new(true, Some(".example.com".to_string()));
        let rendered = settings.access("jwt", 3600).to_string();
        assert!(rendered.starts_with("auth_token=jwt"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Secure"));
        assert!(rendered.contains("Path=/"));
        assert!(rendered.contains("Domain=example.com") || rendered.contains("Domain=.example.com"));
        assert!(rendered.contains("Max-Age=3600"));
    }

    #[test]
    fn development_cookies_are_not_secure() {
        let rendered = CookieSettings::new(false, None).state("abc").to_string();
        assert!(rendered.starts_with("oauthstate=abc"));
        assert!(!rendered.contains("Secure"));
        assert!(!rendered.contains("Domain"));
        assert!(rendered.contains("Max-Age=600"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let rendered = CookieSettings::default().clear(REFRESH_COOKIE).to_string();
        assert!(rendered.starts_with("refresh_token=;"));
        assert!(rendered.contains("Max-Age=0"));
    }
}
