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

//! Application configuration loaded from environment variables.
//!
//! An optional `.env` file in the working directory is loaded first (see
//! `main.rs`); real environment variables take precedence over it.

use std::env;
use std::fmt;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;
use thiserror::Error;

/// Errors that prevent the server from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Deployment environment. Controls cookie security, bearer-token fallback
/// and whether development-only routes are mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::Invalid {
                name: "ENVIRONMENT",
                reason: format!("unknown environment '{other}'"),
            }),
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        };
        f.write_str(name)
    }
}

/// How `GET /api/auth/google/login` hands the authorization URL to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginResponseMode {
    /// `200 {"auth_url": "..."}`; the SPA navigates itself.
    Json,
    /// `307` straight to the identity provider.
    Redirect,
}

impl LoginResponseMode {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LoginResponseMode::Json),
            "redirect" => Ok(LoginResponseMode::Redirect),
            other => Err(ConfigError::Invalid {
                name: "LOGIN_RESPONSE_MODE",
                reason: format!("expected 'json' or 'redirect', got '{other}'"),
            }),
        }
    }
}

/// Configuration for the photos API server.
#[derive(Clone)]
pub struct Config {
    pub environment: Environment,
    /// Address to bind the HTTP server (e.g. "0.0.0.0:8080").
    pub listen_addr: String,
    /// PostgreSQL connection string. `None` is only accepted in development,
    /// where users are then kept in memory.
    pub database_url: Option<String>,
    /// HMAC secret for access tokens.
    pub jwt_secret: String,
    /// HMAC secret for refresh tokens. Independent of `jwt_secret`.
    pub jwt_refresh_secret: String,
    /// Access-token lifetime. Refresh tokens live seven times longer.
    pub token_duration: Duration,
    pub oauth: OAuthConfig,
    /// Where the browser is sent after a successful login; also the CORS origin.
    pub frontend_url: String,
    /// Cookie domain (optional, e.g. ".example.com").
    pub cookie_domain: Option<String>,
    pub login_response_mode: LoginResponseMode,
    /// Accept `Authorization: Bearer` when the access cookie is absent.
    /// Only ever `true` in development.
    pub allow_bearer_auth: bool,
}

// Secrets stay out of logs even when the config is debug-printed.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("environment", &self.environment)
            .field("listen_addr", &self.listen_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("token_duration", &self.token_duration)
            .field("oauth", &self.oauth)
            .field("frontend_url", &self.frontend_url)
            .field("cookie_domain", &self.cookie_domain)
            .field("login_response_mode", &self.login_response_mode)
            .field("allow_bearer_auth", &self.allow_bearer_auth)
            .finish_non_exhaustive()
    }
}

/// Google OAuth configuration.
#[derive(Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("redirect_url", &self.redirect_url)
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("userinfo_url", &self.userinfo_url)
            .finish_non_exhaustive()
    }
}

pub const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

const DEFAULT_TOKEN_DURATION: Duration = Duration::from_secs(24 * 60 * 60);
/// Upper bound for `TOKEN_DURATION`; refresh tokens live seven times longer.
pub const MAX_TOKEN_DURATION: Duration = Duration::from_secs(365 * 24 * 60 * 60);

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Required
    /// - `JWT_SECRET`
    /// - `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET` (outside development)
    /// - `DATABASE_URL` (outside development)
    ///
    /// # Optional
    /// - `ENVIRONMENT` (default: `"development"`)
    /// - `SERVER_HOST` / `SERVER_PORT` (default: `0.0.0.0:8080`)
    /// - `PUBLIC_SCHEME` / `PUBLIC_HOST` / `PUBLIC_PORT` (default:
    ///   `http://127.0.0.1:8080`), used to build the OAuth redirect URL
    /// - `JWT_REFRESH_SECRET` (random per process when unset)
    /// - `TOKEN_DURATION` (default: `"24h"`)
    /// - `OAUTH_REDIRECT_URL`, `OAUTH_AUTH_URL`, `OAUTH_TOKEN_URL`, `OAUTH_USERINFO_URL`
    /// - `FRONTEND_URL` (default: `"http://localhost:5173"`)
    /// - `COOKIE_DOMAIN`
    /// - `LOGIN_RESPONSE_MODE` (`json` | `redirect`, default: `json`)
    /// - `ALLOW_BEARER_AUTH` (default: on in development, ignored elsewhere)
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::parse(&var_or("ENVIRONMENT", "development"))?;

        let jwt_secret = non_empty_var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let jwt_refresh_secret = match non_empty_var("JWT_REFRESH_SECRET") {
            Some(secret) => secret,
            None => {
                tracing::warn!(
                    "JWT_REFRESH_SECRET not set, using a random per-process secret. \
                     Refresh tokens will not survive a restart or work across instances."
                );
                generate_secret()
            }
        };
        if jwt_refresh_secret == jwt_secret {
            tracing::warn!("JWT_REFRESH_SECRET equals JWT_SECRET; access and refresh keys are not separated");
        }

        let token_duration = match non_empty_var("TOKEN_DURATION") {
            Some(raw) => parse_duration(&raw).map_err(|reason| ConfigError::Invalid {
                name: "TOKEN_DURATION",
                reason,
            })?,
            None => DEFAULT_TOKEN_DURATION,
        };

        let listen_addr = format!(
            "{}:{}",
            var_or("SERVER_HOST", "0.0.0.0"),
            var_or("SERVER_PORT", "8080")
        );

        let database_url = non_empty_var("DATABASE_URL");
        if database_url.is_none() && !environment.is_development() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let oauth = OAuthConfig::from_env(environment)?;

        let login_response_mode = match non_empty_var("LOGIN_RESPONSE_MODE") {
            Some(raw) => LoginResponseMode::parse(&raw)?,
            None => LoginResponseMode::Json,
        };

        let bearer_requested = match non_empty_var("ALLOW_BEARER_AUTH") {
            Some(raw) => parse_bool("ALLOW_BEARER_AUTH", &raw)?,
            None => environment.is_development(),
        };
        if bearer_requested && !environment.is_development() {
            tracing::warn!(
                "ALLOW_BEARER_AUTH is ignored in {environment}; browser routes accept cookies only"
            );
        }

        Ok(Self {
            environment,
            listen_addr,
            database_url,
            jwt_secret,
            jwt_refresh_secret,
            token_duration,
            oauth,
            frontend_url: var_or("FRONTEND_URL", "http://localhost:5173"),
            cookie_domain: non_empty_var("COOKIE_DOMAIN"),
            login_response_mode,
            allow_bearer_auth: bearer_requested && environment.is_development(),
        })
    }
}

impl OAuthConfig {
    fn from_env(environment: Environment) -> Result<Self, ConfigError> {
        let client_id = non_empty_var("GOOGLE_CLIENT_ID");
        let client_secret = non_empty_var("GOOGLE_CLIENT_SECRET");
        let (client_id, client_secret) = match (client_id, client_secret) {
            (Some(id), Some(secret)) => (id, secret),
            (id, secret) if environment.is_development() => {
                tracing::warn!("Google OAuth credentials incomplete; Google login will fail upstream");
                (id.unwrap_or_default(), secret.unwrap_or_default())
            }
            (None, _) => return Err(ConfigError::Missing("GOOGLE_CLIENT_ID")),
            (Some(_), None) => return Err(ConfigError::Missing("GOOGLE_CLIENT_SECRET")),
        };

        let redirect_url = non_empty_var("OAUTH_REDIRECT_URL").unwrap_or_else(|| {
            format!(
                "{}://{}:{}/api/auth/google/callback",
                var_or("PUBLIC_SCHEME", "http"),
                var_or("PUBLIC_HOST", "127.0.0.1"),
                var_or("PUBLIC_PORT", "8080"),
            )
        });
        let auth_url = var_or("OAUTH_AUTH_URL", DEFAULT_AUTH_URL);
        url::Url::parse(&auth_url).map_err(|e| ConfigError::Invalid {
            name: "OAUTH_AUTH_URL",
            reason: e.to_string(),
        })?;

        Ok(Self {
            client_id,
            client_secret,
            redirect_url,
            auth_url,
            token_url: var_or("OAUTH_TOKEN_URL", DEFAULT_TOKEN_URL),
            userinfo_url: var_or("OAUTH_USERINFO_URL", DEFAULT_USERINFO_URL),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn var_or(name: &str, default: &str) -> String {
    non_empty_var(name).unwrap_or_else(|| default.to_string())
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            name,
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

/// 32 random bytes, base64-encoded.
fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

/// Parse `"24h"`, `"30m"`, `"90s"`, `"7d"` or a bare number of seconds.
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);
    let value: u64 = digits
        .parse()
        .map_err(|_| format!("'{raw}' does not start with a number"))?;
    let multiplier = match unit {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        other => return Err(format!("unknown unit '{other}' in '{raw}'")),
    };
    if value == 0 {
        return Err("duration must be positive".to_string());
    }
    let secs = value
        .checked_mul(multiplier)
        .filter(|secs| *secs <= MAX_TOKEN_DURATION.as_secs())
        .ok_or_else(|| {
            format!(
                "'{raw}' exceeds the maximum of {}d",
                MAX_TOKEN_DURATION.as_secs() / 86_400
            )
        })?;
    Ok(Duration::from_secs(secs))
}
