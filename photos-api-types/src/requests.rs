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

//! Request types for the auth endpoints.

use serde::{Deserialize, Serialize};

/// Query parameters the identity provider appends to the callback URL.
///
/// Every field is optional so that the handler, not the extractor, decides
/// which absence is an error and with which status.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CallbackQuery {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    /// Set by the provider when the user denied consent or the request was bad.
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Request body for `POST /api/auth/dev/login`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DevLoginRequest {
    pub email: String,
    /// Display name. Defaults to `"Dev User"` when omitted or empty.
    #[serde(default)]
    pub name: Option<String>,
}
