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

//! `GET /api/me`: the caller's identity as carried by the access token.

use axum::{extract::State, Json};
use photos_api_types::responses::MeResponse;

use crate::auth::AuthUser;
use crate::state::AppState;

/// Below this remaining lifetime the client is told to refresh.
const REFRESH_THRESHOLD_MINUTES: i64 = 5;

/// Answered from the claims alone, without a user lookup.
pub async fn me(State(state): State<AppState>, AuthUser(claims): AuthUser) -> Json<MeResponse> {
    let refresh_recommended = state.codec.is_about_to_expire(
        &claims,
        chrono::Duration::minutes(REFRESH_THRESHOLD_MINUTES),
    );
    Json(MeResponse {
        user_id: claims.user_id,
        email: claims.email,
        name: claims.name,
        picture_url: claims.picture_url,
        expires_at: claims.exp,
        refresh_recommended,
    })
}
