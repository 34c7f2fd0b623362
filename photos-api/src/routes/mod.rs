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

//! Axum router configuration for the photos auth API.

#[cfg(feature = "dev-login")]
pub mod dev;
pub mod me;
pub mod oauth;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use photos_api_types::responses::HealthResponse;

use crate::auth::require_session;
use crate::state::AppState;

/// Build the full application router.
///
/// Protected routes sit behind [`require_session`]; the login handshake,
/// refresh and health endpoints are public.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/auth/google/logout", post(oauth::logout))
        .route("/api/me", get(me::me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let public = Router::new()
        .route("/health", get(health))
        .route("/api/auth/google/login", get(oauth::login))
        .route("/api/auth/google/callback", get(oauth::callback))
        .route("/api/auth/google/refresh", post(oauth::refresh));

    let dev_enabled = state.dev_login_enabled;
    with_dev_routes(public.merge(protected), dev_enabled).with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP".to_string(),
    })
}

#[cfg(feature = "dev-login")]
fn with_dev_routes(router: Router<AppState>, enabled: bool) -> Router<AppState> {
    if enabled {
        tracing::warn!("Development login enabled at /api/auth/dev/login");
        router.route("/api/auth/dev/login", post(dev::dev_login))
    } else {
        router
    }
}

#[cfg(not(feature = "dev-login"))]
fn with_dev_routes(router: Router<AppState>, _enabled: bool) -> Router<AppState> {
    router
}
