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

//! Photos auth API server entry point.
//!
//! A standalone Axum service handling Google login, session tokens and
//! logout for the photos SPA.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use photos_api::config::Config;
use photos_api::db::memory::MemoryUserStore;
use photos_api::db::users::PgUserStore;
use photos_api::db::UserStore;
use photos_api::routes;
use photos_api::state::AppState;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

/// How often expired revocation entries are swept.
const REVOCATION_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is normal outside local development.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().inspect_err(|e| {
        tracing::error!("Invalid configuration: {e}");
    })?;
    tracing::info!("Starting photos-api ({})", config.environment);

    let users: Arc<dyn UserStore> = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(20)
                .connect(url)
                .await?;
            tracing::info!("Connected to PostgreSQL");
            sqlx::migrate!("./migrations").run(&pool).await?;
            Arc::new(PgUserStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, users are kept in memory");
            Arc::new(MemoryUserStore::new())
        }
    };

    let state = AppState::new(&config, users)?;

    let revocations = Arc::clone(&state.revocations);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(REVOCATION_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            let purged = revocations.purge_expired();
            if purged > 0 {
                tracing::debug!("Purged {purged} expired revocation entries");
            }
        }
    });

    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_str(&config.frontend_url)?)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    let app = routes::router(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    tracing::info!("photos-api listening on {}", config.listen_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
