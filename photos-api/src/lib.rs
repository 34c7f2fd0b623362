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

//! Photos backend authentication and session library.
//!
//! This crate provides the Axum router, application state, token codec and
//! configuration for the photos auth service. The binary entry point
//! (`main.rs`) is a thin wrapper that calls into this library.

pub mod auth;
pub mod config;
pub mod cookies;
pub mod db;
pub mod error;
pub mod oauth;
pub mod revocation;
pub mod routes;
pub mod state;
pub mod token;
