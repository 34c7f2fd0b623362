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

//! Shared API types for the photos backend auth/session endpoints.
//!
//! This crate defines the contract between the API server and its consumers
//! (the SPA, integration tests). It is intentionally framework-agnostic:
//! no axum, no database types.

pub mod error;
pub mod requests;
pub mod responses;
pub mod token;

pub use error::ErrorBody;
pub use token::{SessionClaims, TokenKind};
