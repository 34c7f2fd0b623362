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

//! In-memory denylist of session tokens revoked before their natural expiry.
//!
//! Entries live until the token would have expired anyway; after that they
//! are inert and get dropped either on lookup or by [`RevocationStore::purge_expired`].
//! The store is process-local: a restart forgets every revocation.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

/// Revoked token string → instant at which the entry stops mattering.
#[derive(Debug, Default)]
pub struct RevocationStore {
    entries: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl RevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `token` as revoked until `expires_at`, then sweep stale entries.
    pub fn insert(&self, token: &str, expires_at: DateTime<Utc>) {
        let mut entries = self.lock();
        entries.insert(token.to_string(), expires_at);
        let now = Utc::now();
        entries.retain(|_, exp| *exp > now);
    }

    /// `true` while `token` is revoked. An expired entry is removed and
    /// reported as not revoked.
    pub fn contains(&self, token: &str) -> bool {
        let mut entries = self.lock();
        match entries.get(token) {
            Some(exp) if *exp > Utc::now() => true,
            Some(_) => {
                entries.remove(token);
                false
            }
            None => false,
        }
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        let now = Utc::now();
        entries.retain(|_, exp| *exp > now);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave the map half-updated, so a
    // poisoned mutex is still safe to use.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, DateTime<Utc>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}
