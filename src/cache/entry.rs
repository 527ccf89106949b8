//! Cache Entry Module
//!
//! Defines the persisted envelope of a cached value.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::Ttl;

// == Cache Entry ==
/// A stored value and the moment it was written.
///
/// Entries are never modified in place: a later `put` replaces the whole
/// envelope, so `stored_at` always reflects the write that produced `payload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Write timestamp (UTC)
    pub stored_at: DateTime<Utc>,
    /// The stored value, opaque to the store
    pub payload: Value,
}

impl CacheEntry {
    // == Constructor ==
    pub fn new(payload: Value, stored_at: DateTime<Utc>) -> Self {
        Self { stored_at, payload }
    }

    // == Is Fresh ==
    /// Checks whether the entry is still valid at `now`.
    ///
    /// Boundary condition: once `now - stored_at` reaches the TTL the entry is
    /// stale. A zero TTL never expires.
    pub fn is_fresh(&self, ttl: Ttl, now: DateTime<Utc>) -> bool {
        if ttl.never_expires() {
            return true;
        }
        match ttl_delta(ttl) {
            Some(limit) => now.signed_duration_since(self.stored_at) < limit,
            // Beyond the representable range: nothing can be that old.
            None => true,
        }
    }

    // == Expires At ==
    /// Returns `stored_at + ttl`, saturating at the latest representable time.
    pub fn expires_at(&self, ttl: Ttl) -> DateTime<Utc> {
        ttl_delta(ttl)
            .and_then(|delta| self.stored_at.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

fn ttl_delta(ttl: Ttl) -> Option<TimeDelta> {
    i64::try_from(ttl.as_secs())
        .ok()
        .and_then(TimeDelta::try_seconds)
}
