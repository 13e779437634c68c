//! Cache Entry Module
//!
//! Defines the stored value with its TTL and creation time.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

// == Value ==
/// A stored payload with TTL metadata.
///
/// TTL and creation time are fixed for the lifetime of the value; only the
/// payload can be replaced, and only by the owning cache.
#[derive(Debug, Clone)]
pub struct Value<V> {
    payload: V,
    ttl: Duration,
    created_at: DateTime<Utc>,
    /// None when `created_at + ttl` is beyond the representable range
    expires_at: Option<DateTime<Utc>>,
}

impl<V> Value<V> {
    // == Constructor ==
    /// Creates a new value stamped with the current wall-clock time.
    pub fn new(payload: V, ttl: Duration) -> Self {
        Self::created_at(payload, ttl, Utc::now())
    }

    /// Creates a value with an explicit creation time.
    pub fn created_at(payload: V, ttl: Duration, created_at: DateTime<Utc>) -> Self {
        let expires_at = TimeDelta::from_std(ttl)
            .ok()
            .and_then(|ttl| created_at.checked_add_signed(ttl));

        Self {
            payload,
            ttl,
            created_at,
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks expiry against `now`.
    ///
    /// Strict comparison: a value is still live at exactly `created_at + ttl`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires) => now > expires,
            None => false,
        }
    }

    /// Checks expiry against the current wall-clock time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    // == Time To Live ==
    /// Returns remaining time before expiry, zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        match self.expires_at {
            Some(expires) => (expires - Utc::now()).to_std().unwrap_or(Duration::ZERO),
            None => self.ttl,
        }
    }

    pub fn payload(&self) -> &V {
        &self.payload
    }

    pub fn into_payload(self) -> V {
        self.payload
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn creation_time(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Replaces the payload, keeping TTL and creation time.
    pub(crate) fn replace_payload(&mut self, payload: V) -> V {
        std::mem::replace(&mut self.payload, payload)
    }
}
