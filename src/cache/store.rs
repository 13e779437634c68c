//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with recency tracking and
//! lazy TTL expiration. The store itself is not synchronized; see
//! [`Cache`](crate::Cache) for the locked wrapper.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::{CacheStats, NodeId, RecencyIndex, Value};
use crate::config::CacheOptions;
use crate::error::Result;
use crate::tasks::{Delivery, Notification, NotificationSender, RemovalCause};

/// Map entry: the value plus its node in the recency index.
#[derive(Debug)]
struct Slot<V> {
    value: Value<V>,
    node: NodeId,
}

/// Record of an entry the store removed on its own, kept so the caller can
/// log it after releasing the cache lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Removal {
    pub(crate) key: String,
    pub(crate) cause: RemovalCause,
    /// None when no listener is attached
    pub(crate) delivery: Option<Delivery>,
}

impl Removal {
    pub(crate) fn log(&self) {
        match self.cause {
            RemovalCause::Evicted => debug!(key = %self.key, "Evicted least recently used entry"),
            RemovalCause::Expired => debug!(key = %self.key, "Purged expired entry"),
        }

        match self.delivery {
            Some(Delivery::Dropped) => {
                warn!(key = %self.key, "Notification queue full, dropping notification")
            }
            Some(Delivery::Closed) => {
                debug!(key = %self.key, "Eviction listener stopped, discarding notification")
            }
            Some(Delivery::Queued) | None => {}
        }
    }
}

// == Cache Store ==
/// Cache storage with LRU eviction and lazy TTL expiration.
///
/// Every key in `entries` has exactly one node in `index`, so
/// `entries.len() == index.len() <= capacity` between calls.
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, Slot<V>>,
    /// Recency tracker, head is the next eviction victim
    index: RecencyIndex,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    capacity: usize,
    /// TTL for puts that do not specify one
    default_ttl: Duration,
    /// Queue for eviction and expiry notifications
    notifier: Option<NotificationSender<V>>,
    /// Eviction or expiry performed by the last operation
    last_removal: Option<Removal>,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates a new store, validating the options first.
    ///
    /// Fails if the capacity or notification queue size is below 1.
    pub fn new(options: CacheOptions) -> Result<Self> {
        let options = options.validated()?;
        Ok(Self {
            entries: HashMap::with_capacity(options.capacity),
            index: RecencyIndex::with_capacity(options.capacity),
            stats: CacheStats::new(),
            capacity: options.capacity,
            default_ttl: options.default_ttl,
            notifier: None,
            last_removal: None,
        })
    }

    pub(crate) fn with_notifier(
        options: CacheOptions,
        notifier: NotificationSender<V>,
    ) -> Result<Self> {
        Ok(Self {
            notifier: Some(notifier),
            ..Self::new(options)?
        })
    }

    // == Put ==
    /// Stores a key-value pair.
    ///
    /// If the key already exists, the value, TTL and creation time are
    /// replaced and the key becomes most recent. Otherwise, if the cache is
    /// at capacity, the least recently touched entry is evicted first.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Optional TTL (uses default_ttl if None)
    pub fn put(&mut self, key: String, value: V, ttl: Option<Duration>) {
        let value = Value::new(value, ttl.unwrap_or(self.default_ttl));

        if let Some(slot) = self.entries.get_mut(&key) {
            slot.value = value;
            self.index.touch(slot.node);
            return;
        }

        if self.entries.len() >= self.capacity {
            self.collect();
        }

        let node = self.index.insert(key.clone());
        self.entries.insert(key, Slot { value, node });
        self.stats.set_total_entries(self.entries.len());
    }

    // == Update ==
    /// Replaces the payload of a live entry and touches it.
    ///
    /// TTL and creation time are preserved, so the original expiry deadline
    /// still applies. Returns false, without inserting, if the key is
    /// absent or expired; an expired entry is purged.
    pub fn update(&mut self, key: &str, value: V) -> bool {
        if !self.live_or_purge(key) {
            return false;
        }

        match self.entries.get_mut(key) {
            Some(slot) => {
                slot.value.replace_payload(value);
                self.index.touch(slot.node);
                true
            }
            None => false,
        }
    }

    // == Delete ==
    /// Removes an entry by key. No notification is sent.
    ///
    /// Returns true if the key was present.
    pub fn delete(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(slot) => {
                self.index.delete(slot.node);
                self.stats.set_total_entries(self.entries.len());
                true
            }
            None => false,
        }
    }

    // == Contains ==
    /// Checks raw presence without touching or purging.
    ///
    /// An expired entry that has not been accessed yet is still present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Keys from least to most recently touched.
    pub fn recency_order(&self) -> Vec<String> {
        self.index.iter().map(str::to_string).collect()
    }

    // == Length ==
    /// Returns the current number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    #[cfg(test)]
    pub(crate) fn index_len(&self) -> usize {
        self.index.len()
    }

    /// Takes the removal recorded by the most recent operation, if any.
    pub(crate) fn take_removal(&mut self) -> Option<Removal> {
        self.last_removal.take()
    }

    // == Collect ==
    /// Evicts the head of the recency index, expired or not.
    ///
    /// Only called when the cache is full, so the index is never empty here.
    fn collect(&mut self) {
        let Some((node, key)) = self.index.oldest() else {
            return;
        };
        let key = key.to_string();

        self.index.delete(node);
        if let Some(slot) = self.entries.remove(&key) {
            self.stats.record_eviction();
            self.notify(key, slot.value.into_payload(), RemovalCause::Evicted);
        }
    }

    /// Returns true if `key` holds a live entry. An expired entry is removed
    /// from map and index and reported to the listener.
    fn live_or_purge(&mut self, key: &str) -> bool {
        let expired = match self.entries.get(key) {
            Some(slot) => slot.value.is_expired(),
            None => return false,
        };

        if expired {
            if let Some(slot) = self.entries.remove(key) {
                self.index.delete(slot.node);
                self.stats.record_expiration();
                self.stats.set_total_entries(self.entries.len());
                self.notify(key.to_string(), slot.value.into_payload(), RemovalCause::Expired);
            }
            return false;
        }
        true
    }

    fn notify(&mut self, key: String, value: V, cause: RemovalCause) {
        let delivery = self.notifier.as_ref().map(|notifier| {
            notifier.try_notify(Notification {
                key: key.clone(),
                value,
                cause,
            })
        });

        if delivery == Some(Delivery::Dropped) {
            self.stats.record_dropped_notification();
        }
        self.last_removal = Some(Removal {
            key,
            cause,
            delivery,
        });
    }
}

impl<V: Clone> CacheStore<V> {
    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns the value if found and not expired, and makes the key most
    /// recent. Expired entries are removed and counted as misses.
    pub fn get(&mut self, key: &str) -> Option<V> {
        if !self.live_or_purge(key) {
            self.stats.record_miss();
            return None;
        }

        let slot = self.entries.get(key)?;
        self.index.touch(slot.node);
        self.stats.record_hit();
        Some(slot.value.payload().clone())
    }
}
