//! Shared Cache Module
//!
//! Thread-safe cache handle: one lock around a [`CacheStore`], plus key
//! generation and the optional eviction listener.

use std::fmt;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::info;

use crate::cache::{CacheStats, CacheStore};
use crate::config::{CacheOptions, PutOptions};
use crate::error::Result;
use crate::keygen::{KeyGenerator, UuidKeyGenerator};
use crate::tasks::{spawn_listener, EvictionListener, ListenerHandle};

// == Cache ==
/// Bounded key/value cache with per-entry TTL and LRU eviction.
///
/// Every operation takes a single mutex for its whole duration, so each
/// one is atomic with respect to the others. No operation blocks on I/O.
/// Share between threads with `Arc<Cache<V>>`.
pub struct Cache<V> {
    store: Mutex<CacheStore<V>>,
    keys: Box<dyn KeyGenerator>,
}

impl<V> fmt::Debug for Cache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let store = self.store.lock();
        f.debug_struct("Cache")
            .field("capacity", &store.capacity())
            .field("len", &store.len())
            .finish()
    }
}

impl<V: Clone + Send + 'static> Cache<V> {
    // == Constructors ==
    /// Creates a cache without an eviction listener.
    ///
    /// Fails if the capacity is below 1.
    pub fn new(options: CacheOptions) -> Result<Self> {
        let options = options.validated()?;
        info!(
            capacity = options.capacity,
            default_ttl_secs = options.default_ttl.as_secs(),
            "Cache created"
        );

        Ok(Self {
            store: Mutex::new(CacheStore::new(options)?),
            keys: Box::new(UuidKeyGenerator),
        })
    }

    /// Creates a cache whose evictions and expiries are delivered to
    /// `listener` on a background task.
    ///
    /// Must be called inside a tokio runtime. Stop the task with
    /// [`ListenerHandle::shutdown`].
    pub fn with_listener<L>(options: CacheOptions, listener: L) -> Result<(Self, ListenerHandle)>
    where
        L: EvictionListener<V>,
    {
        let options = options.validated()?;
        let (notifier, handle) = spawn_listener(listener, options.notify_queue_size)?;
        info!(
            capacity = options.capacity,
            queue_size = options.notify_queue_size,
            "Cache created with eviction listener"
        );

        let cache = Self {
            store: Mutex::new(CacheStore::with_notifier(options, notifier)?),
            keys: Box::new(UuidKeyGenerator),
        };
        Ok((cache, handle))
    }

    /// Replaces the key generator used by `put_generated`.
    pub fn with_key_generator(mut self, keys: impl KeyGenerator + 'static) -> Self {
        self.keys = Box::new(keys);
        self
    }

    // == Put ==
    /// Stores a value under `key` with the default TTL.
    pub fn put(&self, key: impl Into<String>, value: V) {
        self.put_with(key, value, PutOptions::default());
    }

    /// Stores a value under `key` with explicit options.
    pub fn put_with(&self, key: impl Into<String>, value: V, options: PutOptions) {
        self.with_store(|store| store.put(key.into(), value, options.ttl));
    }

    /// Stores a value under a freshly generated key and returns the key.
    pub fn put_generated(&self, value: V) -> String {
        self.put_generated_with(value, PutOptions::default())
    }

    pub fn put_generated_with(&self, value: V, options: PutOptions) -> String {
        let key = self.keys.generate();
        self.with_store(|store| store.put(key.clone(), value, options.ttl));
        key
    }

    // == Get ==
    /// Returns a clone of the live value for `key` and marks it most recent.
    ///
    /// An expired entry is purged and reported as `None`.
    pub fn get(&self, key: &str) -> Option<V> {
        self.with_store(|store| store.get(key))
    }

    // == Update ==
    /// Replaces the payload of a live entry, keeping its expiry deadline.
    ///
    /// Returns false for absent or expired keys; nothing is inserted.
    pub fn update(&self, key: &str, value: V) -> bool {
        self.with_store(|store| store.update(key, value))
    }

    // == Delete ==
    /// Removes `key` if present. Returns true if it was.
    pub fn delete(&self, key: &str) -> bool {
        self.store.lock().delete(key)
    }

    // == Inspection ==
    /// Raw presence check; does not touch recency or purge expired entries.
    pub fn contains_key(&self, key: &str) -> bool {
        self.store.lock().contains_key(key)
    }

    /// Number of stored entries, including expired ones not yet accessed.
    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.store.lock().capacity()
    }

    pub fn default_ttl(&self) -> Duration {
        self.store.lock().default_ttl()
    }

    pub fn stats(&self) -> CacheStats {
        self.store.lock().stats()
    }

    /// Keys from least to most recently touched.
    pub fn recency_order(&self) -> Vec<String> {
        self.store.lock().recency_order()
    }

    /// Runs `op` under the lock, then logs any eviction or expiry once the
    /// lock is released.
    fn with_store<R>(&self, op: impl FnOnce(&mut CacheStore<V>) -> R) -> R {
        let (result, removal) = {
            let mut store = self.store.lock();
            let result = op(&mut *store);
            (result, store.take_removal())
        };

        if let Some(removal) = removal {
            removal.log();
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use crate::tasks::{Notification, RemovalCause};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    struct SequentialKeys(AtomicUsize);

    impl KeyGenerator for SequentialKeys {
        fn generate(&self) -> String {
            format!("key-{}", self.0.fetch_add(1, Ordering::SeqCst))
        }
    }

    fn cache(capacity: usize) -> Cache<String> {
        Cache::new(CacheOptions::new(capacity)).unwrap()
    }

    #[test]
    fn test_cache_rejects_zero_capacity() {
        let result = Cache::<String>::new(CacheOptions::new(0));
        assert!(matches!(result, Err(CacheError::InvalidCapacity(0))));
    }

    #[test]
    fn test_cache_put_get() {
        let cache = cache(10);

        cache.put("key1", "value1".to_string());

        assert_eq!(cache.get("key1"), Some("value1".to_string()));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.capacity(), 10);
    }

    #[test]
    fn test_cache_put_with_ttl() {
        let cache = cache(10);

        cache.put_with(
            "key1",
            "value1".to_string(),
            PutOptions::with_ttl(Duration::from_secs(1)),
        );
        assert!(cache.get("key1").is_some());

        thread::sleep(Duration::from_millis(1100));

        assert_eq!(cache.get("key1"), None);
        assert!(!cache.contains_key("key1"));
    }

    #[test]
    fn test_put_generated_returns_stored_key() {
        let cache = cache(10);

        let key = cache.put_generated("value".to_string());

        assert!(!key.is_empty());
        assert_eq!(cache.get(&key), Some("value".to_string()));
    }

    #[test]
    fn test_put_generated_keys_are_distinct() {
        let cache = cache(1000);

        let keys: HashSet<String> = (0..1000)
            .map(|i| cache.put_generated(i.to_string()))
            .collect();

        assert_eq!(keys.len(), 1000);
        assert_eq!(cache.len(), 1000);
    }

    #[test]
    fn test_custom_key_generator() {
        let cache = cache(10).with_key_generator(SequentialKeys(AtomicUsize::new(0)));

        assert_eq!(cache.put_generated("a".to_string()), "key-0");
        assert_eq!(cache.put_generated("b".to_string()), "key-1");
        assert_eq!(cache.get("key-1"), Some("b".to_string()));
    }

    #[test]
    fn test_cache_update_and_delete() {
        let cache = cache(10);

        assert!(!cache.update("key1", "value".to_string()));
        assert!(cache.is_empty());

        cache.put("key1", "value1".to_string());
        assert!(cache.update("key1", "value2".to_string()));
        assert_eq!(cache.get("key1"), Some("value2".to_string()));

        assert!(cache.delete("key1"));
        assert!(!cache.delete("key1"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_puts_respect_capacity() {
        let cache = Arc::new(cache(50));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for i in 0..200 {
                        cache.put(format!("{}-{}", t, i), i.to_string());
                        cache.get(&format!("{}-{}", t, i / 2));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 50);
        assert_eq!(cache.recency_order().len(), 50);
        assert_eq!(cache.stats().evictions, 8 * 200 - 50);
    }

    #[tokio::test]
    async fn test_listener_sees_evictions_not_deletes() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();
        let (cache, handle) = Cache::<String>::with_listener(CacheOptions::new(2), move |n: Notification<String>| {
            sink.lock().unwrap().push((n.key, n.value, n.cause));
        })
        .unwrap();

        cache.put("a", "1".to_string());
        cache.put("b", "2".to_string());
        cache.delete("b");
        cache.put("c", "3".to_string());
        cache.put("d", "4".to_string());

        handle.shutdown().await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![("a".to_string(), "1".to_string(), RemovalCause::Evicted)]
        );
    }

    #[tokio::test]
    async fn test_listener_sees_expiry() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();
        let (cache, handle) = Cache::<String>::with_listener(CacheOptions::new(2), move |n: Notification<String>| {
            sink.lock().unwrap().push((n.key, n.cause));
        })
        .unwrap();

        cache.put_with("a", "1".to_string(), PutOptions::with_ttl(Duration::ZERO));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get("a"), None);

        handle.shutdown().await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![("a".to_string(), RemovalCause::Expired)]
        );
    }

    #[tokio::test]
    async fn test_expired_head_reported_as_eviction() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();
        let (cache, handle) = Cache::<String>::with_listener(
            CacheOptions::new(2),
            move |n: Notification<String>| sink.lock().unwrap().push((n.key, n.cause)),
        )
        .unwrap();

        cache.put_with("stale", "old".to_string(), PutOptions::with_ttl(Duration::ZERO));
        cache.put("live", "value".to_string());
        tokio::time::sleep(Duration::from_millis(20)).await;

        cache.put("new", "value".to_string());

        let stats = cache.stats();
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.expirations, 0);

        handle.shutdown().await;

        assert!(!cache.contains_key("stale"));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![("stale".to_string(), RemovalCause::Evicted)]
        );
    }

    #[tokio::test]
    async fn test_full_notification_queue_does_not_block() {
        let (cache, handle) = Cache::<String>::with_listener(
            CacheOptions::new(1).notify_queue_size(1),
            |_: Notification<String>| {},
        )
        .unwrap();

        // No await between puts: the listener cannot drain the queue
        for i in 0..10 {
            cache.put(i.to_string(), i.to_string());
        }

        let stats = cache.stats();
        assert_eq!(stats.evictions, 9);
        assert_eq!(stats.dropped_notifications, 8);

        handle.shutdown().await;
    }

    #[test]
    fn test_listener_requires_runtime() {
        let result = Cache::<String>::with_listener(CacheOptions::new(2), |_: Notification<String>| {});
        assert!(matches!(result, Err(CacheError::NoRuntime)));
    }
}
