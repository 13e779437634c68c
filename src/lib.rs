//! kvcache - An embeddable in-process cache
//!
//! Bounded key/value storage with per-entry TTL expiration (checked lazily
//! on access) and least-recently-used eviction. Evictions and expiries can
//! be observed through an [`EvictionListener`] running on a background task.

pub mod cache;
pub mod config;
pub mod error;
pub mod keygen;
pub mod tasks;

pub use cache::{Cache, CacheStats};
pub use config::{CacheOptions, Config, PutOptions, UNBOUNDED_TTL};
pub use error::{CacheError, Result};
pub use keygen::{KeyGenerator, UuidKeyGenerator};
pub use tasks::{EvictionListener, ListenerHandle, LoggingListener, Notification, RemovalCause};
