//! Background Tasks Module
//!
//! Contains the background task that runs for the lifetime of a cache.
//!
//! # Tasks
//! - Eviction listener: drains removal notifications into an [`EvictionListener`]

mod notifier;

pub(crate) use notifier::{spawn_listener, Delivery, NotificationSender};
pub use notifier::{EvictionListener, ListenerHandle, LoggingListener, Notification, RemovalCause};
