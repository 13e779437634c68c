//! Eviction Notification Task
//!
//! Bounded queue of eviction and expiration events, drained by one
//! background task that hands each event to a pluggable listener.

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::{CacheError, Result};

// == Notification ==
/// Why an entry left the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalCause {
    /// Evicted as least recently touched to make room
    Evicted,
    /// Found expired on access
    Expired,
}

/// An entry that was removed by the cache itself (never by `delete`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification<V> {
    pub key: String,
    pub value: V,
    pub cause: RemovalCause,
}

// == Listener ==
/// Consumer of removal notifications.
///
/// Runs on the background task, never under the cache lock. Closures of the
/// shape `FnMut(Notification<V>)` are listeners too.
pub trait EvictionListener<V>: Send + 'static {
    fn on_notification(&mut self, notification: Notification<V>);
}

impl<V, F> EvictionListener<V> for F
where
    F: FnMut(Notification<V>) + Send + 'static,
{
    fn on_notification(&mut self, notification: Notification<V>) {
        self(notification)
    }
}

/// Listener that only logs each notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingListener;

impl<V> EvictionListener<V> for LoggingListener {
    fn on_notification(&mut self, notification: Notification<V>) {
        info!(
            key = %notification.key,
            cause = ?notification.cause,
            "Cache entry removed"
        );
    }
}

// == Sender ==
/// Outcome of a non-blocking enqueue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delivery {
    Queued,
    /// Queue full, the new notification was dropped
    Dropped,
    /// Listener already stopped
    Closed,
}

/// Producer half, owned by the cache store.
#[derive(Debug)]
pub(crate) struct NotificationSender<V> {
    tx: mpsc::Sender<Notification<V>>,
}

impl<V> NotificationSender<V> {
    /// Queues a notification without blocking or logging, since it runs
    /// under the cache lock.
    pub(crate) fn try_notify(&self, notification: Notification<V>) -> Delivery {
        match self.tx.try_send(notification) {
            Ok(()) => Delivery::Queued,
            Err(TrySendError::Full(_)) => Delivery::Dropped,
            Err(TrySendError::Closed(_)) => Delivery::Closed,
        }
    }
}

// == Listener Handle ==
/// Lifecycle handle for the background listener task.
///
/// Dropping the handle detaches the task; it then runs until the cache is
/// dropped. Call [`shutdown`](Self::shutdown) to stop it explicitly.
#[derive(Debug)]
#[must_use = "dropping the handle detaches the listener; call `shutdown` to stop it"]
pub struct ListenerHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl ListenerHandle {
    /// Stops the listener after it drains already-queued notifications, and
    /// waits for the task to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Err(e) = (&mut self.handle).await {
            warn!("Eviction listener task failed: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Spawns the listener task on the current tokio runtime.
///
/// # Arguments
/// * `listener` - Consumer for every queued notification
/// * `queue_size` - Bound of the notification queue
///
/// Fails with [`CacheError::NoRuntime`] outside a tokio runtime.
pub(crate) fn spawn_listener<V, L>(
    listener: L,
    queue_size: usize,
) -> Result<(NotificationSender<V>, ListenerHandle)>
where
    V: Send + 'static,
    L: EvictionListener<V>,
{
    if queue_size < 1 {
        return Err(CacheError::InvalidQueueSize(queue_size));
    }
    let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;

    let (tx, rx) = mpsc::channel(queue_size);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle = runtime.spawn(run_listener(listener, rx, shutdown_rx));

    Ok((
        NotificationSender { tx },
        ListenerHandle {
            shutdown_tx: Some(shutdown_tx),
            handle,
        },
    ))
}

async fn run_listener<V, L>(
    mut listener: L,
    mut rx: mpsc::Receiver<Notification<V>>,
    mut shutdown_rx: oneshot::Receiver<()>,
) where
    L: EvictionListener<V>,
{
    info!("Starting eviction listener");
    let mut detached = false;

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Some(notification) => listener.on_notification(notification),
                // Every sender is gone: the cache was dropped
                None => break,
            },
            signal = &mut shutdown_rx, if !detached => {
                if signal.is_err() {
                    detached = true;
                    continue;
                }

                rx.close();
                while let Some(notification) = rx.recv().await {
                    listener.on_notification(notification);
                }
                break;
            }
        }
    }

    info!("Eviction listener stopped");
}
