//! kvcache demo runner
//!
//! Builds a cache from environment configuration, runs a short workload
//! that exercises eviction and expiry, and shuts the listener down.

use std::time::Duration;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kvcache::{Cache, Config, LoggingListener, PutOptions};

/// Main entry point.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache with a logging eviction listener
/// 4. Run the workload and print statistics
/// 5. Stop the listener and wait for it
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kvcache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: capacity={}, default_ttl={}s, notify_queue={}",
        config.capacity, config.default_ttl, config.notify_queue_size
    );

    let (cache, listener) = Cache::<usize>::with_listener(config.cache_options()?, LoggingListener)?;

    // Overfill by one to force a single eviction
    for i in 0..=cache.capacity() {
        cache.put(format!("key-{}", i), i);
    }

    let generated = cache.put_generated_with(0, PutOptions::with_ttl(Duration::ZERO));
    tokio::time::sleep(Duration::from_millis(10)).await;
    if cache.get(&generated).is_none() {
        info!(key = %generated, "Short-lived entry expired");
    }

    let stats = cache.stats();
    info!(
        "Stats: entries={}, evictions={}, expirations={}, hit_rate={:.2}",
        stats.total_entries,
        stats.evictions,
        stats.expirations,
        stats.hit_rate()
    );

    listener.shutdown().await;
    info!("Shutdown complete");
    Ok(())
}
