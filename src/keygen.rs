//! Key Generation Module
//!
//! Supplies process-unique keys for `put_generated`.

use uuid::Uuid;

/// Source of unique cache keys.
///
/// Implementations must make collisions negligible; the cache does not
/// check generated keys against existing entries.
pub trait KeyGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random 128-bit (UUID v4) keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidKeyGenerator;

impl KeyGenerator for UuidKeyGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
