//! Backend clients for the remote key/value engine.
//!
//! The store depends only on this narrow contract, so any engine speaking a
//! get/set/delete/expire protocol can sit underneath. One production
//! implementation talks Redis protocol through a connection pool; the
//! in-memory implementation backs deterministic tests and single-process
//! deployments.

mod memory;
mod redis;

pub use memory::MemoryBackendClient;
pub use redis::RedisBackendClient;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::EphemeralError;

/// Single-round-trip operations against the remote key/value engine.
///
/// Implementations must be safe under concurrent callers and must never
/// hold a connection across more than one logical operation. No operation
/// retries on its own; retry policy belongs to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Fetches the raw value for a backend key, `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<String>, EphemeralError>;

    /// Writes a raw value. When `ttl` is set, the expiration is attached in
    /// the same round-trip so a failure can never leave a non-expiring key
    /// behind.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>)
        -> Result<(), EphemeralError>;

    /// Removes a backend key. Removing an absent key is a no-op.
    async fn delete(&self, key: &str) -> Result<(), EphemeralError>;

    /// Health check - verify backend connectivity.
    async fn ping(&self) -> Result<bool, EphemeralError>;

    /// Closes and releases the pool. Idempotent; operations issued after
    /// shutdown fail with [`EphemeralError::StoreClosed`].
    async fn shutdown(&self) -> Result<(), EphemeralError>;
}
