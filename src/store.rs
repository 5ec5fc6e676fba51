//! Public ephemeral store contract and the single-value implementation.

use std::sync::Arc;

use async_trait::async_trait;

use crate::backend::BackendClient;
use crate::codec;
use crate::error::EphemeralError;
use crate::models::{EphemeralInput, EphemeralKey, EphemeralLocation, EphemeralResult, Expiration};

/// Capability set implemented by every backend variant.
///
/// Reads of absent keys succeed with an empty result; deletes of absent
/// keys are no-ops. Backend I/O failures propagate as values carrying the
/// operation and encoded key — callers should treat a failed `get` as
/// "value unknown" and degrade, since ephemeral data is best-effort.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EphemeralStore: Send + Sync {
    /// Reads the value(s) stored under `key` at `location`.
    async fn get(
        &self,
        key: &EphemeralKey,
        location: &EphemeralLocation,
    ) -> Result<EphemeralResult, EphemeralError>;

    /// Writes `input` at `location`, attaching its expiration when present.
    async fn set(
        &self,
        input: &EphemeralInput,
        location: &EphemeralLocation,
    ) -> Result<(), EphemeralError>;

    /// Removes the value stored under `key` at `location`.
    async fn delete(
        &self,
        key: &EphemeralKey,
        location: &EphemeralLocation,
    ) -> Result<(), EphemeralError>;

    /// The backend key `input` would be written under. Pure; no I/O.
    fn to_key(
        &self,
        input: &EphemeralInput,
        location: &EphemeralLocation,
    ) -> Result<String, EphemeralError>;

    /// The raw value `input` would persist as. Pure; no I/O.
    fn to_value(
        &self,
        input: &EphemeralInput,
        location: &EphemeralLocation,
    ) -> Result<String, EphemeralError>;

    /// Health check - verify backend connectivity.
    async fn health_check(&self) -> Result<bool, EphemeralError>;

    /// Releases the backing pool. Idempotent.
    async fn shutdown(&self) -> Result<(), EphemeralError>;
}

impl std::fmt::Debug for dyn EphemeralStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn EphemeralStore")
    }
}

/// Single-value, pass-through store over a pooled backend client.
///
/// Values are persisted verbatim (`to_value` is the identity); variants
/// that pack multiple values into one backend entry would transform here
/// instead. Keys are validated and encoded before any network call, so a
/// malformed input never causes a partial write.
pub struct KvEphemeralStore {
    client: Arc<dyn BackendClient>,
}

impl KvEphemeralStore {
    pub fn new(client: Arc<dyn BackendClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EphemeralStore for KvEphemeralStore {
    async fn get(
        &self,
        key: &EphemeralKey,
        location: &EphemeralLocation,
    ) -> Result<EphemeralResult, EphemeralError> {
        let encoded = codec::encode(key, location)?;
        match self.client.get(&encoded).await? {
            Some(value) => Ok(EphemeralResult::single(key.clone(), value)),
            None => Ok(EphemeralResult::empty(key.clone())),
        }
    }

    async fn set(
        &self,
        input: &EphemeralInput,
        location: &EphemeralLocation,
    ) -> Result<(), EphemeralError> {
        let encoded = codec::encode(input.key(), location)?;
        let ttl = input.expiration().map(Expiration::to_duration);
        self.client.set(&encoded, input.value(), ttl).await
    }

    async fn delete(
        &self,
        key: &EphemeralKey,
        location: &EphemeralLocation,
    ) -> Result<(), EphemeralError> {
        let encoded = codec::encode(key, location)?;
        self.client.delete(&encoded).await
    }

    fn to_key(
        &self,
        input: &EphemeralInput,
        location: &EphemeralLocation,
    ) -> Result<String, EphemeralError> {
        codec::encode(input.key(), location)
    }

    fn to_value(
        &self,
        input: &EphemeralInput,
        _location: &EphemeralLocation,
    ) -> Result<String, EphemeralError> {
        Ok(input.value().to_string())
    }

    async fn health_check(&self) -> Result<bool, EphemeralError> {
        self.client.ping().await
    }

    async fn shutdown(&self) -> Result<(), EphemeralError> {
        self.client.shutdown().await
    }
}
