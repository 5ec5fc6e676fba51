//! In-memory backend client.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::BackendClient;
use crate::error::EphemeralError;

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// [`BackendClient`] over a process-local map.
///
/// Same contract as the networked client, including expiration and
/// closed-after-shutdown behavior, which makes it the deterministic stand-in
/// for tests and single-process deployments. Expired entries are dropped
/// lazily when read.
pub struct MemoryBackendClient {
    // None once shut down.
    entries: Mutex<Option<HashMap<String, Entry>>>,
}

impl MemoryBackendClient {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Some(HashMap::new())),
        }
    }
}

impl Default for MemoryBackendClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackendClient for MemoryBackendClient {
    async fn get(&self, key: &str) -> Result<Option<String>, EphemeralError> {
        let mut guard = self.entries.lock().expect("entries lock poisoned");
        let entries = guard.as_mut().ok_or(EphemeralError::StoreClosed)?;

        if let Some(entry) = entries.get(key) {
            if entry.is_expired() {
                entries.remove(key);
                return Ok(None);
            }
            return Ok(Some(entry.value.clone()));
        }
        Ok(None)
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), EphemeralError> {
        let mut guard = self.entries.lock().expect("entries lock poisoned");
        let entries = guard.as_mut().ok_or(EphemeralError::StoreClosed)?;

        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: ttl.map(|ttl| Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), EphemeralError> {
        let mut guard = self.entries.lock().expect("entries lock poisoned");
        let entries = guard.as_mut().ok_or(EphemeralError::StoreClosed)?;

        entries.remove(key);
        Ok(())
    }

    async fn ping(&self) -> Result<bool, EphemeralError> {
        let guard = self.entries.lock().expect("entries lock poisoned");
        Ok(guard.is_some())
    }

    async fn shutdown(&self) -> Result<(), EphemeralError> {
        let mut guard = self.entries.lock().expect("entries lock poisoned");
        *guard = None;
        Ok(())
    }
}
