//! Store factories and the registry that owns the live store.
//!
//! The registry replaces a process-global singleton: the composition root
//! constructs one `StoreRegistry`, hands it whichever factory matches the
//! configured backend, and shares it. The store (and its pool) is built
//! lazily on first use and torn down exactly once on shutdown; tests
//! reconfigure by swapping the factory instead of mutating global state.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::backend::{MemoryBackendClient, RedisBackendClient};
use crate::config::BackendConfig;
use crate::error::EphemeralError;
use crate::store::{EphemeralStore, KvEphemeralStore};

/// Builds a store together with its backing pool.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoreFactory: Send + Sync {
    async fn open(&self) -> Result<Arc<dyn EphemeralStore>, EphemeralError>;
}

impl std::fmt::Debug for dyn StoreFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn StoreFactory")
    }
}

/// Factory for the pooled Redis-protocol backend.
pub struct RedisStoreFactory {
    config: BackendConfig,
}

impl RedisStoreFactory {
    pub fn new(config: BackendConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl StoreFactory for RedisStoreFactory {
    async fn open(&self) -> Result<Arc<dyn EphemeralStore>, EphemeralError> {
        let client = RedisBackendClient::connect(&self.config).await?;
        Ok(Arc::new(KvEphemeralStore::new(Arc::new(client))))
    }
}

/// Factory for the in-memory backend.
#[derive(Default)]
pub struct MemoryStoreFactory;

#[async_trait]
impl StoreFactory for MemoryStoreFactory {
    async fn open(&self) -> Result<Arc<dyn EphemeralStore>, EphemeralError> {
        Ok(Arc::new(KvEphemeralStore::new(Arc::new(
            MemoryBackendClient::new(),
        ))))
    }
}

#[derive(Default)]
struct Inner {
    factory: Option<Arc<dyn StoreFactory>>,
    store: Option<Arc<dyn EphemeralStore>>,
}

/// Holds the active factory and the lazily built store singleton.
///
/// All transitions go through one async mutex, so concurrent `store()`
/// callers never construct two live pools and shutdown never races a
/// construction. The singleton moves `Uninitialized → Active → Closed`;
/// a fresh `store()` call after shutdown rebuilds cleanly.
pub struct StoreRegistry {
    inner: Mutex<Inner>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn with_factory(factory: Arc<dyn StoreFactory>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                factory: Some(factory),
                store: None,
            }),
        }
    }

    /// Replaces the active factory without constructing a store.
    ///
    /// Any store built from the previous factory is shut down first
    /// (best-effort, logged) so its pool cannot leak.
    pub async fn set_factory(&self, factory: Arc<dyn StoreFactory>) {
        let mut inner = self.inner.lock().await;
        if let Some(store) = inner.store.take() {
            if let Err(err) = store.shutdown().await {
                tracing::warn!(error = %err, "previous ephemeral store failed to shut down cleanly");
            }
        }
        inner.factory = Some(factory);
    }

    /// The currently active factory.
    pub async fn factory(&self) -> Result<Arc<dyn StoreFactory>, EphemeralError> {
        self.inner
            .lock()
            .await
            .factory
            .clone()
            .ok_or(EphemeralError::NoFactoryConfigured)
    }

    /// The store singleton, constructed on first call.
    pub async fn store(&self) -> Result<Arc<dyn EphemeralStore>, EphemeralError> {
        let mut inner = self.inner.lock().await;
        if let Some(store) = &inner.store {
            return Ok(Arc::clone(store));
        }
        let factory = inner
            .factory
            .clone()
            .ok_or(EphemeralError::NoFactoryConfigured)?;
        let store = factory.open().await?;
        inner.store = Some(Arc::clone(&store));
        Ok(store)
    }

    /// Releases the store's pool and clears the singleton.
    ///
    /// No-op when no store was ever built. Shutdown errors are logged, not
    /// re-raised; teardown is best-effort.
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;
        let Some(store) = inner.store.take() else {
            return;
        };
        if let Err(err) = store.shutdown().await {
            tracing::warn!(error = %err, "ephemeral store shutdown reported an error");
        }
    }
}

impl Default for StoreRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EphemeralInput, EphemeralKey, EphemeralLocation};
    use crate::store::MockEphemeralStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFactory {
        opens: AtomicUsize,
    }

    impl CountingFactory {
        fn new() -> Self {
            Self {
                opens: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl StoreFactory for CountingFactory {
        async fn open(&self) -> Result<Arc<dyn EphemeralStore>, EphemeralError> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(KvEphemeralStore::new(Arc::new(
                MemoryBackendClient::new(),
            ))))
        }
    }

    fn location() -> EphemeralLocation {
        EphemeralLocation::new(["account", "47e456be-b00a-465e-a1db-4b53e64fa"])
    }

    #[tokio::test]
    async fn unconfigured_registry_errors() {
        let registry = StoreRegistry::new();
        assert!(matches!(
            registry.factory().await.unwrap_err(),
            EphemeralError::NoFactoryConfigured
        ));
        assert!(matches!(
            registry.store().await.unwrap_err(),
            EphemeralError::NoFactoryConfigured
        ));
    }

    #[tokio::test]
    async fn store_is_a_singleton_per_factory() {
        let registry = StoreRegistry::with_factory(Arc::new(MemoryStoreFactory));
        let first = registry.store().await.unwrap();
        let second = registry.store().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn shutdown_before_any_store_is_a_noop() {
        let registry = StoreRegistry::with_factory(Arc::new(MemoryStoreFactory));
        registry.shutdown().await;

        // Still able to build a working store afterwards.
        let store = registry.store().await.unwrap();
        assert!(store.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn shutdown_closes_the_pool_exactly_once() {
        let mut store = MockEphemeralStore::new();
        store.expect_shutdown().times(1).returning(|| Ok(()));
        let store: Arc<dyn EphemeralStore> = Arc::new(store);

        let mut factory = MockStoreFactory::new();
        factory
            .expect_open()
            .times(1)
            .return_once(move || Ok(store));

        let registry = StoreRegistry::with_factory(Arc::new(factory));
        registry.store().await.unwrap();

        // Second shutdown finds no store and must not call shutdown again.
        registry.shutdown().await;
        registry.shutdown().await;
    }

    #[tokio::test]
    async fn store_rebuilds_after_shutdown() {
        let registry = StoreRegistry::with_factory(Arc::new(MemoryStoreFactory));
        let first = registry.store().await.unwrap();
        registry.shutdown().await;

        let second = registry.store().await.unwrap();
        assert!(!Arc::ptr_eq(&first, &second));

        // The old handle is closed; the new one works.
        let key = EphemeralKey::new("somekey");
        assert!(matches!(
            first.get(&key, &location()).await.unwrap_err(),
            EphemeralError::StoreClosed
        ));
        second
            .set(&EphemeralInput::new(key.clone(), "v1"), &location())
            .await
            .unwrap();
        assert_eq!(
            second.get(&key, &location()).await.unwrap().value(),
            Some("v1")
        );
    }

    #[tokio::test]
    async fn set_factory_shuts_down_and_replaces_the_singleton() {
        let registry = StoreRegistry::with_factory(Arc::new(MemoryStoreFactory));
        let first = registry.store().await.unwrap();

        registry.set_factory(Arc::new(MemoryStoreFactory)).await;
        assert!(matches!(
            first.health_check().await,
            Ok(false) | Err(EphemeralError::StoreClosed)
        ));

        let second = registry.store().await.unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn concurrent_store_calls_build_one_store() {
        let factory = Arc::new(CountingFactory::new());
        let registry = Arc::new(StoreRegistry::with_factory(factory.clone()));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move { registry.store().await }));
        }

        let mut stores = Vec::new();
        for handle in handles {
            stores.push(handle.await.unwrap().unwrap());
        }

        assert_eq!(factory.opens.load(Ordering::SeqCst), 1);
        for store in &stores[1..] {
            assert!(Arc::ptr_eq(&stores[0], store));
        }
    }
}
