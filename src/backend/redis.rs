//! Pooled Redis-protocol backend client.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::bb8::{Pool, RunError};
use bb8_redis::redis::{self, RedisError};
use bb8_redis::RedisConnectionManager;
use tokio::time::timeout;

use super::BackendClient;
use crate::config::BackendConfig;
use crate::error::EphemeralError;

/// Backend client over a bb8 connection pool.
///
/// Each operation borrows a connection for exactly one round-trip and
/// releases it on every exit path. The pool handle lives behind a lock so
/// shutdown can take it out; in-flight operations keep their own clone and
/// either complete against the still-open pool or fail cleanly.
pub struct RedisBackendClient {
    pool: RwLock<Option<Pool<RedisConnectionManager>>>,
    op_timeout: Duration,
}

impl RedisBackendClient {
    /// Creates the pool. Connections are established lazily on first
    /// borrow, so this does not require the backend to be reachable yet.
    pub async fn connect(config: &BackendConfig) -> Result<Self, EphemeralError> {
        let manager = RedisConnectionManager::new(config.url.as_str())
            .map_err(EphemeralError::connection)?;
        let pool = Pool::builder()
            .max_size(config.pool_size)
            .connection_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build(manager)
            .await
            .map_err(EphemeralError::connection)?;

        tracing::info!(
            url = %config.url,
            pool_size = config.pool_size,
            "ephemeral backend pool created"
        );

        Ok(Self {
            pool: RwLock::new(Some(pool)),
            op_timeout: Duration::from_secs(config.op_timeout_secs),
        })
    }

    fn pool(&self) -> Result<Pool<RedisConnectionManager>, EphemeralError> {
        self.pool
            .read()
            .expect("pool lock poisoned")
            .clone()
            .ok_or(EphemeralError::StoreClosed)
    }
}

fn borrow_error(err: RunError<RedisError>) -> EphemeralError {
    match err {
        RunError::TimedOut => EphemeralError::PoolExhausted,
        RunError::User(err) => EphemeralError::connection(err),
    }
}

/// Backend TTLs are whole seconds; round up so a short expiration never
/// becomes a permanent key, and never send EX 0.
fn ttl_secs(ttl: Duration) -> u64 {
    let secs = if ttl.subsec_nanos() > 0 {
        ttl.as_secs() + 1
    } else {
        ttl.as_secs()
    };
    secs.max(1)
}

#[async_trait]
impl BackendClient for RedisBackendClient {
    async fn get(&self, key: &str) -> Result<Option<String>, EphemeralError> {
        let pool = self.pool()?;
        let mut conn = pool.get().await.map_err(borrow_error)?;

        let mut cmd = redis::cmd("GET");
        cmd.arg(key);
        match timeout(self.op_timeout, cmd.query_async(&mut *conn)).await {
            Ok(reply) => reply.map_err(|err| EphemeralError::backend("get", key, err)),
            Err(elapsed) => Err(EphemeralError::backend("get", key, elapsed)),
        }
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), EphemeralError> {
        let pool = self.pool()?;
        let mut conn = pool.get().await.map_err(borrow_error)?;

        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = ttl {
            cmd.arg("EX").arg(ttl_secs(ttl));
        }
        match timeout(self.op_timeout, cmd.query_async(&mut *conn)).await {
            Ok(reply) => {
                let _: () = reply.map_err(|err| EphemeralError::backend("set", key, err))?;
                Ok(())
            }
            Err(elapsed) => Err(EphemeralError::backend("set", key, elapsed)),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), EphemeralError> {
        let pool = self.pool()?;
        let mut conn = pool.get().await.map_err(borrow_error)?;

        let mut cmd = redis::cmd("DEL");
        cmd.arg(key);
        match timeout(self.op_timeout, cmd.query_async(&mut *conn)).await {
            Ok(reply) => {
                let _: () = reply.map_err(|err| EphemeralError::backend("delete", key, err))?;
                Ok(())
            }
            Err(elapsed) => Err(EphemeralError::backend("delete", key, elapsed)),
        }
    }

    async fn ping(&self) -> Result<bool, EphemeralError> {
        let pool = self.pool()?;
        let mut conn = pool.get().await.map_err(borrow_error)?;

        let cmd = redis::cmd("PING");
        match timeout(self.op_timeout, cmd.query_async(&mut *conn)).await {
            Ok(reply) => {
                let reply: String = reply.map_err(EphemeralError::connection)?;
                Ok(reply == "PONG")
            }
            Err(elapsed) => Err(EphemeralError::connection(elapsed)),
        }
    }

    async fn shutdown(&self) -> Result<(), EphemeralError> {
        let pool = self.pool.write().expect("pool lock poisoned").take();
        if pool.is_some() {
            tracing::info!("ephemeral backend pool closed");
        }
        Ok(())
    }
}
