//! Ephemeral key/value storage over a pluggable, pooled backend.
//!
//! Short-lived, per-entity data (auth tokens, CSRF tokens, last-logon
//! timestamps) is addressed by a composite key built from the owning
//! entity's location path plus an attribute name, with optional TTL-based
//! expiration. Values live in a remote key/value engine reached through a
//! connection pool; losing them is tolerable by contract, so callers are
//! expected to degrade on failure rather than crash.
//!
//! ## Backend key format
//!
//! ```text
//! {segment_0}|{segment_1}|...|{name}             → plain attribute
//! {segment_0}|{segment_1}|...|{name}|{dynamic}   → one of several concurrent values
//!
//! account|47e456be-b00a-465e-a1db-4b53e64fa|authTokens|366778080
//! cos|47e456be-b00a-465e-a1db-4b53e64fa|somekey
//! ```
//!
//! Segment 0 names the entity kind. The delimiter is reserved: inputs that
//! contain `|` are rejected rather than escaped.
//!
//! ## Usage
//!
//! ```ignore
//! let registry = StoreRegistry::new();
//! registry.set_factory(Arc::new(RedisStoreFactory::new(config))).await;
//!
//! let store = registry.store().await?;
//! let location = EphemeralLocation::new(["account", account_id]);
//! let input = EphemeralInput::new(EphemeralKey::new("lastLogonTimestamp"), ts)
//!     .with_expiration(Expiration::new(30, TimeUnit::Days));
//! store.set(&input, &location).await?;
//!
//! registry.shutdown().await;
//! ```

pub mod backend;
pub mod codec;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod store;

pub use backend::{BackendClient, MemoryBackendClient, RedisBackendClient};
pub use config::BackendConfig;
pub use error::EphemeralError;
pub use models::{
    EphemeralInput, EphemeralKey, EphemeralLocation, EphemeralResult, Expiration, TimeUnit,
};
pub use registry::{MemoryStoreFactory, RedisStoreFactory, StoreFactory, StoreRegistry};
pub use store::{EphemeralStore, KvEphemeralStore};
