//! Error taxonomy for ephemeral store operations.

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures surfaced by the store, the backend client, and the registry.
///
/// Encoding problems (`InvalidLocation`, `InvalidKey`) are detected before
/// any network I/O. Backend failures carry the operation and encoded key so
/// callers can log and degrade; ephemeral data is best-effort and a failed
/// `get` should be treated as "value unknown", not as fatal.
#[derive(Debug, thiserror::Error)]
pub enum EphemeralError {
    /// Location path is empty or malformed.
    #[error("invalid ephemeral location: {0}")]
    InvalidLocation(String),

    /// Key name is empty, or a component contains the reserved delimiter.
    #[error("invalid ephemeral key: {0}")]
    InvalidKey(String),

    /// Backend unreachable or the connection handshake failed.
    #[error("backend connection failed: {source}")]
    Connection {
        #[source]
        source: BoxError,
    },

    /// No idle connection became available within the borrow timeout.
    #[error("connection pool exhausted waiting for an idle connection")]
    PoolExhausted,

    /// The backend reported a protocol-level error for an operation.
    #[error("backend {op} failed for key `{key}`: {source}")]
    Backend {
        op: &'static str,
        key: String,
        #[source]
        source: BoxError,
    },

    /// Operation attempted after the pool was shut down.
    #[error("ephemeral store is closed")]
    StoreClosed,

    /// The registry was asked for a store before any factory was set.
    #[error("no ephemeral store factory configured")]
    NoFactoryConfigured,
}

impl EphemeralError {
    pub(crate) fn connection(source: impl Into<BoxError>) -> Self {
        Self::Connection {
            source: source.into(),
        }
    }

    pub(crate) fn backend(op: &'static str, key: &str, source: impl Into<BoxError>) -> Self {
        Self::Backend {
            op,
            key: key.to_string(),
            source: source.into(),
        }
    }
}
