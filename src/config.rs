use serde::{Deserialize, Serialize};

/// Connection settings for the pooled backend client.
///
/// Which backend kind the URL names (and how it is parsed out of the
/// process configuration) is the embedding application's concern; this
/// struct only carries what the pool needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend connection URL (e.g. redis://localhost:6379).
    pub url: String,
    /// Maximum number of pooled connections.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    /// Seconds to wait for an idle connection before the borrow fails.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Seconds to wait for a single backend round-trip.
    #[serde(default = "default_op_timeout_secs")]
    pub op_timeout_secs: u64,
}

impl BackendConfig {
    /// Config for `url` with default pool sizing and timeouts.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool_size: default_pool_size(),
            connect_timeout_secs: default_connect_timeout_secs(),
            op_timeout_secs: default_op_timeout_secs(),
        }
    }
}

fn default_pool_size() -> u32 {
    16
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_op_timeout_secs() -> u64 {
    5
}
