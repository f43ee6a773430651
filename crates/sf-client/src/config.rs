//! Transport settings shared by [`SfHttpClient`](crate::SfHttpClient), the
//! authenticator's token request and every [`SalesforceClient`](crate::SalesforceClient)
//! built from it.

use std::time::Duration;

use crate::DEFAULT_API_VERSION;

/// Settings for one blocking HTTP client.
///
/// Nothing here retries. A request either completes within `timeout` or
/// fails with a transport error.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// REST API version clients target, without the leading `v` (`"59.0"`).
    pub api_version: String,
    /// Upper bound on one whole exchange, body included.
    pub timeout: Duration,
    /// Upper bound on establishing the connection.
    pub connect_timeout: Duration,
    /// Idle connection reuse.
    pub pool: PoolConfig,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Ask for gzip/deflate bodies and decode them transparently.
    pub accept_compressed: bool,
    /// Log each exchange at `debug` (non-2xx at `info`).
    pub trace_exchanges: bool,
}

/// Idle connection pool settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolConfig {
    pub idle_timeout: Duration,
    pub max_idle_per_host: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(90),
            max_idle_per_host: 4,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool: PoolConfig::default(),
            user_agent: crate::USER_AGENT.to_string(),
            accept_compressed: true,
            trace_exchanges: true,
        }
    }
}

impl ClientConfig {
    /// Start from the defaults.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// The same settings targeting another API version.
    pub fn with_api_version(mut self, version: impl AsRef<str>) -> Self {
        self.api_version = normalize_api_version(version.as_ref());
        self
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Target API version. A leading `v` is dropped, so `"v60.0"` and
    /// `"60.0"` are the same.
    pub fn with_api_version(mut self, version: impl AsRef<str>) -> Self {
        self.config = self.config.with_api_version(version);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.config.pool = pool;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Accept compressed response bodies.
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.config.accept_compressed = enabled;
        self
    }

    /// Log request/response exchanges.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.config.trace_exchanges = enabled;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

pub(crate) fn normalize_api_version(version: &str) -> String {
    let version = version.trim();
    version
        .strip_prefix('v')
        .or_else(|| version.strip_prefix('V'))
        .unwrap_or(version)
        .to_string()
}
