//! The capability a network transport exposes to the client layer.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::provider::{
    AnalyticsProvider, DiagnosticsProvider, HttpProvider, QueryProvider, SearchProvider,
};

/// Username and password used to authenticate against the cluster.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Everything a transport needs to build its configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Connection string scheme (`couchbase`, `couchbases`, `http`).
    pub scheme: String,
    /// Seed node addresses as `host` or `host:port`.
    pub addresses: Vec<String>,
    /// Bucket to open, or `None` for a cluster-level connection.
    pub bucket_name: Option<String>,
    /// Credentials, if any were configured.
    pub credentials: Option<Credentials>,
    /// Timeout for establishing the connection.
    pub connect_timeout: Duration,
    /// Default timeout for key-value operations.
    pub kv_timeout: Duration,
    /// Whether mutation tokens are requested from the server.
    pub use_mutation_tokens: bool,
    /// Whether server-side operation durations are requested.
    pub use_server_durations: bool,
    /// Connection string options not interpreted by the client layer.
    pub options: BTreeMap<String, Vec<String>>,
}

/// One logical connection to the cluster as provided by the network layer.
///
/// Connecting and bucket selection are performed once; retry policy belongs to
/// the transport itself.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Builds the transport configuration. Performs no network I/O.
    fn build_config(&self) -> Result<()>;

    /// Connects to the cluster.
    async fn connect(&self) -> Result<()>;

    /// Binds the connection to a bucket.
    async fn select_bucket(&self, bucket_name: &str) -> Result<()>;

    /// Returns whether the connection is established.
    fn is_connected(&self) -> bool;

    /// Returns whether the cluster accepts bucket-independent requests on
    /// this connection.
    fn supports_cluster_level_operations(&self) -> bool;

    /// Closes the connection and releases its resources.
    async fn close(&self) -> Result<()>;

    /// Returns the N1QL query provider.
    fn query_provider(&self) -> Result<Arc<dyn QueryProvider>>;

    /// Returns the analytics provider.
    fn analytics_provider(&self) -> Result<Arc<dyn AnalyticsProvider>>;

    /// Returns the search provider.
    fn search_provider(&self) -> Result<Arc<dyn SearchProvider>>;

    /// Returns the diagnostics provider.
    fn diagnostics_provider(&self) -> Result<Arc<dyn DiagnosticsProvider>>;

    /// Returns the generic HTTP provider.
    fn http_provider(&self) -> Result<Arc<dyn HttpProvider>>;
}

impl std::fmt::Debug for dyn Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Creates unconnected transports.
pub trait TransportFactory: Send + Sync {
    /// Creates a transport for the given configuration. Performs no I/O.
    fn create(&self, config: &AgentConfig) -> Arc<dyn Transport>;
}

impl std::fmt::Debug for dyn TransportFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TransportFactory")
    }
}
