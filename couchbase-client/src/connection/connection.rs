//! A single logical connection to the cluster.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use couchbase_core::{
    AnalyticsProvider, CoreError, DiagnosticsProvider, HttpProvider, QueryProvider,
    SearchProvider, Transport,
};

use crate::error::{Error, Result};

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generates a new unique connection ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw ID value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A transport together with the state the client tracks for it.
///
/// The connection moves from unconnected to connected, or records a bootstrap
/// error that is kept for its lifetime. Closing is terminal.
#[derive(Debug)]
pub struct ManagedConnection {
    id: ConnectionId,
    transport: Arc<dyn Transport>,
    bootstrap_error: OnceLock<Arc<CoreError>>,
    closed: AtomicBool,
}

impl ManagedConnection {
    /// Wraps an unconnected transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            id: ConnectionId::new(),
            transport,
            bootstrap_error: OnceLock::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Returns the connection's unique identifier.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Builds the transport configuration.
    pub fn build_config(&self) -> couchbase_core::Result<()> {
        self.ensure_open_for_bootstrap()?;
        self.transport.build_config()
    }

    /// Connects the transport.
    pub async fn connect(&self) -> couchbase_core::Result<()> {
        self.ensure_open_for_bootstrap()?;
        self.transport.connect().await
    }

    /// Binds the transport to a bucket.
    pub async fn select_bucket(&self, bucket_name: &str) -> couchbase_core::Result<()> {
        self.ensure_open_for_bootstrap()?;
        self.transport.select_bucket(bucket_name).await
    }

    /// Records a bootstrap failure.
    ///
    /// Only the first failure is kept.
    pub fn set_bootstrap_error(&self, err: CoreError) {
        tracing::warn!(connection = %self.id, error = %err, "connection bootstrap failed");
        let _ = self.bootstrap_error.set(Arc::new(err));
    }

    /// Returns the recorded bootstrap failure, if any.
    pub fn bootstrap_error(&self) -> Option<Arc<CoreError>> {
        self.bootstrap_error.get().cloned()
    }

    /// Returns true if the connection is open, bootstrapped without error and
    /// reported connected by the transport.
    pub fn is_connected(&self) -> bool {
        !self.is_closed() && self.bootstrap_error.get().is_none() && self.transport.is_connected()
    }

    /// Returns whether the cluster accepts bucket-independent requests on
    /// this connection.
    pub fn supports_cluster_level_operations(&self) -> bool {
        self.transport.supports_cluster_level_operations()
    }

    /// Returns true once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Closes the connection. Closing an already closed connection succeeds
    /// without touching the transport.
    pub async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.transport.close().await.map_err(Error::from)
    }

    /// Returns the N1QL query provider.
    pub fn query_provider(&self) -> Result<Arc<dyn QueryProvider>> {
        self.ensure_usable()?;
        Ok(self.transport.query_provider()?)
    }

    /// Returns the analytics provider.
    pub fn analytics_provider(&self) -> Result<Arc<dyn AnalyticsProvider>> {
        self.ensure_usable()?;
        Ok(self.transport.analytics_provider()?)
    }

    /// Returns the search provider.
    pub fn search_provider(&self) -> Result<Arc<dyn SearchProvider>> {
        self.ensure_usable()?;
        Ok(self.transport.search_provider()?)
    }

    /// Returns the diagnostics provider.
    pub fn diagnostics_provider(&self) -> Result<Arc<dyn DiagnosticsProvider>> {
        self.ensure_usable()?;
        Ok(self.transport.diagnostics_provider()?)
    }

    /// Returns the generic HTTP provider.
    pub fn http_provider(&self) -> Result<Arc<dyn HttpProvider>> {
        self.ensure_usable()?;
        Ok(self.transport.http_provider()?)
    }

    fn ensure_open_for_bootstrap(&self) -> couchbase_core::Result<()> {
        if self.is_closed() {
            return Err(CoreError::Connection(format!("{} is closed", self.id)));
        }
        Ok(())
    }

    fn ensure_usable(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::Closed);
        }
        if let Some(err) = self.bootstrap_error.get() {
            return Err(Error::Bootstrap(Arc::clone(err)));
        }
        Ok(())
    }
}
