//! Selection of a connection for requests that are not bound to a bucket.

use std::sync::Arc;

use couchbase_core::{
    AnalyticsProvider, DiagnosticsProvider, HttpProvider, QueryProvider, SearchProvider,
};

use super::connection::ManagedConnection;
use super::registry::ClientRegistry;
use crate::error::{Error, Result};

/// Routes cluster-level requests to a live connection.
///
/// An unclaimed floating connection is used when the cluster supports
/// cluster-level operations. Once claimed, any connected registry entry can
/// serve the request.
#[derive(Debug, Clone)]
pub struct ServiceRouter {
    registry: Arc<ClientRegistry>,
}

impl ServiceRouter {
    /// Creates a router over `registry`.
    pub fn new(registry: Arc<ClientRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the registry this router reads from.
    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }

    /// Picks the connection that serves the next cluster-level request.
    pub async fn select_connection(&self) -> Result<Arc<ManagedConnection>> {
        let state = self.registry.read_state().await;

        if let Some(floating) = state.floating.peek() {
            if !floating.supports_cluster_level_operations() {
                return Err(Error::ClusterLevelUnsupported);
            }
            return Ok(Arc::clone(floating));
        }

        let mut bootstrap_error = None;
        for conn in state.connections.values() {
            if conn.is_connected() {
                return Ok(Arc::clone(conn));
            }
            if bootstrap_error.is_none() {
                bootstrap_error = conn.bootstrap_error();
            }
        }

        match bootstrap_error {
            Some(err) => Err(Error::Bootstrap(err)),
            None => Err(Error::NotConnected),
        }
    }

    /// Returns a N1QL query provider from a routed connection.
    pub async fn query_provider(&self) -> Result<Arc<dyn QueryProvider>> {
        self.select_connection().await?.query_provider()
    }

    /// Returns an analytics provider from a routed connection.
    pub async fn analytics_provider(&self) -> Result<Arc<dyn AnalyticsProvider>> {
        self.select_connection().await?.analytics_provider()
    }

    /// Returns a search provider from a routed connection.
    pub async fn search_provider(&self) -> Result<Arc<dyn SearchProvider>> {
        self.select_connection().await?.search_provider()
    }

    /// Returns a diagnostics provider from a routed connection.
    pub async fn diagnostics_provider(&self) -> Result<Arc<dyn DiagnosticsProvider>> {
        self.select_connection().await?.diagnostics_provider()
    }

    /// Returns a generic HTTP provider from a routed connection.
    pub async fn http_provider(&self) -> Result<Arc<dyn HttpProvider>> {
        self.select_connection().await?.http_provider()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClusterOptions;
    use crate::connection::testing::{base_config, MockFactory, MockTransport};
    use crate::connection::ConnectionIdentity;
    use couchbase_core::CoreError;

    fn identity(bucket: &str) -> ConnectionIdentity {
        ConnectionIdentity::for_bucket(bucket, &ClusterOptions::default())
    }

    async fn connected(transport: Arc<MockTransport>) -> Arc<ManagedConnection> {
        let conn = Arc::new(ManagedConnection::new(transport));
        conn.connect().await.unwrap();
        conn
    }

    #[tokio::test]
    async fn test_unclaimed_floating_is_used_when_supported() {
        let floating = connected(MockTransport::new().with_cluster_level(true)).await;
        let registry = ClientRegistry::new(MockFactory::new(), base_config(), Some(Arc::clone(&floating)));
        let router = ServiceRouter::new(Arc::new(registry));

        let selected = router.select_connection().await.unwrap();
        assert!(Arc::ptr_eq(&selected, &floating));
    }

    #[tokio::test]
    async fn test_unsupported_floating_fails_even_with_connected_entries() {
        let floating = connected(MockTransport::new().with_cluster_level(false)).await;
        let registry = ClientRegistry::new(MockFactory::new(), base_config(), Some(floating));
        registry.register(identity("beer"), connected(MockTransport::new()).await).await;
        let router = ServiceRouter::new(Arc::new(registry));

        assert!(matches!(
            router.select_connection().await,
            Err(Error::ClusterLevelUnsupported)
        ));
        assert!(matches!(
            router.query_provider().await,
            Err(Error::ClusterLevelUnsupported)
        ));
    }

    #[tokio::test]
    async fn test_connected_entry_is_chosen_over_failed_ones() {
        let registry = ClientRegistry::new(MockFactory::new(), base_config(), None);
        for bucket in ["a", "b", "c"] {
            let conn = Arc::new(ManagedConnection::new(MockTransport::new()));
            conn.set_bootstrap_error(CoreError::Authentication(bucket.to_string()));
            registry.register(identity(bucket), conn).await;
        }
        let live = connected(MockTransport::new()).await;
        registry.register(identity("live"), Arc::clone(&live)).await;
        let router = ServiceRouter::new(Arc::new(registry));

        let selected = router.select_connection().await.unwrap();
        assert!(Arc::ptr_eq(&selected, &live));
    }

    #[tokio::test]
    async fn test_bootstrap_error_surfaces_when_nothing_connected() {
        let registry = ClientRegistry::new(MockFactory::new(), base_config(), None);
        let conn = Arc::new(ManagedConnection::new(MockTransport::new()));
        conn.set_bootstrap_error(CoreError::Authentication("bad password".to_string()));
        registry.register(identity("beer"), conn).await;
        let router = ServiceRouter::new(Arc::new(registry));

        match router.select_connection().await {
            Err(Error::Bootstrap(err)) => {
                assert_eq!(err.to_string(), "authentication error: bad password")
            }
            other => panic!("expected bootstrap error, got {:?}", other.map(|c| c.id())),
        }
    }

    #[tokio::test]
    async fn test_not_connected_when_registry_empty() {
        let registry = ClientRegistry::new(MockFactory::new(), base_config(), None);
        let router = ServiceRouter::new(Arc::new(registry));
        assert!(matches!(
            router.select_connection().await,
            Err(Error::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_provider_failure_is_returned() {
        let transport = MockTransport::new();
        transport.fail_providers();
        let registry = ClientRegistry::new(MockFactory::new(), base_config(), None);
        registry.register(identity("beer"), connected(transport).await).await;
        let router = ServiceRouter::new(Arc::new(registry));

        assert!(matches!(
            router.analytics_provider().await,
            Err(Error::Core(CoreError::ServiceNotAvailable(_)))
        ));
    }
}
