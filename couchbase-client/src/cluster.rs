//! Entry point for talking to a Couchbase cluster.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use couchbase_core::{
    AnalyticsProvider, AnalyticsRequest, DiagnosticsProvider, DiagnosticsReport,
    DiagnosticsRequest, HttpProvider, QueryProvider, SearchProvider, SearchRequest,
    ServiceResponse, TransportFactory,
};
use serde::Serialize;
use tracing::instrument;

use crate::bucket::Bucket;
use crate::config::ClusterOptions;
use crate::connection::{ClientRegistry, ConnectionIdentity, ManagedConnection, ServiceRouter};
use crate::connstr::ConnSpec;
use crate::enhance::enhance_search_error;
use crate::error::{InvalidArgumentError, Result};
use crate::options::{AnalyticsOptions, SearchOptions};

/// A connected cluster.
///
/// The cluster owns every connection it opens. Cluster-level requests are
/// routed through the shared connection made by [`connect`](Self::connect)
/// until a bucket claims it, then through any connected bucket.
#[derive(Debug)]
pub struct Cluster {
    options: ClusterOptions,
    conn_spec: ConnSpec,
    registry: Arc<ClientRegistry>,
    router: ServiceRouter,
    supports_cluster_level: bool,
    enhanced_prepared_statements: AtomicBool,
}

impl Cluster {
    /// Connects to the cluster described by `conn_str`.
    ///
    /// Timeout overrides in the connection string take precedence over
    /// `options`. Failure to connect the initial connection is returned.
    #[instrument(skip(options, factory))]
    pub async fn connect(
        conn_str: &str,
        mut options: ClusterOptions,
        factory: Arc<dyn TransportFactory>,
    ) -> Result<Self> {
        let conn_spec: ConnSpec = conn_str.parse()?;
        options.apply_conn_spec(&conn_spec)?;

        let base_config = options.agent_config(&conn_spec, None);
        let floating = Arc::new(ManagedConnection::new(factory.create(&base_config)));
        floating.build_config()?;
        floating.connect().await?;

        let supports_cluster_level = floating.supports_cluster_level_operations();
        tracing::info!(
            connection = %floating.id(),
            addresses = conn_spec.addresses().len(),
            cluster_level = supports_cluster_level,
            "connected to cluster"
        );

        let registry = Arc::new(ClientRegistry::new(factory, base_config, Some(floating)));
        let router = ServiceRouter::new(Arc::clone(&registry));

        Ok(Self {
            options,
            conn_spec,
            registry,
            router,
            supports_cluster_level,
            enhanced_prepared_statements: AtomicBool::new(false),
        })
    }

    /// Opens a bucket.
    ///
    /// The returned bucket may carry a bootstrap error instead of being
    /// connected.
    pub async fn bucket(&self, name: impl Into<String>) -> Bucket {
        let name = name.into();
        let identity = ConnectionIdentity::for_bucket(name.clone(), &self.options);
        let connection = self.registry.acquire_for_bucket(identity).await;
        tracing::info!(bucket = %name, connection = %connection.id(), "opened bucket");
        Bucket::new(name, connection)
    }

    /// Runs an analytics query.
    ///
    /// Options are validated before any connection is selected.
    pub async fn analytics_query(
        &self,
        statement: &str,
        options: &AnalyticsOptions,
    ) -> Result<ServiceResponse> {
        let params = options.to_params(statement)?;
        let timeout = options
            .timeout()
            .unwrap_or_else(|| self.options.timeouts().analytics());

        let provider = self.router.analytics_provider().await?;
        Ok(provider
            .analytics_query(AnalyticsRequest { params, timeout })
            .await?)
    }

    /// Runs a search query against `index_name`.
    ///
    /// `query` is serialized as the request's `query` body. HTTP failures from
    /// the search service are returned as [`Error::Search`](crate::Error::Search)
    /// carrying that body.
    pub async fn search_query<Q>(
        &self,
        index_name: &str,
        query: &Q,
        options: &SearchOptions,
    ) -> Result<ServiceResponse>
    where
        Q: Serialize + ?Sized,
    {
        let mut params = options.to_params()?;
        let query = serde_json::to_value(query).map_err(|e| InvalidArgumentError::InvalidValue {
            option: "query",
            reason: e.to_string(),
        })?;
        params.insert("query".to_string(), query.clone());
        let timeout = options
            .timeout()
            .unwrap_or_else(|| self.options.timeouts().search());

        let provider = self.router.search_provider().await?;
        provider
            .search_query(SearchRequest {
                index_name: index_name.to_string(),
                params,
                timeout,
            })
            .await
            .map_err(|e| enhance_search_error(e, &query))
    }

    /// Produces a diagnostics report from a routed connection.
    pub async fn diagnostics(&self, report_id: Option<String>) -> Result<DiagnosticsReport> {
        let provider = self.router.diagnostics_provider().await?;
        Ok(provider.diagnostics(DiagnosticsRequest { report_id }).await?)
    }

    /// Returns a routed N1QL query provider.
    pub async fn query_provider(&self) -> Result<Arc<dyn QueryProvider>> {
        self.router.query_provider().await
    }

    /// Returns a routed analytics provider.
    pub async fn analytics_provider(&self) -> Result<Arc<dyn AnalyticsProvider>> {
        self.router.analytics_provider().await
    }

    /// Returns a routed search provider.
    pub async fn search_provider(&self) -> Result<Arc<dyn SearchProvider>> {
        self.router.search_provider().await
    }

    /// Returns a routed diagnostics provider.
    pub async fn diagnostics_provider(&self) -> Result<Arc<dyn DiagnosticsProvider>> {
        self.router.diagnostics_provider().await
    }

    /// Returns a routed generic HTTP provider.
    pub async fn http_provider(&self) -> Result<Arc<dyn HttpProvider>> {
        self.router.http_provider().await
    }

    /// Returns whether the cluster reported support for cluster-level
    /// operations when it was connected.
    pub fn supports_cluster_level_operations(&self) -> bool {
        self.supports_cluster_level
    }

    /// Returns whether enhanced prepared statements are enabled.
    pub fn supports_enhanced_prepared_statements(&self) -> bool {
        self.enhanced_prepared_statements.load(Ordering::Acquire)
    }

    /// Records whether enhanced prepared statements are enabled.
    pub fn set_supports_enhanced_prepared_statements(&self, supported: bool) {
        self.enhanced_prepared_statements
            .store(supported, Ordering::Release);
    }

    /// Returns the options the cluster was connected with, including
    /// connection string overrides.
    pub fn options(&self) -> &ClusterOptions {
        &self.options
    }

    /// Returns the parsed connection string.
    pub fn conn_spec(&self) -> &ConnSpec {
        &self.conn_spec
    }

    /// Returns the router used for cluster-level requests.
    pub fn router(&self) -> &ServiceRouter {
        &self.router
    }

    /// Closes every connection owned by the cluster.
    ///
    /// Each connection is closed even if an earlier one fails; the first
    /// failure is returned.
    #[instrument(skip(self))]
    pub async fn close(&self) -> Result<()> {
        let result = self.registry.close_all().await;
        match &result {
            Ok(()) => tracing::info!("cluster closed"),
            Err(e) => tracing::warn!(error = %e, "cluster closed with errors"),
        }
        result
    }
}

