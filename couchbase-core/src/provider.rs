//! Per-service provider handles.
//!
//! A connected [`Transport`](crate::Transport) hands out one provider per
//! service. Requests carry an already-encoded JSON parameter map; the provider
//! is responsible for the HTTP round trip, retries and result streaming.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// A JSON object of request parameters, ready to become a request body.
pub type ParameterMap = serde_json::Map<String, Value>;

/// Services reachable over HTTP on a cluster node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceType {
    /// Cluster management REST API.
    Management,
    /// Map/reduce views.
    Views,
    /// N1QL query service.
    Query,
    /// Full text search service.
    Search,
    /// Analytics service.
    Analytics,
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Management => "mgmt",
            Self::Views => "views",
            Self::Query => "query",
            Self::Search => "search",
            Self::Analytics => "analytics",
        };
        f.write_str(name)
    }
}

/// Rows and trailing metadata returned by a query-like service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceResponse {
    /// Result rows, in the order the service produced them.
    pub rows: Vec<Value>,
    /// Everything in the response body other than the rows.
    pub metadata: Value,
}

/// A N1QL query request.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    /// Encoded query parameters.
    pub params: ParameterMap,
    /// Client-side deadline for the request.
    pub timeout: Duration,
}

/// An analytics query request.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsRequest {
    /// Encoded analytics parameters.
    pub params: ParameterMap,
    /// Client-side deadline for the request.
    pub timeout: Duration,
}

/// A search query request against a single index.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Name of the search index.
    pub index_name: String,
    /// Encoded search parameters, including the query body.
    pub params: ParameterMap,
    /// Client-side deadline for the request.
    pub timeout: Duration,
}

/// A diagnostics request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticsRequest {
    /// Identifier to stamp on the report; the transport picks one if absent.
    pub report_id: Option<String>,
}

/// Point-in-time connection state reported by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticsReport {
    /// Identifier of the report.
    pub id: String,
    /// Configuration revision the report was taken against.
    pub config_rev: i64,
    /// Per-endpoint state, as reported by the transport.
    pub endpoints: Vec<Value>,
}

/// A raw HTTP request routed to one of the cluster services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Service to route the request to.
    pub service: ServiceType,
    /// HTTP method.
    pub method: String,
    /// Request path, including any query string.
    pub path: String,
    /// Request body.
    pub body: Vec<u8>,
    /// Content type of the body.
    pub content_type: Option<String>,
    /// Whether the request may be retried safely.
    pub idempotent: bool,
    /// Client-side deadline for the request.
    pub timeout: Duration,
}

/// Response to an [`HttpRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Endpoint that served the request.
    pub endpoint: String,
    /// HTTP status code.
    pub status_code: u16,
    /// Response body.
    pub body: Vec<u8>,
}

/// Issues N1QL queries.
#[async_trait]
pub trait QueryProvider: Send + Sync {
    /// Executes a query and collects its result.
    async fn query(&self, request: QueryRequest) -> Result<ServiceResponse>;
}

/// Issues analytics queries.
#[async_trait]
pub trait AnalyticsProvider: Send + Sync {
    /// Executes an analytics query and collects its result.
    async fn analytics_query(&self, request: AnalyticsRequest) -> Result<ServiceResponse>;
}

/// Issues search queries.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Executes a search query and collects its hits.
    async fn search_query(&self, request: SearchRequest) -> Result<ServiceResponse>;
}

/// Reports connection diagnostics.
#[async_trait]
pub trait DiagnosticsProvider: Send + Sync {
    /// Produces a diagnostics report for the connection.
    async fn diagnostics(&self, request: DiagnosticsRequest) -> Result<DiagnosticsReport>;
}

/// Issues raw HTTP requests against cluster services.
#[async_trait]
pub trait HttpProvider: Send + Sync {
    /// Sends the request and returns the full response.
    async fn do_http_request(&self, request: HttpRequest) -> Result<HttpResponse>;
}

macro_rules! impl_provider_debug {
    ($($provider:ident),*) => {
        $(
            impl std::fmt::Debug for dyn $provider {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(stringify!($provider))
                }
            }
        )*
    };
}

impl_provider_debug!(
    QueryProvider,
    AnalyticsProvider,
    SearchProvider,
    DiagnosticsProvider,
    HttpProvider
);
