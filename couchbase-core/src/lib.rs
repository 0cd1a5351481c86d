//! Transport boundary types for the Couchbase client.
//!
//! This crate describes what the client layer expects from the network
//! transport: the raw error shapes it reports, the retry reasons it attaches to
//! them, the [`Transport`] capability every connection exposes, and the
//! per-service provider handles used to issue query, analytics, search,
//! diagnostics and management HTTP requests.

#![warn(missing_docs)]

pub mod error;
pub mod provider;
pub mod retry;
pub mod transport;

pub use error::{
    AnalyticsErrorDesc, AnalyticsErrorInfo, CoreError, HttpErrorInfo, KeyValueErrorInfo,
    QueryErrorDesc, QueryErrorInfo, Result, ViewErrorDesc, ViewErrorInfo,
};
pub use provider::{
    AnalyticsProvider, AnalyticsRequest, DiagnosticsProvider, DiagnosticsReport,
    DiagnosticsRequest, HttpProvider, HttpRequest, HttpResponse, ParameterMap, QueryProvider,
    QueryRequest, SearchProvider, SearchRequest, ServiceResponse, ServiceType,
};
pub use retry::RetryReason;
pub use transport::{AgentConfig, Credentials, Transport, TransportFactory};
