//! Error types reported by the transport layer.
//!
//! Five variants carry a structured payload describing a failed request
//! against a specific service. The client layer rewraps those into its own
//! error types; every other variant is passed through as-is.

use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::retry::RetryReason;

/// Payload of a failed key-value operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeyValueErrorInfo {
    /// Message of the underlying cause.
    #[serde(skip)]
    pub inner_error: String,
    /// Binary protocol status code.
    pub status_code: u16,
    /// Bucket the operation targeted.
    pub bucket_name: String,
    /// Scope the operation targeted.
    pub scope_name: String,
    /// Collection the operation targeted.
    pub collection_name: String,
    /// Resolved collection identifier.
    pub collection_id: u32,
    /// Error name from the server error map.
    pub error_name: String,
    /// Error description from the server error map.
    pub error_description: String,
    /// Opaque value of the request.
    pub opaque: u32,
    /// Extended error context returned by the server.
    pub context: String,
    /// Extended error reference returned by the server.
    #[serde(rename = "ref")]
    pub reference: String,
    /// Reasons the request was retried, in order.
    pub retry_reasons: Vec<RetryReason>,
    /// Number of attempts made.
    pub retry_attempts: u32,
}

/// A single error entry returned by the view service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewErrorDesc {
    /// Node that reported the error.
    pub source_node: String,
    /// Error message.
    pub message: String,
}

/// Payload of a failed view query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewErrorInfo {
    /// Message of the underlying cause.
    #[serde(skip)]
    pub inner_error: String,
    /// Design document the view belongs to.
    pub design_document_name: String,
    /// View name.
    pub view_name: String,
    /// Errors reported by the service.
    pub errors: Vec<ViewErrorDesc>,
    /// Endpoint that served the request.
    pub endpoint: String,
    /// Reasons the request was retried, in order.
    pub retry_reasons: Vec<RetryReason>,
    /// Number of attempts made.
    pub retry_attempts: u32,
}

/// A single error entry returned by the query service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryErrorDesc {
    /// Service error code.
    pub code: u32,
    /// Error message.
    pub message: String,
}

/// Payload of a failed N1QL query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryErrorInfo {
    /// Message of the underlying cause.
    #[serde(skip)]
    pub inner_error: String,
    /// Statement that was executed.
    pub statement: String,
    /// Client context identifier sent with the request.
    pub client_context_id: String,
    /// Errors reported by the service.
    pub errors: Vec<QueryErrorDesc>,
    /// Endpoint that served the request.
    pub endpoint: String,
    /// Reasons the request was retried, in order.
    pub retry_reasons: Vec<RetryReason>,
    /// Number of attempts made.
    pub retry_attempts: u32,
}

/// A single error entry returned by the analytics service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalyticsErrorDesc {
    /// Service error code.
    pub code: u32,
    /// Error message.
    pub message: String,
}

/// Payload of a failed analytics query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalyticsErrorInfo {
    /// Message of the underlying cause.
    #[serde(skip)]
    pub inner_error: String,
    /// Statement that was executed.
    pub statement: String,
    /// Client context identifier sent with the request.
    pub client_context_id: String,
    /// Errors reported by the service.
    pub errors: Vec<AnalyticsErrorDesc>,
    /// Endpoint that served the request.
    pub endpoint: String,
    /// Reasons the request was retried, in order.
    pub retry_reasons: Vec<RetryReason>,
    /// Number of attempts made.
    pub retry_attempts: u32,
}

/// Payload of a failed generic HTTP request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HttpErrorInfo {
    /// Message of the underlying cause.
    #[serde(skip)]
    pub inner_error: String,
    /// Unique identifier of the request.
    pub unique_id: String,
    /// Endpoint that served the request.
    pub endpoint: String,
    /// Reasons the request was retried, in order.
    pub retry_reasons: Vec<RetryReason>,
    /// Number of attempts made.
    pub retry_attempts: u32,
}

/// The error type returned by a [`Transport`](crate::Transport) and its
/// service providers.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A key-value operation failed.
    #[error("key-value error: {}", .0.inner_error)]
    KeyValue(KeyValueErrorInfo),

    /// A view query failed.
    #[error("view error: {}", .0.inner_error)]
    View(ViewErrorInfo),

    /// A N1QL query failed.
    #[error("query error: {}", .0.inner_error)]
    Query(QueryErrorInfo),

    /// An analytics query failed.
    #[error("analytics error: {}", .0.inner_error)]
    Analytics(AnalyticsErrorInfo),

    /// A generic HTTP request failed.
    #[error("http error: {}", .0.inner_error)]
    Http(HttpErrorInfo),

    /// Connection-related errors (refused, reset, bucket selection rejected).
    #[error("connection error: {0}")]
    Connection(String),

    /// Protocol-related errors (malformed configuration, unexpected frames).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Operation timeout errors.
    #[error("timeout error: {0}")]
    Timeout(String),

    /// Authentication errors.
    #[error("authentication error: {0}")]
    Authentication(String),

    /// Configuration errors (the transport could not build its configuration).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The transport does not provide the requested service yet.
    #[error("service not available: {0}")]
    ServiceNotAvailable(String),

    /// I/O errors from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A specialized `Result` type for transport operations.
pub type Result<T> = std::result::Result<T, CoreError>;
