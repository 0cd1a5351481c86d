//! Error types returned by the client.
//!
//! Transport errors with a recognized shape are rewrapped into the typed
//! errors below by [`enhance_core_error`](crate::enhance::enhance_core_error);
//! anything else is surfaced as [`Error::Core`] unchanged.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use couchbase_core::CoreError;

use crate::config::ConfigError;
use crate::enhance::serialize_wrapped_error;
use crate::retry::RetryReason;

/// A request option combination that cannot be sent to the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidArgumentError {
    /// Two options that select alternative mechanisms were both supplied.
    #[error("{first} and {second} must be used exclusively")]
    MutuallyExclusive {
        /// The first conflicting option.
        first: &'static str,
        /// The second conflicting option.
        second: &'static str,
    },

    /// A single option holds a value that cannot be encoded.
    #[error("invalid {option}: {reason}")]
    InvalidValue {
        /// The offending option.
        option: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// The main error type for client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The caller supplied options that cannot be encoded.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgumentError),

    /// A cluster-level operation was requested but the cluster cannot route it.
    #[error("cluster-level operations not supported due to cluster version")]
    ClusterLevelUnsupported,

    /// No connection to the cluster is established.
    #[error("not connected to cluster")]
    NotConnected,

    /// The connection was closed.
    #[error("connection is closed")]
    Closed,

    /// The connection failed to connect or to select its bucket.
    #[error(transparent)]
    Bootstrap(Arc<CoreError>),

    /// A key-value operation failed.
    #[error(transparent)]
    KeyValue(KeyValueError),

    /// A view query failed.
    #[error(transparent)]
    View(ViewError),

    /// A N1QL query failed.
    #[error(transparent)]
    Query(QueryError),

    /// An analytics query failed.
    #[error(transparent)]
    Analytics(AnalyticsError),

    /// A search query failed.
    #[error(transparent)]
    Search(SearchError),

    /// A generic HTTP request failed.
    #[error(transparent)]
    Http(HttpError),

    /// The client configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A transport error with no richer representation.
    #[error(transparent)]
    Core(CoreError),
}

impl Error {
    /// Returns the retry reasons recorded for this error, if it carries any.
    pub fn retry_reasons(&self) -> &[RetryReason] {
        match self {
            Self::KeyValue(e) => &e.retry_reasons,
            Self::View(e) => &e.retry_reasons,
            Self::Query(e) => &e.retry_reasons,
            Self::Analytics(e) => &e.retry_reasons,
            Self::Search(e) => &e.retry_reasons,
            Self::Http(e) => &e.retry_reasons,
            _ => &[],
        }
    }

    /// Returns the number of attempts recorded for this error.
    pub fn retry_attempts(&self) -> u32 {
        match self {
            Self::KeyValue(e) => e.retry_attempts,
            Self::View(e) => e.retry_attempts,
            Self::Query(e) => e.retry_attempts,
            Self::Analytics(e) => e.retry_attempts,
            Self::Search(e) => e.retry_attempts,
            Self::Http(e) => e.retry_attempts,
            _ => 0,
        }
    }
}

/// A specialized `Result` type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

macro_rules! wrapped_error_display {
    ($($ty:ident),*) => {
        $(
            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{} | {}", self.inner_error, serialize_wrapped_error(self))
                }
            }

            impl std::error::Error for $ty {}
        )*
    };
}

/// Error returned by a failed key-value operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeyValueError {
    /// Message of the underlying cause.
    #[serde(skip)]
    pub inner_error: String,
    /// Binary protocol status code.
    pub status_code: u16,
    /// Bucket the operation targeted.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bucket_name: String,
    /// Scope the operation targeted.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub scope_name: String,
    /// Collection the operation targeted.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub collection_name: String,
    /// Resolved collection identifier.
    pub collection_id: u32,
    /// Error name from the server error map.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error_name: String,
    /// Error description from the server error map.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error_description: String,
    /// Opaque value of the request.
    pub opaque: u32,
    /// Extended error context returned by the server.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub context: String,
    /// Extended error reference returned by the server.
    #[serde(rename = "ref", skip_serializing_if = "String::is_empty")]
    pub reference: String,
    /// Reasons the request was retried, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub retry_reasons: Vec<RetryReason>,
    /// Number of attempts made.
    pub retry_attempts: u32,
}

/// A single error entry reported by the view service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewErrorDesc {
    /// Node that reported the error.
    pub source_node: String,
    /// Error message.
    pub message: String,
}

/// Error returned by a failed view query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewError {
    /// Message of the underlying cause.
    #[serde(skip)]
    pub inner_error: String,
    /// Design document the view belongs to.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub design_document_name: String,
    /// View name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub view_name: String,
    /// Errors reported by the service.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ViewErrorDesc>,
    /// Endpoint that served the request.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub endpoint: String,
    /// Reasons the request was retried, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub retry_reasons: Vec<RetryReason>,
    /// Number of attempts made.
    pub retry_attempts: u32,
}

/// A single error entry reported by the query service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryErrorDesc {
    /// Service error code.
    pub code: u32,
    /// Error message.
    pub message: String,
}

/// Error returned by a failed N1QL query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryError {
    /// Message of the underlying cause.
    #[serde(skip)]
    pub inner_error: String,
    /// Statement that was executed.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub statement: String,
    /// Client context identifier sent with the request.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub client_context_id: String,
    /// Errors reported by the service.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<QueryErrorDesc>,
    /// Endpoint that served the request.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub endpoint: String,
    /// Reasons the request was retried, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub retry_reasons: Vec<RetryReason>,
    /// Number of attempts made.
    pub retry_attempts: u32,
}

/// A single error entry reported by the analytics service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalyticsErrorDesc {
    /// Service error code.
    pub code: u32,
    /// Error message.
    pub message: String,
}

/// Error returned by a failed analytics query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalyticsError {
    /// Message of the underlying cause.
    #[serde(skip)]
    pub inner_error: String,
    /// Statement that was executed.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub statement: String,
    /// Client context identifier sent with the request.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub client_context_id: String,
    /// Errors reported by the service.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<AnalyticsErrorDesc>,
    /// Endpoint that served the request.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub endpoint: String,
    /// Reasons the request was retried, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub retry_reasons: Vec<RetryReason>,
    /// Number of attempts made.
    pub retry_attempts: u32,
}

/// Error returned by a failed search query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchError {
    /// Message of the underlying cause.
    #[serde(skip)]
    pub inner_error: String,
    /// Query that was executed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
    /// Endpoint that served the request.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub endpoint: String,
    /// Reasons the request was retried, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub retry_reasons: Vec<RetryReason>,
    /// Number of attempts made.
    pub retry_attempts: u32,
}

/// Error returned by a failed generic HTTP request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HttpError {
    /// Message of the underlying cause.
    #[serde(skip)]
    pub inner_error: String,
    /// Unique identifier of the request.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub unique_id: String,
    /// Endpoint that served the request.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub endpoint: String,
    /// Reasons the request was retried, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub retry_reasons: Vec<RetryReason>,
    /// Number of attempts made.
    pub retry_attempts: u32,
}

wrapped_error_display!(
    KeyValueError,
    ViewError,
    QueryError,
    AnalyticsError,
    SearchError,
    HttpError
);
