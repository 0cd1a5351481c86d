//! Retry reasons reported by the transport.

use serde::{Serialize, Serializer};

/// Why the transport decided a request was eligible for another attempt.
///
/// Each reason has a stable upper-case identifier that is what ends up in
/// serialized error payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetryReason {
    /// The reason could not be classified.
    Unknown,
    /// No socket to the target node was available.
    SocketNotAvailable,
    /// The target service was not available on any node.
    ServiceNotAvailable,
    /// The target node was not part of the current configuration.
    NodeNotAvailable,
    /// The node responded that it does not own the vbucket.
    KvNotMyVbucket,
    /// The collection manifest the request was built against is outdated.
    KvCollectionOutdated,
    /// The server error map marked the status as retryable.
    KvErrorMapRetryIndicated,
    /// The document is locked.
    KvLocked,
    /// The server reported a temporary failure.
    KvTemporaryFailure,
    /// A synchronous write is in progress on the document.
    KvSyncWriteInProgress,
    /// A synchronous write re-commit is in progress on the document.
    KvSyncWriteReCommitInProgress,
    /// An HTTP service returned a status code that indicates a retry.
    ServiceResponseCodeIndicated,
    /// The socket closed while the request was in flight.
    SocketClosedWhileInFlight,
    /// The circuit breaker for the endpoint is open.
    CircuitBreakerOpen,
    /// A prepared query statement failed and must be re-prepared.
    QueryPreparedStatementFailure,
    /// The query index was not found.
    QueryIndexNotFound,
    /// The analytics service reported a temporary failure.
    AnalyticsTemporaryFailure,
    /// The search service rejected the request with too many requests.
    SearchTooManyRequests,
}

impl RetryReason {
    /// Returns the stable identifier for this reason.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::SocketNotAvailable => "SOCKET_NOT_AVAILABLE",
            Self::ServiceNotAvailable => "SERVICE_NOT_AVAILABLE",
            Self::NodeNotAvailable => "NODE_NOT_AVAILABLE",
            Self::KvNotMyVbucket => "KV_NOT_MY_VBUCKET",
            Self::KvCollectionOutdated => "KV_COLLECTION_OUTDATED",
            Self::KvErrorMapRetryIndicated => "KV_ERROR_MAP_RETRY_INDICATED",
            Self::KvLocked => "KV_LOCKED",
            Self::KvTemporaryFailure => "KV_TEMPORARY_FAILURE",
            Self::KvSyncWriteInProgress => "KV_SYNC_WRITE_IN_PROGRESS",
            Self::KvSyncWriteReCommitInProgress => "KV_SYNC_WRITE_RE_COMMIT_IN_PROGRESS",
            Self::ServiceResponseCodeIndicated => "SERVICE_RESPONSE_CODE_INDICATED",
            Self::SocketClosedWhileInFlight => "SOCKET_CLOSED_WHILE_IN_FLIGHT",
            Self::CircuitBreakerOpen => "CIRCUIT_BREAKER_OPEN",
            Self::QueryPreparedStatementFailure => "QUERY_PREPARED_STATEMENT_FAILURE",
            Self::QueryIndexNotFound => "QUERY_INDEX_NOT_FOUND",
            Self::AnalyticsTemporaryFailure => "ANALYTICS_TEMPORARY_FAILURE",
            Self::SearchTooManyRequests => "SEARCH_TOO_MANY_REQUESTS",
        }
    }

    /// Returns true if non-idempotent requests may be retried for this reason.
    ///
    /// Only reasons where the request provably never reached the server
    /// qualify.
    pub fn allows_non_idempotent_retry(&self) -> bool {
        matches!(
            self,
            Self::SocketNotAvailable
                | Self::ServiceNotAvailable
                | Self::NodeNotAvailable
                | Self::KvNotMyVbucket
                | Self::KvCollectionOutdated
                | Self::KvErrorMapRetryIndicated
                | Self::KvLocked
                | Self::KvTemporaryFailure
                | Self::KvSyncWriteInProgress
                | Self::KvSyncWriteReCommitInProgress
                | Self::CircuitBreakerOpen
                | Self::QueryPreparedStatementFailure
                | Self::QueryIndexNotFound
                | Self::AnalyticsTemporaryFailure
                | Self::SearchTooManyRequests
        )
    }
}

impl std::fmt::Display for RetryReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

impl Serialize for RetryReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.description())
    }
}
