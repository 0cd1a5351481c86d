//! Retry reasons attached to client errors.

use serde::Serialize;

use couchbase_core::RetryReason as CoreRetryReason;

/// A reason a request was retried before it failed.
///
/// Reasons are identified by their upper-case description, e.g.
/// `SERVICE_NOT_AVAILABLE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RetryReason(String);

impl RetryReason {
    /// Creates a retry reason from its description.
    pub fn new(description: impl Into<String>) -> Self {
        Self(description.into())
    }

    /// Returns the description identifying this reason.
    pub fn description(&self) -> &str {
        &self.0
    }
}

impl From<CoreRetryReason> for RetryReason {
    fn from(reason: CoreRetryReason) -> Self {
        Self(reason.description().to_string())
    }
}

impl std::fmt::Display for RetryReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub(crate) fn translate_core_retry_reasons(reasons: Vec<CoreRetryReason>) -> Vec<RetryReason> {
    reasons.into_iter().map(RetryReason::from).collect()
}
