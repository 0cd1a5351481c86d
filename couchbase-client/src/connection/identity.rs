//! Keys distinguishing logical connections.

use crate::config::ClusterOptions;

/// Deterministic key for a logical connection.
///
/// Two identities compare equal exactly when their bucket and every
/// connection-relevant option match, so equal identities share one connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionIdentity {
    bucket_name: Option<String>,
    use_mutation_tokens: bool,
    use_server_durations: bool,
}

impl ConnectionIdentity {
    /// Creates the identity of a connection bound to `bucket_name`.
    pub fn for_bucket(bucket_name: impl Into<String>, options: &ClusterOptions) -> Self {
        Self {
            bucket_name: Some(bucket_name.into()),
            use_mutation_tokens: options.use_mutation_tokens(),
            use_server_durations: options.use_server_durations(),
        }
    }

    /// Creates the identity of a connection not bound to any bucket.
    pub fn cluster_level(options: &ClusterOptions) -> Self {
        Self {
            bucket_name: None,
            use_mutation_tokens: options.use_mutation_tokens(),
            use_server_durations: options.use_server_durations(),
        }
    }

    /// Returns the bucket, or `None` for a cluster-level identity.
    pub fn bucket_name(&self) -> Option<&str> {
        self.bucket_name.as_deref()
    }

    /// Returns whether mutation tokens are requested on this connection.
    pub fn use_mutation_tokens(&self) -> bool {
        self.use_mutation_tokens
    }

    /// Returns whether server durations are requested on this connection.
    pub fn use_server_durations(&self) -> bool {
        self.use_server_durations
    }
}

impl std::fmt::Display for ConnectionIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.bucket_name.as_deref().unwrap_or(""),
            self.use_mutation_tokens,
            self.use_server_durations
        )
    }
}
