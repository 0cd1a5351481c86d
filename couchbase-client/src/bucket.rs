//! Handle to a single bucket.

use std::sync::Arc;

use couchbase_core::CoreError;

use crate::connection::ManagedConnection;

/// A bucket opened through [`Cluster::bucket`](crate::Cluster::bucket).
///
/// Opening never fails. A bucket whose connection could not be bootstrapped
/// keeps the failure, available from [`bootstrap_error`](Self::bootstrap_error).
#[derive(Debug, Clone)]
pub struct Bucket {
    name: String,
    connection: Arc<ManagedConnection>,
}

impl Bucket {
    pub(crate) fn new(name: String, connection: Arc<ManagedConnection>) -> Self {
        Self { name, connection }
    }

    /// Returns the bucket name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the connection serving this bucket.
    pub fn connection(&self) -> &Arc<ManagedConnection> {
        &self.connection
    }

    /// Returns the error recorded while opening the bucket, if any.
    pub fn bootstrap_error(&self) -> Option<Arc<CoreError>> {
        self.connection.bootstrap_error()
    }

    /// Returns true if the bucket's connection is usable.
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }
}
