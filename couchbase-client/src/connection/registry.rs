//! Ownership of every live connection, keyed by identity.

use std::collections::HashMap;
use std::sync::Arc;

use couchbase_core::{AgentConfig, TransportFactory};
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::instrument;

use super::connection::ManagedConnection;
use super::identity::ConnectionIdentity;
use crate::error::Result;

/// A slot holding the shared cluster-level connection until a bucket claims it.
///
/// The slot can be emptied exactly once; every later claim observes `None`.
#[derive(Debug, Default)]
pub struct FloatingConnection {
    slot: Option<Arc<ManagedConnection>>,
}

impl FloatingConnection {
    /// Creates a slot, empty or holding `connection`.
    pub fn new(connection: Option<Arc<ManagedConnection>>) -> Self {
        Self { slot: connection }
    }

    /// Removes and returns the connection if it has not been claimed yet.
    pub fn claim(&mut self) -> Option<Arc<ManagedConnection>> {
        self.slot.take()
    }

    /// Returns the unclaimed connection without removing it.
    pub fn peek(&self) -> Option<&Arc<ManagedConnection>> {
        self.slot.as_ref()
    }

    /// Returns true when the slot is empty.
    pub fn is_claimed(&self) -> bool {
        self.slot.is_none()
    }
}

#[derive(Debug, Default)]
pub(crate) struct RegistryState {
    pub(crate) connections: HashMap<ConnectionIdentity, Arc<ManagedConnection>>,
    pub(crate) floating: FloatingConnection,
}

/// Registry of per-bucket connections plus the floating shared connection.
///
/// The lock guards only map and slot mutation. Connecting, bucket selection
/// and closing happen on the returned connection after the lock is released.
#[derive(Debug)]
pub struct ClientRegistry {
    factory: Arc<dyn TransportFactory>,
    base_config: AgentConfig,
    state: RwLock<RegistryState>,
}

impl ClientRegistry {
    /// Creates a registry that builds new transports with `factory`, starting
    /// from `base_config`, and that owns the optional floating connection.
    pub fn new(
        factory: Arc<dyn TransportFactory>,
        base_config: AgentConfig,
        floating: Option<Arc<ManagedConnection>>,
    ) -> Self {
        Self {
            factory,
            base_config,
            state: RwLock::new(RegistryState {
                connections: HashMap::new(),
                floating: FloatingConnection::new(floating),
            }),
        }
    }

    /// Returns the connection for `identity`, claiming the floating connection
    /// or creating a new one as needed.
    ///
    /// Bootstrap failures are recorded on the returned connection rather than
    /// returned, so a failed bucket stays registered and observable.
    #[instrument(skip(self, identity), fields(identity = %identity))]
    pub async fn acquire_for_bucket(
        &self,
        identity: ConnectionIdentity,
    ) -> Arc<ManagedConnection> {
        let claimed = {
            let mut state = self.state.write().await;
            match state.floating.claim() {
                Some(conn) => {
                    state.connections.insert(identity.clone(), Arc::clone(&conn));
                    Some(conn)
                }
                None => None,
            }
        };

        if let Some(conn) = claimed {
            tracing::debug!(connection = %conn.id(), "claimed floating connection");
            if let Some(bucket) = identity.bucket_name() {
                if let Err(e) = conn.select_bucket(bucket).await {
                    conn.set_bootstrap_error(e);
                }
            }
            return conn;
        }

        if let Some(conn) = self.state.read().await.connections.get(&identity) {
            return Arc::clone(conn);
        }

        let (conn, created) = {
            let mut state = self.state.write().await;
            match state.connections.get(&identity) {
                Some(existing) => (Arc::clone(existing), false),
                None => {
                    let config = self.config_for(&identity);
                    let conn = Arc::new(ManagedConnection::new(self.factory.create(&config)));
                    state.connections.insert(identity.clone(), Arc::clone(&conn));
                    (conn, true)
                }
            }
        };

        if created {
            tracing::debug!(connection = %conn.id(), "created connection");
            if let Err(e) = self.bootstrap(&conn).await {
                conn.set_bootstrap_error(e);
            }
        }
        conn
    }

    /// Publishes an already-built connection under `identity`, replacing any
    /// previous entry.
    pub async fn register(&self, identity: ConnectionIdentity, connection: Arc<ManagedConnection>) {
        tracing::debug!(identity = %identity, connection = %connection.id(), "registered connection");
        self.state.write().await.connections.insert(identity, connection);
    }

    /// Returns the connection stored under `identity`, if any.
    pub async fn get(&self, identity: &ConnectionIdentity) -> Option<Arc<ManagedConnection>> {
        self.state.read().await.connections.get(identity).cloned()
    }

    /// Returns the number of registered connections, excluding an unclaimed
    /// floating connection.
    pub async fn len(&self) -> usize {
        self.state.read().await.connections.len()
    }

    /// Returns true when no connection is registered.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.connections.is_empty()
    }

    /// Returns true once the floating connection has been claimed or when
    /// there never was one.
    pub async fn floating_claimed(&self) -> bool {
        self.state.read().await.floating.is_claimed()
    }

    pub(crate) async fn read_state(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().await
    }

    /// Closes every registered connection and the unclaimed floating one.
    ///
    /// Every connection is closed even after a failure. The registry is empty
    /// afterwards and the first failure, if any, is returned.
    pub async fn close_all(&self) -> Result<()> {
        let connections: Vec<Arc<ManagedConnection>> = {
            let mut state = self.state.write().await;
            let mut drained: Vec<_> = state.connections.drain().map(|(_, conn)| conn).collect();
            drained.extend(state.floating.claim());
            drained
        };

        let mut first_error = None;
        for conn in connections {
            if let Err(e) = conn.close().await {
                tracing::warn!(connection = %conn.id(), error = %e, "failed to close connection");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn config_for(&self, identity: &ConnectionIdentity) -> AgentConfig {
        let mut config = self.base_config.clone();
        config.bucket_name = identity.bucket_name().map(str::to_string);
        config.use_mutation_tokens = identity.use_mutation_tokens();
        config.use_server_durations = identity.use_server_durations();
        config
    }

    async fn bootstrap(&self, conn: &ManagedConnection) -> couchbase_core::Result<()> {
        conn.build_config()?;
        conn.connect().await
    }
}
