//! Connection management for the Couchbase client.

#[allow(clippy::module_inception)]
mod connection;
mod identity;
mod registry;
mod router;

#[cfg(test)]
pub(crate) mod testing;

pub use connection::{ConnectionId, ManagedConnection};
pub use identity::ConnectionIdentity;
pub use registry::{ClientRegistry, FloatingConnection};
pub use router::ServiceRouter;
