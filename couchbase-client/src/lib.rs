//! Async Rust client layer for [Couchbase](https://www.couchbase.com/).
//!
//! This crate sits between applications and a network [`Transport`]. It owns
//! the connections opened for each bucket, routes cluster-level requests to a
//! live connection, encodes typed request options into the JSON parameter maps
//! the services expect, and turns raw transport errors into typed, retry-aware
//! errors.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use couchbase_client::{AnalyticsOptions, Cluster, ClusterOptions};
//!
//! let options = ClusterOptions::builder()
//!     .credentials("Administrator", "password")
//!     .build()?;
//! let cluster = Cluster::connect("couchbase://10.0.0.1", options, transport_factory).await?;
//!
//! let bucket = cluster.bucket("travel-sample").await;
//! if let Some(err) = bucket.bootstrap_error() {
//!     eprintln!("bucket unavailable: {err}");
//! }
//!
//! let result = cluster
//!     .analytics_query("SELECT 1", &AnalyticsOptions::new().with_read_only(true))
//!     .await?;
//! println!("{} rows", result.rows.len());
//!
//! cluster.close().await?;
//! ```
//!
//! # Connections
//!
//! [`Cluster::connect`] opens one connection that is not bound to a bucket.
//! The first [`Cluster::bucket`] call claims it; every later bucket gets its
//! own connection, shared by equal [`ConnectionIdentity`] values. Requests
//! that are not bucket-scoped go through the [`ServiceRouter`].
//!
//! # Configuration
//!
//! Use [`ClusterOptions::builder()`](ClusterOptions::builder), environment
//! variables through [`ClusterOptions::from_env`], or, with the `config-file`
//! feature, YAML and TOML files. Timeout options in the connection string
//! (`n1ql_timeout`, `analytics_timeout`, `search_timeout`, `view_timeout`)
//! override the configured values.

#![warn(missing_docs)]

mod bucket;
mod cluster;
pub mod config;
pub mod config_file;
pub mod connection;
pub mod connstr;
pub mod enhance;
pub mod error;
pub mod mutation_state;
pub mod options;
pub mod retry;
pub mod search;

pub use bucket::Bucket;
pub use cluster::Cluster;
pub use config::{
    ClusterOptions, ClusterOptionsBuilder, ConfigError, PasswordAuthenticator, TimeoutConfig,
    TimeoutConfigBuilder,
};
pub use connection::{
    ClientRegistry, ConnectionId, ConnectionIdentity, FloatingConnection, ManagedConnection,
    ServiceRouter,
};
pub use connstr::{Address, ConnSpec};
pub use couchbase_core as core;
pub use couchbase_core::{ServiceResponse, Transport, TransportFactory};
pub use enhance::{enhance_core_error, enhance_search_error};
pub use error::{
    AnalyticsError, Error, HttpError, InvalidArgumentError, KeyValueError, QueryError, Result,
    SearchError, ViewError,
};
pub use mutation_state::{MutationState, MutationToken};
pub use options::{
    AnalyticsOptions, SearchHighlightOptions, SearchHighlightStyle, SearchOptions,
    SearchScanConsistency,
};
pub use retry::RetryReason;
pub use search::{DateRange, NumericRange, SearchFacet, SearchSort};
