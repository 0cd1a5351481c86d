//! Cluster configuration types and builders.

use std::time::Duration;

use couchbase_core::{AgentConfig, Credentials};

use crate::connstr::ConnSpec;

/// Default timeout for establishing a connection.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(10_000);
/// Default timeout for key-value operations.
const DEFAULT_KV_TIMEOUT: Duration = Duration::from_millis(2_500);
/// Default timeout for view queries.
const DEFAULT_VIEW_TIMEOUT: Duration = Duration::from_millis(75_000);
/// Default timeout for N1QL queries.
const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_millis(75_000);
/// Default timeout for analytics queries.
const DEFAULT_ANALYTICS_TIMEOUT: Duration = Duration::from_millis(75_000);
/// Default timeout for search queries.
const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_millis(75_000);
/// Default timeout for management requests.
const DEFAULT_MANAGEMENT_TIMEOUT: Duration = Duration::from_millis(75_000);
/// Default timeout for durable writes.
const DEFAULT_DURABILITY_TIMEOUT: Duration = Duration::from_millis(40_000);
/// Default interval between durability polls.
const DEFAULT_DURABILITY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration error returned when validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Per-service operation timeouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutConfig {
    connect: Duration,
    kv: Duration,
    view: Duration,
    query: Duration,
    analytics: Duration,
    search: Duration,
    management: Duration,
    durability: Duration,
    durability_poll_interval: Duration,
}

impl TimeoutConfig {
    /// Returns the connection establishment timeout.
    pub fn connect(&self) -> Duration {
        self.connect
    }

    /// Returns the key-value operation timeout.
    pub fn kv(&self) -> Duration {
        self.kv
    }

    /// Returns the view query timeout.
    pub fn view(&self) -> Duration {
        self.view
    }

    /// Returns the N1QL query timeout.
    pub fn query(&self) -> Duration {
        self.query
    }

    /// Returns the analytics query timeout.
    pub fn analytics(&self) -> Duration {
        self.analytics
    }

    /// Returns the search query timeout.
    pub fn search(&self) -> Duration {
        self.search
    }

    /// Returns the management request timeout.
    pub fn management(&self) -> Duration {
        self.management
    }

    /// Returns the durable write timeout.
    pub fn durability(&self) -> Duration {
        self.durability
    }

    /// Returns the interval between durability polls.
    pub fn durability_poll_interval(&self) -> Duration {
        self.durability_poll_interval
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect: DEFAULT_CONNECT_TIMEOUT,
            kv: DEFAULT_KV_TIMEOUT,
            view: DEFAULT_VIEW_TIMEOUT,
            query: DEFAULT_QUERY_TIMEOUT,
            analytics: DEFAULT_ANALYTICS_TIMEOUT,
            search: DEFAULT_SEARCH_TIMEOUT,
            management: DEFAULT_MANAGEMENT_TIMEOUT,
            durability: DEFAULT_DURABILITY_TIMEOUT,
            durability_poll_interval: DEFAULT_DURABILITY_POLL_INTERVAL,
        }
    }
}

/// Builder for `TimeoutConfig`.
#[derive(Debug, Clone, Default)]
pub struct TimeoutConfigBuilder {
    connect: Option<Duration>,
    kv: Option<Duration>,
    view: Option<Duration>,
    query: Option<Duration>,
    analytics: Option<Duration>,
    search: Option<Duration>,
    management: Option<Duration>,
    durability: Option<Duration>,
    durability_poll_interval: Option<Duration>,
}

impl TimeoutConfigBuilder {
    /// Creates a new timeout configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the connection establishment timeout.
    pub fn connect(mut self, timeout: Duration) -> Self {
        self.connect = Some(timeout);
        self
    }

    /// Sets the key-value operation timeout.
    pub fn kv(mut self, timeout: Duration) -> Self {
        self.kv = Some(timeout);
        self
    }

    /// Sets the view query timeout.
    pub fn view(mut self, timeout: Duration) -> Self {
        self.view = Some(timeout);
        self
    }

    /// Sets the N1QL query timeout.
    pub fn query(mut self, timeout: Duration) -> Self {
        self.query = Some(timeout);
        self
    }

    /// Sets the analytics query timeout.
    pub fn analytics(mut self, timeout: Duration) -> Self {
        self.analytics = Some(timeout);
        self
    }

    /// Sets the search query timeout.
    pub fn search(mut self, timeout: Duration) -> Self {
        self.search = Some(timeout);
        self
    }

    /// Sets the management request timeout.
    pub fn management(mut self, timeout: Duration) -> Self {
        self.management = Some(timeout);
        self
    }

    /// Sets the durable write timeout.
    pub fn durability(mut self, timeout: Duration) -> Self {
        self.durability = Some(timeout);
        self
    }

    /// Sets the interval between durability polls.
    pub fn durability_poll_interval(mut self, interval: Duration) -> Self {
        self.durability_poll_interval = Some(interval);
        self
    }

    /// Builds the timeout configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any supplied timeout is zero.
    pub fn build(self) -> Result<TimeoutConfig, ConfigError> {
        fn resolve(
            name: &str,
            value: Option<Duration>,
            default: Duration,
        ) -> Result<Duration, ConfigError> {
            match value {
                Some(d) if d.is_zero() => {
                    Err(ConfigError::new(format!("{} timeout must be positive", name)))
                }
                Some(d) => Ok(d),
                None => Ok(default),
            }
        }

        Ok(TimeoutConfig {
            connect: resolve("connect", self.connect, DEFAULT_CONNECT_TIMEOUT)?,
            kv: resolve("kv", self.kv, DEFAULT_KV_TIMEOUT)?,
            view: resolve("view", self.view, DEFAULT_VIEW_TIMEOUT)?,
            query: resolve("query", self.query, DEFAULT_QUERY_TIMEOUT)?,
            analytics: resolve("analytics", self.analytics, DEFAULT_ANALYTICS_TIMEOUT)?,
            search: resolve("search", self.search, DEFAULT_SEARCH_TIMEOUT)?,
            management: resolve("management", self.management, DEFAULT_MANAGEMENT_TIMEOUT)?,
            durability: resolve("durability", self.durability, DEFAULT_DURABILITY_TIMEOUT)?,
            durability_poll_interval: resolve(
                "durability_poll_interval",
                self.durability_poll_interval,
                DEFAULT_DURABILITY_POLL_INTERVAL,
            )?,
        })
    }
}

/// Username/password authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordAuthenticator {
    username: String,
    password: String,
}

impl PasswordAuthenticator {
    /// Creates a new authenticator.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for PasswordAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordAuthenticator")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Options used when connecting to a cluster.
#[derive(Debug, Clone, Default)]
pub struct ClusterOptions {
    authenticator: Option<PasswordAuthenticator>,
    timeouts: TimeoutConfig,
    disable_mutation_tokens: bool,
    disable_server_durations: bool,
}

impl ClusterOptions {
    /// Creates a new cluster options builder.
    pub fn builder() -> ClusterOptionsBuilder {
        ClusterOptionsBuilder::new()
    }

    /// Returns the configured authenticator.
    pub fn authenticator(&self) -> Option<&PasswordAuthenticator> {
        self.authenticator.as_ref()
    }

    /// Returns the timeout configuration.
    pub fn timeouts(&self) -> &TimeoutConfig {
        &self.timeouts
    }

    /// Returns whether mutation tokens are requested from the server.
    pub fn use_mutation_tokens(&self) -> bool {
        !self.disable_mutation_tokens
    }

    /// Returns whether server-side operation durations are requested.
    pub fn use_server_durations(&self) -> bool {
        !self.disable_server_durations
    }

    /// Applies the timeout overrides carried in a connection string.
    ///
    /// Recognized options are `n1ql_timeout`, `analytics_timeout`,
    /// `search_timeout` and `view_timeout`, each in milliseconds. When an
    /// option is repeated, the last value wins.
    pub fn apply_conn_spec(&mut self, spec: &ConnSpec) -> Result<(), ConfigError> {
        let overrides: [(&str, &mut Duration); 4] = [
            ("n1ql_timeout", &mut self.timeouts.query),
            ("analytics_timeout", &mut self.timeouts.analytics),
            ("search_timeout", &mut self.timeouts.search),
            ("view_timeout", &mut self.timeouts.view),
        ];

        for (name, target) in overrides {
            if let Some(value) = spec.option(name) {
                let millis: u64 = value
                    .parse()
                    .map_err(|_| ConfigError::new(format!("{} option must be a number", name)))?;
                *target = Duration::from_millis(millis);
            }
        }

        Ok(())
    }

    /// Builds the transport configuration for a connection.
    pub(crate) fn agent_config(&self, spec: &ConnSpec, bucket_name: Option<&str>) -> AgentConfig {
        AgentConfig {
            scheme: spec.scheme().to_string(),
            addresses: spec.addresses().iter().map(|a| a.to_string()).collect(),
            bucket_name: bucket_name.map(str::to_string),
            credentials: self.authenticator.as_ref().map(|auth| Credentials {
                username: auth.username.clone(),
                password: auth.password.clone(),
            }),
            connect_timeout: self.timeouts.connect,
            kv_timeout: self.timeouts.kv,
            use_mutation_tokens: self.use_mutation_tokens(),
            use_server_durations: self.use_server_durations(),
            options: spec.options().clone(),
        }
    }
}

/// Builder for `ClusterOptions`.
#[derive(Debug, Clone, Default)]
pub struct ClusterOptionsBuilder {
    authenticator: Option<PasswordAuthenticator>,
    timeouts: TimeoutConfigBuilder,
    disable_mutation_tokens: bool,
    disable_server_durations: bool,
}

impl ClusterOptionsBuilder {
    /// Creates a new cluster options builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the authenticator.
    pub fn authenticator(mut self, authenticator: PasswordAuthenticator) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Sets username/password credentials.
    pub fn credentials(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.authenticator(PasswordAuthenticator::new(username, password))
    }

    /// Configures timeouts using a builder function.
    pub fn timeouts<F>(mut self, f: F) -> Self
    where
        F: FnOnce(TimeoutConfigBuilder) -> TimeoutConfigBuilder,
    {
        self.timeouts = f(self.timeouts);
        self
    }

    /// Sets the connection establishment timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts = self.timeouts.connect(timeout);
        self
    }

    /// Stops requesting mutation tokens from the server.
    pub fn disable_mutation_tokens(mut self, disable: bool) -> Self {
        self.disable_mutation_tokens = disable;
        self
    }

    /// Stops requesting server-side operation durations.
    pub fn disable_server_durations(mut self, disable: bool) -> Self {
        self.disable_server_durations = disable;
        self
    }

    /// Builds the cluster options, returning an error if validation fails.
    pub fn build(self) -> Result<ClusterOptions, ConfigError> {
        if let Some(auth) = &self.authenticator {
            if auth.username.is_empty() {
                return Err(ConfigError::new("username must not be empty"));
            }
        }

        Ok(ClusterOptions {
            authenticator: self.authenticator,
            timeouts: self.timeouts.build()?,
            disable_mutation_tokens: self.disable_mutation_tokens,
            disable_server_durations: self.disable_server_durations,
        })
    }
}
