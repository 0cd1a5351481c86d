//! Declarative configuration loading from YAML, TOML, and environment variables.
//!
//! File formats deserialize into [`FileConfig`], a serde mirror of
//! [`ClusterOptions`] that is converted with [`TryFrom`]. Timeouts are given in
//! milliseconds.
//!
//! # Supported Formats
//!
//! - **YAML** (requires `config-file` feature): `ClusterOptions::from_yaml("couchbase.yaml")`
//! - **TOML** (requires `config-file` feature): `ClusterOptions::from_toml("couchbase.toml")`
//! - **Environment Variables** (always available): `ClusterOptions::from_env()`
//!
//! # Example TOML
//!
//! ```toml
//! username = "Administrator"
//! password = "password"
//! disable-server-durations = true
//!
//! [timeouts]
//! connect-ms = 5000
//! kv-ms = 2500
//! analytics-ms = 120000
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ClusterOptions, ClusterOptionsBuilder, ConfigError};

/// Top-level file-based configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case", default)]
pub struct FileConfig {
    /// Username for password authentication.
    pub username: Option<String>,
    /// Password for password authentication.
    pub password: Option<String>,
    /// Timeout configuration.
    pub timeouts: Option<FileTimeoutConfig>,
    /// Stop requesting mutation tokens.
    pub disable_mutation_tokens: Option<bool>,
    /// Stop requesting server-side operation durations.
    pub disable_server_durations: Option<bool>,
}

/// File-based timeout configuration, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case", default)]
pub struct FileTimeoutConfig {
    /// Connection establishment timeout.
    pub connect_ms: Option<u64>,
    /// Key-value operation timeout.
    pub kv_ms: Option<u64>,
    /// View query timeout.
    pub view_ms: Option<u64>,
    /// N1QL query timeout.
    pub query_ms: Option<u64>,
    /// Analytics query timeout.
    pub analytics_ms: Option<u64>,
    /// Search query timeout.
    pub search_ms: Option<u64>,
    /// Management request timeout.
    pub management_ms: Option<u64>,
    /// Durable write timeout.
    pub durability_ms: Option<u64>,
    /// Interval between durability polls.
    pub durability_poll_interval_ms: Option<u64>,
}

impl TryFrom<FileConfig> for ClusterOptions {
    type Error = ConfigError;

    fn try_from(file: FileConfig) -> Result<Self, Self::Error> {
        let mut builder = ClusterOptionsBuilder::new();

        match (file.username, file.password) {
            (Some(username), password) => {
                builder = builder.credentials(username, password.unwrap_or_default());
            }
            (None, Some(_)) => {
                return Err(ConfigError::new("password given without a username"));
            }
            (None, None) => {}
        }

        if let Some(t) = file.timeouts {
            builder = builder.timeouts(|mut b| {
                let ms = Duration::from_millis;
                if let Some(v) = t.connect_ms {
                    b = b.connect(ms(v));
                }
                if let Some(v) = t.kv_ms {
                    b = b.kv(ms(v));
                }
                if let Some(v) = t.view_ms {
                    b = b.view(ms(v));
                }
                if let Some(v) = t.query_ms {
                    b = b.query(ms(v));
                }
                if let Some(v) = t.analytics_ms {
                    b = b.analytics(ms(v));
                }
                if let Some(v) = t.search_ms {
                    b = b.search(ms(v));
                }
                if let Some(v) = t.management_ms {
                    b = b.management(ms(v));
                }
                if let Some(v) = t.durability_ms {
                    b = b.durability(ms(v));
                }
                if let Some(v) = t.durability_poll_interval_ms {
                    b = b.durability_poll_interval(ms(v));
                }
                b
            });
        }

        if let Some(disable) = file.disable_mutation_tokens {
            builder = builder.disable_mutation_tokens(disable);
        }

        if let Some(disable) = file.disable_server_durations {
            builder = builder.disable_server_durations(disable);
        }

        builder.build()
    }
}

impl ClusterOptions {
    /// Loads options from a YAML file.
    ///
    /// Requires the `config-file` feature.
    #[cfg(feature = "config-file")]
    pub fn from_yaml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::new(format!("failed to read YAML config file: {e}"))
        })?;
        let file_config: FileConfig = serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::new(format!("failed to parse YAML config: {e}"))
        })?;
        file_config.try_into()
    }

    /// Loads options from a TOML file.
    ///
    /// Requires the `config-file` feature.
    #[cfg(feature = "config-file")]
    pub fn from_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::new(format!("failed to read TOML config file: {e}"))
        })?;
        let file_config: FileConfig = toml_crate::from_str(&content).map_err(|e| {
            ConfigError::new(format!("failed to parse TOML config: {e}"))
        })?;
        file_config.try_into()
    }

    /// Loads options from environment variables.
    ///
    /// This method is always available (no feature flag required).
    ///
    /// # Supported Environment Variables
    ///
    /// | Variable | Maps to |
    /// |----------|---------|
    /// | `COUCHBASE_USERNAME` | `username` |
    /// | `COUCHBASE_PASSWORD` | `password` |
    /// | `COUCHBASE_<NAME>_TIMEOUT_MS` | Timeout in milliseconds, `<NAME>` one of `CONNECT`, `KV`, `VIEW`, `QUERY`, `ANALYTICS`, `SEARCH`, `MANAGEMENT`, `DURABILITY` |
    /// | `COUCHBASE_DURABILITY_POLL_INTERVAL_MS` | Durability poll interval in milliseconds |
    /// | `COUCHBASE_DISABLE_MUTATION_TOKENS` | `"true"` or `"false"` |
    /// | `COUCHBASE_DISABLE_SERVER_DURATIONS` | `"true"` or `"false"` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut file_config = FileConfig::default();

        if let Ok(val) = std::env::var("COUCHBASE_USERNAME") {
            file_config.username = Some(val);
        }

        if let Ok(val) = std::env::var("COUCHBASE_PASSWORD") {
            file_config.password = Some(val);
        }

        let millis = |name: &str| -> Option<u64> {
            std::env::var(name).ok().and_then(|v| v.parse::<u64>().ok())
        };
        let timeouts = FileTimeoutConfig {
            connect_ms: millis("COUCHBASE_CONNECT_TIMEOUT_MS"),
            kv_ms: millis("COUCHBASE_KV_TIMEOUT_MS"),
            view_ms: millis("COUCHBASE_VIEW_TIMEOUT_MS"),
            query_ms: millis("COUCHBASE_QUERY_TIMEOUT_MS"),
            analytics_ms: millis("COUCHBASE_ANALYTICS_TIMEOUT_MS"),
            search_ms: millis("COUCHBASE_SEARCH_TIMEOUT_MS"),
            management_ms: millis("COUCHBASE_MANAGEMENT_TIMEOUT_MS"),
            durability_ms: millis("COUCHBASE_DURABILITY_TIMEOUT_MS"),
            durability_poll_interval_ms: millis("COUCHBASE_DURABILITY_POLL_INTERVAL_MS"),
        };
        file_config.timeouts = Some(timeouts);

        if let Ok(val) = std::env::var("COUCHBASE_DISABLE_MUTATION_TOKENS") {
            file_config.disable_mutation_tokens = Some(val.eq_ignore_ascii_case("true"));
        }

        if let Ok(val) = std::env::var("COUCHBASE_DISABLE_SERVER_DURATIONS") {
            file_config.disable_server_durations = Some(val.eq_ignore_ascii_case("true"));
        }

        file_config.try_into()
    }
}

/// Loads a configuration file, choosing the format by extension.
///
/// Supports `.yaml`, `.yml`, and `.toml` extensions.
/// Requires the `config-file` feature.
#[cfg(feature = "config-file")]
pub fn load_config<P: AsRef<std::path::Path>>(path: P) -> Result<ClusterOptions, ConfigError> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => ClusterOptions::from_yaml(path),
        Some("toml") => ClusterOptions::from_toml(path),
        Some(ext) => Err(ConfigError::new(format!(
            "unsupported config file extension: .{ext} (expected .yaml, .yml, or .toml)"
        ))),
        None => Err(ConfigError::new(
            "config file has no extension; expected .yaml, .yml, or .toml",
        )),
    }
}
