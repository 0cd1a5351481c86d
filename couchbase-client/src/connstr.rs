//! Connection string parsing.
//!
//! A connection string has the form
//! `scheme://host[:port][,host[:port]...][/bucket][?key=value&...]`.
//! The scheme is optional and defaults to `couchbase`. Hosts may be separated
//! by `,` or `;`, and IPv6 hosts must be bracketed.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::config::ConfigError;

const DEFAULT_SCHEME: &str = "couchbase";
const KNOWN_SCHEMES: [&str; 3] = ["couchbase", "couchbases", "http"];

/// A seed node address from a connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    host: String,
    port: Option<u16>,
}

impl Address {
    /// Returns the host name or IP literal.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the explicit port, if one was given.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    fn parse(raw: &str) -> Result<Self, ConfigError> {
        let (host, port) = if let Some(rest) = raw.strip_prefix('[') {
            let (host, after) = rest
                .split_once(']')
                .ok_or_else(|| ConfigError::new(format!("unterminated IPv6 address: {}", raw)))?;
            let port = match after.strip_prefix(':') {
                Some(port) => Some(port),
                None if after.is_empty() => None,
                None => {
                    return Err(ConfigError::new(format!("invalid address: {}", raw)));
                }
            };
            (format!("[{}]", host), port)
        } else {
            match raw.rsplit_once(':') {
                Some((host, port)) => (host.to_string(), Some(port)),
                None => (raw.to_string(), None),
            }
        };

        if host.is_empty() || host == "[]" {
            return Err(ConfigError::new(format!("missing host in address: {}", raw)));
        }

        let port = port
            .map(|p| {
                p.parse::<u16>()
                    .map_err(|_| ConfigError::new(format!("invalid port in address: {}", raw)))
            })
            .transpose()?;

        Ok(Self { host, port })
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.host, port),
            None => f.write_str(&self.host),
        }
    }
}

/// A parsed connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnSpec {
    scheme: String,
    addresses: Vec<Address>,
    bucket: Option<String>,
    options: BTreeMap<String, Vec<String>>,
}

impl ConnSpec {
    /// Returns the scheme.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the seed node addresses.
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// Returns the bucket named in the path, if any.
    pub fn bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }

    /// Returns every option with all of its values, in order of appearance.
    pub fn options(&self) -> &BTreeMap<String, Vec<String>> {
        &self.options
    }

    /// Returns the last value given for an option.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options
            .get(name)
            .and_then(|values| values.last())
            .map(String::as_str)
    }
}

impl FromStr for ConnSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scheme, rest) = match s.split_once("://") {
            Some((scheme, rest)) => (scheme, rest),
            None => (DEFAULT_SCHEME, s),
        };

        if !KNOWN_SCHEMES.contains(&scheme) {
            return Err(ConfigError::new(format!(
                "unknown connection string scheme: {}",
                scheme
            )));
        }

        let (location, query) = match rest.split_once('?') {
            Some((location, query)) => (location, Some(query)),
            None => (rest, None),
        };

        let (hosts, bucket) = match location.split_once('/') {
            Some((hosts, path)) if !path.is_empty() => (hosts, Some(path.to_string())),
            Some((hosts, _)) => (hosts, None),
            None => (location, None),
        };

        let addresses = hosts
            .split([',', ';'])
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(Address::parse)
            .collect::<Result<Vec<_>, _>>()?;

        if addresses.is_empty() {
            return Err(ConfigError::new("connection string has no hosts"));
        }

        let mut options: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for pair in query.into_iter().flat_map(|q| q.split('&')) {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if key.is_empty() {
                return Err(ConfigError::new(format!("invalid option: {}", pair)));
            }
            options
                .entry(key.to_string())
                .or_default()
                .push(value.to_string());
        }

        Ok(Self {
            scheme: scheme.to_string(),
            addresses,
            bucket,
            options,
        })
    }
}
