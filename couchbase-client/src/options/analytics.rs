//! Analytics query options.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use uuid::Uuid;

use couchbase_core::ParameterMap;

use super::format_duration;
use crate::error::{InvalidArgumentError, Result};

/// Options for an analytics query.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsOptions {
    server_side_timeout: Option<Duration>,
    client_context_id: Option<String>,
    raw: HashMap<String, Value>,
    priority: bool,
    positional_parameters: Option<Vec<Value>>,
    named_parameters: Option<HashMap<String, Value>>,
    read_only: bool,
    timeout: Option<Duration>,
}

impl AnalyticsOptions {
    /// Creates options with every setting at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the timeout the server enforces on the query.
    pub fn with_server_side_timeout(mut self, timeout: Duration) -> Self {
        self.server_side_timeout = Some(timeout);
        self
    }

    /// Sets the client context identifier echoed back by the server.
    pub fn with_client_context_id(mut self, id: impl Into<String>) -> Self {
        self.client_context_id = Some(id.into());
        self
    }

    /// Sets a raw parameter, sent as-is and taking precedence over computed keys.
    pub fn with_raw(mut self, key: impl Into<String>, value: Value) -> Self {
        self.raw.insert(key.into(), value);
        self
    }

    /// Marks the query as high priority.
    pub fn with_priority(mut self, priority: bool) -> Self {
        self.priority = priority;
        self
    }

    /// Sets positional parameters, bound to `$1`, `$2`, ...
    pub fn with_positional_parameters(mut self, params: impl IntoIterator<Item = Value>) -> Self {
        self.positional_parameters = Some(params.into_iter().collect());
        self
    }

    /// Adds a named parameter. The `$` prefix is optional.
    pub fn with_named_parameter(mut self, name: impl Into<String>, value: Value) -> Self {
        self.named_parameters
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value);
        self
    }

    /// Marks the query as read-only.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Sets the client-side timeout for the request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the client-side timeout, if one was set.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns whether the query was marked high priority.
    pub fn priority(&self) -> bool {
        self.priority
    }

    fn validate(&self) -> Result<()> {
        if self.positional_parameters.is_some() && self.named_parameters.is_some() {
            return Err(InvalidArgumentError::MutuallyExclusive {
                first: "positional_parameters",
                second: "named_parameters",
            }
            .into());
        }
        Ok(())
    }

    /// Encodes the options and statement as analytics request parameters.
    ///
    /// A fresh client context identifier is generated when none was set.
    /// Named parameters become top-level `$name` keys. Raw parameters are
    /// applied last.
    ///
    /// # Errors
    ///
    /// Returns an invalid-argument error if both positional and named
    /// parameters were supplied.
    pub fn to_params(&self, statement: &str) -> Result<ParameterMap> {
        self.validate()?;

        let mut params = ParameterMap::new();
        params.insert("statement".to_string(), Value::from(statement));

        if let Some(timeout) = self.server_side_timeout.filter(|t| !t.is_zero()) {
            params.insert("timeout".to_string(), Value::from(format_duration(timeout)));
        }

        let client_context_id = match &self.client_context_id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => Uuid::new_v4().to_string(),
        };
        params.insert(
            "client_context_id".to_string(),
            Value::from(client_context_id),
        );

        if self.priority {
            params.insert("priority".to_string(), Value::from(-1));
        }

        if let Some(args) = &self.positional_parameters {
            params.insert("args".to_string(), Value::Array(args.clone()));
        }

        if let Some(named) = &self.named_parameters {
            for (name, value) in named {
                let key = if name.starts_with('$') {
                    name.clone()
                } else {
                    format!("${}", name)
                };
                params.insert(key, value.clone());
            }
        }

        if self.read_only {
            params.insert("readonly".to_string(), Value::Bool(true));
        }

        for (key, value) in &self.raw {
            params.insert(key.clone(), value.clone());
        }

        Ok(params)
    }
}
