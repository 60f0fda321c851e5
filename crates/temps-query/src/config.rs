use crate::error::{DataError, Result};
use std::collections::HashMap;
use std::str::FromStr;

/// Connection configuration handed to a backend manager
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Backend type identifier (cassandra, elasticsearch, solr)
    pub backend: String,
    /// Host or connection endpoint
    pub host: Option<String>,
    /// Port number
    pub port: Option<u16>,
    /// Username
    pub username: Option<String>,
    /// Password
    pub password: Option<String>,
    /// Keyspace, index or core name
    pub database: Option<String>,
    /// Backend-specific options as key-value pairs
    pub options: HashMap<String, String>,
}

impl ConnectionConfig {
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            host: None,
            port: None,
            username: None,
            password: None,
            database: None,
            options: HashMap::new(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Parse an option, `None` when absent
    pub fn option<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.options.get(key) {
            Some(raw) => raw.parse::<T>().map(Some).map_err(|e| {
                DataError::invalid_configuration(format!(
                    "option '{}' has invalid value '{}': {}",
                    key, raw, e
                ))
            }),
            None => Ok(None),
        }
    }

    /// Database name, required by backends that scope every statement by it
    pub fn require_database(&self) -> Result<&str> {
        self.database
            .as_deref()
            .filter(|d| !d.is_empty())
            .ok_or_else(|| {
                DataError::invalid_configuration(format!(
                    "{} requires a database name",
                    self.backend
                ))
            })
    }

    /// Get connection string for display purposes (without password)
    pub fn connection_string(&self) -> String {
        let mut parts = vec![self.backend.clone(), "://".to_string()];

        if let Some(username) = &self.username {
            parts.push(format!("{}@", username));
        }

        if let Some(host) = &self.host {
            parts.push(host.clone());

            if let Some(port) = self.port {
                parts.push(format!(":{}", port));
            }
        }

        if let Some(database) = &self.database {
            parts.push(format!("/{}", database));
        }

        parts.join("")
    }
}
