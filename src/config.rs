//! Connection settings for the Neo4j backend.

use std::env;
use thiserror::Error;

pub const DEFAULT_URI: &str = "bolt://localhost:7687";
pub const DEFAULT_USER: &str = "neo4j";
pub const DEFAULT_PASSWORD: &str = "neo4j";

pub const URI_VAR: &str = "NEO4J_URI";
pub const USER_VAR: &str = "NEO4J_USER";
pub const PASSWORD_VAR: &str = "NEO4J_PASSWORD";
pub const DATABASE_VAR: &str = "NEO4J_DATABASE";

const SCHEMES: &[&str] = &[
    "bolt", "bolt+s", "bolt+ssc", "neo4j", "neo4j+s", "neo4j+ssc",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("connection URI '{0}' has no scheme (expected e.g. bolt://host:7687)")]
    MissingScheme(String),

    #[error("unsupported URI scheme '{scheme}' (expected one of: {})", SCHEMES.join(", "))]
    UnsupportedScheme { scheme: String },

    #[error("connection URI '{0}' has no host")]
    MissingHost(String),
}

#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    /// Target database; the server default when `None`.
    pub database: Option<String>,
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("uri", &self.uri)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_URI.to_string(),
            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            database: None,
        }
    }
}

impl ConnectionConfig {
    /// Reads `NEO4J_URI`, `NEO4J_USER`, `NEO4J_PASSWORD` and `NEO4J_DATABASE`,
    /// falling back to defaults for anything unset or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();
        let config = Self {
            uri: get(URI_VAR).unwrap_or(defaults.uri),
            user: get(USER_VAR).unwrap_or(defaults.user),
            password: get(PASSWORD_VAR).unwrap_or(defaults.password),
            database: get(DATABASE_VAR),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that the URI names a Bolt-compatible scheme and a host.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Some((scheme, rest)) = self.uri.split_once("://") else {
            return Err(ConfigError::MissingScheme(self.uri.clone()));
        };
        if !SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::UnsupportedScheme {
                scheme: scheme.to_string(),
            });
        }
        let host = rest.split(['/', ':']).next().unwrap_or_default();
        if host.is_empty() {
            return Err(ConfigError::MissingHost(self.uri.clone()));
        }
        Ok(())
    }
}
