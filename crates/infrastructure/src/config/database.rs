//! SQLite database settings.

use serde::{Deserialize, Serialize};

use super::default_true;
use crate::persistence::AsyncDatabaseConfig;

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    #[serde(default = "default_url")]
    pub url: String,

    /// Maximum number of pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of pooled connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Enable WAL mode
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

fn default_url() -> String {
    "sqlite:closetiq.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

const fn default_min_connections() -> u32 {
    1
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            wal_mode: true,
        }
    }
}

impl DatabaseConfig {
    /// Convert into the connection-layer configuration
    #[must_use]
    pub fn to_async_config(&self) -> AsyncDatabaseConfig {
        AsyncDatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            wal_mode: self.wal_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_reasonable() {
        let config = DatabaseConfig::default();
        assert_eq!(config.url, "sqlite:closetiq.db");
        assert_eq!(config.max_connections, 5);
        assert!(config.wal_mode);
    }

    #[test]
    fn converts_to_connection_config() {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            ..DatabaseConfig::default()
        };
        let async_config = config.to_async_config();
        assert_eq!(async_config.url, "sqlite::memory:");
        assert_eq!(async_config.max_connections, 5);
    }
}
