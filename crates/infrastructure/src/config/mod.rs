//! Cache service configuration
//!
//! Split into focused sub-modules:
//! - `cache`: strategy, age limit, L1 and warming settings
//! - `database`: SQLite pool settings
//!
//! Settings load from an optional TOML file with `CLOSETIQ_`-prefixed
//! environment variables layered on top.

mod cache;
mod database;

pub use cache::CacheSettings;
pub use database::DatabaseConfig;
use serde::{Deserialize, Serialize};

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Top-level settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Database settings
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Cache settings
    #[serde(default)]
    pub cache: CacheSettings,
}

impl Settings {
    /// Load settings from an optional file plus environment overrides
    ///
    /// Environment variables use the `CLOSETIQ_` prefix with `__` as the
    /// section separator, e.g. `CLOSETIQ_CACHE__MAX_AGE_SECS=3600`.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        builder
            .add_source(config::Environment::with_prefix("CLOSETIQ").separator("__"))
            .build()?
            .try_deserialize()
    }
}
