//! # Stockwise Configuration
//!
//! Configuration for the database pool, identifier generation and events.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOCKWISE_DB_PATH=/var/lib/stockwise/stockwise.db                  │
//! │     STOCKWISE_SEQUENCE_MAX_ATTEMPTS=5                                  │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/stockwise/stockwise.toml (Linux)                         │
//! │     ~/Library/Application Support/com.stockwise.stockwise/... (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "./stockwise.db"
//! max_connections = 5
//! busy_timeout_secs = 5
//!
//! [sequence]
//! max_attempts = 3
//! sku_random_digits = 4
//!
//! [events]
//! channel_capacity = 256
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::pool::DbConfig;

// =============================================================================
// Database Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Pool acquire timeout (seconds).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// How long a writer waits on a locked database before its
    /// transaction fails and rolls back (seconds).
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_secs: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./stockwise.db")
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_busy_timeout() -> u64 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            busy_timeout_secs: default_busy_timeout(),
        }
    }
}

// =============================================================================
// Sequence Settings
// =============================================================================

/// Identifier generation settings (SKUs, GRN numbers).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceSettings {
    /// Attempts before a numbering collision fails permanently.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Width of the random SKU suffix.
    #[serde(default = "default_sku_random_digits")]
    pub sku_random_digits: u32,
}

fn default_max_attempts() -> u32 {
    stockwise_core::DEFAULT_SEQUENCE_ATTEMPTS
}

fn default_sku_random_digits() -> u32 {
    4
}

impl Default for SequenceSettings {
    fn default() -> Self {
        SequenceSettings {
            max_attempts: default_max_attempts(),
            sku_random_digits: default_sku_random_digits(),
        }
    }
}

// =============================================================================
// Event Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSettings {
    /// Buffered events per subscriber before the slowest one lags.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_channel_capacity() -> usize {
    256
}

impl Default for EventSettings {
    fn default() -> Self {
        EventSettings {
            channel_capacity: default_channel_capacity(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete Stockwise configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockwiseConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub sequence: SequenceSettings,

    #[serde(default)]
    pub events: EventSettings,
}

impl StockwiseConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (stockwise.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> DbResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)
                    .map_err(|e| DbError::Config(format!("{}: {e}", path.display())))?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a TOML document. Missing sections take their defaults.
    pub fn from_toml(contents: &str) -> DbResult<Self> {
        toml::from_str(contents).map_err(|e| DbError::Config(e.to_string()))
    }

    pub fn validate(&self) -> DbResult<()> {
        if self.sequence.max_attempts == 0 {
            return Err(DbError::Config("sequence.max_attempts must be greater than 0".into()));
        }
        if self.database.max_connections == 0 {
            return Err(DbError::Config("database.max_connections must be greater than 0".into()));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(DbError::Config(format!(
                "database.min_connections ({}) exceeds max_connections ({})",
                self.database.min_connections, self.database.max_connections
            )));
        }
        if !(1..=9).contains(&self.sequence.sku_random_digits) {
            return Err(DbError::Config("sequence.sku_random_digits must be between 1 and 9".into()));
        }
        Ok(())
    }

    /// Applies overrides from a variable lookup (the process environment in
    /// [`StockwiseConfig::load`]). Unparseable values are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("STOCKWISE_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(value) = lookup("STOCKWISE_MAX_CONNECTIONS") {
            match value.parse() {
                Ok(n) => self.database.max_connections = n,
                Err(_) => warn!(value = %value, "Ignoring invalid STOCKWISE_MAX_CONNECTIONS"),
            }
        }

        if let Some(value) = lookup("STOCKWISE_BUSY_TIMEOUT_SECS") {
            match value.parse() {
                Ok(n) => self.database.busy_timeout_secs = n,
                Err(_) => warn!(value = %value, "Ignoring invalid STOCKWISE_BUSY_TIMEOUT_SECS"),
            }
        }

        if let Some(value) = lookup("STOCKWISE_SEQUENCE_MAX_ATTEMPTS") {
            match value.parse() {
                Ok(n) => self.sequence.max_attempts = n,
                Err(_) => warn!(value = %value, "Ignoring invalid STOCKWISE_SEQUENCE_MAX_ATTEMPTS"),
            }
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "stockwise", "stockwise")
            .map(|dirs| dirs.config_dir().join("stockwise.toml"))
    }

    /// Pool configuration derived from the `[database]` section.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path)
            .max_connections(self.database.max_connections)
            .min_connections(self.database.min_connections)
            .connect_timeout(Duration::from_secs(self.database.connect_timeout_secs))
            .busy_timeout(Duration::from_secs(self.database.busy_timeout_secs))
            .sequence(self.sequence.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = StockwiseConfig::default();
        assert_eq!(config.sequence.max_attempts, 3);
        assert_eq!(config.sequence.sku_random_digits, 4);
        assert_eq!(config.database.busy_timeout_secs, 5);
        assert_eq!(config.events.channel_capacity, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = StockwiseConfig::from_toml(
            r#"
            [database]
            path = "/tmp/shop.db"
            max_connections = 8

            [sequence]
            max_attempts = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.database.max_connections, 8);
        assert_eq!(config.database.min_connections, 1);
        assert_eq!(config.sequence.max_attempts, 5);
        assert_eq!(config.sequence.sku_random_digits, 4);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            StockwiseConfig::from_toml("[database\npath = 1"),
            Err(DbError::Config(_))
        ));
    }

    #[test]
    fn test_validation() {
        let mut config = StockwiseConfig::default();
        config.sequence.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = StockwiseConfig::default();
        config.database.min_connections = 10;
        assert!(config.validate().is_err());

        let mut config = StockwiseConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        for digits in [0, 10] {
            let mut config = StockwiseConfig::default();
            config.sequence.sku_random_digits = digits;
            assert!(matches!(config.validate(), Err(DbError::Config(msg)) if msg.contains("sku_random_digits")));
        }
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("STOCKWISE_DB_PATH", "/data/override.db"),
            ("STOCKWISE_SEQUENCE_MAX_ATTEMPTS", "7"),
            ("STOCKWISE_MAX_CONNECTIONS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = StockwiseConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, PathBuf::from("/data/override.db"));
        assert_eq!(config.sequence.max_attempts, 7);
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_db_config_derivation() {
        let mut config = StockwiseConfig::default();
        config.database.busy_timeout_secs = 9;
        let db = config.db_config();
        assert_eq!(db.busy_timeout, Duration::from_secs(9));
        assert_eq!(db.max_connections, 5);
    }
}
