//! CLI configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                       | Default          |
//! |--------------------------------|------------------|
//! | `STOCKROOM_DB_PATH`            | `./stockroom.db` |
//! | `STOCKROOM_DB_MAX_CONNECTIONS` | `5`              |
//! | `STOCKROOM_RUN_MIGRATIONS`     | `true`           |

use serde::Serialize;
use std::env;
use std::path::PathBuf;

use stockroom_db::DbConfig;

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CliConfig {
    /// SQLite database file
    pub db_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// Apply pending migrations on startup
    pub run_migrations: bool,
}

impl CliConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(|key| env::var(key).ok())
    }

    /// Load configuration through a variable lookup.
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db_path = lookup("STOCKROOM_DB_PATH")
            .map(|p| p.trim().to_string())
            .unwrap_or_else(|| "./stockroom.db".to_string());

        if db_path.is_empty() {
            return Err(ConfigError::MissingRequired("STOCKROOM_DB_PATH".to_string()));
        }

        let max_connections: u32 = lookup("STOCKROOM_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue("STOCKROOM_DB_MAX_CONNECTIONS".to_string()))?;

        if max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "STOCKROOM_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        let run_migrations = match lookup("STOCKROOM_RUN_MIGRATIONS") {
            None => true,
            Some(value) => parse_flag(&value)
                .ok_or_else(|| ConfigError::InvalidValue("STOCKROOM_RUN_MIGRATIONS".to_string()))?,
        };

        Ok(CliConfig {
            db_path: PathBuf::from(db_path),
            max_connections,
            run_migrations,
        })
    }

    /// Pool configuration for [`stockroom_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.db_path.clone())
            .max_connections(self.max_connections)
            .min_connections(1)
            .run_migrations(self.run_migrations)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
