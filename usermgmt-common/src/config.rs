//! Configuration loading and resolution
//!
//! Settings sources, highest priority first:
//! 1. Command-line argument
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default
//!
//! A missing config file is not an error: a warning is logged and
//! compiled defaults are used.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the TOML config file
pub const CONFIG_ENV: &str = "USERMGMT_CONFIG";

/// Environment variable naming the SQLite database file
pub const DATABASE_ENV: &str = "USERMGMT_DATABASE";

/// Environment variable overriding the log level
pub const LOG_LEVEL_ENV: &str = "USERMGMT_LOG_LEVEL";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Path to SQLite database file (relative or absolute)
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Student validation settings (optional)
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Student validation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    /// Username is a distinct, mandatory login identifier
    #[serde(default)]
    pub enable_username: bool,

    /// Batches are submitted by the order/ERP flow
    #[serde(default)]
    pub order_flow: bool,

    /// Reject the whole batch when any record fails
    #[serde(default)]
    pub strict: bool,

    /// Domain used to build login emails when usernames are enabled
    #[serde(default = "default_login_email_domain")]
    pub login_email_domain: String,

    /// Upper bound for a single bulk repository lookup
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enable_username: false,
            order_flow: false,
            strict: false,
            login_email_domain: default_login_email_domain(),
            lookup_timeout_ms: default_lookup_timeout_ms(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_login_email_domain() -> String {
    "manabie.com".to_string()
}

fn default_lookup_timeout_ms() -> u64 {
    30_000
}

impl TomlConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Read and parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded TOML configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration following the priority order
    ///
    /// An explicitly named file (CLI or ENV) that cannot be read is an
    /// error. A missing default file falls back to compiled defaults.
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = cli_path {
            return Self::from_file(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }

        match default_config_file() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                warn!("No config file found, using compiled defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Resolve the database path: CLI → ENV → TOML → compiled default
pub fn resolve_database_path(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATABASE_ENV) {
        return PathBuf::from(path);
    }

    if let Some(path) = &config.database_path {
        return path.clone();
    }

    default_database_path()
}

/// Resolve the log level: CLI → ENV → TOML (which carries its own default)
pub fn resolve_log_level(cli_arg: Option<&str>, config: &TomlConfig) -> String {
    if let Some(level) = cli_arg {
        return level.to_string();
    }

    if let Ok(level) = std::env::var(LOG_LEVEL_ENV) {
        return level;
    }

    config.logging.level.clone()
}

/// Default configuration file path for the platform
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("usermgmt").join("config.toml"))
}

/// OS-dependent default database path
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("usermgmt").join("usermgmt.db"))
        .unwrap_or_else(|| PathBuf::from("./usermgmt_data/usermgmt.db"))
}
