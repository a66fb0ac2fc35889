//! Configuration loading and root folder resolution
//!
//! Bootstrap settings come from a TOML file. Every section is optional and
//! falls back to built-in defaults, so an absent file is a valid setup.
//!
//! Root folder priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8000;

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "skylog.db";

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "SKYLOG_ROOT_FOLDER";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Folder holding the database file
    pub root_folder: Option<PathBuf>,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub geocoding: GeocodingConfig,
    pub weather: WeatherConfig,
    pub history: HistoryConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Geocoding provider endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// Open-Meteo geocoding search endpoint (primary)
    pub primary_url: String,
    /// Nominatim search endpoint (fallback)
    pub fallback_url: String,
    /// Nominatim's usage policy requires an identifying User-Agent
    pub user_agent: String,
    /// Per-provider request timeout
    pub timeout_secs: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            primary_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            fallback_url: "https://nominatim.openstreetmap.org/search".to_string(),
            user_agent: concat!("skylog/", env!("CARGO_PKG_VERSION"), " (personal weather lookup)")
                .to_string(),
            timeout_secs: 8,
        }
    }
}

/// Weather API endpoints and range limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Open-Meteo forecast endpoint (current, 5-day and future ranges)
    pub forecast_url: String,
    /// Open-Meteo ERA5 archive endpoint (past ranges)
    pub archive_url: String,
    pub timeout_secs: u64,
    /// Longest accepted inclusive date range
    pub max_range_days: i64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            archive_url: "https://archive-api.open-meteo.com/v1/era5".to_string(),
            timeout_secs: 8,
            max_range_days: 31,
        }
    }
}

/// History page and export sizes
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub page_limit: i64,
    pub export_limit: i64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            page_limit: 50,
            export_limit: 1000,
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Reject values that would make the service unusable
    pub fn validate(&self) -> Result<()> {
        if self.geocoding.timeout_secs == 0 || self.weather.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be at least 1".to_string()));
        }
        if self.weather.max_range_days < 1 {
            return Err(Error::Config("max_range_days must be at least 1".to_string()));
        }
        if self.history.page_limit < 1 || self.history.export_limit < 1 {
            return Err(Error::Config("history limits must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Load configuration from an explicit path, the platform config file, or defaults
///
/// An explicit path must exist. The platform file is optional.
pub fn load_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = explicit {
        info!("Loading configuration from {}", path.display());
        return TomlConfig::load(path);
    }

    match default_config_path() {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            TomlConfig::load(&path)
        }
        None => {
            debug!("No config file found, using built-in defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Locate the platform config file, if one exists
///
/// Tries `<config dir>/skylog/config.toml` first, then `/etc/skylog/config.toml` on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("skylog").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/skylog/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Resolve the root folder following the documented priority order
pub fn resolve_root_folder(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    config: &TomlConfig,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("skylog"))
        .unwrap_or_else(|| PathBuf::from("./skylog_data"))
}

/// Database file location inside a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}
