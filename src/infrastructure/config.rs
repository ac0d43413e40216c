//! Configuration infrastructure
//!
//! Settings are layered with the `config` crate:
//! 1. Built-in defaults (see [`defaults`])
//! 2. Optional JSON file (`<config dir>/pokedex/pokedex.json` or an explicit path)
//! 3. `POKEDEX_*` environment variables, `__` separating sections
//!    (e.g. `POKEDEX_CATALOG__PAGE_SIZE=10`)
//!
//! The page size is read once at session start and never changes afterwards.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::domain::PageRequest;
use crate::infrastructure::http_client::HttpClientConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },

    #[error("Could not determine the user configuration directory")]
    NoConfigDir,
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub http: HttpClientConfig,
    pub logging: LoggingConfig,
}

/// Listing endpoint and page-load tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Listing endpoint without paging parameters
    pub listing_url: String,

    /// Items requested per listing page
    pub page_size: u32,

    /// Maximum detail lookups in flight during one page load
    pub detail_max_concurrent: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            listing_url: defaults::LISTING_URL.to_string(),
            page_size: defaults::PAGE_SIZE,
            detail_max_concurrent: defaults::DETAIL_MAX_CONCURRENT,
        }
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Enable console output (stderr)
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory for log files; defaults to `logs/` next to the executable
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Load from the default file location plus environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = ConfigManager::new()?.config_path;
        Self::load_from(Some(&path))
    }

    /// Load from an optional file plus environment. A missing file is not an error.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(defaults::ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;

        if let Some(path) = path {
            info!("Loaded configuration (file: {:?})", path);
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.page_size == 0 {
            return Err(validation("catalog.page_size must be greater than 0"));
        }
        if self.catalog.detail_max_concurrent == 0 {
            return Err(validation("catalog.detail_max_concurrent must be greater than 0"));
        }
        if let Err(e) = url::Url::parse(&self.catalog.listing_url) {
            return Err(validation(format!(
                "catalog.listing_url '{}' is not a valid URL: {e}",
                self.catalog.listing_url
            )));
        }
        if self.http.timeout_seconds == 0 {
            return Err(validation("http.timeout_seconds must be greater than 0"));
        }
        if !self.logging.console_output && !self.logging.file_output {
            return Err(validation("at least one of logging.console_output or logging.file_output must be enabled"));
        }
        Ok(())
    }

    /// Paging parameters for the session.
    pub fn page_request(&self) -> Result<PageRequest, ConfigError> {
        PageRequest::new(&self.catalog.listing_url, self.catalog.page_size)
            .map_err(|e| validation(format!("catalog.listing_url: {e}")))
    }
}

fn validation(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        message: message.into(),
    }
}

/// Locates the configuration file on disk
#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(defaults::APP_DIR_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn new() -> Result<Self, ConfigError> {
        let config_path = Self::get_config_dir()?.join(defaults::CONFIG_FILE_NAME);
        Ok(Self { config_path })
    }
}

/// PokeAPI endpoints
pub mod pokeapi {
    /// Pokémon listing endpoint
    pub const POKEMON_LIST: &str = "https://pokeapi.co/api/v2/pokemon";
}

/// Default configuration values
pub mod defaults {
    /// Default listing endpoint
    pub const LISTING_URL: &str = super::pokeapi::POKEMON_LIST;

    /// Default number of items per page
    pub const PAGE_SIZE: u32 = crate::domain::DEFAULT_PAGE_SIZE;

    /// Default maximum concurrent detail lookups per page
    pub const DETAIL_MAX_CONCURRENT: usize = 10;

    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    /// Default request rate ceiling; 0 disables rate limiting
    pub const MAX_REQUESTS_PER_SECOND: u32 = 10;

    /// Default user agent
    pub const USER_AGENT: &str = concat!("pokedex/", env!("CARGO_PKG_VERSION"));

    /// Default log level
    pub const LOG_LEVEL: &str = "info";

    /// Default JSON format setting
    pub const LOG_JSON_FORMAT: bool = false;

    /// Console output stays off so log lines do not interleave with the catalog view
    pub const LOG_CONSOLE_OUTPUT: bool = false;

    /// Default file output setting
    pub const LOG_FILE_OUTPUT: bool = true;

    pub const ENV_PREFIX: &str = "POKEDEX";
    pub const APP_DIR_NAME: &str = "pokedex";
    pub const CONFIG_FILE_NAME: &str = "pokedex.json";
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.catalog.page_size, 5);
        assert_eq!(config.catalog.listing_url, "https://pokeapi.co/api/v2/pokemon");
    }

    #[test]
    fn default_page_request_builds_first_cursor() {
        let request = AppConfig::default().page_request().unwrap();
        assert_eq!(request.first_page_cursor(), "https://pokeapi.co/api/v2/pokemon?limit=5");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(Some(&dir.path().join("absent.json"))).unwrap();
        assert_eq!(config.catalog.page_size, defaults::PAGE_SIZE);
        assert_eq!(config.http.timeout_seconds, defaults::REQUEST_TIMEOUT_SECONDS);
    }

    #[test]
    fn file_overrides_only_the_fields_it_names() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{ "catalog": {{ "page_size": 20 }}, "logging": {{ "level": "debug" }} }}"#
        )
        .unwrap();

        let config = AppConfig::load_from(Some(file.path())).unwrap();
        assert_eq!(config.catalog.page_size, 20);
        assert_eq!(config.catalog.detail_max_concurrent, defaults::DETAIL_MAX_CONCURRENT);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.file_output);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{ "catalog": {{ "page_size": 0 }} }}"#).unwrap();

        let result = AppConfig::load_from(Some(file.path()));
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn validation_catches_bad_values() {
        let mut config = AppConfig::default();
        config.catalog.listing_url = "pokeapi".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.catalog.detail_max_concurrent = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.logging.console_output = false;
        config.logging.file_output = false;
        assert!(config.validate().is_err());
    }
}
