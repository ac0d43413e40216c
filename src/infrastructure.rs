//! Infrastructure layer: HTTP transport, configuration and logging

pub mod config;
pub mod http_client;
pub mod logging;

pub use config::{AppConfig, ConfigError, ConfigManager};
pub use http_client::{HttpClient, HttpClientConfig};
pub use logging::{init_logging_with_config, get_log_directory};
