//! Logging system configuration and initialization
//!
//! This module provides the logging setup with:
//! - Daily rolling file logs through a non-blocking writer
//! - Configuration based log level control, overridable with `RUST_LOG`
//! - Structured JSON logging (optional)
//! - Console output on stderr so stdout stays free for the catalog view

#![allow(clippy::needless_borrows_for_generic_args)]

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use lazy_static::lazy_static;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt::{self, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

pub use crate::infrastructure::config::LoggingConfig;

const LOG_FILE_PREFIX: &str = "pokedex.log";

// Keeps the non-blocking file writer alive for the process lifetime
lazy_static! {
    static ref LOG_GUARDS: Mutex<Vec<tracing_appender::non_blocking::WorkerGuard>> =
        Mutex::new(Vec::new());
}

/// Local wall-clock timestamps with millisecond precision
struct LocalTimeFormatter;

impl FormatTime for LocalTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S%.3f %:z"))
    }
}

/// Get the log directory: the configured one, else `logs/` next to the executable
pub fn get_log_directory(config: &LoggingConfig) -> PathBuf {
    if let Some(dir) = &config.log_dir {
        return dir.clone();
    }

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(std::path::Path::to_path_buf))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    exe_dir.join("logs")
}

/// Build the filter: `RUST_LOG` wins, otherwise the configured level with
/// HTTP internals capped unless TRACE is requested.
///
/// ```bash
/// # Show detailed HTTP logs
/// RUST_LOG="debug,reqwest=debug,hyper=debug" pokedex
/// ```
pub fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut filter = EnvFilter::try_new(&config.level)
        .with_context(|| format!("Invalid log level '{}'", config.level))?;

    if !config.level.to_lowercase().contains("trace") {
        for directive in ["reqwest=info", "hyper=warn", "hyper_util=warn", "h2=warn", "tokio=info"] {
            filter = filter.add_directive(directive.parse()?);
        }
    }

    Ok(filter)
}

/// Initialize logging with custom configuration
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    if !config.file_output && !config.console_output {
        return Err(anyhow!("No logging output configured"));
    }

    let env_filter = build_env_filter(config)?;
    let log_dir = get_log_directory(config);

    let file_layer = if config.file_output {
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

        let (file_writer, file_guard) = non_blocking(rolling::daily(&log_dir, LOG_FILE_PREFIX));
        LOG_GUARDS
            .lock()
            .map_err(|_| anyhow!("Log guard registry poisoned"))?
            .push(file_guard);

        let layer = fmt::Layer::new()
            .with_writer(file_writer)
            .with_timer(LocalTimeFormatter)
            .with_ansi(false);

        Some(if config.json_format {
            layer
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .boxed()
        } else {
            layer.with_target(false).boxed()
        })
    } else {
        None
    };

    let console_layer = config.console_output.then(|| {
        fmt::Layer::new()
            .with_writer(std::io::stderr)
            .with_timer(LocalTimeFormatter)
            .with_target(false)
    });

    Registry::default()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    info!("Logging system initialized");
    info!("Log level: {}", config.level);
    if config.file_output {
        info!("Log directory: {:?}", log_dir);
    }
    info!("JSON format: {}", config.json_format);
    info!("Console output: {}", config.console_output);

    Ok(())
}

/// Log system information for diagnostics
pub fn log_system_info() {
    info!("=== Pokedex System Information ===");
    info!("Application version: {}", env!("CARGO_PKG_VERSION"));
    info!("Operating system: {}", std::env::consts::OS);
    info!("Architecture: {}", std::env::consts::ARCH);
    info!("==================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_log_dir_wins() {
        let config = LoggingConfig {
            log_dir: Some(PathBuf::from("/tmp/pokedex-logs")),
            ..Default::default()
        };
        assert_eq!(get_log_directory(&config), PathBuf::from("/tmp/pokedex-logs"));
    }

    #[test]
    fn default_log_dir_is_named_logs() {
        let dir = get_log_directory(&LoggingConfig::default());
        assert!(dir.ends_with("logs"));
    }

    #[test]
    fn filter_accepts_configured_levels() {
        for level in ["error", "warn", "info", "debug", "trace"] {
            let config = LoggingConfig {
                level: level.to_string(),
                ..Default::default()
            };
            assert!(build_env_filter(&config).is_ok());
        }
    }

    #[test]
    fn no_output_is_rejected() {
        let config = LoggingConfig {
            console_output: false,
            file_output: false,
            ..Default::default()
        };
        assert!(init_logging_with_config(&config).is_err());
    }
}
