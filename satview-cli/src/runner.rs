//! CLI runner for common setup.
//!
//! Loads configuration, applies command-line overrides and initializes
//! logging so command handlers start from a ready environment.

use std::path::PathBuf;

use tracing::info;

use satview::config::SatviewConfig;
use satview::logging::{init_logging, LoggingGuard};

use crate::error::CliError;

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Runner that manages CLI lifecycle.
pub struct CliRunner {
    /// Keeps logging active while the runner exists
    _logging_guard: LoggingGuard,
    config: SatviewConfig,
}

impl CliRunner {
    /// Load config, apply overrides and initialize logging.
    pub fn new(options: &GlobalOptions) -> Result<Self, CliError> {
        let config = load_config(options)?;

        let logging_guard = init_logging(&config.logging.directory, &config.logging.file)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            _logging_guard: logging_guard,
            config,
        })
    }

    /// Get the effective configuration.
    pub fn config(&self) -> &SatviewConfig {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("satview v{}", env!("CARGO_PKG_VERSION"));
        info!(
            gpsd = %self.config.gpsd.address(),
            minimum_interval_ms = self.config.request.minimum_interval.as_millis() as u64,
            "satview CLI: {} command",
            command
        );
    }

    /// Build a multi-threaded tokio runtime.
    pub fn runtime(&self) -> Result<tokio::runtime::Runtime, CliError> {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)
    }
}

/// Load the config file (explicit path or default) and overlay CLI flags.
fn load_config(options: &GlobalOptions) -> Result<SatviewConfig, CliError> {
    let mut config = match &options.config {
        Some(path) if !path.exists() => {
            return Err(CliError::Config(format!(
                "config file '{}' not found",
                path.display()
            )))
        }
        Some(path) => SatviewConfig::load_from(path)?,
        None => SatviewConfig::load()?,
    };

    if let Some(host) = &options.host {
        config.gpsd.host = host.clone();
    }
    if let Some(port) = options.port {
        config.gpsd.port = port;
    }

    Ok(config)
}
