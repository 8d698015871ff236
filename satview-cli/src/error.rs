//! CLI error handling with user-friendly messages.

use std::fmt;
use std::process;

use satview::config::ConfigFileError;
use satview::gpsd::GpsdError;
use satview::source::SourceError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to build the async runtime
    Runtime(std::io::Error),
    /// Could not reach gpsd
    Gpsd(GpsdError),
    /// The source driver went away
    Source(SourceError),
    /// Failed to read an NMEA log
    FileRead { path: String, error: std::io::Error },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::Gpsd(GpsdError::Connect { .. }) = self {
            eprintln!();
            eprintln!("Common issues:");
            eprintln!("  1. gpsd not running: sudo systemctl start gpsd");
            eprintln!("  2. Wrong address: check [gpsd] in config.ini or use --host/--port");
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Gpsd(e) => write!(f, "{}", e),
            CliError::Source(e) => write!(f, "Satellite source error: {}", e),
            CliError::FileRead { path, error } => {
                write!(f, "Failed to read file '{}': {}", path, error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Runtime(e) => Some(e),
            CliError::Gpsd(e) => Some(e),
            CliError::Source(e) => Some(e),
            CliError::FileRead { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<GpsdError> for CliError {
    fn from(e: GpsdError) -> Self {
        CliError::Gpsd(e)
    }
}

impl From<SourceError> for CliError {
    fn from(e: SourceError) -> Self {
        CliError::Source(e)
    }
}
