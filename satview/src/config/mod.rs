//! Configuration file handling for ~/.satview/config.ini.
//!
//! ```ini
//! [gpsd]
//! host = localhost
//! port = 2947
//!
//! [request]
//! minimum_interval_ms = 5000
//! default_timeout_ms = 0
//!
//! [logging]
//! directory = logs
//! file = satview.log
//! ```
//!
//! Missing sections and keys keep their defaults.

mod file;
mod parser;
mod settings;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    LoggingSettings, RequestSettings, SatviewConfig, DEFAULT_LOG_DIR, DEFAULT_LOG_FILE,
    DEFAULT_MINIMUM_INTERVAL_MS,
};
