//! Settings structs, one per `[section]` of config.ini.

use std::path::PathBuf;
use std::time::Duration;

use crate::gpsd::GpsdConfig;

/// Default floor for one-shot request timeouts, in milliseconds.
pub const DEFAULT_MINIMUM_INTERVAL_MS: u64 = 5000;

/// Default log directory.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "satview.log";

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SatviewConfig {
    /// gpsd connection
    pub gpsd: GpsdConfig,
    /// One-shot request timing
    pub request: RequestSettings,
    /// Log output
    pub logging: LoggingSettings,
}

/// One-shot request settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSettings {
    /// Timeouts below this are answered with an immediate request timeout.
    pub minimum_interval: Duration,
    /// Timeout used when the caller gives none. Zero means the minimum.
    pub default_timeout: Duration,
}

impl RequestSettings {
    /// Timeout for a request when the caller passes `requested` (if any).
    pub fn effective_timeout(&self, requested: Option<Duration>) -> Duration {
        requested.unwrap_or(self.default_timeout)
    }
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            minimum_interval: Duration::from_millis(DEFAULT_MINIMUM_INTERVAL_MS),
            default_timeout: Duration::ZERO,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub file: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_LOG_DIR),
            file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}
