//! INI parsing: the single place where INI key names map to struct fields.

use std::path::PathBuf;
use std::time::Duration;

use ini::Ini;

use super::file::ConfigFileError;
use super::settings::SatviewConfig;

/// Parse an `Ini` object into a `SatviewConfig`.
///
/// Starts from `SatviewConfig::default()` and overlays any values found.
pub(super) fn parse_ini(ini: &Ini) -> Result<SatviewConfig, ConfigFileError> {
    let mut config = SatviewConfig::default();

    // [gpsd] section
    if let Some(section) = ini.section(Some("gpsd")) {
        if let Some(v) = section.get("host") {
            let v = v.trim();
            if v.is_empty() {
                return Err(invalid("gpsd", "host", v, "must not be empty"));
            }
            config.gpsd.host = v.to_string();
        }
        if let Some(v) = section.get("port") {
            config.gpsd.port = match v.trim().parse::<u16>() {
                Ok(port) if port != 0 => port,
                _ => return Err(invalid("gpsd", "port", v, "must be a port number (1-65535)")),
            };
        }
    }

    // [request] section
    if let Some(section) = ini.section(Some("request")) {
        if let Some(v) = section.get("minimum_interval_ms") {
            let ms = parse_millis(v)
                .filter(|ms| *ms > 0)
                .ok_or_else(|| {
                    invalid(
                        "request",
                        "minimum_interval_ms",
                        v,
                        "must be a positive integer (milliseconds)",
                    )
                })?;
            config.request.minimum_interval = Duration::from_millis(ms);
        }
        if let Some(v) = section.get("default_timeout_ms") {
            let ms = parse_millis(v).ok_or_else(|| {
                invalid(
                    "request",
                    "default_timeout_ms",
                    v,
                    "must be a non-negative integer (milliseconds)",
                )
            })?;
            config.request.default_timeout = Duration::from_millis(ms);
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = v.to_string();
            }
        }
    }

    Ok(config)
}

fn parse_millis(value: &str) -> Option<u64> {
    value.trim().parse().ok()
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
