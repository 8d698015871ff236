//! Error types for the satellite source.

use thiserror::Error;

/// Error code exposed through [`super::SatelliteSource::last_error`] and
/// delivered to the notification sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceErrorCode {
    /// No error has occurred.
    #[default]
    NoError,
    /// The daemon connection could not provide a device.
    AccessError,
}

/// Errors raised by the source's collaborators.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The daemon connection could not hand out a device.
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The driver task is no longer running.
    #[error("Source driver stopped")]
    DriverStopped,
}

impl SourceError {
    /// Map to the caller-visible error code.
    pub fn code(&self) -> SourceErrorCode {
        match self {
            SourceError::DeviceUnavailable(_) | SourceError::DriverStopped => {
                SourceErrorCode::AccessError
            }
        }
    }
}
