//! Error types for the gpsd connection.

use thiserror::Error;

/// Errors that can occur while talking to gpsd.
#[derive(Debug, Error)]
pub enum GpsdError {
    /// Could not open the TCP connection.
    #[error("Failed to connect to gpsd at {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Could not send the watch command.
    #[error("Failed to enable NMEA watch: {0}")]
    Watch(#[source] std::io::Error),
}
