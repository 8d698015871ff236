//! Configuration for the gpsd connection.

/// Default gpsd host.
pub const DEFAULT_GPSD_HOST: &str = "localhost";

/// Default gpsd TCP port.
pub const DEFAULT_GPSD_PORT: u16 = 2947;

/// Where to reach gpsd.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpsdConfig {
    /// Host name or address.
    pub host: String,

    /// TCP port.
    pub port: u16,
}

impl GpsdConfig {
    /// Create a config for `host:port`.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `host:port` form used for connecting and logging.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for GpsdConfig {
    fn default() -> Self {
        Self::new(DEFAULT_GPSD_HOST, DEFAULT_GPSD_PORT)
    }
}
