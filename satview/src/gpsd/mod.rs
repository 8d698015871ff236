//! gpsd connection
//!
//! A [`GpsdMaster`] owns one TCP connection to gpsd with NMEA watching
//! enabled and acts as a [`DeviceFactory`](crate::source::DeviceFactory).
//! Each [`GpsdDevice`] it creates receives a copy of every NMEA line
//! while resumed.
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio::sync::Notify;
//! use satview::gpsd::{GpsdConfig, GpsdMaster};
//!
//! # async fn run() -> Result<(), satview::gpsd::GpsdError> {
//! let readable = Arc::new(Notify::new());
//! let master = GpsdMaster::connect(&GpsdConfig::default(), readable).await?;
//! assert!(master.is_connected());
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod master;

pub use config::{GpsdConfig, DEFAULT_GPSD_HOST, DEFAULT_GPSD_PORT};
pub use error::GpsdError;
pub use master::{GpsdDevice, GpsdMaster};
