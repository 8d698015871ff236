//! satview - satellite view decoder for NMEA-0183 streams
//!
//! Decodes GSV (satellites in view) and GSA (satellites in use) sentences
//! from a gpsd NMEA stream and reports them to a [`NotificationSink`],
//! either continuously or as one-shot requests with a deadline.
//!
//! # Modules
//!
//! - [`nmea`] - checksum validation and sentence splitting
//! - [`satellite`] - satellite records, GSV accumulation, GSA resolution
//! - [`request`] - one-shot update request state machine
//! - [`source`] - the [`SatelliteSource`] facade, collaborator traits, async driver
//! - [`gpsd`] - TCP connection to gpsd acting as a device factory
//! - [`config`] - config.ini loading
//! - [`logging`] - tracing subscriber setup
//!
//! [`NotificationSink`]: source::NotificationSink
//! [`SatelliteSource`]: source::SatelliteSource

pub mod config;
pub mod gpsd;
pub mod logging;
pub mod nmea;
pub mod request;
pub mod satellite;
pub mod source;
