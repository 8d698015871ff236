//! Satellite Source
//!
//! The public entry point of the decoder. A [`SatelliteSource`] acquires a
//! device from a [`DeviceFactory`], drains NMEA lines from it, reconciles GSV
//! and GSA data and reports to a [`NotificationSink`].
//!
//! # Architecture
//!
//! ```text
//! DeviceFactory ──► LineSource ──► checksum ──► split ──┬─► GsvAccumulator ──┐
//!  (gpsd, replay)    (device)                           └─► GsaResolver ─────┤
//!                                                                            ▼
//!                         NotificationSink ◄── SatelliteSource ◄── UpdateRequest
//! ```
//!
//! The source is synchronous and single-threaded. [`SourceDriver`] runs one
//! on a tokio task, driven by a command channel, a readiness [`Notify`]
//! and the request deadline.
//!
//! [`Notify`]: tokio::sync::Notify
//!
//! # Components
//!
//! - [`facade`] - `SatelliteSource`
//! - [`traits`] - `LineSource`, `DeviceFactory`, `NotificationSink`
//! - [`event`] - `SatelliteEvent` and channel sinks
//! - [`memory`] - `LineBuffer`, `ReplayFactory` for recorded logs
//! - [`driver`] - `SourceDriver`, `SourceHandle`

mod driver;
mod error;
mod event;
mod facade;
mod memory;
mod traits;

pub use driver::{SourceCommand, SourceDriver, SourceHandle};
pub use error::{SourceError, SourceErrorCode};
pub use event::SatelliteEvent;
pub use facade::{SatelliteSource, SourceStats};
pub use memory::{LineBuffer, ReplayDevice, ReplayFactory, ReplayFeed, ReplayStats};
pub use traits::{DeviceFactory, LineSource, NotificationSink};
