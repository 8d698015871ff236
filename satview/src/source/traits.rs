//! Collaborator traits at the source boundary.
//!
//! The source never touches sockets or timers itself. It reads lines from a
//! [`LineSource`] handed out by a [`DeviceFactory`] and reports through a
//! [`NotificationSink`].

use super::error::{SourceError, SourceErrorCode};
use crate::satellite::SatelliteRecord;

/// A buffered stream of complete NMEA lines.
pub trait LineSource {
    /// Whether at least one complete line is buffered.
    fn can_read_line(&mut self) -> bool;

    /// Read and remove one complete line, terminator included if present.
    fn read_line(&mut self) -> Option<Vec<u8>>;
}

/// Lifecycle of subordinate devices on a shared daemon connection.
///
/// Devices are created paused; the source resumes a device when it starts
/// updates and pauses then destroys it when it stops.
pub trait DeviceFactory {
    /// Device type handed out by this factory.
    type Device: LineSource;

    /// Create a new, paused device.
    fn create_device(&mut self) -> Result<Self::Device, SourceError>;

    /// Start delivering lines to `device`.
    fn resume_device(&mut self, device: &mut Self::Device);

    /// Stop delivering lines to `device`.
    fn pause_device(&mut self, device: &mut Self::Device);

    /// Release `device`.
    fn destroy_device(&mut self, device: Self::Device);
}

/// Receiver of satellite notifications.
pub trait NotificationSink {
    /// A new satellites-in-view list, ascending PRN order.
    fn satellites_in_view(&mut self, satellites: &[SatelliteRecord]);

    /// A new satellites-in-use list, ascending PRN order.
    fn satellites_in_use(&mut self, satellites: &[SatelliteRecord]);

    /// A one-shot update request expired without a complete answer.
    fn request_timeout(&mut self);

    /// A one-shot update request was answered. Follows the answer's
    /// notifications.
    fn request_completed(&mut self) {}

    /// An error occurred.
    fn error(&mut self, code: SourceErrorCode);
}
