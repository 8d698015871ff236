//! Notification events and channel-backed sinks.

use tokio::sync::mpsc;
use tracing::trace;

use super::error::SourceErrorCode;
use super::traits::NotificationSink;
use crate::satellite::SatelliteRecord;

/// A notification emitted by the satellite source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SatelliteEvent {
    /// Satellites currently in view.
    SatellitesInView(Vec<SatelliteRecord>),
    /// Satellites used in the current fix.
    SatellitesInUse(Vec<SatelliteRecord>),
    /// A one-shot request expired.
    RequestTimeout,
    /// A one-shot request was answered.
    RequestCompleted,
    /// An error occurred.
    Error(SourceErrorCode),
}

/// Collects events in memory. Mostly useful for replay and tests.
impl NotificationSink for Vec<SatelliteEvent> {
    fn satellites_in_view(&mut self, satellites: &[SatelliteRecord]) {
        self.push(SatelliteEvent::SatellitesInView(satellites.to_vec()));
    }

    fn satellites_in_use(&mut self, satellites: &[SatelliteRecord]) {
        self.push(SatelliteEvent::SatellitesInUse(satellites.to_vec()));
    }

    fn request_timeout(&mut self) {
        self.push(SatelliteEvent::RequestTimeout);
    }

    fn request_completed(&mut self) {
        self.push(SatelliteEvent::RequestCompleted);
    }

    fn error(&mut self, code: SourceErrorCode) {
        self.push(SatelliteEvent::Error(code));
    }
}

/// Forwards events to an async consumer.
///
/// A closed receiver is not an error for the source; events are dropped.
impl NotificationSink for mpsc::UnboundedSender<SatelliteEvent> {
    fn satellites_in_view(&mut self, satellites: &[SatelliteRecord]) {
        forward(self, SatelliteEvent::SatellitesInView(satellites.to_vec()));
    }

    fn satellites_in_use(&mut self, satellites: &[SatelliteRecord]) {
        forward(self, SatelliteEvent::SatellitesInUse(satellites.to_vec()));
    }

    fn request_timeout(&mut self) {
        forward(self, SatelliteEvent::RequestTimeout);
    }

    fn request_completed(&mut self) {
        forward(self, SatelliteEvent::RequestCompleted);
    }

    fn error(&mut self, code: SourceErrorCode) {
        forward(self, SatelliteEvent::Error(code));
    }
}

fn forward(tx: &mpsc::UnboundedSender<SatelliteEvent>, event: SatelliteEvent) {
    if tx.send(event).is_err() {
        trace!("Event receiver dropped, discarding event");
    }
}
