//! In-memory line sources.
//!
//! [`LineBuffer`] is a plain FIFO of lines. [`ReplayFactory`] is a
//! [`DeviceFactory`] whose devices read from a shared, externally fed queue,
//! which is how recorded NMEA logs are replayed and how the source is
//! exercised without a gpsd instance.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::error::SourceError;
use super::traits::{DeviceFactory, LineSource};

/// FIFO of complete lines.
#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    lines: VecDeque<Vec<u8>>,
}

impl LineBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer every non-empty line of `text`.
    pub fn from_text(text: &str) -> Self {
        let mut buffer = Self::new();
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            buffer.push_line(line);
        }
        buffer
    }

    /// Append one line.
    pub fn push_line(&mut self, line: impl Into<Vec<u8>>) {
        self.lines.push_back(line.into());
    }

    /// Number of buffered lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether no line is buffered.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl LineSource for LineBuffer {
    fn can_read_line(&mut self) -> bool {
        !self.lines.is_empty()
    }

    fn read_line(&mut self) -> Option<Vec<u8>> {
        self.lines.pop_front()
    }
}

/// Device lifecycle counters of a [`ReplayFactory`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub created: u64,
    pub resumed: u64,
    pub paused: u64,
    pub destroyed: u64,
    pub failed: u64,
}

impl ReplayStats {
    /// Devices created and not yet destroyed.
    pub fn live_devices(&self) -> u64 {
        self.created - self.destroyed
    }
}

#[derive(Debug)]
struct ReplayShared {
    lines: LineBuffer,
    available: bool,
    stats: ReplayStats,
}

/// Handle for feeding lines to, and observing, a [`ReplayFactory`].
#[derive(Debug, Clone)]
pub struct ReplayFeed {
    shared: Arc<Mutex<ReplayShared>>,
}

impl ReplayFeed {
    /// Queue one line.
    pub fn push_line(&self, line: impl Into<Vec<u8>>) {
        self.shared.lock().lines.push_line(line);
    }

    /// Queue every non-empty line of `text`.
    pub fn push_text(&self, text: &str) {
        let mut shared = self.shared.lock();
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            shared.lines.push_line(line);
        }
    }

    /// Lines not yet read by any device.
    pub fn pending(&self) -> usize {
        self.shared.lock().lines.len()
    }

    /// Make device creation succeed (`true`) or fail (`false`).
    pub fn set_available(&self, available: bool) {
        self.shared.lock().available = available;
    }

    /// Lifecycle counters.
    pub fn stats(&self) -> ReplayStats {
        self.shared.lock().stats
    }
}

/// Device handed out by a [`ReplayFactory`].
///
/// Reads from the shared queue while resumed.
#[derive(Debug)]
pub struct ReplayDevice {
    shared: Arc<Mutex<ReplayShared>>,
    resumed: bool,
}

impl LineSource for ReplayDevice {
    fn can_read_line(&mut self) -> bool {
        self.resumed && !self.shared.lock().lines.is_empty()
    }

    fn read_line(&mut self) -> Option<Vec<u8>> {
        if !self.resumed {
            return None;
        }
        self.shared.lock().lines.read_line()
    }
}

/// Factory replaying queued lines.
#[derive(Debug)]
pub struct ReplayFactory {
    feed: ReplayFeed,
}

impl Default for ReplayFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplayFactory {
    /// Create a factory with an empty queue.
    pub fn new() -> Self {
        Self {
            feed: ReplayFeed {
                shared: Arc::new(Mutex::new(ReplayShared {
                    lines: LineBuffer::new(),
                    available: true,
                    stats: ReplayStats::default(),
                })),
            },
        }
    }

    /// Handle for feeding lines after the factory moved into a source.
    pub fn feed(&self) -> ReplayFeed {
        self.feed.clone()
    }
}

impl DeviceFactory for ReplayFactory {
    type Device = ReplayDevice;

    fn create_device(&mut self) -> Result<ReplayDevice, SourceError> {
        let mut shared = self.feed.shared.lock();
        if !shared.available {
            shared.stats.failed += 1;
            return Err(SourceError::DeviceUnavailable(
                "replay source unavailable".to_string(),
            ));
        }
        shared.stats.created += 1;

        Ok(ReplayDevice {
            shared: Arc::clone(&self.feed.shared),
            resumed: false,
        })
    }

    fn resume_device(&mut self, device: &mut ReplayDevice) {
        device.resumed = true;
        self.feed.shared.lock().stats.resumed += 1;
    }

    fn pause_device(&mut self, device: &mut ReplayDevice) {
        device.resumed = false;
        self.feed.shared.lock().stats.paused += 1;
    }

    fn destroy_device(&mut self, device: ReplayDevice) {
        drop(device);
        self.feed.shared.lock().stats.destroyed += 1;
    }
}
