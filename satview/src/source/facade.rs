//! The satellite source: wires decoding, request tracking and collaborators.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use super::error::SourceErrorCode;
use super::traits::{DeviceFactory, LineSource, NotificationSink};
use crate::nmea::{parse_sentence, SentenceKind};
use crate::request::{IssueOutcome, Progress, UpdateRequest, MINIMUM_UPDATE_INTERVAL};
use crate::satellite::{GsaResolver, GsvAccumulator, SatelliteRecord, ViewSnapshot};

/// Work postponed until the current dispatch has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeferredTask {
    StopUpdates,
}

/// Line and sentence counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    /// Lines read from the device.
    pub lines_read: u64,
    /// Lines dropped by framing or checksum validation.
    pub lines_rejected: u64,
    /// View snapshots published.
    pub views_published: u64,
    /// GSA sentences that resolved completely.
    pub in_use_resolved: u64,
}

/// Satellite information source backed by a stream of NMEA lines.
///
/// All entry points are synchronous and expected to run on a single logical
/// thread: the host calls [`handle_lines_ready`](Self::handle_lines_ready)
/// when the device has data and [`handle_deadline`](Self::handle_deadline)
/// when [`next_deadline`](Self::next_deadline) passes.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use satview::source::{ReplayFactory, SatelliteEvent, SatelliteSource};
///
/// let factory = ReplayFactory::new();
/// let feed = factory.feed();
/// let mut source = SatelliteSource::new(factory, Vec::<SatelliteEvent>::new());
///
/// source.start_updates();
/// feed.push_line("$GPGSV,1,1,02,01,40,083,46,02,17,308,41*7D");
/// source.handle_lines_ready();
///
/// assert_eq!(source.satellites_in_view().map(|v| v.len()), Some(2));
/// assert_eq!(source.sink().len(), 1);
/// ```
pub struct SatelliteSource<F: DeviceFactory, S: NotificationSink> {
    factory: F,
    sink: S,
    /// Present exactly while running.
    device: Option<F::Device>,
    last_error: SourceErrorCode,
    gsv: GsvAccumulator,
    gsa: GsaResolver,
    view: Option<ViewSnapshot>,
    request: UpdateRequest,
    deferred: VecDeque<DeferredTask>,
    stats: SourceStats,
}

impl<F: DeviceFactory, S: NotificationSink> SatelliteSource<F, S> {
    /// Create a stopped source with the default minimum update interval.
    pub fn new(factory: F, sink: S) -> Self {
        Self::with_minimum_interval(factory, sink, MINIMUM_UPDATE_INTERVAL)
    }

    /// Create a stopped source with a custom minimum update interval.
    pub fn with_minimum_interval(factory: F, sink: S, minimum_interval: Duration) -> Self {
        Self {
            factory,
            sink,
            device: None,
            last_error: SourceErrorCode::NoError,
            gsv: GsvAccumulator::new(),
            gsa: GsaResolver::new(),
            view: None,
            request: UpdateRequest::new(minimum_interval),
            deferred: VecDeque::new(),
            stats: SourceStats::default(),
        }
    }

    /// Start continuous updates.
    ///
    /// On failure the error is recorded, reported to the sink, and the source
    /// stays stopped. Calling this while running does nothing.
    pub fn start_updates(&mut self) {
        if self.device.is_some() {
            return;
        }

        match self.factory.create_device() {
            Ok(mut device) => {
                self.factory.resume_device(&mut device);
                self.device = Some(device);
                info!("Satellite updates started");
            }
            Err(e) => {
                warn!(error = %e, "Failed to start satellite updates");
                self.last_error = e.code();
                self.sink.error(self.last_error);
            }
        }
    }

    /// Stop continuous updates and release the device.
    pub fn stop_updates(&mut self) {
        if let Some(mut device) = self.device.take() {
            self.factory.pause_device(&mut device);
            self.factory.destroy_device(device);
            info!("Satellite updates stopped");
        }
    }

    /// Request a single update within `timeout`.
    ///
    /// A zero timeout uses the minimum interval; a timeout below the minimum
    /// is answered with an immediate request timeout, and one beyond
    /// [`MAXIMUM_UPDATE_TIMEOUT`](crate::request::MAXIMUM_UPDATE_TIMEOUT) is
    /// clamped to it. Ignored while another request is outstanding.
    pub fn request_update(&mut self, timeout: Duration) {
        let running = self.is_running();
        match self.request.issue(timeout, running, Instant::now()) {
            IssueOutcome::AlreadyPending => {}
            IssueOutcome::Rejected => self.sink.request_timeout(),
            IssueOutcome::Armed {
                start_subscription,
                deadline,
            } => {
                debug!(
                    timeout_ms = timeout.as_millis() as u64,
                    was_running = running,
                    "Update request armed"
                );
                if start_subscription {
                    self.start_updates();
                }
                trace!(?deadline, "Request deadline set");
            }
        }
        self.run_deferred();
    }

    /// Shortest timeout accepted by [`request_update`](Self::request_update).
    pub fn minimum_update_interval(&self) -> Duration {
        self.request.minimum_interval()
    }

    /// Last error raised.
    pub fn last_error(&self) -> SourceErrorCode {
        self.last_error
    }

    /// Whether continuous updates are running.
    pub fn is_running(&self) -> bool {
        self.device.is_some()
    }

    /// Whether a one-shot request is outstanding.
    pub fn is_request_pending(&self) -> bool {
        self.request.is_pending()
    }

    /// When the outstanding request expires.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.request.deadline()
    }

    /// Most recently published satellites in view.
    pub fn satellites_in_view(&self) -> Option<&ViewSnapshot> {
        self.view.as_ref()
    }

    /// Line and sentence counters.
    pub fn stats(&self) -> SourceStats {
        self.stats
    }

    /// The notification sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the notification sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// The device has data: drain every buffered line.
    ///
    /// Draining stops early when a request completes and its deferred stop
    /// is queued; lines still buffered are left to the device.
    pub fn handle_lines_ready(&mut self) {
        while self.deferred.is_empty() {
            let Some(device) = self.device.as_mut() else {
                break;
            };
            if !device.can_read_line() {
                break;
            }
            let Some(line) = device.read_line() else {
                break;
            };
            self.handle_line(&line);
        }
        self.run_deferred();
    }

    /// The request deadline passed.
    pub fn handle_deadline(&mut self) {
        if let Some(outcome) = self.request.deadline_elapsed() {
            debug!(
                stop_subscription = outcome.stop_subscription,
                timed_out = outcome.timed_out,
                "Update request deadline"
            );
            if outcome.stop_subscription {
                self.stop_updates();
            }
            if outcome.timed_out {
                self.sink.request_timeout();
            }
        }
        self.run_deferred();
    }

    /// Decode one raw line.
    ///
    /// Lines failing framing or checksum validation are dropped silently.
    pub fn handle_line(&mut self, line: &[u8]) {
        self.stats.lines_read += 1;

        let sentence = match parse_sentence(line) {
            Ok(sentence) => sentence,
            Err(e) => {
                self.stats.lines_rejected += 1;
                trace!(error = %e, "Dropping sentence");
                return;
            }
        };

        match sentence.kind() {
            SentenceKind::Gsv => {
                if let Some(snapshot) = self.gsv.accept(&sentence) {
                    self.publish_view(snapshot);
                }
            }
            SentenceKind::Gsa => {
                if let Some(in_use) = self.gsa.resolve(&sentence, self.view.as_ref()) {
                    self.publish_in_use(in_use);
                }
            }
            SentenceKind::Other => {
                trace!(address = sentence.field(0), "Ignoring sentence");
            }
        }
    }

    fn publish_view(&mut self, snapshot: ViewSnapshot) {
        self.stats.views_published += 1;
        self.view = Some(snapshot);

        match self.request.view_received() {
            Progress::Completed { stop_subscription } => {
                self.complete_request(stop_subscription);
                self.sink.request_completed();
            }
            progress if progress.should_notify() => self.notify_view(),
            _ => trace!("Satellites in view collected for pending request"),
        }
    }

    fn publish_in_use(&mut self, in_use: Vec<SatelliteRecord>) {
        self.stats.in_use_resolved += 1;

        match self.request.use_received() {
            Progress::Completed { stop_subscription } => {
                self.complete_request(stop_subscription);
                self.sink.satellites_in_use(&in_use);
                self.sink.request_completed();
            }
            progress if progress.should_notify() => self.sink.satellites_in_use(&in_use),
            _ => trace!("Satellites in use collected for pending request"),
        }
    }

    fn complete_request(&mut self, stop_subscription: bool) {
        info!(
            satellites = self.view.as_ref().map_or(0, ViewSnapshot::len),
            "Update request completed"
        );
        if stop_subscription {
            self.deferred.push_back(DeferredTask::StopUpdates);
        }
        self.notify_view();
    }

    fn notify_view(&mut self) {
        if let Some(view) = &self.view {
            self.sink.satellites_in_view(&view.records());
        }
    }

    fn run_deferred(&mut self) {
        while let Some(task) = self.deferred.pop_front() {
            match task {
                DeferredTask::StopUpdates => self.stop_updates(),
            }
        }
    }
}

impl<F: DeviceFactory, S: NotificationSink> Drop for SatelliteSource<F, S> {
    fn drop(&mut self) {
        self.stop_updates();
    }
}
