//! One-shot update request tracking.

use std::time::{Duration, Instant};

use tracing::debug;

/// Shortest timeout a one-shot request accepts.
pub const MINIMUM_UPDATE_INTERVAL: Duration = Duration::from_millis(5000);

/// Longer timeouts are clamped to this so the deadline stays representable.
pub const MAXIMUM_UPDATE_TIMEOUT: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Which halves of a one-shot answer have arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Completion(u8);

impl Completion {
    /// Nothing received yet.
    pub const NONE: Completion = Completion(0);
    /// A complete GSV group was published.
    pub const VIEW: Completion = Completion(0b01);
    /// A GSA sentence resolved completely.
    pub const USE: Completion = Completion(0b10);
    /// Both halves received.
    pub const BOTH: Completion = Completion(0b11);

    /// Whether every bit of `other` is set.
    pub fn contains(self, other: Completion) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set the bits of `other`.
    pub fn insert(&mut self, other: Completion) {
        self.0 |= other.0;
    }

    /// Whether both view and use data were received.
    pub fn is_complete(self) -> bool {
        self.contains(Completion::BOTH)
    }
}

/// An outstanding one-shot request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRequest {
    /// When the request times out.
    pub deadline: Instant,
    /// Whether a continuous subscription was running when the request was issued.
    pub was_running: bool,
    /// Data received so far.
    pub received: Completion,
}

/// Request state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    /// No one-shot request outstanding.
    #[default]
    Idle,
    /// A one-shot request is waiting for data or its deadline.
    Pending(PendingRequest),
}

/// Result of issuing a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueOutcome {
    /// A request is already outstanding; nothing changed.
    AlreadyPending,
    /// The timeout is below the minimum interval; report a timeout now.
    Rejected,
    /// The request is armed until `deadline`.
    Armed {
        /// The subscription must be started for this request.
        start_subscription: bool,
        deadline: Instant,
    },
}

/// What to do with a freshly received view or use update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// No request outstanding: ordinary live update.
    Live,
    /// Request outstanding on an already-running subscription: forward as usual.
    Forwarded,
    /// Request outstanding on an on-demand subscription: collect silently.
    Suppressed,
    /// This update completed the request.
    Completed {
        /// The subscription was started for the request and must be stopped.
        stop_subscription: bool,
    },
}

impl Progress {
    /// Whether the update should reach the notification sink.
    pub fn should_notify(&self) -> bool {
        !matches!(self, Progress::Suppressed)
    }
}

/// Result of the request deadline firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineOutcome {
    /// The subscription was started for the request and must be stopped.
    pub stop_subscription: bool,
    /// The request did not complete; report a timeout.
    pub timed_out: bool,
}

/// Update-request state machine.
///
/// ```text
/// Idle --issue(timeout >= min)--> Pending
/// Pending --view + use received--> Idle (Completed)
/// Pending --deadline--> Idle (timeout unless complete)
/// ```
///
/// The machine decides; the caller owns the subscription and the timer.
#[derive(Debug)]
pub struct UpdateRequest {
    state: RequestState,
    minimum_interval: Duration,
}

impl Default for UpdateRequest {
    fn default() -> Self {
        Self::new(MINIMUM_UPDATE_INTERVAL)
    }
}

impl UpdateRequest {
    /// Create an idle state machine with the given minimum interval.
    pub fn new(minimum_interval: Duration) -> Self {
        Self {
            state: RequestState::Idle,
            minimum_interval,
        }
    }

    /// Shortest accepted timeout.
    pub fn minimum_interval(&self) -> Duration {
        self.minimum_interval
    }

    /// Current state.
    pub fn state(&self) -> RequestState {
        self.state
    }

    /// Whether a request is outstanding.
    pub fn is_pending(&self) -> bool {
        matches!(self.state, RequestState::Pending(_))
    }

    /// Deadline of the outstanding request.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            RequestState::Pending(pending) => Some(pending.deadline),
            RequestState::Idle => None,
        }
    }

    /// Issue a one-shot request.
    ///
    /// A zero `timeout` means "use the minimum interval". `running` is the
    /// subscription state at the time of the call.
    pub fn issue(&mut self, timeout: Duration, running: bool, now: Instant) -> IssueOutcome {
        if self.is_pending() {
            debug!("Update request already pending, ignoring");
            return IssueOutcome::AlreadyPending;
        }

        let timeout = if timeout.is_zero() {
            self.minimum_interval
        } else {
            timeout
        };

        if timeout < self.minimum_interval {
            debug!(
                timeout_ms = timeout.as_millis() as u64,
                minimum_ms = self.minimum_interval.as_millis() as u64,
                "Update request timeout below minimum"
            );
            return IssueOutcome::Rejected;
        }

        let timeout = timeout.min(MAXIMUM_UPDATE_TIMEOUT);
        let deadline = now.checked_add(timeout).unwrap_or(now);
        self.state = RequestState::Pending(PendingRequest {
            deadline,
            was_running: running,
            received: Completion::NONE,
        });

        IssueOutcome::Armed {
            start_subscription: !running,
            deadline,
        }
    }

    /// Record that a complete view snapshot was published.
    pub fn view_received(&mut self) -> Progress {
        self.receive(Completion::VIEW)
    }

    /// Record that an in-use list resolved completely.
    pub fn use_received(&mut self) -> Progress {
        self.receive(Completion::USE)
    }

    fn receive(&mut self, bit: Completion) -> Progress {
        let RequestState::Pending(pending) = &mut self.state else {
            return Progress::Live;
        };

        pending.received.insert(bit);

        if pending.received.is_complete() {
            let stop_subscription = !pending.was_running;
            self.state = RequestState::Idle;
            return Progress::Completed { stop_subscription };
        }

        if pending.was_running {
            Progress::Forwarded
        } else {
            Progress::Suppressed
        }
    }

    /// The request deadline fired.
    ///
    /// Returns `None` when no request is outstanding (already completed).
    pub fn deadline_elapsed(&mut self) -> Option<DeadlineOutcome> {
        let RequestState::Pending(pending) = self.state else {
            return None;
        };
        self.state = RequestState::Idle;

        Some(DeadlineOutcome {
            stop_subscription: !pending.was_running,
            timed_out: !pending.received.is_complete(),
        })
    }
}
