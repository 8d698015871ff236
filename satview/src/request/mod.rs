//! One-shot update requests on top of a continuous subscription.
//!
//! A caller asking for "one fresh satellite reading" gets exactly one
//! satellites-in-view notification once both a complete GSV group and a
//! fully resolved GSA sentence have arrived, or a timeout if the deadline
//! passes first. When the subscription had to be started for the request,
//! intermediate updates are collected silently and the subscription is
//! stopped again afterwards.

mod state;

pub use state::{
    Completion, DeadlineOutcome, IssueOutcome, PendingRequest, Progress, RequestState,
    UpdateRequest, MAXIMUM_UPDATE_TIMEOUT, MINIMUM_UPDATE_INTERVAL,
};
