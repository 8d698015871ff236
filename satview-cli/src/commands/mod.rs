//! CLI command implementations.

pub mod common;
pub mod replay;
pub mod request;
pub mod watch;
