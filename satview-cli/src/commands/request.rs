//! Request command - one-shot satellite update with a timeout.

use std::time::Duration;

use satview::source::SatelliteEvent;
use tracing::warn;

use super::common::{print_event, GpsdSession};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Slack added to the request timeout before the CLI gives up on its own.
const GRACE: Duration = Duration::from_secs(1);

/// Run the request command.
///
/// `timeout_ms` falls back to `[request] default_timeout_ms`; zero means the
/// minimum interval.
pub fn run(runner: &CliRunner, timeout_ms: Option<u64>) -> Result<(), CliError> {
    runner.log_startup("request");
    let config = runner.config().clone();
    let runtime = runner.runtime()?;

    let timeout = config
        .request
        .effective_timeout(timeout_ms.map(Duration::from_millis));
    let wait = timeout.max(config.request.minimum_interval) + GRACE;

    runtime.block_on(async move {
        let mut session = GpsdSession::connect(&config).await?;
        session.handle().request_update(timeout)?;

        let outcome = tokio::time::timeout(wait, async {
            while let Some(event) = session.next_event().await {
                print_event(&event);
                if is_final(&event) {
                    break;
                }
            }
        })
        .await;

        if outcome.is_err() {
            warn!(wait_ms = wait.as_millis() as u64, "No answer from satellite source");
            println!("No answer within {} ms", wait.as_millis());
        }

        session.finish().await
    })
}

/// Whether `event` ends a one-shot request.
fn is_final(event: &SatelliteEvent) -> bool {
    matches!(
        event,
        SatelliteEvent::RequestCompleted | SatelliteEvent::RequestTimeout | SatelliteEvent::Error(_)
    )
}
