//! Watch command - continuous satellite updates until Ctrl+C.

use tracing::info;

use super::common::{ctrl_c_notify, print_event, GpsdSession};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the watch command.
pub fn run(runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("watch");
    let config = runner.config().clone();
    let runtime = runner.runtime()?;

    println!("Watching satellites via gpsd at {}", config.gpsd.address());
    println!("Press Ctrl+C to exit");
    println!();

    runtime.block_on(async move {
        let stop = ctrl_c_notify()?;
        let mut session = GpsdSession::connect(&config).await?;
        session.handle().start_updates()?;

        loop {
            tokio::select! {
                event = session.next_event() => match event {
                    Some(event) => print_event(&event),
                    None => break,
                },
                _ = stop.notified() => {
                    println!();
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        session.finish().await
    })
}
