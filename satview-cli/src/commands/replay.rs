//! Replay command - decode a recorded NMEA log offline.

use std::path::Path;
use std::time::Duration;

use tracing::info;

use satview::source::{ReplayFactory, SatelliteEvent, SatelliteSource, SourceStats};

use super::common::print_event;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the replay command.
///
/// With `request_timeout_ms` the log answers a one-shot request instead of
/// continuous updates; the end of the log counts as the deadline.
pub fn run(
    runner: &CliRunner,
    file: &Path,
    request_timeout_ms: Option<u64>,
) -> Result<(), CliError> {
    runner.log_startup("replay");
    let text = std::fs::read_to_string(file).map_err(|e| CliError::FileRead {
        path: file.display().to_string(),
        error: e,
    })?;

    let (events, stats) = replay(
        &text,
        runner.config().request.minimum_interval,
        request_timeout_ms.map(Duration::from_millis),
    );

    for event in &events {
        print_event(event);
    }

    println!();
    println!("Lines read:      {}", stats.lines_read);
    println!("Lines rejected:  {}", stats.lines_rejected);
    println!("Views published: {}", stats.views_published);
    println!("In-use resolved: {}", stats.in_use_resolved);
    info!(file = %file.display(), ?stats, "Replay finished");

    Ok(())
}

/// Feed `text` through a source and collect what it reports.
fn replay(
    text: &str,
    minimum_interval: Duration,
    request_timeout: Option<Duration>,
) -> (Vec<SatelliteEvent>, SourceStats) {
    let factory = ReplayFactory::new();
    let feed = factory.feed();
    feed.push_text(text);

    let mut source = SatelliteSource::with_minimum_interval(factory, Vec::new(), minimum_interval);
    match request_timeout {
        Some(timeout) => source.request_update(timeout),
        None => source.start_updates(),
    }
    source.handle_lines_ready();
    if source.is_request_pending() {
        source.handle_deadline();
    }
    source.stop_updates();

    let stats = source.stats();
    (std::mem::take(source.sink_mut()), stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A
$GPGSV,2,1,08,01,40,083,46,02,17,308,41,12,07,344,39,14,22,228,45*75
$GPGSV,2,2,08,15,52,050,40,18,11,181,34,22,65,095,47,25,33,140,43*7C
$GPGSA,A,3,01,02,12,14,,,,,,,,,2.5,1.3,2.1*31
$GPGSV,2,1,08,01,40,083,46,02,17,308,41,12,07,344,39,14,22,228,45*75
$GPGSV,2,2,08,15,52,050,40,18,11,181,34,22,65,095,47,25,33,140,43*7C
";

    const FIVE_SECONDS: Duration = Duration::from_millis(5000);

    #[test]
    fn test_continuous_replay() {
        let (events, stats) = replay(LOG, FIVE_SECONDS, None);

        assert_eq!(events.len(), 3);
        assert_eq!(stats.lines_read, 6);
        assert_eq!(stats.views_published, 2);
        assert_eq!(stats.in_use_resolved, 1);
    }

    #[test]
    fn test_request_replay_stops_at_completion() {
        let (events, stats) = replay(LOG, FIVE_SECONDS, Some(Duration::from_secs(6)));

        assert!(matches!(events[0], SatelliteEvent::SatellitesInView(_)));
        assert!(matches!(events[1], SatelliteEvent::SatellitesInUse(_)));
        assert_eq!(events[2], SatelliteEvent::RequestCompleted);
        assert_eq!(events.len(), 3);
        assert_eq!(stats.lines_read, 4);
    }

    #[test]
    fn test_request_replay_times_out_at_end_of_log() {
        let gsv_only: String = LOG.lines().take(3).map(|l| format!("{l}\n")).collect();
        let (events, _) = replay(&gsv_only, FIVE_SECONDS, Some(Duration::from_secs(6)));

        assert_eq!(events, vec![SatelliteEvent::RequestTimeout]);
    }

    #[test]
    fn test_short_request_rejected() {
        let (events, stats) = replay(LOG, FIVE_SECONDS, Some(Duration::from_secs(3)));

        assert_eq!(events, vec![SatelliteEvent::RequestTimeout]);
        assert_eq!(stats.lines_read, 0);
    }
}
