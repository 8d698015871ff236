//! Output formatting and the gpsd session shared by live commands.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::info;

use satview::config::SatviewConfig;
use satview::gpsd::GpsdMaster;
use satview::satellite::SatelliteRecord;
use satview::source::{SatelliteEvent, SatelliteSource, SourceDriver, SourceError, SourceHandle};

use crate::error::CliError;

type GpsdSource = SatelliteSource<GpsdMaster, UnboundedSender<SatelliteEvent>>;

/// Format one satellite as a table row.
pub fn format_record(record: &SatelliteRecord) -> String {
    format!(
        "  {:<8} PRN {:>3}  elev {:>3}  azim {:>3}  snr {:>2}",
        record.constellation.name(),
        record.prn,
        record.elevation,
        record.azimuth,
        record.signal_strength
    )
}

/// Render an event for the terminal.
pub fn format_event(event: &SatelliteEvent) -> String {
    match event {
        SatelliteEvent::SatellitesInView(records) => {
            let mut out = format!("Satellites in view: {}", records.len());
            for record in records {
                out.push('\n');
                out.push_str(&format_record(record));
            }
            out
        }
        SatelliteEvent::SatellitesInUse(records) => {
            let prns: Vec<String> = records.iter().map(|r| r.prn.to_string()).collect();
            format!("Satellites in use: {} [{}]", records.len(), prns.join(", "))
        }
        SatelliteEvent::RequestTimeout => "Request timed out".to_string(),
        SatelliteEvent::RequestCompleted => "Request completed".to_string(),
        SatelliteEvent::Error(code) => format!("Source error: {:?}", code),
    }
}

/// Print an event to stdout.
pub fn print_event(event: &SatelliteEvent) {
    println!("{}", format_event(event));
}

/// A satellite source driven on a tokio task over a gpsd connection.
pub struct GpsdSession {
    handle: SourceHandle,
    events: UnboundedReceiver<SatelliteEvent>,
    task: JoinHandle<GpsdSource>,
}

impl GpsdSession {
    /// Connect to gpsd and start the driver (updates not yet started).
    pub async fn connect(config: &SatviewConfig) -> Result<Self, CliError> {
        let readable = Arc::new(Notify::new());
        let master = GpsdMaster::connect(&config.gpsd, Arc::clone(&readable)).await?;

        let (tx, events) = mpsc::unbounded_channel();
        let source =
            SatelliteSource::with_minimum_interval(master, tx, config.request.minimum_interval);
        let (driver, handle) = SourceDriver::new(source, readable);

        Ok(Self {
            handle,
            events,
            task: driver.start(),
        })
    }

    /// Handle for sending commands to the driver.
    pub fn handle(&self) -> SourceHandle {
        self.handle.clone()
    }

    /// Next event from the source.
    pub async fn next_event(&mut self) -> Option<SatelliteEvent> {
        self.events.recv().await
    }

    /// Shut the driver down and wait for it.
    pub async fn finish(self) -> Result<(), CliError> {
        // Already stopped is fine
        let _ = self.handle.shutdown();
        let source = self
            .task
            .await
            .map_err(|_| CliError::Source(SourceError::DriverStopped))?;
        info!(stats = ?source.stats(), "gpsd session finished");
        Ok(())
    }
}

/// Notify that fires once Ctrl+C is pressed.
pub fn ctrl_c_notify() -> Result<Arc<Notify>, CliError> {
    let stop = Arc::new(Notify::new());
    let stop_clone = Arc::clone(&stop);

    ctrlc::set_handler(move || {
        stop_clone.notify_one();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    Ok(stop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use satview::satellite::Constellation;
    use satview::source::SourceErrorCode;

    fn record(prn: u16) -> SatelliteRecord {
        SatelliteRecord {
            constellation: Constellation::Gps,
            prn,
            elevation: 40,
            azimuth: 83,
            signal_strength: 46,
        }
    }

    #[test]
    fn test_format_view() {
        let text = format_event(&SatelliteEvent::SatellitesInView(vec![record(1), record(12)]));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Satellites in view: 2");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("GPS"));
        assert!(lines[2].contains("PRN  12"));
    }

    #[test]
    fn test_format_in_use() {
        let text = format_event(&SatelliteEvent::SatellitesInUse(vec![record(1), record(2)]));
        assert_eq!(text, "Satellites in use: 2 [1, 2]");
    }

    #[test]
    fn test_format_errors() {
        assert_eq!(format_event(&SatelliteEvent::RequestTimeout), "Request timed out");
        assert!(
            format_event(&SatelliteEvent::Error(SourceErrorCode::AccessError))
                .contains("AccessError")
        );
    }
}
