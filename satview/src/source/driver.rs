//! Async driver running a [`SatelliteSource`] on a tokio task.
//!
//! The source itself is synchronous; the driver owns it and turns commands,
//! device readiness and the request deadline into entry-point calls, one at
//! a time.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, Notify};
use tracing::{debug, info};

use super::error::SourceError;
use super::facade::SatelliteSource;
use super::traits::{DeviceFactory, NotificationSink};

/// Commands accepted by a running driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceCommand {
    StartUpdates,
    StopUpdates,
    RequestUpdate(Duration),
    Shutdown,
}

/// Cloneable handle for controlling a driver.
#[derive(Debug, Clone)]
pub struct SourceHandle {
    tx: mpsc::UnboundedSender<SourceCommand>,
}

impl SourceHandle {
    /// Start continuous updates.
    pub fn start_updates(&self) -> Result<(), SourceError> {
        self.send(SourceCommand::StartUpdates)
    }

    /// Stop continuous updates.
    pub fn stop_updates(&self) -> Result<(), SourceError> {
        self.send(SourceCommand::StopUpdates)
    }

    /// Request a single update within `timeout`.
    pub fn request_update(&self, timeout: Duration) -> Result<(), SourceError> {
        self.send(SourceCommand::RequestUpdate(timeout))
    }

    /// Stop the driver, releasing the device.
    pub fn shutdown(&self) -> Result<(), SourceError> {
        self.send(SourceCommand::Shutdown)
    }

    fn send(&self, command: SourceCommand) -> Result<(), SourceError> {
        self.tx
            .send(command)
            .map_err(|_| SourceError::DriverStopped)
    }
}

/// Event loop for a satellite source.
pub struct SourceDriver<F: DeviceFactory, S: NotificationSink> {
    source: SatelliteSource<F, S>,
    commands: mpsc::UnboundedReceiver<SourceCommand>,
    readable: Arc<Notify>,
}

impl<F, S> SourceDriver<F, S>
where
    F: DeviceFactory + Send + 'static,
    F::Device: Send,
    S: NotificationSink + Send + 'static,
{
    /// Wrap `source`. `readable` must be notified whenever the device has
    /// new lines.
    pub fn new(source: SatelliteSource<F, S>, readable: Arc<Notify>) -> (Self, SourceHandle) {
        let (tx, commands) = mpsc::unbounded_channel();
        (
            Self {
                source,
                commands,
                readable,
            },
            SourceHandle { tx },
        )
    }

    /// Spawn the driver.
    pub fn start(self) -> tokio::task::JoinHandle<SatelliteSource<F, S>> {
        tokio::spawn(self.run())
    }

    /// Run until shutdown or until every handle is dropped.
    ///
    /// Returns the stopped source.
    pub async fn run(mut self) -> SatelliteSource<F, S> {
        info!("Satellite source driver started");

        loop {
            let deadline = self.source.next_deadline();

            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(SourceCommand::StartUpdates) => self.source.start_updates(),
                    Some(SourceCommand::StopUpdates) => self.source.stop_updates(),
                    Some(SourceCommand::RequestUpdate(timeout)) => self.source.request_update(timeout),
                    Some(SourceCommand::Shutdown) | None => {
                        debug!("Satellite source driver shutting down");
                        break;
                    }
                },
                _ = self.readable.notified() => self.source.handle_lines_ready(),
                _ = sleep_until(deadline) => self.source.handle_deadline(),
            }
        }

        self.source.stop_updates();
        info!(stats = ?self.source.stats(), "Satellite source driver stopped");
        self.source
    }
}

/// Sleep until `deadline`, or forever when there is none.
async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ReplayFactory, SatelliteEvent};

    const GSV: &str = "$GPGSV,1,1,02,01,40,083,46,02,17,308,41*7D";

    #[tokio::test]
    async fn test_live_updates_flow_through_channel() {
        let factory = ReplayFactory::new();
        let feed = factory.feed();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let readable = Arc::new(Notify::new());

        let source = SatelliteSource::new(factory, tx);
        let (driver, handle) = SourceDriver::new(source, Arc::clone(&readable));
        let task = driver.start();

        handle.start_updates().unwrap();
        feed.push_line(GSV);
        readable.notify_one();

        match rx.recv().await {
            Some(SatelliteEvent::SatellitesInView(records)) => assert_eq!(records.len(), 2),
            other => panic!("unexpected event {:?}", other),
        }

        handle.shutdown().unwrap();
        let source = task.await.unwrap();
        assert!(!source.is_running());
        assert_eq!(feed.stats().live_devices(), 0);
    }

    #[tokio::test]
    async fn test_deadline_fires_timeout() {
        let factory = ReplayFactory::new();
        let feed = factory.feed();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let readable = Arc::new(Notify::new());

        let source =
            SatelliteSource::with_minimum_interval(factory, tx, Duration::from_millis(20));
        let (driver, handle) = SourceDriver::new(source, readable);
        let task = driver.start();

        handle.request_update(Duration::from_millis(30)).unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timeout event within test window");
        assert_eq!(event, Some(SatelliteEvent::RequestTimeout));
        assert_eq!(feed.stats().live_devices(), 0);

        drop(handle);
        task.await.unwrap();
    }

    #[test]
    fn test_handle_reports_stopped_driver() {
        let factory = ReplayFactory::new();
        let source = SatelliteSource::new(factory, Vec::<SatelliteEvent>::new());
        let (driver, handle) = SourceDriver::new(source, Arc::new(Notify::new()));
        drop(driver);

        assert!(matches!(
            handle.start_updates(),
            Err(SourceError::DriverStopped)
        ));
    }
}
