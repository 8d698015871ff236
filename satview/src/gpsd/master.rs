//! Shared gpsd connection handing out subordinate devices.
//!
//! One TCP connection is opened per process. A reader task splits the
//! stream into lines and copies every NMEA line to each resumed
//! subordinate device. Devices start paused.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::config::GpsdConfig;
use super::error::GpsdError;
use crate::nmea::SENTINEL;
use crate::source::{DeviceFactory, LineSource, SourceError};

/// Enables raw NMEA output on a gpsd socket.
const WATCH_NMEA: &[u8] = b"?WATCH={\"enable\":true,\"nmea\":true};\n";

/// Lines longer than this are junk (NMEA caps sentences at 82 bytes).
const MAX_LINE_LEN: usize = 1024;

#[derive(Debug)]
struct Subordinate {
    paused: bool,
    tx: mpsc::UnboundedSender<Vec<u8>>,
}

#[derive(Debug)]
struct Shared {
    subordinates: Mutex<HashMap<u64, Subordinate>>,
    next_id: AtomicU64,
    connected: AtomicBool,
    readable: Arc<Notify>,
}

impl Shared {
    fn dispatch(&self, line: &[u8]) {
        if line.first() != Some(&SENTINEL) {
            trace!(len = line.len(), "Skipping non-NMEA gpsd output");
            return;
        }

        let mut delivered = false;
        for subordinate in self.subordinates.lock().values().filter(|s| !s.paused) {
            delivered |= subordinate.tx.send(line.to_vec()).is_ok();
        }

        if delivered {
            self.readable.notify_one();
        }
    }
}

/// Master connection to gpsd.
pub struct GpsdMaster {
    shared: Arc<Shared>,
    reader: JoinHandle<()>,
    /// Held so the socket's write side stays open.
    _writer: Option<OwnedWriteHalf>,
}

impl GpsdMaster {
    /// Connect to gpsd and enable NMEA watching.
    ///
    /// `readable` is notified whenever a resumed device receives a line.
    pub async fn connect(config: &GpsdConfig, readable: Arc<Notify>) -> Result<Self, GpsdError> {
        let address = config.address();
        let stream = TcpStream::connect((config.host.as_str(), config.port))
            .await
            .map_err(|source| GpsdError::Connect {
                address: address.clone(),
                source,
            })?;

        let (read_half, mut write_half) = stream.into_split();
        write_half
            .write_all(WATCH_NMEA)
            .await
            .map_err(GpsdError::Watch)?;

        info!(address = %address, "Connected to gpsd");

        let mut master = Self::from_reader(read_half, readable);
        master._writer = Some(write_half);
        Ok(master)
    }

    /// Build a master over an arbitrary byte stream (recorded sessions, tests).
    pub fn from_reader<R>(reader: R, readable: Arc<Notify>) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let shared = Arc::new(Shared {
            subordinates: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            connected: AtomicBool::new(true),
            readable,
        });
        let reader = tokio::spawn(read_loop(BufReader::new(reader), Arc::clone(&shared)));

        Self {
            shared,
            reader,
            _writer: None,
        }
    }

    /// Whether the connection is still open.
    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::Acquire)
    }

    /// Number of live subordinate devices.
    pub fn device_count(&self) -> usize {
        self.shared.subordinates.lock().len()
    }
}

impl Drop for GpsdMaster {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

async fn read_loop<R: AsyncBufRead + Unpin>(mut reader: R, shared: Arc<Shared>) {
    let mut line = Vec::with_capacity(128);
    let mut lines_read: u64 = 0;
    // Set while skipping the rest of an oversized line.
    let mut discarding = false;

    loop {
        line.clear();
        let read = (&mut reader)
            .take(MAX_LINE_LEN as u64)
            .read_until(b'\n', &mut line)
            .await;

        match read {
            Ok(0) => {
                info!("gpsd connection closed");
                break;
            }
            Ok(len) if len == MAX_LINE_LEN && !line.ends_with(b"\n") => {
                if !discarding {
                    debug!(limit = MAX_LINE_LEN, "Discarding oversized gpsd line");
                }
                discarding = true;
            }
            Ok(_) if discarding => {
                discarding = false;
            }
            Ok(_) => {
                lines_read += 1;
                shared.dispatch(&line);
            }
            Err(e) => {
                warn!(error = %e, "gpsd read error");
                break;
            }
        }
    }

    shared.connected.store(false, Ordering::Release);
    info!(lines_read, "gpsd reader stopped");
}

/// Subordinate device fed by a [`GpsdMaster`].
#[derive(Debug)]
pub struct GpsdDevice {
    id: u64,
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
    peeked: Option<Vec<u8>>,
}

impl LineSource for GpsdDevice {
    fn can_read_line(&mut self) -> bool {
        if self.peeked.is_none() {
            self.peeked = self.rx.try_recv().ok();
        }
        self.peeked.is_some()
    }

    fn read_line(&mut self) -> Option<Vec<u8>> {
        self.peeked.take().or_else(|| self.rx.try_recv().ok())
    }
}

impl DeviceFactory for GpsdMaster {
    type Device = GpsdDevice;

    fn create_device(&mut self) -> Result<GpsdDevice, SourceError> {
        if !self.is_connected() {
            return Err(SourceError::DeviceUnavailable(
                "gpsd connection closed".to_string(),
            ));
        }

        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.shared
            .subordinates
            .lock()
            .insert(id, Subordinate { paused: true, tx });
        debug!(id, "gpsd device created");

        Ok(GpsdDevice {
            id,
            rx,
            peeked: None,
        })
    }

    fn resume_device(&mut self, device: &mut GpsdDevice) {
        if let Some(subordinate) = self.shared.subordinates.lock().get_mut(&device.id) {
            subordinate.paused = false;
        }
    }

    fn pause_device(&mut self, device: &mut GpsdDevice) {
        if let Some(subordinate) = self.shared.subordinates.lock().get_mut(&device.id) {
            subordinate.paused = true;
        }
    }

    fn destroy_device(&mut self, device: GpsdDevice) {
        self.shared.subordinates.lock().remove(&device.id);
        debug!(id = device.id, "gpsd device destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const GSV: &[u8] = b"$GPGSV,1,1,02,01,40,083,46,02,17,308,41*7D\r\n";

    async fn wait_disconnected(master: &GpsdMaster) {
        for _ in 0..100 {
            if !master.is_connected() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("reader did not observe EOF");
    }

    #[tokio::test]
    async fn test_resumed_device_receives_lines() {
        let (mut client, server) = tokio::io::duplex(1024);
        let readable = Arc::new(Notify::new());
        let mut master = GpsdMaster::from_reader(server, Arc::clone(&readable));

        let mut device = master.create_device().unwrap();
        master.resume_device(&mut device);

        client.write_all(GSV).await.unwrap();
        tokio::time::timeout(Duration::from_secs(5), readable.notified())
            .await
            .expect("readiness notification");

        assert!(device.can_read_line());
        assert_eq!(device.read_line().as_deref(), Some(GSV));
        assert!(!device.can_read_line());
    }

    #[tokio::test]
    async fn test_paused_device_receives_nothing() {
        let (mut client, server) = tokio::io::duplex(1024);
        let readable = Arc::new(Notify::new());
        let mut master = GpsdMaster::from_reader(server, readable);

        let mut paused = master.create_device().unwrap();
        let mut resumed = master.create_device().unwrap();
        master.resume_device(&mut resumed);

        client.write_all(GSV).await.unwrap();
        client.write_all(b"{\"class\":\"VERSION\"}\n").await.unwrap();
        drop(client);
        wait_disconnected(&master).await;

        assert!(!paused.can_read_line());
        assert!(resumed.can_read_line());
        resumed.read_line();
        assert!(!resumed.can_read_line(), "JSON output is filtered");
    }

    #[tokio::test]
    async fn test_oversized_line_is_skipped() {
        let (mut client, server) = tokio::io::duplex(1024);
        let readable = Arc::new(Notify::new());
        let mut master = GpsdMaster::from_reader(server, readable);

        let mut device = master.create_device().unwrap();
        master.resume_device(&mut device);

        let mut junk = b"$GPTXT,".to_vec();
        junk.resize(5 * MAX_LINE_LEN, b'x');
        junk.push(b'\n');

        client.write_all(&junk).await.unwrap();
        client.write_all(GSV).await.unwrap();
        drop(client);
        wait_disconnected(&master).await;

        assert_eq!(device.read_line().as_deref(), Some(GSV));
        assert!(!device.can_read_line());
    }

    #[tokio::test]
    async fn test_create_fails_after_disconnect() {
        let mut master = GpsdMaster::from_reader(&b""[..], Arc::new(Notify::new()));
        wait_disconnected(&master).await;

        let err = master.create_device().unwrap_err();
        assert!(matches!(err, SourceError::DeviceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_destroy_detaches_device() {
        let (_client, server) = tokio::io::duplex(64);
        let mut master = GpsdMaster::from_reader(server, Arc::new(Notify::new()));

        let device = master.create_device().unwrap();
        assert_eq!(master.device_count(), 1);
        master.destroy_device(device);
        assert_eq!(master.device_count(), 0);
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = GpsdConfig::new("127.0.0.1", port);
        let result = GpsdMaster::connect(&config, Arc::new(Notify::new())).await;
        assert!(matches!(result, Err(GpsdError::Connect { .. })));
    }

    #[tokio::test]
    async fn test_connect_sends_watch() {
        use tokio::io::AsyncReadExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = GpsdConfig::new("127.0.0.1", listener.local_addr().unwrap().port());

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; WATCH_NMEA.len()];
            socket.read_exact(&mut buf).await.unwrap();
            buf
        });

        let master = GpsdMaster::connect(&config, Arc::new(Notify::new()))
            .await
            .unwrap();
        assert_eq!(server.await.unwrap(), WATCH_NMEA);
        drop(master);
    }
}
