//! Mock scanner source for testing and development.
//!
//! The mock behaves like a device path that can appear, vanish, refuse to
//! open, and deliver scripted reports. Reports are queued through a
//! [`MockSourceHandle`] and consumed by whichever stream is currently open,
//! so a reconnecting reader sees one continuous script.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::{
    HardwareError, Result,
    traits::{DeviceSource, DeviceStream},
    types::DeviceInfo,
};

/// A scripted item delivered to the open stream.
#[derive(Debug, Clone, PartialEq, Eq)]
enum MockReport {
    Data(Vec<u8>),
    EndOfStream,
    Failure(io::ErrorKind),
    Fault(String),
}

#[derive(Debug)]
struct MockShared {
    present: AtomicBool,
    open_failures: Mutex<VecDeque<io::ErrorKind>>,
    reports: tokio::sync::Mutex<mpsc::Receiver<MockReport>>,
    open_count: AtomicUsize,
    open_streams: AtomicUsize,
}

/// Mock scanner device source.
///
/// # Examples
///
/// ```
/// use wedge_hardware::mock::MockSource;
/// use wedge_hardware::traits::{DeviceSource, DeviceStream};
///
/// #[tokio::main]
/// async fn main() -> wedge_hardware::Result<()> {
///     let (source, handle) = MockSource::new();
///
///     handle.send_line("A123").await?;
///
///     let mut stream = source.open().await?;
///     let mut buf = [0u8; 24];
///     let n = stream.read_chunk(&mut buf).await?;
///
///     assert_eq!(&buf[..n], b"A123\r");
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MockSource {
    name: String,
    shared: Arc<MockShared>,
}

impl MockSource {
    /// Create a present mock source with the default name.
    ///
    /// Returns a tuple of (MockSource, MockSourceHandle) where the handle
    /// scripts what the source does.
    pub fn new() -> (Self, MockSourceHandle) {
        Self::with_name("Mock Scanner".to_string())
    }

    /// Create a present mock source with a custom name.
    pub fn with_name(name: String) -> (Self, MockSourceHandle) {
        let (report_tx, report_rx) = mpsc::channel(32);

        let shared = Arc::new(MockShared {
            present: AtomicBool::new(true),
            open_failures: Mutex::new(VecDeque::new()),
            reports: tokio::sync::Mutex::new(report_rx),
            open_count: AtomicUsize::new(0),
            open_streams: AtomicUsize::new(0),
        });

        let source = Self {
            name,
            shared: Arc::clone(&shared),
        };
        let handle = MockSourceHandle { report_tx, shared };

        (source, handle)
    }
}

impl DeviceSource for MockSource {
    type Stream = MockStream;

    fn describe(&self) -> &str {
        &self.name
    }

    async fn exists(&self) -> bool {
        self.shared.present.load(Ordering::SeqCst)
    }

    async fn open(&self) -> Result<MockStream> {
        if !self.shared.present.load(Ordering::SeqCst) {
            return Err(HardwareError::device_not_found(&self.name));
        }

        let failure = self
            .shared
            .open_failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        if let Some(kind) = failure {
            return Err(HardwareError::from_io(
                &self.name,
                io::Error::new(kind, "mock open failure"),
            ));
        }

        self.shared.open_count.fetch_add(1, Ordering::SeqCst);
        self.shared.open_streams.fetch_add(1, Ordering::SeqCst);

        Ok(MockStream {
            name: self.name.clone(),
            shared: Arc::clone(&self.shared),
            pending: Vec::new(),
        })
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Mock Scanner v1.0").with_firmware_version("1.0.0"))
    }
}

/// Stream returned by [`MockSource::open`].
///
/// Reports larger than the caller's buffer are handed out across several
/// reads, like a real device would.
#[derive(Debug)]
pub struct MockStream {
    name: String,
    shared: Arc<MockShared>,
    pending: Vec<u8>,
}

impl DeviceStream for MockStream {
    async fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.pending.is_empty() {
            let report = self.shared.reports.lock().await.recv().await;

            match report {
                Some(MockReport::Data(bytes)) => self.pending = bytes,
                Some(MockReport::EndOfStream) => return Ok(0),
                Some(MockReport::Failure(kind)) => {
                    return Err(HardwareError::Io(io::Error::new(kind, "mock read failure")));
                }
                Some(MockReport::Fault(message)) => return Err(HardwareError::other(message)),
                None => return Err(HardwareError::disconnected(&self.name)),
            }
        }

        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }
}

impl Drop for MockStream {
    fn drop(&mut self) {
        self.shared.open_streams.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Handle for controlling a mock source.
///
/// It can be cloned and shared across tasks. Dropping every handle makes the
/// open stream report a disconnection.
#[derive(Debug, Clone)]
pub struct MockSourceHandle {
    report_tx: mpsc::Sender<MockReport>,
    shared: Arc<MockShared>,
}

impl MockSourceHandle {
    async fn send_report(&self, report: MockReport) -> Result<()> {
        self.report_tx
            .send(report)
            .await
            .map_err(|_| HardwareError::disconnected("Mock report channel closed"))
    }

    /// Deliver `bytes` as one report. Empty slices are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the source has been dropped and the channel is closed.
    pub async fn send_bytes(&self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.send_report(MockReport::Data(bytes.to_vec())).await
    }

    /// Deliver each byte of `text` as its own report, like a scanner typing
    /// key by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the source has been dropped and the channel is closed.
    pub async fn send_keystrokes(&self, text: &str) -> Result<()> {
        for &byte in text.as_bytes() {
            self.send_report(MockReport::Data(vec![byte])).await?;
        }
        Ok(())
    }

    /// Deliver `text` followed by a carriage return as one report.
    ///
    /// # Errors
    ///
    /// Returns an error if the source has been dropped and the channel is closed.
    pub async fn send_line(&self, text: &str) -> Result<()> {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(b'\r');
        self.send_report(MockReport::Data(bytes)).await
    }

    /// Make the open stream report end of data.
    ///
    /// # Errors
    ///
    /// Returns an error if the source has been dropped and the channel is closed.
    pub async fn send_end_of_stream(&self) -> Result<()> {
        self.send_report(MockReport::EndOfStream).await
    }

    /// Make the open stream fail its next read with `kind`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source has been dropped and the channel is closed.
    pub async fn send_read_failure(&self, kind: io::ErrorKind) -> Result<()> {
        self.send_report(MockReport::Failure(kind)).await
    }

    /// Make the open stream fail its next read with an error that is not
    /// an I/O failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the source has been dropped and the channel is closed.
    pub async fn send_fault(&self, message: &str) -> Result<()> {
        self.send_report(MockReport::Fault(message.to_string())).await
    }

    /// Simulate the device path appearing or disappearing.
    pub fn set_present(&self, present: bool) {
        self.shared.present.store(present, Ordering::SeqCst);
    }

    /// Unplug the device: the path disappears and the open stream ends.
    ///
    /// # Errors
    ///
    /// Returns an error if the source has been dropped and the channel is closed.
    pub async fn unplug(&self) -> Result<()> {
        self.set_present(false);
        self.send_end_of_stream().await
    }

    /// Make the next call to `open` fail with `kind`.
    pub fn fail_next_open(&self, kind: io::ErrorKind) {
        self.shared
            .open_failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(kind);
    }

    /// Number of successful opens so far.
    pub fn open_count(&self) -> usize {
        self.shared.open_count.load(Ordering::SeqCst)
    }

    /// Number of streams currently open.
    pub fn open_streams(&self) -> usize {
        self.shared.open_streams.load(Ordering::SeqCst)
    }
}
