//! Notifications emitted by the scan controller.
//!
//! Events are fanned out over a Tokio broadcast channel so any number of
//! consumers can subscribe. A subscriber that falls behind by more than the
//! channel capacity loses the oldest events; [`EventStream::recv`] logs how
//! many were skipped and keeps going.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{trace, warn};
use wedge_core::constants::DEVICE_NOT_FOUND_MESSAGE;
use wedge_hardware::{FailureKind, HardwareError};

/// A completed scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEvent {
    /// Printable characters received since the previous flush, in order.
    pub barcode: String,

    /// When the scan was completed.
    pub timestamp: DateTime<Utc>,
}

impl ScanEvent {
    /// Create a scan event stamped with the current time.
    pub fn new(barcode: impl Into<String>) -> Self {
        Self {
            barcode: barcode.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A device-level failure observed by the I/O loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoErrorEvent {
    /// Human-readable description.
    pub message: String,

    /// Failure classification.
    pub kind: FailureKind,

    /// True when the I/O loop stopped because of this failure.
    pub fatal: bool,

    /// When the failure was observed.
    pub timestamp: DateTime<Utc>,
}

impl IoErrorEvent {
    /// Build the event reported for `error`.
    pub fn from_error(error: &HardwareError) -> Self {
        let kind = error.kind();
        let message = match kind {
            FailureKind::DeviceNotFound => DEVICE_NOT_FOUND_MESSAGE.to_string(),
            _ => error.to_string(),
        };

        Self {
            message,
            kind,
            fatal: kind.is_fatal(),
            timestamp: Utc::now(),
        }
    }
}

/// Unified event from the scan controller.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReaderEvent {
    /// A barcode was completed by a terminator or by inactivity.
    BarcodeScanned(ScanEvent),

    /// The device was absent or failed. The controller keeps running unless
    /// the event is marked fatal.
    IoError(IoErrorEvent),
}

impl ReaderEvent {
    /// Barcode payload if this is a scan.
    pub fn barcode(&self) -> Option<&str> {
        match self {
            Self::BarcodeScanned(scan) => Some(&scan.barcode),
            _ => None,
        }
    }

    /// Error details if this is an I/O error.
    pub fn io_error(&self) -> Option<&IoErrorEvent> {
        match self {
            Self::IoError(error) => Some(error),
            _ => None,
        }
    }
}

/// Sending side shared by the I/O loop and timer callbacks.
#[derive(Debug, Clone)]
pub(crate) struct EventBus {
    tx: broadcast::Sender<ReaderEvent>,
}

impl EventBus {
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub(crate) fn subscribe(&self) -> EventStream {
        EventStream {
            rx: self.tx.subscribe(),
        }
    }

    pub(crate) fn emit_scan(&self, barcode: String) {
        trace!(len = barcode.len(), "Emitting scan");
        self.emit(ReaderEvent::BarcodeScanned(ScanEvent::new(barcode)));
    }

    pub(crate) fn emit_io_error(&self, error: &HardwareError) -> IoErrorEvent {
        let event = IoErrorEvent::from_error(error);
        self.emit(ReaderEvent::IoError(event.clone()));
        event
    }

    fn emit(&self, event: ReaderEvent) {
        // No subscribers is not an error: events are simply not observed.
        if self.tx.send(event).is_err() {
            trace!("No event subscribers");
        }
    }
}

/// Receiving side handed to consumers by
/// [`ScanController::subscribe`](crate::ScanController::subscribe).
#[derive(Debug)]
pub struct EventStream {
    rx: broadcast::Receiver<ReaderEvent>,
}

impl EventStream {
    /// Receive the next event.
    ///
    /// Returns `None` once the controller has been dropped.
    pub async fn recv(&mut self) -> Option<ReaderEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event subscriber lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Receive an already queued event without waiting.
    pub fn try_recv(&mut self) -> Option<ReaderEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event subscriber lagged, events dropped");
                }
                Err(_) => return None,
            }
        }
    }
}
