//! Keyboard-wedge barcode reader.
//!
//! A USB barcode scanner in keyboard-wedge mode presents itself as a HID
//! keyboard and "types" each barcode as a burst of keystrokes, usually
//! followed by a carriage return. This crate reads that raw byte stream from
//! a device node, groups the printable characters into barcodes and
//! publishes them as events.
//!
//! A scan ends in one of two ways:
//!
//! - a carriage return (byte 13) arrives, or
//! - no printable byte arrives for the inactivity timeout (250 ms by default),
//!   for scanners configured without a suffix.
//!
//! The device is reopened automatically when it disappears, reaches end of
//! data or a read fails. An access-denied error, or any failure that is not
//! an I/O failure, ends the I/O loop until the next start.
//!
//! # Examples
//!
//! ```no_run
//! use std::time::Duration;
//! use wedge_reader::{ReaderConfig, ScanController};
//!
//! #[tokio::main]
//! async fn main() -> wedge_core::Result<()> {
//!     let config = ReaderConfig::new("/dev/hidraw0")
//!         .with_inactivity_timeout(Duration::from_millis(150));
//!
//!     let mut controller = ScanController::new(config)?;
//!     let mut events = controller.subscribe();
//!     controller.start()?;
//!
//!     if let Some(event) = events.recv().await {
//!         if let Some(barcode) = event.barcode() {
//!             println!("scanned {barcode}");
//!         }
//!     }
//!
//!     controller.stop().await
//! }
//! ```

pub mod buffer;
pub mod classifier;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod events;

pub use buffer::ScanBuffer;
pub use classifier::{ByteClass, classify};
pub use config::{IoStrategy, ReaderConfig};
pub use controller::ScanController;
pub use debounce::DebounceTimer;
pub use events::{EventStream, IoErrorEvent, ReaderEvent, ScanEvent};

pub use wedge_core::{Error, Result, RunState};
