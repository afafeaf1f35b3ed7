//! Device source abstraction layer for keyboard-wedge barcode scanners.
//!
//! This crate defines how the reader core obtains bytes from a scanner: a
//! [`DeviceSource`] names something that can be opened (and reopened) as a
//! [`DeviceStream`] of unframed bytes. Implementations exist for real device
//! paths ([`file::FileSource`]) and for tests ([`mock::MockSource`]).
//!
//! # Design Philosophy
//!
//! - **Async-first**: All I/O operations are asynchronous using native `async fn`
//!   in traits (Rust 1.90 + Edition 2024 RPITIT).
//! - **Enum dispatch**: [`AnyDeviceSource`] selects the concrete source at
//!   runtime without trait objects.
//! - **Thread-safe**: Sources are `Send + Sync` so one can be shared with a
//!   background task across restarts.
//! - **Classified errors**: Every [`HardwareError`] maps to a
//!   [`FailureKind`] that tells the caller whether to retry.
//!
//! # Examples
//!
//! ```no_run
//! use wedge_hardware::traits::{DeviceSource, DeviceStream};
//! use wedge_hardware::file::FileSource;
//!
//! #[tokio::main]
//! async fn main() -> wedge_hardware::Result<()> {
//!     let source = FileSource::new("/dev/hidraw0");
//!     let mut stream = source.open().await?;
//!
//!     let mut buf = [0u8; 24];
//!     let n = stream.read_chunk(&mut buf).await?;
//!     println!("read {} bytes", n);
//!
//!     Ok(())
//! }
//! ```
//!
//! [`DeviceSource`]: traits::DeviceSource
//! [`DeviceStream`]: traits::DeviceStream

pub mod devices;
pub mod error;
pub mod file;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use devices::{AnyDeviceSource, AnyDeviceStream};
pub use error::{FailureKind, HardwareError, Result};
pub use traits::{DeviceSource, DeviceStream};
pub use types::DeviceInfo;
