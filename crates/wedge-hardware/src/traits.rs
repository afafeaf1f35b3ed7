//! Device source trait definitions.
//!
//! A keyboard-wedge scanner is consumed as an unframed byte stream behind a
//! path: it may be absent, it may disappear mid-read, and it may come back.
//! These traits capture exactly that contract so the reader core never
//! touches the filesystem directly.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::DeviceInfo;

/// An open byte stream from a device.
///
/// Dropping the stream closes the underlying handle.
pub trait DeviceStream: Send {
    /// Read the next available chunk into `buf`.
    ///
    /// Returns the number of bytes written. `Ok(0)` means end of data: the
    /// device went away or the stream was closed on the other side, and the
    /// caller should reopen the source.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails. Use
    /// [`HardwareError::kind`](crate::HardwareError::kind) to decide whether
    /// to retry.
    async fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize>;
}

/// A device that can be (re)opened as a byte stream.
///
/// # Object Safety and Dynamic Dispatch
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// `impl Future`. Use generic parameters, or the enum wrapper
/// [`AnyDeviceSource`](crate::devices::AnyDeviceSource) when the concrete
/// source is chosen at runtime.
///
/// # Examples
///
/// ```no_run
/// use wedge_hardware::traits::{DeviceSource, DeviceStream};
/// use wedge_hardware::error::Result;
///
/// async fn dump<S: DeviceSource>(source: &S) -> Result<Vec<u8>> {
///     let mut stream = source.open().await?;
///     let mut buf = [0u8; 24];
///     let mut out = Vec::new();
///
///     loop {
///         let n = stream.read_chunk(&mut buf).await?;
///         if n == 0 {
///             break;
///         }
///         out.extend_from_slice(&buf[..n]);
///     }
///
///     Ok(out)
/// }
/// ```
pub trait DeviceSource: Send + Sync {
    /// Stream type produced by [`open`](DeviceSource::open).
    type Stream: DeviceStream;

    /// Human-readable identifier used in logs and error messages.
    fn describe(&self) -> &str;

    /// Check whether the device is currently present.
    ///
    /// This is a cheap pre-check; [`open`](DeviceSource::open) may still fail.
    async fn exists(&self) -> bool;

    /// Open a new read stream.
    ///
    /// The stream must not lock the device exclusively: other processes may
    /// keep reading it concurrently.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The device does not exist
    /// - The process lacks permission to read it
    /// - Any other I/O error occurs
    async fn open(&self) -> Result<Self::Stream>;

    /// Get device information.
    ///
    /// # Errors
    ///
    /// Returns an error if the device metadata cannot be queried.
    async fn get_info(&self) -> Result<DeviceInfo>;
}
