//! Core constants for HID keyboard-wedge barcode scanners.
//!
//! Keyboard-wedge scanners have no framing: they emit the payload as a run of
//! keystroke-equivalent bytes and, depending on their programming, finish it
//! with an Enter key press. The constants below pin the byte classes and the
//! default timings the reader uses to reassemble those bytes into barcodes.
//!
//! # Byte Classes
//!
//! | Range | Class | Effect |
//! |-------|-------|--------|
//! | `32..=126` | printable | appended to the in-progress scan |
//! | `13` | terminator | completes the scan immediately |
//! | anything else | ignorable | dropped |
//!
//! # Usage
//!
//! ```
//! use wedge_core::constants::*;
//! use std::time::Duration;
//!
//! assert!((PRINTABLE_MIN..=PRINTABLE_MAX).contains(&b'A'));
//! assert_eq!(CARRIAGE_RETURN, b'\r');
//!
//! let window = Duration::from_millis(DEFAULT_INACTIVITY_TIMEOUT_MS);
//! assert_eq!(window, Duration::from_millis(250));
//! ```
//!
//! # Scanner Compatibility
//!
//! The printable range and the terminator byte match what wedge scanners send
//! in their factory "USB keyboard" mode. Changing them breaks compatibility
//! with scanners already deployed.

// ============================================================================
// Byte Classes
// ============================================================================

/// Carriage return (Enter key) terminating a scan.
pub const CARRIAGE_RETURN: u8 = 13;

/// Lowest printable ASCII byte (space).
pub const PRINTABLE_MIN: u8 = 32;

/// Highest printable ASCII byte (`~`).
///
/// DEL (127) is deliberately outside the range.
pub const PRINTABLE_MAX: u8 = 126;

// ============================================================================
// Timing
// ============================================================================

/// Default inactivity window in milliseconds.
///
/// A scan without a terminator is considered complete once no printable byte
/// has arrived for this long. Wedge scanners emit a whole payload within a few
/// milliseconds, so 250ms leaves ample room while still feeling instant.
///
/// # Examples
///
/// ```
/// use wedge_core::constants::DEFAULT_INACTIVITY_TIMEOUT_MS;
/// use std::time::Duration;
///
/// let window = Duration::from_millis(DEFAULT_INACTIVITY_TIMEOUT_MS);
/// assert_eq!(window.as_millis(), 250);
/// ```
pub const DEFAULT_INACTIVITY_TIMEOUT_MS: u64 = 250;

/// Default delay between retries after a transient device error (milliseconds).
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 1000;

// ============================================================================
// Buffers
// ============================================================================

/// Default number of bytes requested per device read.
///
/// Wedge devices deliver a handful of bytes per report, so a small chunk keeps
/// latency low without starving the reader.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 24;

/// Initial capacity of the scan buffer.
///
/// Large enough for EAN-13, UPC-A and most Code 128 labels without
/// reallocating. The buffer still grows for longer payloads.
pub const DEFAULT_BUFFER_CAPACITY: usize = 26;

/// Default capacity of the event broadcast channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

// ============================================================================
// Messages
// ============================================================================

/// Message reported when the device path is absent.
pub const DEVICE_NOT_FOUND_MESSAGE: &str = "device not found";
