//! Byte classification for keyboard-wedge input.

use wedge_core::constants::{CARRIAGE_RETURN, PRINTABLE_MAX, PRINTABLE_MIN};

/// What a single input byte means to the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteClass {
    /// Printable ASCII, part of the barcode payload.
    Printable,

    /// Carriage return, completes the scan.
    Terminator,

    /// Anything else (control bytes, DEL, high bytes). Dropped.
    Ignorable,
}

/// Classify one byte.
///
/// # Examples
///
/// ```
/// use wedge_reader::classifier::{ByteClass, classify};
///
/// assert_eq!(classify(b'A'), ByteClass::Printable);
/// assert_eq!(classify(b'\r'), ByteClass::Terminator);
/// assert_eq!(classify(b'\n'), ByteClass::Ignorable);
/// ```
pub const fn classify(byte: u8) -> ByteClass {
    if byte >= PRINTABLE_MIN && byte <= PRINTABLE_MAX {
        ByteClass::Printable
    } else if byte == CARRIAGE_RETURN {
        ByteClass::Terminator
    } else {
        ByteClass::Ignorable
    }
}
