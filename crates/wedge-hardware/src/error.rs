//! Error types for device source operations.
//!
//! Every error carries a [`FailureKind`] that tells the reader loop whether
//! the condition is worth retrying or ends the current run.

use std::io;

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur while opening or reading a device source.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// The device path does not exist.
    #[error("Device not found: {device}")]
    DeviceNotFound { device: String },

    /// The process is not allowed to open or read the device.
    #[error("Access denied: {device}")]
    AccessDenied { device: String },

    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

/// How the reader loop should react to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Device path absent. Retried after the backoff interval.
    DeviceNotFound,

    /// Read or open failed mid-session. Retried after the backoff interval.
    IoFailure,

    /// Permission problem. Ends the run.
    AccessDenied,

    /// Anything the reader cannot reason about. Ends the run.
    Unclassified,
}

impl FailureKind {
    /// Whether this failure terminates the current run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::AccessDenied | Self::Unclassified)
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeviceNotFound => write!(f, "DeviceNotFound"),
            Self::IoFailure => write!(f, "IoFailure"),
            Self::AccessDenied => write!(f, "AccessDenied"),
            Self::Unclassified => write!(f, "Unclassified"),
        }
    }
}

impl HardwareError {
    /// Create a new device-not-found error.
    pub fn device_not_found(device: impl Into<String>) -> Self {
        Self::DeviceNotFound {
            device: device.into(),
        }
    }

    /// Create a new access denied error.
    pub fn access_denied(device: impl Into<String>) -> Self {
        Self::AccessDenied {
            device: device.into(),
        }
    }

    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a generic error with custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Convert an I/O error raised while touching `device`.
    ///
    /// `NotFound` and `PermissionDenied` get their dedicated variants so the
    /// caller does not have to inspect the error kind again.
    pub fn from_io(device: impl Into<String>, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::device_not_found(device),
            io::ErrorKind::PermissionDenied => Self::access_denied(device),
            _ => Self::Io(error),
        }
    }

    /// Classify this error for retry decisions.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::DeviceNotFound { .. } => FailureKind::DeviceNotFound,
            Self::AccessDenied { .. } => FailureKind::AccessDenied,
            Self::Disconnected { .. } => FailureKind::IoFailure,
            Self::Io(e) => match e.kind() {
                io::ErrorKind::NotFound => FailureKind::DeviceNotFound,
                io::ErrorKind::PermissionDenied => FailureKind::AccessDenied,
                _ => FailureKind::IoFailure,
            },
            Self::Other(_) => FailureKind::Unclassified,
        }
    }
}
