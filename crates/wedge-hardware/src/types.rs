//! Common types shared across device source implementations.

use serde::{Deserialize, Serialize};

/// Generic device information.
///
/// Contains metadata about a device source such as its name, model and the
/// path it is read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "hidraw0", "Mock Scanner").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// Optional filesystem path the device is read from.
    pub path: Option<String>,

    /// Optional firmware version string.
    pub firmware_version: Option<String>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            path: None,
            firmware_version: None,
        }
    }

    /// Set the device path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the firmware version.
    pub fn with_firmware_version(mut self, firmware_version: impl Into<String>) -> Self {
        self.firmware_version = Some(firmware_version.into());
        self
    }
}
