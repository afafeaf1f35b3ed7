//! Reader configuration.
//!
//! The device path and the inactivity window are the whole external
//! configuration surface; the remaining knobs default to values that suit
//! every wedge scanner seen so far.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use wedge_reader::{IoStrategy, ReaderConfig};
//!
//! let config = ReaderConfig::new("/dev/hidraw0")
//!     .with_inactivity_timeout(Duration::from_millis(150))
//!     .with_strategy(IoStrategy::DedicatedThread);
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.retry_backoff(), Duration::from_millis(1000));
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use wedge_core::constants::{
    DEFAULT_EVENT_CAPACITY, DEFAULT_INACTIVITY_TIMEOUT_MS, DEFAULT_READ_CHUNK_SIZE,
    DEFAULT_RETRY_BACKOFF_MS,
};
use wedge_core::{Error, Result};

/// How the I/O loop is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IoStrategy {
    /// Cooperative Tokio task.
    #[default]
    Cooperative,

    /// Dedicated blocking-pool thread driving the loop to completion.
    DedicatedThread,
}

impl fmt::Display for IoStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cooperative => write!(f, "cooperative"),
            Self::DedicatedThread => write!(f, "dedicated_thread"),
        }
    }
}

impl FromStr for IoStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cooperative" | "task" => Ok(Self::Cooperative),
            "dedicated_thread" | "dedicated-thread" | "thread" => Ok(Self::DedicatedThread),
            other => Err(Error::Config(format!("unknown I/O strategy: {other}"))),
        }
    }
}

/// Configuration for a [`ScanController`](crate::ScanController).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Path of the scanner device.
    pub device_path: PathBuf,

    /// Inactivity window after which a scan without terminator completes.
    pub inactivity_timeout_ms: u64,

    /// Delay between retries after a transient device error.
    pub retry_backoff_ms: u64,

    /// Bytes requested per read.
    pub read_chunk_size: usize,

    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,

    /// Scheduling of the I/O loop.
    pub strategy: IoStrategy,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            device_path: PathBuf::new(),
            inactivity_timeout_ms: DEFAULT_INACTIVITY_TIMEOUT_MS,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            strategy: IoStrategy::default(),
        }
    }
}

impl ReaderConfig {
    /// Default configuration for the device at `device_path`.
    pub fn new(device_path: impl Into<PathBuf>) -> Self {
        Self {
            device_path: device_path.into(),
            ..Self::default()
        }
    }

    /// Parse a JSON document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the document is malformed or the values
    /// fail [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Config(format!("invalid JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, otherwise the errors
    /// of [`from_json`](Self::from_json).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Set the device path.
    pub fn with_device_path(mut self, device_path: impl Into<PathBuf>) -> Self {
        self.device_path = device_path.into();
        self
    }

    /// Set the inactivity window.
    pub fn with_inactivity_timeout(mut self, timeout: Duration) -> Self {
        self.inactivity_timeout_ms = duration_to_ms(timeout);
        self
    }

    /// Set the retry backoff interval.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff_ms = duration_to_ms(backoff);
        self
    }

    /// Set the number of bytes requested per read.
    pub fn with_read_chunk_size(mut self, read_chunk_size: usize) -> Self {
        self.read_chunk_size = read_chunk_size;
        self
    }

    /// Set the event channel capacity.
    pub fn with_event_capacity(mut self, event_capacity: usize) -> Self {
        self.event_capacity = event_capacity;
        self
    }

    /// Set the I/O scheduling strategy.
    pub fn with_strategy(mut self, strategy: IoStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Inactivity window as a [`Duration`].
    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_millis(self.inactivity_timeout_ms)
    }

    /// Retry backoff as a [`Duration`].
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Check the values are usable.
    ///
    /// The device path is not checked here: a controller built around a
    /// custom source does not need one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.inactivity_timeout_ms == 0 {
            return Err(Error::Config(
                "inactivity_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.retry_backoff_ms == 0 {
            return Err(Error::Config(
                "retry_backoff_ms must be greater than zero".to_string(),
            ));
        }
        if self.read_chunk_size == 0 {
            return Err(Error::Config(
                "read_chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(Error::Config(
                "event_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn duration_to_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = ReaderConfig::new("/dev/hidraw0");

        assert_eq!(config.device_path, PathBuf::from("/dev/hidraw0"));
        assert_eq!(config.inactivity_timeout(), Duration::from_millis(250));
        assert_eq!(config.retry_backoff(), Duration::from_millis(1000));
        assert_eq!(config.read_chunk_size, 24);
        assert_eq!(config.strategy, IoStrategy::Cooperative);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_setters() {
        let config = ReaderConfig::default()
            .with_device_path("/dev/hidraw2")
            .with_inactivity_timeout(Duration::from_millis(100))
            .with_retry_backoff(Duration::from_secs(2))
            .with_read_chunk_size(8)
            .with_event_capacity(4)
            .with_strategy(IoStrategy::DedicatedThread);

        assert_eq!(config.device_path, PathBuf::from("/dev/hidraw2"));
        assert_eq!(config.inactivity_timeout_ms, 100);
        assert_eq!(config.retry_backoff_ms, 2000);
        assert_eq!(config.read_chunk_size, 8);
        assert_eq!(config.event_capacity, 4);
        assert_eq!(config.strategy, IoStrategy::DedicatedThread);
    }

    #[rstest]
    #[case(ReaderConfig::default().with_inactivity_timeout(Duration::ZERO), "inactivity_timeout_ms")]
    #[case(ReaderConfig::default().with_retry_backoff(Duration::ZERO), "retry_backoff_ms")]
    #[case(ReaderConfig::default().with_read_chunk_size(0), "read_chunk_size")]
    #[case(ReaderConfig::default().with_event_capacity(0), "event_capacity")]
    fn test_validate_rejects_zero(#[case] config: ReaderConfig, #[case] field: &str) {
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains(field));
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config =
            ReaderConfig::from_json(r#"{"device_path": "/dev/hidraw1", "inactivity_timeout_ms": 300}"#)
                .unwrap();

        assert_eq!(config.device_path, PathBuf::from("/dev/hidraw1"));
        assert_eq!(config.inactivity_timeout_ms, 300);
        assert_eq!(config.retry_backoff_ms, 1000);
    }

    #[test]
    fn test_from_json_strategy() {
        let config = ReaderConfig::from_json(r#"{"strategy": "dedicated_thread"}"#).unwrap();
        assert_eq!(config.strategy, IoStrategy::DedicatedThread);
    }

    #[test]
    fn test_from_json_rejects_invalid_values() {
        assert!(ReaderConfig::from_json(r#"{"read_chunk_size": 0}"#).is_err());
        assert!(ReaderConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, br#"{"device_path": "/dev/hidraw5"}"#).unwrap();

        let config = ReaderConfig::from_file(file.path()).unwrap();
        assert_eq!(config.device_path, PathBuf::from("/dev/hidraw5"));
    }

    #[test]
    fn test_from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = ReaderConfig::from_file(dir.path().join("wedge.json")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[rstest]
    #[case("task", IoStrategy::Cooperative)]
    #[case("cooperative", IoStrategy::Cooperative)]
    #[case("thread", IoStrategy::DedicatedThread)]
    #[case("Dedicated-Thread", IoStrategy::DedicatedThread)]
    fn test_strategy_from_str(#[case] input: &str, #[case] expected: IoStrategy) {
        assert_eq!(input.parse::<IoStrategy>().unwrap(), expected);
    }

    #[test]
    fn test_strategy_from_str_unknown() {
        assert!("fibers".parse::<IoStrategy>().is_err());
    }
}
