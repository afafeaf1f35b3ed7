//! Enum wrappers for device source dispatch.
//!
//! Native `async fn` in traits (RPITIT, Rust Edition 2024) is not object-safe,
//! so `Box<dyn DeviceSource>` is not available. The enums below give concrete
//! type dispatch instead, which also lets the reader spawn its I/O loop on
//! Tokio: the compiler can see that every concrete future is `Send`.
//!
//! # Examples
//!
//! ```
//! use wedge_hardware::devices::AnyDeviceSource;
//! use wedge_hardware::mock::MockSource;
//!
//! let (source, _handle) = MockSource::new();
//! let any_source = AnyDeviceSource::Mock(source);
//! ```

use std::path::PathBuf;

use crate::file::{FileSource, FileStream};
use crate::mock::{MockSource, MockStream};
use crate::traits::{DeviceSource, DeviceStream};
use crate::{DeviceInfo, Result};

/// Enum wrapper for device source dispatch.
///
/// # Examples
///
/// ```
/// use wedge_hardware::devices::AnyDeviceSource;
/// use wedge_hardware::traits::DeviceSource;
///
/// #[tokio::main]
/// async fn main() -> wedge_hardware::Result<()> {
///     let source = AnyDeviceSource::file("/dev/hidraw0");
///
///     let info = source.get_info().await?;
///     println!("Scanner: {}", info.name);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyDeviceSource {
    /// Filesystem path (hidraw node, FIFO, plain file).
    File(FileSource),

    /// Mock source for development and testing.
    Mock(MockSource),
}

impl AnyDeviceSource {
    /// Convenience constructor for a path-backed source.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(FileSource::new(path))
    }
}

impl From<FileSource> for AnyDeviceSource {
    fn from(source: FileSource) -> Self {
        Self::File(source)
    }
}

impl From<MockSource> for AnyDeviceSource {
    fn from(source: MockSource) -> Self {
        Self::Mock(source)
    }
}

impl DeviceSource for AnyDeviceSource {
    type Stream = AnyDeviceStream;

    fn describe(&self) -> &str {
        match self {
            Self::File(source) => source.describe(),
            Self::Mock(source) => source.describe(),
        }
    }

    async fn exists(&self) -> bool {
        match self {
            Self::File(source) => source.exists().await,
            Self::Mock(source) => source.exists().await,
        }
    }

    async fn open(&self) -> Result<AnyDeviceStream> {
        match self {
            Self::File(source) => source.open().await.map(AnyDeviceStream::File),
            Self::Mock(source) => source.open().await.map(AnyDeviceStream::Mock),
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::File(source) => source.get_info().await,
            Self::Mock(source) => source.get_info().await,
        }
    }
}

/// Enum wrapper for open device streams.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyDeviceStream {
    /// Stream over a filesystem path.
    File(FileStream),

    /// Stream over a mock source.
    Mock(MockStream),
}

impl DeviceStream for AnyDeviceStream {
    async fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self {
            Self::File(stream) => stream.read_chunk(buf).await,
            Self::Mock(stream) => stream.read_chunk(buf).await,
        }
    }
}
