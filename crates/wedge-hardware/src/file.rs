//! Device source backed by a filesystem path.
//!
//! On Linux a keyboard-wedge scanner is typically exposed as `/dev/hidrawN`
//! or a named pipe fed by a udev helper; both are plain readable paths.
//!
//! On Unix the path is opened with `O_NONBLOCK`. Character devices and FIFOs
//! are then read through the Tokio reactor, so dropping a pending read leaves
//! no system call behind that could consume bytes after the stream is gone.
//! Regular files cannot be polled and are read on the blocking pool; their
//! reads never wait for data.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::debug;

#[cfg(unix)]
use std::io::Read;
#[cfg(unix)]
use tokio::io::unix::AsyncFd;

use crate::error::{HardwareError, Result};
use crate::traits::{DeviceSource, DeviceStream};
use crate::types::DeviceInfo;

#[cfg(windows)]
const FILE_SHARE_READ: u32 = 0x0000_0001;
#[cfg(windows)]
const FILE_SHARE_WRITE: u32 = 0x0000_0002;

/// Device source reading from a path on the local filesystem.
///
/// # Examples
///
/// ```no_run
/// use wedge_hardware::file::FileSource;
/// use wedge_hardware::traits::DeviceSource;
///
/// #[tokio::main]
/// async fn main() -> wedge_hardware::Result<()> {
///     let source = FileSource::new("/dev/hidraw0");
///
///     if source.exists().await {
///         let _stream = source.open().await?;
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    label: String,
}

impl FileSource {
    /// Create a source for `path`. Nothing is opened until [`DeviceSource::open`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path.display().to_string();
        Self { path, label }
    }
}

impl DeviceSource for FileSource {
    type Stream = FileStream;

    fn describe(&self) -> &str {
        &self.label
    }

    async fn exists(&self) -> bool {
        // An indeterminate answer (e.g. unreadable parent directory) is left
        // for open() to report with its real error kind.
        tokio::fs::try_exists(&self.path).await.unwrap_or(true)
    }

    async fn open(&self) -> Result<FileStream> {
        let reader = FileReader::open(&self.path)
            .await
            .map_err(|e| HardwareError::from_io(&self.label, e))?;

        debug!(device = %self.label, polled = reader.is_polled(), "Device stream opened");

        Ok(FileStream {
            reader,
            label: self.label.clone(),
        })
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.label.clone());

        Ok(DeviceInfo::new(name, "HID keyboard wedge").with_path(&self.label))
    }
}

/// How an open path is read.
#[derive(Debug)]
enum FileReader {
    /// Pollable descriptor (character device, FIFO) driven by the reactor.
    #[cfg(unix)]
    Polled(AsyncFd<std::fs::File>),

    /// Regular file, or any path off Unix.
    Blocking(File),
}

impl FileReader {
    #[cfg(unix)]
    async fn open(path: &Path) -> io::Result<Self> {
        use std::os::unix::fs::OpenOptionsExt;

        // Non-blocking also keeps open() on a FIFO from waiting for a writer.
        let file = std::fs::OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)?;

        match AsyncFd::try_new(file) {
            Ok(fd) => Ok(Self::Polled(fd)),
            Err(e) => {
                let (file, error) = e.into_parts();
                // epoll refuses regular files with EPERM.
                if error.kind() == io::ErrorKind::PermissionDenied {
                    Ok(Self::Blocking(File::from_std(file)))
                } else {
                    Err(error)
                }
            }
        }
    }

    #[cfg(not(unix))]
    async fn open(path: &Path) -> io::Result<Self> {
        let mut options = tokio::fs::OpenOptions::new();
        options.read(true);

        #[cfg(windows)]
        options.share_mode(FILE_SHARE_READ | FILE_SHARE_WRITE);

        Ok(Self::Blocking(options.open(path).await?))
    }

    fn is_polled(&self) -> bool {
        match self {
            #[cfg(unix)]
            Self::Polled(_) => true,
            Self::Blocking(_) => false,
        }
    }

    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            #[cfg(unix)]
            Self::Polled(fd) => loop {
                let mut guard = fd.readable().await?;
                match guard.try_io(|inner| {
                    let mut file = inner.get_ref();
                    file.read(buf)
                }) {
                    Ok(result) => return result,
                    Err(_would_block) => continue,
                }
            },
            Self::Blocking(file) => file.read(buf).await,
        }
    }
}

/// Open read stream over a [`FileSource`].
#[derive(Debug)]
pub struct FileStream {
    reader: FileReader,
    label: String,
}

impl DeviceStream for FileStream {
    async fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.reader
            .read(buf)
            .await
            .map_err(|e| HardwareError::from_io(&self.label, e))
    }
}

impl Drop for FileStream {
    fn drop(&mut self) {
        debug!(device = %self.label, "Device stream closed");
    }
}
