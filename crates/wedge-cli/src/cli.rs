//! Command-line arguments and config resolution.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use wedge_reader::{IoStrategy, ReaderConfig};

#[derive(Debug, Parser)]
#[command(name = "wedge", version, about = "Read barcodes from a keyboard-wedge scanner")]
pub struct Cli {
    /// Device path, e.g. /dev/hidraw0
    #[arg(short, long, env = "WEDGE_DEVICE")]
    pub device: Option<PathBuf>,

    /// Inactivity window that ends a scan without a terminator
    #[arg(long, env = "WEDGE_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Wait between reopen attempts after a device error
    #[arg(long, env = "WEDGE_BACKOFF_MS")]
    pub backoff_ms: Option<u64>,

    /// How the I/O loop is scheduled: `task` or `thread`
    #[arg(long, env = "WEDGE_STRATEGY")]
    pub strategy: Option<IoStrategy>,

    /// JSON config file; flags override its values
    #[arg(short, long, env = "WEDGE_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Merge the config file (if any) with flag overrides.
    pub fn reader_config(&self) -> Result<ReaderConfig> {
        let mut config = match &self.config {
            Some(path) => ReaderConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ReaderConfig::default(),
        };

        if let Some(device) = &self.device {
            config = config.with_device_path(device);
        }
        if let Some(ms) = self.timeout_ms {
            config = config.with_inactivity_timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = self.backoff_ms {
            config = config.with_retry_backoff(Duration::from_millis(ms));
        }
        if let Some(strategy) = self.strategy {
            config = config.with_strategy(strategy);
        }

        if config.device_path.as_os_str().is_empty() {
            bail!("no device path: pass --device or set device_path in the config file");
        }
        config.validate()?;

        Ok(config)
    }
}
