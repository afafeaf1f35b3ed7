//! `wedge`: print barcodes read from a keyboard-wedge scanner.
//!
//! ```text
//! wedge --device /dev/hidraw0
//! RUST_LOG=wedge_reader=debug wedge --config scanner.json --strategy thread
//! ```

mod cli;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use wedge_hardware::DeviceSource;
use wedge_reader::{ReaderEvent, ScanController};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = cli.reader_config()?;

    info!(
        version = wedge_core::VERSION,
        device = %config.device_path.display(),
        timeout_ms = config.inactivity_timeout_ms,
        strategy = %config.strategy,
        "Starting wedge"
    );

    let mut controller = ScanController::new(config)?;
    match controller.source().get_info().await {
        Ok(info) => info!(name = %info.name, model = %info.model, "Using device"),
        Err(e) => warn!("Could not describe device: {}", e),
    }

    let mut events = controller.subscribe();
    controller.start()?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break;
            }
            event = events.recv() => match event {
                Some(ReaderEvent::BarcodeScanned(scan)) => println!("{}", scan.barcode),
                Some(ReaderEvent::IoError(io_error)) if io_error.fatal => {
                    error!(kind = %io_error.kind, "{}", io_error.message);
                    break;
                }
                Some(ReaderEvent::IoError(io_error)) => {
                    warn!(kind = %io_error.kind, "{}", io_error.message);
                }
                Some(_) => {}
                None => break,
            },
        }
    }

    controller.stop().await?;
    Ok(())
}
