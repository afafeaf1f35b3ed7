//! Common test utilities for reader integration tests.
//!
//! Helpers come in two groups:
//!
//! 1. **Setup** (`mock_controller`, `test_config`) builds a controller wired to
//!    a scripted [`MockSource`].
//! 2. **Expectations** (`expect_*`, `assert_no_event`) pull the next event off
//!    an [`EventStream`] and fail with a readable message when it is not what
//!    the test expected.
//!
//! Every wait is bounded by [`EVENT_TIMEOUT`]. Under paused time the bound is
//! virtual and costs nothing.

#![allow(dead_code)]

use std::time::Duration;

use tokio::time::timeout;
use wedge_hardware::mock::{MockSource, MockSourceHandle};
use wedge_reader::{EventStream, IoErrorEvent, ReaderConfig, ReaderEvent, ScanController};

/// Upper bound on how long any helper waits for an event.
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default config with a path that is never opened.
pub fn test_config() -> ReaderConfig {
    ReaderConfig::new("/dev/null/unused")
}

/// Build a controller reading from a fresh mock source.
pub fn mock_controller(config: ReaderConfig) -> (ScanController, MockSourceHandle) {
    let (source, handle) = MockSource::new();
    let controller =
        ScanController::with_source(config, source).expect("test config should be valid");
    (controller, handle)
}

/// Wait for the next event of any kind.
pub async fn next_event(events: &mut EventStream) -> ReaderEvent {
    match timeout(EVENT_TIMEOUT, events.recv()).await {
        Ok(Some(event)) => event,
        Ok(None) => panic!("event stream closed"),
        Err(_) => panic!("no event within {:?}", EVENT_TIMEOUT),
    }
}

/// Wait for the next event and require it to be a scan.
pub async fn expect_barcode(events: &mut EventStream) -> String {
    let event = next_event(events).await;
    match event.barcode() {
        Some(barcode) => barcode.to_string(),
        None => panic!("expected a barcode, got {:?}", event),
    }
}

/// Wait for the next event and require it to be an I/O error.
pub async fn expect_io_error(events: &mut EventStream) -> IoErrorEvent {
    let event = next_event(events).await;
    match event.io_error() {
        Some(error) => error.clone(),
        None => panic!("expected an I/O error, got {:?}", event),
    }
}

/// Assert that nothing is published for `window`.
pub async fn assert_no_event(events: &mut EventStream, window: Duration) {
    if let Ok(event) = timeout(window, events.recv()).await {
        panic!("unexpected event: {:?}", event);
    }
}
