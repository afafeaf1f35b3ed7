//! Scan controller: the reader's state machine and I/O loop.
//!
//! # Architecture
//!
//! ```text
//!                 ┌────────────────── lock ──────────────────┐
//! ┌──────────┐    │  ┌────────────┐         ┌──────────────┐ │
//! │ I/O loop │───►│  │ ScanBuffer │◄────────│ DebounceTimer│ │
//! │  task    │    │  └────────────┘  flush  └──────────────┘ │
//! └──────────┘    └──────────────────────┬───────────────────┘
//!                                        │ emit
//!                                        ▼
//!                                  Event channel ──────► subscribers
//! ```
//!
//! The I/O loop and the timer callbacks are the only two execution contexts
//! that touch the buffer. Both go through one mutex that is held only for
//! in-memory bookkeeping, never across an await point. Scan events are sent
//! while the lock is still held so they leave in the same order the flushes
//! happened.
//!
//! # Lifecycle
//!
//! `Idle → Running → Stopping → Idle`. [`ScanController::start`] rejects a
//! second start with [`Error::AlreadyRunning`]; [`ScanController::stop`] on
//! an idle controller does nothing.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};
use wedge_core::{Error, Result, RunState};
use wedge_hardware::{
    AnyDeviceSource, AnyDeviceStream, DeviceSource, DeviceStream, FailureKind, HardwareError,
};

use crate::buffer::ScanBuffer;
use crate::classifier::{ByteClass, classify};
use crate::config::{IoStrategy, ReaderConfig};
use crate::debounce::DebounceTimer;
use crate::events::{EventBus, EventStream};

/// Everything guarded by the scan lock.
#[derive(Debug, Default)]
struct ScanState {
    buffer: ScanBuffer,
    timer: DebounceTimer,
}

/// State shared between the controller, its I/O loop and timer callbacks.
#[derive(Debug)]
struct ScanShared {
    state: Mutex<ScanState>,
    events: EventBus,
    inactivity_timeout: Duration,
}

impl ScanShared {
    fn new(inactivity_timeout: Duration, event_capacity: usize) -> Self {
        Self {
            state: Mutex::new(ScanState::default()),
            events: EventBus::new(event_capacity),
            inactivity_timeout,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ScanState> {
        // Critical sections never panic midway, so a poisoned lock still
        // holds consistent data.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Feed one chunk from the device through the classifier.
    fn process_chunk(self: &Arc<Self>, chunk: &[u8]) {
        for &byte in chunk {
            match classify(byte) {
                ByteClass::Printable => self.accept_printable(byte),
                ByteClass::Terminator => self.flush_on_terminator(),
                ByteClass::Ignorable => trace!(byte, "Ignoring byte"),
            }
        }
    }

    fn accept_printable(self: &Arc<Self>, byte: u8) {
        let weak = Arc::downgrade(self);
        let mut state = self.lock();

        state.buffer.append(char::from(byte));
        state.timer.arm(self.inactivity_timeout, move |generation| {
            if let Some(shared) = weak.upgrade() {
                shared.flush_on_timeout(generation);
            }
        });
    }

    fn flush_on_terminator(&self) {
        let mut state = self.lock();

        let barcode = state.buffer.flush_and_clear();
        state.timer.disarm();

        if !barcode.is_empty() {
            debug!(len = barcode.len(), "Scan completed by terminator");
            self.events.emit_scan(barcode);
        }
    }

    fn flush_on_timeout(&self, generation: u64) {
        let mut state = self.lock();

        if !state.timer.claim(generation) {
            trace!(generation, "Superseded timer fired, ignoring");
            return;
        }

        let barcode = state.buffer.flush_and_clear();
        if !barcode.is_empty() {
            debug!(len = barcode.len(), "Scan completed by inactivity");
            self.events.emit_scan(barcode);
        }
    }

    fn disarm_timer(&self) {
        self.lock().timer.disarm();
    }

    /// Disarm the timer and drop any partial scan. Returns the dropped length.
    fn discard_pending(&self) -> usize {
        let mut state = self.lock();
        state.timer.disarm();
        let discarded = state.buffer.len();
        state.buffer.clear();
        discarded
    }
}

/// Loop parameters copied out of the config at start.
#[derive(Debug, Clone, Copy)]
struct LoopSettings {
    retry_backoff: Duration,
    read_chunk_size: usize,
}

/// How a single open-read session ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    Cancelled,
    EndOfStream { received: usize },
}

/// A launched I/O loop and the token that stops it.
#[derive(Debug)]
struct ActiveRun {
    token: CancellationToken,
    task: JoinHandle<()>,
}

/// Turns a keyboard-wedge byte stream into barcode events.
///
/// # Examples
///
/// ```no_run
/// use wedge_reader::{ReaderConfig, ReaderEvent, ScanController};
///
/// #[tokio::main]
/// async fn main() -> wedge_core::Result<()> {
///     let mut controller = ScanController::new(ReaderConfig::new("/dev/hidraw0"))?;
///     let mut events = controller.subscribe();
///
///     controller.start()?;
///
///     while let Some(event) = events.recv().await {
///         match event {
///             ReaderEvent::BarcodeScanned(scan) => println!("{}", scan.barcode),
///             ReaderEvent::IoError(error) => eprintln!("{}", error.message),
///             _ => {}
///         }
///     }
///
///     controller.stop().await
/// }
/// ```
#[derive(Debug)]
pub struct ScanController {
    config: ReaderConfig,
    source: Arc<AnyDeviceSource>,
    shared: Arc<ScanShared>,
    state: RunState,
    run: Option<ActiveRun>,
}

impl ScanController {
    /// Create a controller reading from `config.device_path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the path is empty or the config is invalid.
    pub fn new(config: ReaderConfig) -> Result<Self> {
        if config.device_path.as_os_str().is_empty() {
            return Err(Error::Config("device_path must not be empty".to_string()));
        }

        let source = AnyDeviceSource::file(config.device_path.clone());
        Self::with_source(config, source)
    }

    /// Create a controller reading from an explicit source.
    ///
    /// `config.device_path` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the config is invalid.
    pub fn with_source(config: ReaderConfig, source: impl Into<AnyDeviceSource>) -> Result<Self> {
        config.validate()?;

        let shared = ScanShared::new(config.inactivity_timeout(), config.event_capacity);

        Ok(Self {
            config,
            source: Arc::new(source.into()),
            shared: Arc::new(shared),
            state: RunState::Idle,
            run: None,
        })
    }

    /// Subscribe to scan and error events.
    ///
    /// Events emitted before subscribing are not replayed.
    pub fn subscribe(&self) -> EventStream {
        self.shared.events.subscribe()
    }

    /// Launch the I/O loop.
    ///
    /// A run that already ended on a fatal device error is reaped first, so
    /// the controller can be restarted without an intervening [`stop`](Self::stop).
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyRunning`] if a loop is running or still stopping.
    /// - [`Error::Runtime`] if called outside a Tokio runtime.
    pub fn start(&mut self) -> Result<()> {
        self.reap_finished_run();

        if self.state.is_active() {
            return Err(Error::AlreadyRunning);
        }
        let next = self.state.transition_to(RunState::Running)?;

        let runtime = Handle::try_current()
            .map_err(|e| Error::Runtime(format!("start() requires a Tokio runtime: {e}")))?;

        self.shared.discard_pending();

        let token = CancellationToken::new();
        let io_loop = run_io_loop(
            Arc::clone(&self.source),
            Arc::clone(&self.shared),
            LoopSettings {
                retry_backoff: self.config.retry_backoff(),
                read_chunk_size: self.config.read_chunk_size,
            },
            token.clone(),
        );

        let task = match self.config.strategy {
            IoStrategy::Cooperative => runtime.spawn(io_loop),
            IoStrategy::DedicatedThread => {
                let driver = runtime.clone();
                runtime.spawn_blocking(move || driver.block_on(io_loop))
            }
        };

        self.run = Some(ActiveRun { token, task });
        self.state = next;

        info!(
            device = %self.source.describe(),
            strategy = %self.config.strategy,
            "Reader started"
        );
        Ok(())
    }

    /// Stop the I/O loop and wait for it to finish.
    ///
    /// Any partial scan is discarded and the inactivity timer is disarmed.
    /// Calling this on an idle controller is a no-op. If a previous call was
    /// interrupted while stopping, this call finishes the job.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStateTransition`] only if the lifecycle was
    /// corrupted, which indicates a bug.
    pub async fn stop(&mut self) -> Result<()> {
        match self.state {
            RunState::Idle => {
                debug!("Stop requested while idle");
                return Ok(());
            }
            RunState::Running => {
                self.state = self.state.transition_to(RunState::Stopping)?;
            }
            RunState::Stopping => {}
        }

        if let Some(run) = self.run.as_mut() {
            run.token.cancel();
            self.shared.disarm_timer();

            match (&mut run.task).await {
                Ok(()) => {}
                Err(e) if e.is_panic() => error!("I/O loop panicked: {}", e),
                Err(e) => warn!("I/O loop did not finish cleanly: {}", e),
            }
        }
        self.run = None;

        let discarded = self.shared.discard_pending();
        if discarded > 0 {
            debug!(discarded, "Dropped partial scan on stop");
        }

        self.state = self.state.transition_to(RunState::Idle)?;
        info!(device = %self.source.describe(), "Reader stopped");
        Ok(())
    }

    /// Current lifecycle state.
    ///
    /// A run that ended on a fatal error stays `Running` until the next
    /// [`start`](Self::start) or [`stop`](Self::stop); use
    /// [`is_running`](Self::is_running) to see whether the loop is alive.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// True while the I/O loop is alive.
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
            && self.run.as_ref().is_some_and(|run| !run.task.is_finished())
    }

    /// Number of characters in the in-progress scan.
    pub fn pending_len(&self) -> usize {
        self.shared.lock().buffer.len()
    }

    /// True while an inactivity flush is scheduled.
    pub fn is_timer_armed(&self) -> bool {
        self.shared.lock().timer.is_armed()
    }

    /// Configuration in use.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Device source in use.
    pub fn source(&self) -> &AnyDeviceSource {
        &self.source
    }

    fn reap_finished_run(&mut self) {
        let finished = self.state == RunState::Running
            && self.run.as_ref().is_some_and(|run| run.task.is_finished());

        if finished {
            debug!("Reaping I/O loop that ended on its own");
            self.run = None;
            self.shared.discard_pending();
            self.state = RunState::Idle;
        }
    }
}

impl Drop for ScanController {
    fn drop(&mut self) {
        if let Some(run) = &self.run {
            run.token.cancel();
        }
    }
}

/// Body of the background I/O loop.
async fn run_io_loop(
    source: Arc<AnyDeviceSource>,
    shared: Arc<ScanShared>,
    settings: LoopSettings,
    token: CancellationToken,
) {
    let device = source.describe().to_string();
    info!(device = %device, "I/O loop started");

    let mut buf = vec![0u8; settings.read_chunk_size];

    while !token.is_cancelled() {
        match read_session(&source, &shared, &token, &mut buf).await {
            Ok(SessionEnd::Cancelled) => break,
            Ok(SessionEnd::EndOfStream { received }) => {
                debug!(device = %device, received, "End of stream, reopening");

                // A path that is permanently at end of data would otherwise
                // be reopened in a tight loop.
                if received == 0 && !sleep_unless_cancelled(&token, settings.retry_backoff).await {
                    break;
                }
            }
            Err(error) => {
                let event = shared.events.emit_io_error(&error);

                if event.fatal {
                    if event.kind == FailureKind::AccessDenied {
                        error!(
                            device = %device,
                            "Access denied: {}. Check permissions on the device", error
                        );
                    } else {
                        error!(device = %device, kind = %event.kind, "Fatal device error: {}", error);
                    }
                    break;
                }

                warn!(
                    device = %device,
                    kind = %event.kind,
                    backoff_ms = settings.retry_backoff.as_millis() as u64,
                    "Device unavailable: {}", error
                );

                if !sleep_unless_cancelled(&token, settings.retry_backoff).await {
                    break;
                }
            }
        }
    }

    info!(device = %device, "I/O loop exited");
}

/// Open the device once and read until end of data, cancellation or failure.
///
/// The stream is dropped, and therefore closed, on every return path.
async fn read_session(
    source: &AnyDeviceSource,
    shared: &Arc<ScanShared>,
    token: &CancellationToken,
    buf: &mut [u8],
) -> std::result::Result<SessionEnd, HardwareError> {
    let mut stream = tokio::select! {
        biased;
        _ = token.cancelled() => return Ok(SessionEnd::Cancelled),
        opened = open_device(source) => opened?,
    };

    let mut received = 0usize;

    loop {
        let n = tokio::select! {
            biased;
            _ = token.cancelled() => return Ok(SessionEnd::Cancelled),
            read = stream.read_chunk(buf) => read?,
        };

        if n == 0 {
            return Ok(SessionEnd::EndOfStream { received });
        }

        received += n;
        trace!(bytes = n, "Chunk read");
        shared.process_chunk(&buf[..n]);
    }
}

async fn open_device(
    source: &AnyDeviceSource,
) -> std::result::Result<AnyDeviceStream, HardwareError> {
    if !source.exists().await {
        return Err(HardwareError::device_not_found(source.describe()));
    }
    source.open().await
}

/// Sleep for `duration`. Returns `false` if cancelled first.
async fn sleep_unless_cancelled(token: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        biased;
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ReaderEvent;
    use wedge_hardware::mock::MockSource;

    fn shared() -> Arc<ScanShared> {
        Arc::new(ScanShared::new(Duration::from_millis(250), 64))
    }

    fn drain(events: &mut EventStream) -> Vec<String> {
        std::iter::from_fn(|| events.try_recv())
            .filter_map(|event| event.barcode().map(str::to_string))
            .collect()
    }

    #[tokio::test]
    async fn test_process_chunk_terminator() {
        let shared = shared();
        let mut events = shared.events.subscribe();

        shared.process_chunk(b"A123\r");

        assert_eq!(drain(&mut events), vec!["A123"]);
        let state = shared.lock();
        assert!(state.buffer.is_empty());
        assert!(!state.timer.is_armed());
    }

    #[tokio::test]
    async fn test_process_chunk_drops_ignorable_bytes() {
        let shared = shared();
        let mut events = shared.events.subscribe();

        shared.process_chunk(b"\x00A\nB\x7fC\x1b\r");

        assert_eq!(drain(&mut events), vec!["ABC"]);
    }

    #[tokio::test]
    async fn test_empty_flush_emits_nothing() {
        let shared = shared();
        let mut events = shared.events.subscribe();

        shared.process_chunk(b"\r\r\r");

        assert!(events.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_printable_arms_timer() {
        let shared = shared();
        shared.process_chunk(b"XY");

        let state = shared.lock();
        assert_eq!(state.buffer.as_str(), "XY");
        assert!(state.timer.is_armed());
    }

    #[tokio::test]
    async fn test_timer_after_terminator_is_noop() {
        let shared = shared();
        let mut events = shared.events.subscribe();

        shared.process_chunk(b"AB");
        let generation = shared.lock().timer.generation();

        shared.flush_on_terminator();
        shared.flush_on_timeout(generation);

        assert_eq!(drain(&mut events), vec!["AB"]);
    }

    #[tokio::test]
    async fn test_terminator_after_timer_is_noop() {
        let shared = shared();
        let mut events = shared.events.subscribe();

        shared.process_chunk(b"AB");
        let generation = shared.lock().timer.generation();

        shared.flush_on_timeout(generation);
        shared.flush_on_terminator();

        assert_eq!(drain(&mut events), vec!["AB"]);
    }

    #[tokio::test]
    async fn test_superseded_timer_does_not_split_scan() {
        let shared = shared();
        let mut events = shared.events.subscribe();

        shared.process_chunk(b"A");
        let stale = shared.lock().timer.generation();
        shared.process_chunk(b"B");

        // The first timer woke up but lost the race to the rearm.
        shared.flush_on_timeout(stale);
        assert!(events.try_recv().is_none());

        shared.process_chunk(b"\r");
        assert_eq!(drain(&mut events), vec!["AB"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_timer_and_terminator_emit_exactly_once() {
        let shared = shared();
        let mut events = shared.events.subscribe();

        for round in 0..200 {
            shared.process_chunk(format!("R{round}").as_bytes());
            let generation = shared.lock().timer.generation();

            let by_timer = {
                let shared = Arc::clone(&shared);
                tokio::spawn(async move { shared.flush_on_timeout(generation) })
            };
            let by_terminator = {
                let shared = Arc::clone(&shared);
                tokio::spawn(async move { shared.process_chunk(b"\r") })
            };
            by_timer.await.unwrap();
            by_terminator.await.unwrap();

            let emitted = drain(&mut events);
            assert_eq!(emitted, vec![format!("R{round}")]);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_inactivity_flush_through_timer() {
        let shared = shared();
        let mut events = shared.events.subscribe();

        shared.process_chunk(b"XY");
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(drain(&mut events), vec!["XY"]);
        let state = shared.lock();
        assert!(state.buffer.is_empty());
        assert!(!state.timer.is_armed());
    }

    #[tokio::test]
    async fn test_discard_pending() {
        let shared = shared();
        shared.process_chunk(b"PARTIAL");

        assert_eq!(shared.discard_pending(), 7);
        let state = shared.lock();
        assert!(state.buffer.is_empty());
        assert!(!state.timer.is_armed());
    }

    #[test]
    fn test_new_requires_device_path() {
        let err = ScanController::new(ReaderConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_with_source_validates_config() {
        let (source, _handle) = MockSource::new();
        let config = ReaderConfig::default().with_read_chunk_size(0);

        assert!(ScanController::with_source(config, source).is_err());
    }

    #[test]
    fn test_start_outside_runtime_fails() {
        let (source, _handle) = MockSource::new();
        let mut controller = ScanController::with_source(ReaderConfig::default(), source).unwrap();

        let err = controller.start().unwrap_err();
        assert!(matches!(err, Error::Runtime(_)));
        assert_eq!(controller.state(), RunState::Idle);
    }

    #[tokio::test]
    async fn test_new_controller_is_idle() {
        let (source, _handle) = MockSource::new();
        let controller = ScanController::with_source(ReaderConfig::default(), source).unwrap();

        assert_eq!(controller.state(), RunState::Idle);
        assert!(!controller.is_running());
        assert_eq!(controller.pending_len(), 0);
        assert!(!controller.is_timer_armed());
        assert_eq!(controller.source().describe(), "Mock Scanner");
    }

    #[tokio::test]
    async fn test_event_variant_from_loop_error() {
        let (source, handle) = MockSource::new();
        handle.set_present(false);

        let shared = shared();
        let mut events = shared.events.subscribe();
        let token = CancellationToken::new();
        let mut buf = [0u8; 8];
        let source = AnyDeviceSource::from(source);

        let err = read_session(&source, &shared, &token, &mut buf)
            .await
            .unwrap_err();
        shared.events.emit_io_error(&err);

        match events.try_recv() {
            Some(ReaderEvent::IoError(event)) => assert_eq!(event.message, "device not found"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_read_session_stops_on_cancel() {
        let (source, handle) = MockSource::new();
        let source = AnyDeviceSource::from(source);
        let shared = shared();
        let token = CancellationToken::new();
        let mut buf = [0u8; 8];

        token.cancel();
        let end = read_session(&source, &shared, &token, &mut buf).await.unwrap();

        assert_eq!(end, SessionEnd::Cancelled);
        assert_eq!(handle.open_streams(), 0);
    }
}
