//! Single-shot, rearmable inactivity timer.
//!
//! Each arming spawns a Tokio task that sleeps for the window and then runs a
//! callback. Arming again aborts the previous task first, so at most one
//! callback is ever pending.
//!
//! Aborting cannot stop a callback that has already woken up and is waiting
//! for the owner's lock. To close that gap every arming gets a generation
//! number: the callback receives it and must [`claim`](DebounceTimer::claim)
//! it while holding the owner's lock. A callback whose generation was
//! superseded by a rearm, or cancelled by a disarm, fails the claim and must do
//! nothing.

use std::time::Duration;

use tokio::task::AbortHandle;

/// Rearmable one-shot timer.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
/// use wedge_reader::debounce::DebounceTimer;
///
/// #[tokio::main]
/// async fn main() {
///     let timer = Arc::new(Mutex::new(DebounceTimer::new()));
///     let owner = Arc::clone(&timer);
///
///     timer.lock().unwrap().arm(Duration::from_millis(10), move |generation| {
///         if owner.lock().unwrap().claim(generation) {
///             println!("inactivity window elapsed");
///         }
///     });
///
///     tokio::time::sleep(Duration::from_millis(50)).await;
///     assert!(!timer.lock().unwrap().is_armed());
/// }
/// ```
#[derive(Debug, Default)]
pub struct DebounceTimer {
    pending: Option<AbortHandle>,
    generation: u64,
}

impl DebounceTimer {
    /// Create a disarmed timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `on_fire` to run after `delay`, replacing any pending schedule.
    ///
    /// Returns the generation handed to `on_fire`.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn arm<F>(&mut self, delay: Duration, on_fire: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.disarm();

        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire(generation);
        });
        self.pending = Some(task.abort_handle());

        generation
    }

    /// Cancel the pending schedule, if any.
    ///
    /// Returns `true` if a schedule was pending. Idempotent.
    pub fn disarm(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// True while a schedule is pending and has not been claimed.
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Consume the pending schedule on behalf of a firing callback.
    ///
    /// Returns `true` only for the current generation of a still-armed timer.
    /// After a successful claim the timer is disarmed.
    pub fn claim(&mut self, generation: u64) -> bool {
        if self.pending.is_some() && self.generation == generation {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Generation of the most recent arming.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        self.disarm();
    }
}
