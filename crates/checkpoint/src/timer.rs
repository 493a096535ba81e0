//! Owned, cancellable timer handles.

use std::future::Future;

use tokio::task::JoinHandle;

/// Stamp carried by every event a timer emits.
///
/// Bumped on each cancel, so an event already queued by an aborted
/// timer no longer matches and is dropped by the receiver.
pub type Generation = u64;

/// Holds at most one spawned timer task.
#[derive(Debug, Default)]
pub struct TimerSlot {
    handle: Option<JoinHandle<()>>,
    generation: Generation,
}

impl TimerSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel whatever is pending, then spawn the future built by `make`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm<F, Fut>(&mut self, make: F) -> Generation
    where
        F: FnOnce(Generation) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let generation = self.generation;
        self.handle = Some(tokio::spawn(make(generation)));
        generation
    }

    /// Abort the pending timer, if any. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.generation += 1;
    }

    /// Whether `generation` belongs to the timer currently armed.
    pub fn is_current(&self, generation: Generation) -> bool {
        self.handle.is_some() && generation == self.generation
    }

    /// Accept a one-shot firing: true (and the slot is cleared) only for the live generation.
    pub fn take_fired(&mut self, generation: Generation) -> bool {
        if self.is_current(generation) {
            self.handle = None;
            true
        } else {
            false
        }
    }

    /// Whether a timer is armed and not yet accepted.
    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
