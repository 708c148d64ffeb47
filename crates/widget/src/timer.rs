//! Cancellable banner reset timer.

use std::time::Duration;

use tokio::task::JoinHandle;

/// One pending delayed callback at a time.
///
/// Scheduling again replaces the pending callback. Each schedule gets a new
/// generation number, passed to the callback; [`ResetTimer::take_fired`]
/// only accepts the latest one, so a callback that fired just before being
/// replaced is ignored. The task is aborted when the timer is dropped.
#[derive(Debug)]
pub struct ResetTimer {
    delay: Duration,
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl ResetTimer {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            handle: None,
        }
    }

    /// Run `fire` after the delay, replacing anything pending.
    ///
    /// Must be called from within a tokio runtime. Returns the generation
    /// handed to `fire`.
    pub fn schedule<F>(&mut self, fire: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.cancel();
        let generation = self.generation;
        // Deadline is fixed here, not when the task is first polled.
        let sleep = tokio::time::sleep(self.delay);
        self.handle = Some(tokio::spawn(async move {
            sleep.await;
            fire(generation);
        }));
        generation
    }

    /// Drop the pending callback, if any.
    pub fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Accept a firing. Returns `false` for stale generations.
    pub fn take_fired(&mut self, generation: u64) -> bool {
        if self.handle.is_some() && generation == self.generation {
            self.handle = None;
            true
        } else {
            false
        }
    }

    /// Whether a callback is scheduled and not yet accepted.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for ResetTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
