// SPDX-License-Identifier: MPL-2.0
//! Cancellable timers.
//!
//! The lifecycle manager never sleeps itself: it hands delayed work to a
//! [`Scheduler`] and keeps the returned [`TimerHandle`] so it can cancel the
//! work if the item is dismissed early.
//!
//! - [`TokioScheduler`] spawns one sleeping task per timer on a tokio runtime.
//! - [`ManualScheduler`] keeps a virtual clock that only moves when
//!   [`ManualScheduler::advance`] is called, for hosts that drive time from a
//!   UI tick and for deterministic tests.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Work to run once a timer elapses.
pub type TimerTask = Box<dyn FnOnce() + Send + 'static>;

/// Cancellable one-shot timer primitive.
pub trait Scheduler: Send + Sync {
    /// Runs `task` once `delay` has elapsed, unless the handle is cancelled
    /// first.
    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerHandle;
}

/// Handle to a pending timer.
///
/// Dropping the handle does not cancel the timer; call
/// [`TimerHandle::cancel`].
#[must_use = "a timer can only be cancelled through its handle"]
pub struct TimerHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TimerHandle {
    /// Creates a handle that runs `cancel` when cancelled.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Prevents the timer from firing if it has not fired yet.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

// =============================================================================
// TokioScheduler
// =============================================================================

/// Scheduler backed by `tokio::time::sleep`.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    runtime: tokio::runtime::Handle,
}

impl TokioScheduler {
    /// Binds to the runtime the caller is running on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRuntime`] when called outside of a tokio runtime.
    pub fn current() -> Result<Self> {
        tokio::runtime::Handle::try_current()
            .map(Self::with_handle)
            .map_err(|_| Error::NoRuntime)
    }

    /// Binds to an explicit runtime handle.
    #[must_use]
    pub fn with_handle(runtime: tokio::runtime::Handle) -> Self {
        Self { runtime }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerHandle {
        let join = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
        let abort = join.abort_handle();
        TimerHandle::new(move || abort.abort())
    }
}

// =============================================================================
// ManualScheduler
// =============================================================================

#[derive(Default)]
struct ManualClock {
    now: Duration,
    next_seq: u64,
    /// Keyed by (deadline, registration order) so equal deadlines fire FIFO.
    timers: BTreeMap<(Duration, u64), TimerTask>,
}

/// Scheduler with a virtual clock.
///
/// Timers fire only inside [`ManualScheduler::advance`], in deadline order,
/// and on the calling thread. Tasks may schedule further timers; those fire
/// in the same `advance` call if their deadline falls inside the window.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Arc<Mutex<ManualClock>>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ManualClock> {
        self.clock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Time elapsed on the virtual clock.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of timers waiting to fire.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock().timers.len()
    }

    /// Moves the clock forward by `by`, firing every timer that comes due.
    ///
    /// Returns the number of timers fired.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut fired = 0;
        loop {
            let task = {
                let mut clock = self.lock();
                let due = clock
                    .timers
                    .first_key_value()
                    .is_some_and(|((deadline, _), _)| *deadline <= target);
                if !due {
                    clock.now = target;
                    return fired;
                }
                match clock.timers.pop_first() {
                    Some(((deadline, _), task)) => {
                        clock.now = deadline;
                        task
                    }
                    None => continue,
                }
            };
            task();
            fired += 1;
        }
    }

    /// Advances straight to the next deadline, if any.
    pub fn run_next(&self) -> bool {
        let next = self
            .lock()
            .timers
            .first_key_value()
            .map(|((deadline, _), _)| *deadline);
        match next {
            Some(deadline) => {
                let by = deadline.saturating_sub(self.now());
                self.advance(by) > 0
            }
            None => false,
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerHandle {
        let key = {
            let mut clock = self.lock();
            let key = (clock.now + delay, clock.next_seq);
            clock.next_seq += 1;
            clock.timers.insert(key, task);
            key
        };
        let clock = Arc::downgrade(&self.clock);
        TimerHandle::new(move || {
            if let Some(clock) = clock.upgrade() {
                clock
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .timers
                    .remove(&key);
            }
        })
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clock = self.lock();
        f.debug_struct("ManualScheduler")
            .field("now", &clock.now)
            .field("pending", &clock.timers.len())
            .finish()
    }
}
