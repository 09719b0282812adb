// SPDX-License-Identifier: MPL-2.0
//! Progress tracking on top of the lifecycle manager.
//!
//! The controller keeps the numeric state of each progress item and mirrors
//! it into the item's `data` under `value`, `max` and `indeterminate`, so
//! presentation code only needs to read the store.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::id::ItemId;
use super::kind::FeedbackKind;
use super::manager::FeedbackManager;
use super::options::{Callback, FeedbackOptions, OptionsPatch};
use super::scheduler::TimerHandle;
use super::store::StoreState;
use crate::config::defaults::{DEFAULT_PROGRESS_COMPLETION_DELAY_MS, DEFAULT_PROGRESS_MAX};
use crate::error::Result;

/// Options for [`ProgressController::show`].
#[derive(Clone)]
pub struct ProgressOptions {
    pub value: f64,
    /// Must be positive; anything else falls back to 100.
    pub max: f64,
    pub indeterminate: bool,
    pub message: Option<String>,
    /// Fires when the value reaches `max` from below.
    pub on_complete: Option<Callback>,
    /// Extra options for the underlying item.
    pub feedback: FeedbackOptions,
}

impl Default for ProgressOptions {
    fn default() -> Self {
        Self {
            value: 0.0,
            max: DEFAULT_PROGRESS_MAX,
            indeterminate: false,
            message: None,
            on_complete: None,
            feedback: FeedbackOptions::default(),
        }
    }
}

impl ProgressOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }

    #[must_use]
    pub fn max(mut self, max: f64) -> Self {
        self.max = max;
        self
    }

    #[must_use]
    pub fn indeterminate(mut self, indeterminate: bool) -> Self {
        self.indeterminate = indeterminate;
        self
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn on_complete(mut self, callback: impl Fn(&ItemId) + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Arc::new(callback));
        self
    }

    #[must_use]
    pub fn feedback(mut self, options: FeedbackOptions) -> Self {
        self.feedback = options;
        self
    }
}

impl fmt::Debug for ProgressOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressOptions")
            .field("value", &self.value)
            .field("max", &self.max)
            .field("indeterminate", &self.indeterminate)
            .field("message", &self.message)
            .field("on_complete", &self.on_complete.is_some())
            .field("feedback", &self.feedback)
            .finish()
    }
}

struct Tracker {
    /// Sequence number of the item this tracker belongs to.
    seq: u64,
    value: f64,
    max: f64,
    indeterminate: bool,
    /// Set once `on_complete` fired for the current crossing.
    completed: bool,
    on_complete: Option<Callback>,
    /// Pending removal scheduled by `complete`.
    removal: Option<TimerHandle>,
}

impl Tracker {
    /// A tracker is live while its own item is resident and not exiting.
    fn is_live(&self, id: &ItemId, state: &StoreState) -> bool {
        state
            .get(id)
            .is_some_and(|item| item.seq() == self.seq && item.is_active())
    }

    fn retire(mut self) {
        if let Some(handle) = self.removal.take() {
            handle.cancel();
        }
    }

    fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return 0.0;
        }
        value.clamp(0.0, self.max)
    }

    /// Stores `value` and returns the callback to fire if it crossed `max`.
    fn set(&mut self, value: f64) -> Option<Callback> {
        self.value = self.clamp(value);
        if self.value < self.max {
            self.completed = false;
            return None;
        }
        if self.completed {
            return None;
        }
        self.completed = true;
        self.on_complete.clone()
    }

    fn patch(&self, extra: OptionsPatch) -> OptionsPatch {
        extra
            .data("value", self.value)
            .data("max", self.max)
            .data("indeterminate", self.indeterminate)
    }
}

fn sanitize_max(max: f64) -> f64 {
    if max.is_finite() && max > 0.0 {
        max
    } else {
        DEFAULT_PROGRESS_MAX
    }
}

/// Drives progress items of a [`FeedbackManager`].
///
/// Cloning yields another handle to the same trackers.
#[derive(Clone)]
pub struct ProgressController {
    manager: FeedbackManager,
    completion_delay: Duration,
    trackers: Arc<Mutex<HashMap<ItemId, Tracker>>>,
}

impl ProgressController {
    #[must_use]
    pub fn new(manager: FeedbackManager) -> Self {
        Self {
            manager,
            completion_delay: Duration::from_millis(DEFAULT_PROGRESS_COMPLETION_DELAY_MS),
            trackers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Sets the pause between [`complete`](Self::complete) and removal.
    #[must_use]
    pub fn with_completion_delay(mut self, delay: Duration) -> Self {
        self.completion_delay = delay;
        self
    }

    /// Locks the trackers, dropping those whose item has left the store,
    /// started exiting or was replaced under the same id.
    fn trackers(&self) -> MutexGuard<'_, HashMap<ItemId, Tracker>> {
        let state = self.manager.snapshot();
        let mut trackers = self.trackers.lock().unwrap_or_else(PoisonError::into_inner);
        let stale: Vec<ItemId> = trackers
            .iter()
            .filter(|(id, tracker)| !tracker.is_live(id, &state))
            .map(|(id, _)| id.clone())
            .collect();
        for id in stale {
            if let Some(tracker) = trackers.remove(&id) {
                tracker.retire();
            }
        }
        trackers
    }

    /// Number of items currently tracked.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.trackers().len()
    }

    /// Adds a progress item.
    ///
    /// Starting at or above `max` counts as already completed:
    /// `on_complete` will not fire until the value drops and rises again.
    ///
    /// # Errors
    ///
    /// Returns the manager's error if the item cannot be added.
    pub fn show(&self, options: ProgressOptions) -> Result<ItemId> {
        let ProgressOptions {
            value,
            max,
            indeterminate,
            message,
            on_complete,
            feedback,
        } = options;

        let mut tracker = Tracker {
            seq: 0,
            value: 0.0,
            max: sanitize_max(max),
            indeterminate,
            completed: false,
            on_complete,
            removal: None,
        };
        tracker.value = tracker.clamp(value);
        tracker.completed = tracker.value >= tracker.max;

        let mut feedback = feedback
            .with_data("value", tracker.value)
            .with_data("max", tracker.max)
            .with_data("indeterminate", tracker.indeterminate);
        if message.is_some() {
            feedback.message = message;
        }

        let id = self.manager.add(FeedbackKind::Progress, feedback)?;
        let Some(seq) = self.manager.get(&id).map(|item| item.seq()) else {
            return Ok(id);
        };
        tracker.seq = seq;
        if let Some(previous) = self.trackers().insert(id.clone(), tracker) {
            previous.retire();
        }
        Ok(id)
    }

    /// Sets the value, clamped to `[0, max]`, and applies `extra` to the
    /// item.
    ///
    /// Returns false if the item is no longer tracked.
    pub fn update(&self, id: &ItemId, value: f64, extra: Option<OptionsPatch>) -> bool {
        self.modify(id, extra.unwrap_or_default(), |tracker| tracker.set(value))
    }

    /// Adds `delta` to the current value.
    pub fn increment(&self, id: &ItemId, delta: f64) -> bool {
        self.modify(id, OptionsPatch::new(), |tracker| {
            let next = tracker.value + delta;
            tracker.set(next)
        })
    }

    pub fn set_indeterminate(&self, id: &ItemId, indeterminate: bool) -> bool {
        self.modify(id, OptionsPatch::new(), |tracker| {
            tracker.indeterminate = indeterminate;
            None
        })
    }

    /// Fills the bar, then removes the item after the completion delay.
    ///
    /// Completing again while the removal is pending keeps the first
    /// deadline.
    pub fn complete(&self, id: &ItemId) -> bool {
        let done = self.modify(id, OptionsPatch::new(), |tracker| {
            tracker.indeterminate = false;
            let max = tracker.max;
            tracker.set(max)
        });
        if !done {
            return false;
        }

        let mut trackers = self.trackers();
        let Some(tracker) = trackers.get_mut(id) else {
            return false;
        };
        if tracker.removal.is_none() {
            tracker.removal = Some(self.schedule_removal(id.clone(), tracker.seq));
        }
        true
    }

    /// Removes the item with `seq` once the completion delay elapses.
    ///
    /// The timer does nothing if `target` was dismissed or now names a
    /// different item.
    fn schedule_removal(&self, target: ItemId, seq: u64) -> TimerHandle {
        let manager = self.manager.downgrade();
        let trackers = Arc::downgrade(&self.trackers);
        self.manager.scheduler().schedule(
            self.completion_delay,
            Box::new(move || {
                let Some(trackers) = trackers.upgrade() else {
                    return;
                };
                {
                    let mut trackers = trackers.lock().unwrap_or_else(PoisonError::into_inner);
                    if !trackers.get(&target).is_some_and(|tracker| tracker.seq == seq) {
                        return;
                    }
                    trackers.remove(&target);
                }
                if let Some(manager) = manager.upgrade() {
                    if manager.get(&target).is_some_and(|item| item.seq() == seq) {
                        manager.remove(&target);
                    }
                }
            }),
        )
    }

    /// Removes the item right away.
    pub fn dismiss(&self, id: &ItemId) -> bool {
        let tracker = self.trackers().remove(id);
        if let Some(tracker) = tracker {
            tracker.retire();
        }
        self.manager.remove(id)
    }

    /// Current value, if the item is tracked.
    #[must_use]
    pub fn value(&self, id: &ItemId) -> Option<f64> {
        self.trackers().get(id).map(|tracker| tracker.value)
    }

    /// Applies `change` to the tracker, mirrors it into the item and fires
    /// `on_complete` if the change crossed `max`.
    fn modify(
        &self,
        id: &ItemId,
        extra: OptionsPatch,
        change: impl FnOnce(&mut Tracker) -> Option<Callback>,
    ) -> bool {
        let (patch, fire) = {
            let mut trackers = self.trackers();
            let Some(tracker) = trackers.get_mut(id) else {
                return false;
            };
            let fire = change(tracker);
            (tracker.patch(extra), fire)
        };

        if !self.manager.update(id, patch) {
            let tracker = self.trackers.lock().unwrap_or_else(PoisonError::into_inner).remove(id);
            if let Some(tracker) = tracker {
                tracker.retire();
            }
            return false;
        }
        if let Some(callback) = fire {
            callback(id);
        }
        true
    }
}

impl fmt::Debug for ProgressController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressController")
            .field("completion_delay", &self.completion_delay)
            .field("tracked", &self.tracked())
            .finish()
    }
}
