// SPDX-License-Identifier: MPL-2.0
//! Lifecycle manager for feedback items.
//!
//! The manager owns the item store and drives every status transition:
//!
//! ```text
//! add ──► entering ──(enter_animation)──► visible ──(duration)──► exiting ──(exit_animation)──► deleted
//!                                            │                      ▲
//!                                            └──── remove / evict ──┘
//! ```
//!
//! All operations are synchronous. Delayed transitions go through a
//! [`Scheduler`]; each pending timer carries a token so a timer that fires
//! after being superseded does nothing.
//!
//! Subscribers are notified and `on_open` / `on_close` callbacks run after
//! the manager lock is released, so any of them may call back into the
//! manager.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::watch;

use super::id::ItemId;
use super::item::FeedbackItem;
use super::kind::{FeedbackKind, OverflowPolicy, Status};
use super::options::{Callback, FeedbackOptions, OptionsPatch};
use super::scheduler::{Scheduler, TimerHandle, TokioScheduler};
use super::settings::{ConfigPatch, ManagerConfig};
use super::store::{Store, StoreState};
use super::subscription::{Subscribers, Subscription};
use crate::diagnostics::{DiagnosticsHandle, LifecycleEvent};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    /// `entering` → `visible`
    Enter,
    /// `visible` → `exiting`
    Dismiss,
    /// `exiting` → deleted
    Removal,
}

struct PendingTimer {
    transition: Transition,
    token: u64,
    handle: TimerHandle,
}

/// An item held back by [`OverflowPolicy::Queue`].
struct DeferredItem {
    id: ItemId,
    options: FeedbackOptions,
}

struct Inner {
    store: Store,
    config: ManagerConfig,
    timers: HashMap<ItemId, PendingTimer>,
    deferred: BTreeMap<FeedbackKind, VecDeque<DeferredItem>>,
    next_token: u64,
    next_seq: u64,
    diagnostics: Option<DiagnosticsHandle>,
}

impl Inner {
    fn log(&self, event: LifecycleEvent) {
        if let Some(handle) = &self.diagnostics {
            handle.log_lifecycle(event);
        }
    }

    fn is_known(&self, id: &ItemId) -> bool {
        self.store.state().contains(id) || self.deferred_position(id).is_some()
    }

    fn deferred_position(&self, id: &ItemId) -> Option<(FeedbackKind, usize)> {
        self.deferred.iter().find_map(|(kind, queue)| {
            queue
                .iter()
                .position(|deferred| &deferred.id == id)
                .map(|index| (*kind, index))
        })
    }

    fn take_deferred(&mut self, id: &ItemId) -> Option<DeferredItem> {
        let (kind, index) = self.deferred_position(id)?;
        let queue = self.deferred.get_mut(&kind)?;
        let item = queue.remove(index);
        if queue.is_empty() {
            self.deferred.remove(&kind);
        }
        item
    }

    fn cancel_timer(&mut self, id: &ItemId) {
        if let Some(pending) = self.timers.remove(id) {
            pending.handle.cancel();
        }
    }
}

/// Work collected under the lock and carried out after it is released.
#[derive(Default)]
struct Effects {
    callbacks: Vec<(Callback, ItemId)>,
}

struct Shared {
    self_ref: Weak<Shared>,
    inner: Mutex<Inner>,
    subscribers: Subscribers,
    scheduler: Arc<dyn Scheduler>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` under the lock, then publishes the new snapshot (if the
    /// store changed) and fires the collected callbacks.
    fn with_inner<R>(&self, f: impl FnOnce(&mut Inner, &mut Effects) -> R) -> R {
        let mut effects = Effects::default();
        let (result, changed, diagnostics) = {
            let mut inner = self.lock();
            let before = inner.store.state().version();
            let result = f(&mut inner, &mut effects);
            let changed =
                (inner.store.state().version() != before).then(|| inner.store.snapshot());
            (result, changed, inner.diagnostics.clone())
        };

        if let Some(state) = changed {
            self.subscribers.publish(state, diagnostics.as_ref());
        }
        for (callback, id) in effects.callbacks {
            callback(&id);
        }
        result
    }

    fn schedule(&self, inner: &mut Inner, id: &ItemId, transition: Transition, delay: Duration) {
        let token = inner.next_token;
        inner.next_token += 1;

        let shared = self.self_ref.clone();
        let timer_id = id.clone();
        let handle = self.scheduler.schedule(
            delay,
            Box::new(move || {
                if let Some(shared) = shared.upgrade() {
                    shared.on_timer(&timer_id, transition, token);
                }
            }),
        );

        let pending = PendingTimer {
            transition,
            token,
            handle,
        };
        if let Some(previous) = inner.timers.insert(id.clone(), pending) {
            previous.handle.cancel();
        }
    }

    fn on_timer(&self, id: &ItemId, transition: Transition, token: u64) {
        self.with_inner(|inner, effects| {
            let current = inner
                .timers
                .get(id)
                .is_some_and(|pending| pending.token == token && pending.transition == transition);
            if !current {
                return;
            }
            inner.timers.remove(id);

            match transition {
                Transition::Enter => self.become_visible(inner, id, effects),
                Transition::Dismiss => {
                    if let Some(kind) = inner.store.get(id).map(FeedbackItem::kind) {
                        self.begin_exit(inner, id, effects);
                        self.promote(inner, kind, effects);
                    }
                }
                Transition::Removal => {
                    if inner.store.remove(id).is_some() {
                        inner.log(LifecycleEvent::Removed { id: id.clone() });
                    }
                }
            }
        });
    }

    fn admit(&self, inner: &mut Inner, id: ItemId, kind: FeedbackKind, options: FeedbackOptions) {
        let seq = inner.next_seq;
        inner.next_seq += 1;

        if !inner
            .store
            .add(FeedbackItem::new(id.clone(), kind, options, seq))
        {
            return;
        }
        inner.log(LifecycleEvent::Added {
            id: id.clone(),
            kind,
        });
        let delay = inner.config.enter_animation;
        self.schedule(inner, &id, Transition::Enter, delay);
    }

    fn become_visible(&self, inner: &mut Inner, id: &ItemId, effects: &mut Effects) {
        if !inner.store.set_status(id, Status::Visible) {
            return;
        }
        inner.log(LifecycleEvent::StatusChanged {
            id: id.clone(),
            status: Status::Visible,
        });

        let Some(item) = inner.store.get(id) else {
            return;
        };
        let duration = item.display_duration();
        let on_open = item.options().on_open.clone();

        if !duration.is_zero() {
            self.schedule(inner, id, Transition::Dismiss, duration);
        }
        if let Some(callback) = on_open {
            effects.callbacks.push((callback, id.clone()));
        }
    }

    /// Moves an active item to `exiting` and schedules its deletion.
    ///
    /// Returns false for absent or already exiting items.
    fn begin_exit(&self, inner: &mut Inner, id: &ItemId, effects: &mut Effects) -> bool {
        let on_close = match inner.store.get(id) {
            Some(item) if item.is_active() => item.options().on_close.clone(),
            _ => return false,
        };

        inner.cancel_timer(id);
        if !inner.store.set_status(id, Status::Exiting) {
            return false;
        }
        inner.log(LifecycleEvent::StatusChanged {
            id: id.clone(),
            status: Status::Exiting,
        });

        let delay = inner.config.exit_animation;
        self.schedule(inner, id, Transition::Removal, delay);
        if let Some(callback) = on_close {
            effects.callbacks.push((callback, id.clone()));
        }
        true
    }

    /// Admits deferred items of `kind` while its cap has room.
    fn promote(&self, inner: &mut Inner, kind: FeedbackKind, effects: &mut Effects) {
        loop {
            let cap = inner.config.max_visible_for(kind);
            if cap.is_reached_by(inner.store.state().active_count(kind)) {
                break;
            }
            let Some(next) = inner.deferred.get_mut(&kind).and_then(VecDeque::pop_front) else {
                break;
            };
            inner.log(LifecycleEvent::Promoted {
                id: next.id.clone(),
                kind,
            });
            self.admit(inner, next.id, kind, next.options);
        }

        if inner.deferred.get(&kind).is_some_and(VecDeque::is_empty) {
            inner.deferred.remove(&kind);
        }
    }
}

/// Central registry of feedback items.
///
/// Cloning yields another handle to the same manager.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use feedback_kit::{FeedbackKind, FeedbackManager, FeedbackOptions, ManagerConfig, ManualScheduler, Status};
///
/// let scheduler = ManualScheduler::new();
/// let manager = FeedbackManager::new(ManagerConfig::default(), Arc::new(scheduler.clone()));
///
/// let id = manager.add(FeedbackKind::Toast, FeedbackOptions::message("Saved")).unwrap();
/// assert_eq!(manager.get(&id).map(|item| item.status()), Some(Status::Entering));
///
/// scheduler.advance(Duration::from_millis(200));
/// assert_eq!(manager.get(&id).map(|item| item.status()), Some(Status::Visible));
/// ```
#[derive(Clone)]
pub struct FeedbackManager {
    shared: Arc<Shared>,
}

/// Non-owning handle to a [`FeedbackManager`].
#[derive(Clone)]
pub struct WeakFeedbackManager {
    shared: Weak<Shared>,
}

impl WeakFeedbackManager {
    /// Returns the manager if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<FeedbackManager> {
        self.shared.upgrade().map(|shared| FeedbackManager { shared })
    }
}

impl fmt::Debug for WeakFeedbackManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakFeedbackManager")
            .field("alive", &(self.shared.strong_count() > 0))
            .finish()
    }
}

impl FeedbackManager {
    /// Creates a manager that hands its timers to `scheduler`.
    #[must_use]
    pub fn new(config: ManagerConfig, scheduler: Arc<dyn Scheduler>) -> Self {
        let store = Store::new();
        let subscribers = Subscribers::new(store.snapshot());
        let shared = Arc::new_cyclic(|self_ref| Shared {
            self_ref: self_ref.clone(),
            inner: Mutex::new(Inner {
                store,
                config,
                timers: HashMap::new(),
                deferred: BTreeMap::new(),
                next_token: 0,
                next_seq: 0,
                diagnostics: None,
            }),
            subscribers,
            scheduler,
        });
        Self { shared }
    }

    /// Creates a manager whose timers run on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRuntime`] when called outside a runtime.
    pub fn with_tokio(config: ManagerConfig) -> Result<Self> {
        let scheduler = TokioScheduler::current()?;
        Ok(Self::new(config, Arc::new(scheduler)))
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakFeedbackManager {
        WeakFeedbackManager {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Returns the scheduler driving this manager's timers.
    #[must_use]
    pub fn scheduler(&self) -> Arc<dyn Scheduler> {
        Arc::clone(&self.shared.scheduler)
    }

    /// Sends lifecycle events to `handle` from now on.
    pub fn set_diagnostics(&self, handle: DiagnosticsHandle) {
        self.shared.lock().diagnostics = Some(handle);
    }

    #[must_use]
    pub fn diagnostics(&self) -> Option<DiagnosticsHandle> {
        self.shared.lock().diagnostics.clone()
    }

    /// Creates an item of `kind` and returns its id immediately.
    ///
    /// `options` are merged over the kind's defaults. When the kind is at
    /// its cap, the oldest active item is evicted or the new item is
    /// deferred, depending on the kind's [`OverflowPolicy`]. A deferred item
    /// keeps its id and shows up in the store once promoted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateId`] if `options.id` names an item that is
    /// resident or deferred.
    pub fn add(&self, kind: FeedbackKind, options: FeedbackOptions) -> Result<ItemId> {
        let shared = &self.shared;
        shared.with_inner(|inner, effects| {
            let mut options = inner.config.resolve(kind, options);
            let id = match options.id.take() {
                Some(id) if inner.is_known(&id) => return Err(Error::DuplicateId(id.to_string())),
                Some(id) => id,
                None => ItemId::generate(&inner.config.id_prefix),
            };
            options.id = Some(id.clone());

            let cap = inner.config.max_visible_for(kind);
            match inner.config.overflow_for(kind) {
                OverflowPolicy::Queue => {
                    let waiting = inner.deferred.get(&kind).is_some_and(|q| !q.is_empty());
                    if waiting || cap.is_reached_by(inner.store.state().active_count(kind)) {
                        inner.log(LifecycleEvent::Queued {
                            id: id.clone(),
                            kind,
                        });
                        inner.deferred.entry(kind).or_default().push_back(DeferredItem {
                            id: id.clone(),
                            options,
                        });
                        return Ok(id);
                    }
                }
                OverflowPolicy::EvictOldest => {
                    while cap.is_reached_by(inner.store.state().active_count(kind)) {
                        let Some(oldest) = inner
                            .store
                            .state()
                            .oldest_active(kind)
                            .map(|item| item.id().clone())
                        else {
                            break;
                        };
                        inner.log(LifecycleEvent::Evicted {
                            id: oldest.clone(),
                            kind,
                        });
                        if !shared.begin_exit(inner, &oldest, effects) {
                            break;
                        }
                    }
                }
            }

            shared.admit(inner, id.clone(), kind, options);
            Ok(id)
        })
    }

    /// Patches an item's message, title, variant or data.
    ///
    /// Never touches status or timers. Deferred items are patched too.
    /// Returns false for unknown ids.
    pub fn update(&self, id: &ItemId, patch: OptionsPatch) -> bool {
        self.shared.with_inner(|inner, _| {
            if inner.store.state().contains(id) {
                return inner.store.update(id, patch);
            }
            let Some((kind, index)) = inner.deferred_position(id) else {
                return false;
            };
            match inner
                .deferred
                .get_mut(&kind)
                .and_then(|queue| queue.get_mut(index))
            {
                Some(deferred) => {
                    deferred.options.apply(patch);
                    true
                }
                None => false,
            }
        })
    }

    /// Starts the exit of an `entering` or `visible` item.
    ///
    /// A deferred item is dropped from its queue instead. Returns false if
    /// the item is absent or already exiting.
    pub fn remove(&self, id: &ItemId) -> bool {
        let shared = &self.shared;
        shared.with_inner(|inner, effects| {
            if inner.take_deferred(id).is_some() {
                inner.log(LifecycleEvent::Removed { id: id.clone() });
                return true;
            }
            let Some(kind) = inner.store.get(id).map(FeedbackItem::kind) else {
                return false;
            };
            if !shared.begin_exit(inner, id, effects) {
                return false;
            }
            shared.promote(inner, kind, effects);
            true
        })
    }

    /// Removes every item, or every item of `kind`.
    ///
    /// Active items go through the normal exit path; deferred items are
    /// dropped. Returns how many items were affected.
    pub fn remove_all(&self, kind: Option<FeedbackKind>) -> usize {
        let shared = &self.shared;
        shared.with_inner(|inner, effects| {
            let matches = |candidate: FeedbackKind| kind.is_none_or(|k| k == candidate);

            let mut count = 0;
            let dropped: Vec<FeedbackKind> =
                inner.deferred.keys().copied().filter(|k| matches(*k)).collect();
            for deferred_kind in dropped {
                if let Some(queue) = inner.deferred.remove(&deferred_kind) {
                    for deferred in queue {
                        inner.log(LifecycleEvent::Removed { id: deferred.id });
                        count += 1;
                    }
                }
            }

            let active: Vec<ItemId> = inner
                .store
                .state()
                .iter()
                .filter(|item| item.is_active() && matches(item.kind()))
                .map(|item| item.id().clone())
                .collect();
            for id in active {
                if shared.begin_exit(inner, &id, effects) {
                    count += 1;
                }
            }
            count
        })
    }

    /// Returns a copy of the item, if resident.
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<FeedbackItem> {
        self.shared.lock().store.get(id).cloned()
    }

    /// Returns every resident item in admission order.
    #[must_use]
    pub fn get_all(&self) -> Vec<FeedbackItem> {
        self.shared
            .lock()
            .store
            .state()
            .iter()
            .cloned()
            .collect()
    }

    /// Returns the current store snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<StoreState> {
        self.shared.lock().store.snapshot()
    }

    /// Returns true if `id` is waiting for a free slot.
    #[must_use]
    pub fn is_queued(&self, id: &ItemId) -> bool {
        self.shared.lock().deferred_position(id).is_some()
    }

    /// Number of deferred items of `kind`.
    #[must_use]
    pub fn queued_count(&self, kind: FeedbackKind) -> usize {
        self.shared
            .lock()
            .deferred
            .get(&kind)
            .map_or(0, VecDeque::len)
    }

    #[must_use]
    pub fn config(&self) -> ManagerConfig {
        self.shared.lock().config.clone()
    }

    /// Merges `patch` into the configuration.
    ///
    /// Raised caps promote deferred items right away. Lowered caps only
    /// apply to later admissions.
    pub fn update_config(&self, patch: ConfigPatch) {
        let shared = &self.shared;
        shared.with_inner(|inner, effects| {
            inner.config.apply(patch);
            let waiting: Vec<FeedbackKind> = inner.deferred.keys().copied().collect();
            for kind in waiting {
                shared.promote(inner, kind, effects);
            }
        });
    }

    /// Cancels every timer and drops every item, resident or deferred.
    ///
    /// No `on_close` callbacks fire. The manager stays usable.
    pub fn dispose(&self) {
        self.shared.with_inner(|inner, _| {
            for (_, pending) in inner.timers.drain() {
                pending.handle.cancel();
            }
            inner.deferred.clear();
            inner.store.clear();
        });
    }

    /// Calls `callback` whenever `selector` picks a different value from a
    /// new snapshot.
    pub fn subscribe<T, S, C>(&self, selector: S, callback: C) -> Subscription
    where
        T: PartialEq + Send + 'static,
        S: Fn(&StoreState) -> T + Send + 'static,
        C: FnMut(&T) + Send + 'static,
    {
        let inner = self.shared.lock();
        self.shared
            .subscribers
            .subscribe(inner.store.state(), selector, callback)
    }

    /// Calls `callback` with the store version after every mutation.
    pub fn subscribe_all<C>(&self, mut callback: C) -> Subscription
    where
        C: FnMut(u64) + Send + 'static,
    {
        self.subscribe(StoreState::version, move |version: &u64| callback(*version))
    }

    /// Returns a receiver that always holds the latest snapshot.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Arc<StoreState>> {
        self.shared.subscribers.watch()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.len()
    }
}

impl fmt::Debug for FeedbackManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.lock();
        f.debug_struct("FeedbackManager")
            .field("items", &inner.store.state().len())
            .field("timers", &inner.timers.len())
            .field(
                "deferred",
                &inner.deferred.values().map(VecDeque::len).sum::<usize>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{DiagnosticEventKind, DiagnosticsCollector};
    use crate::feedback::scheduler::ManualScheduler;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ENTER: Duration = Duration::from_millis(200);
    const EXIT: Duration = Duration::from_millis(150);

    fn manager() -> (FeedbackManager, ManualScheduler) {
        let scheduler = ManualScheduler::new();
        let manager = FeedbackManager::new(ManagerConfig::default(), Arc::new(scheduler.clone()));
        (manager, scheduler)
    }

    fn status(manager: &FeedbackManager, id: &ItemId) -> Option<Status> {
        manager.get(id).map(|item| item.status())
    }

    fn counter() -> (Arc<AtomicUsize>, impl Fn(&ItemId) + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        (count, move |_: &ItemId| {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn add_returns_id_of_entering_item() {
        let (manager, _) = manager();
        let id = manager
            .add(FeedbackKind::Toast, FeedbackOptions::message("hi"))
            .expect("add");

        assert!(id.as_str().starts_with("fb_"));
        assert_eq!(status(&manager, &id), Some(Status::Entering));
        assert_eq!(manager.get(&id).and_then(|i| i.message().map(String::from)), Some("hi".into()));
    }

    #[test]
    fn toast_walks_full_lifecycle() {
        let (manager, scheduler) = manager();
        let id = manager
            .add(FeedbackKind::Toast, FeedbackOptions::new())
            .expect("add");

        scheduler.advance(ENTER);
        assert_eq!(status(&manager, &id), Some(Status::Visible));

        scheduler.advance(Duration::from_millis(4_000));
        assert_eq!(status(&manager, &id), Some(Status::Exiting));

        scheduler.advance(EXIT);
        assert_eq!(status(&manager, &id), None);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn zero_duration_never_auto_exits() {
        let (manager, scheduler) = manager();
        let id = manager
            .add(FeedbackKind::Modal, FeedbackOptions::new())
            .expect("add");

        scheduler.advance(Duration::from_secs(3_600));
        assert_eq!(status(&manager, &id), Some(Status::Visible));
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn remove_during_entering_cancels_enter_timer() {
        let (manager, scheduler) = manager();
        let (opened, on_open) = counter();
        let id = manager
            .add(FeedbackKind::Toast, FeedbackOptions::new().on_open(on_open))
            .expect("add");

        assert!(manager.remove(&id));
        assert_eq!(status(&manager, &id), Some(Status::Exiting));

        scheduler.advance(Duration::from_secs(10));
        assert_eq!(status(&manager, &id), None);
        assert_eq!(opened.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn remove_is_idempotent() {
        let (manager, scheduler) = manager();
        let (closed, on_close) = counter();
        let id = manager
            .add(FeedbackKind::Toast, FeedbackOptions::new().on_close(on_close))
            .expect("add");
        scheduler.advance(ENTER);

        assert!(manager.remove(&id));
        assert!(!manager.remove(&id));
        assert!(!manager.remove(&ItemId::from("missing")));
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn duplicate_custom_id_is_rejected() {
        let (manager, _) = manager();
        manager
            .add(FeedbackKind::Toast, FeedbackOptions::new().with_id("same"))
            .expect("first add");
        let second = manager.add(FeedbackKind::Alert, FeedbackOptions::new().with_id("same"));
        assert_eq!(second, Err(Error::DuplicateId("same".to_string())));
    }

    #[test]
    fn custom_id_is_reusable_after_deletion() {
        let (manager, scheduler) = manager();
        let id = manager
            .add(FeedbackKind::Modal, FeedbackOptions::new().with_id("dialog"))
            .expect("add");
        manager.remove(&id);
        scheduler.advance(EXIT);

        assert!(manager
            .add(FeedbackKind::Modal, FeedbackOptions::new().with_id("dialog"))
            .is_ok());
    }

    #[test]
    fn evict_oldest_keeps_cap() {
        let (manager, _) = manager();
        manager.update_config(ConfigPatch::new().max_visible(FeedbackKind::Toast, 2));

        let first = manager.add(FeedbackKind::Toast, FeedbackOptions::new()).expect("add");
        let second = manager.add(FeedbackKind::Toast, FeedbackOptions::new()).expect("add");
        let third = manager.add(FeedbackKind::Toast, FeedbackOptions::new()).expect("add");

        assert_eq!(status(&manager, &first), Some(Status::Exiting));
        assert_eq!(status(&manager, &second), Some(Status::Entering));
        assert_eq!(status(&manager, &third), Some(Status::Entering));
        assert_eq!(manager.snapshot().active_count(FeedbackKind::Toast), 2);
    }

    #[test]
    fn queue_policy_defers_until_slot_frees() {
        let (manager, scheduler) = manager();
        let first = manager.add(FeedbackKind::Modal, FeedbackOptions::new()).expect("add");
        let second = manager.add(FeedbackKind::Modal, FeedbackOptions::new()).expect("add");

        assert!(manager.is_queued(&second));
        assert_eq!(manager.queued_count(FeedbackKind::Modal), 1);
        assert!(manager.get(&second).is_none());

        manager.remove(&first);
        assert!(!manager.is_queued(&second));
        assert_eq!(status(&manager, &second), Some(Status::Entering));

        scheduler.advance(ENTER);
        assert_eq!(status(&manager, &second), Some(Status::Visible));
    }

    #[test]
    fn removing_a_deferred_item_drops_it() {
        let (manager, _) = manager();
        manager.add(FeedbackKind::Drawer, FeedbackOptions::new()).expect("add");
        let waiting = manager.add(FeedbackKind::Drawer, FeedbackOptions::new()).expect("add");

        assert!(manager.remove(&waiting));
        assert!(!manager.is_queued(&waiting));
        assert_eq!(manager.queued_count(FeedbackKind::Drawer), 0);
    }

    #[test]
    fn update_patches_resident_and_deferred_items() {
        let (manager, _) = manager();
        let shown = manager.add(FeedbackKind::Sheet, FeedbackOptions::message("a")).expect("add");
        let waiting = manager.add(FeedbackKind::Sheet, FeedbackOptions::message("b")).expect("add");

        assert!(manager.update(&shown, OptionsPatch::new().message("a2")));
        assert!(manager.update(&waiting, OptionsPatch::new().message("b2")));
        assert!(!manager.update(&ItemId::from("nope"), OptionsPatch::new().message("x")));

        assert_eq!(manager.get(&shown).and_then(|i| i.message().map(String::from)), Some("a2".into()));
        manager.remove(&shown);
        assert_eq!(manager.get(&waiting).and_then(|i| i.message().map(String::from)), Some("b2".into()));
    }

    #[test]
    fn update_does_not_touch_status_or_timers() {
        let (manager, scheduler) = manager();
        let id = manager.add(FeedbackKind::Toast, FeedbackOptions::new()).expect("add");
        let pending = scheduler.pending();

        manager.update(&id, OptionsPatch::new().title("t"));
        assert_eq!(status(&manager, &id), Some(Status::Entering));
        assert_eq!(scheduler.pending(), pending);
    }

    #[test]
    fn remove_all_filters_by_kind() {
        let (manager, _) = manager();
        let toast = manager.add(FeedbackKind::Toast, FeedbackOptions::new()).expect("add");
        let alert = manager.add(FeedbackKind::Alert, FeedbackOptions::new()).expect("add");

        assert_eq!(manager.remove_all(Some(FeedbackKind::Toast)), 1);
        assert_eq!(status(&manager, &toast), Some(Status::Exiting));
        assert_eq!(status(&manager, &alert), Some(Status::Entering));

        assert_eq!(manager.remove_all(None), 1);
        assert_eq!(status(&manager, &alert), Some(Status::Exiting));
    }

    #[test]
    fn remove_all_drops_deferred_without_promoting() {
        let (manager, _) = manager();
        let shown = manager.add(FeedbackKind::Confirm, FeedbackOptions::new()).expect("add");
        let waiting = manager.add(FeedbackKind::Confirm, FeedbackOptions::new()).expect("add");

        assert_eq!(manager.remove_all(None), 2);
        assert_eq!(status(&manager, &shown), Some(Status::Exiting));
        assert!(manager.get(&waiting).is_none());
        assert!(!manager.is_queued(&waiting));
    }

    #[test]
    fn raising_cap_promotes_deferred() {
        let (manager, _) = manager();
        manager.add(FeedbackKind::Prompt, FeedbackOptions::new()).expect("add");
        let waiting = manager.add(FeedbackKind::Prompt, FeedbackOptions::new()).expect("add");

        manager.update_config(ConfigPatch::new().max_visible(FeedbackKind::Prompt, 2));
        assert_eq!(status(&manager, &waiting), Some(Status::Entering));
    }

    #[test]
    fn callbacks_may_reenter_manager() {
        let (manager, scheduler) = manager();
        let reentrant = manager.clone();
        let id = manager
            .add(
                FeedbackKind::Modal,
                FeedbackOptions::new().on_open(move |id| {
                    reentrant.remove(id);
                }),
            )
            .expect("add");

        scheduler.advance(ENTER);
        assert_eq!(status(&manager, &id), Some(Status::Exiting));
    }

    #[test]
    fn on_close_fires_once_on_auto_dismiss() {
        let (manager, scheduler) = manager();
        let (closed, on_close) = counter();
        manager
            .add(
                FeedbackKind::Toast,
                FeedbackOptions::new()
                    .with_duration(Duration::from_millis(50))
                    .on_close(on_close),
            )
            .expect("add");

        scheduler.advance(ENTER + Duration::from_millis(50) + EXIT);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn subscribers_see_each_mutation() {
        let (manager, scheduler) = manager();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _subscription = manager.subscribe(
            |state: &StoreState| state.len(),
            move |len: &usize| sink.lock().expect("lock").push(*len),
        );

        manager.add(FeedbackKind::Toast, FeedbackOptions::new()).expect("add");
        scheduler.advance(ENTER + Duration::from_millis(4_000) + EXIT);

        assert_eq!(*seen.lock().expect("lock"), vec![1, 0]);
    }

    #[test]
    fn subscribe_all_fires_on_every_version() {
        let (manager, scheduler) = manager();
        let versions = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&versions);
        let subscription = manager.subscribe_all(move |v| sink.lock().expect("lock").push(v));

        let id = manager.add(FeedbackKind::Alert, FeedbackOptions::new()).expect("add");
        scheduler.advance(ENTER);
        manager.remove(&id);

        assert_eq!(versions.lock().expect("lock").len(), 3);
        assert_eq!(manager.subscriber_count(), 1);
        assert!(subscription.unsubscribe());
        assert_eq!(manager.subscriber_count(), 0);
    }

    #[test]
    fn dispose_clears_items_and_timers() {
        let (manager, scheduler) = manager();
        manager.add(FeedbackKind::Toast, FeedbackOptions::new()).expect("add");
        manager.add(FeedbackKind::Modal, FeedbackOptions::new()).expect("add");
        manager.add(FeedbackKind::Modal, FeedbackOptions::new()).expect("add");

        manager.dispose();
        assert!(manager.get_all().is_empty());
        assert_eq!(manager.queued_count(FeedbackKind::Modal), 0);
        assert_eq!(scheduler.pending(), 0);

        assert!(manager.add(FeedbackKind::Toast, FeedbackOptions::new()).is_ok());
    }

    #[test]
    fn get_all_is_in_admission_order() {
        let (manager, _) = manager();
        let a = manager.add(FeedbackKind::Toast, FeedbackOptions::new()).expect("add");
        let b = manager.add(FeedbackKind::Alert, FeedbackOptions::new()).expect("add");
        let ids: Vec<ItemId> = manager.get_all().iter().map(|i| i.id().clone()).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn lifecycle_is_reported_to_diagnostics() {
        let (manager, scheduler) = manager();
        let mut collector = DiagnosticsCollector::default();
        manager.set_diagnostics(collector.handle());

        manager.add(FeedbackKind::Toast, FeedbackOptions::new()).expect("add");
        scheduler.advance(ENTER + Duration::from_millis(4_000) + EXIT);
        collector.process_pending();

        let events: Vec<LifecycleEvent> = collector
            .iter()
            .filter_map(|event| match &event.kind {
                DiagnosticEventKind::Lifecycle { event } => Some(event.clone()),
                _ => None,
            })
            .collect();
        assert!(matches!(events.first(), Some(LifecycleEvent::Added { .. })));
        assert!(matches!(events.last(), Some(LifecycleEvent::Removed { .. })));
        assert_eq!(events.len(), 4);
    }

    #[test]
    fn weak_handle_does_not_keep_manager_alive() {
        let (manager, scheduler) = manager();
        let weak = manager.downgrade();
        assert!(weak.upgrade().is_some());

        manager.add(FeedbackKind::Toast, FeedbackOptions::new()).expect("add");
        drop(manager);
        assert!(weak.upgrade().is_none());
        scheduler.advance(Duration::from_secs(10));
    }
}
