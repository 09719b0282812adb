// SPDX-License-Identifier: MPL-2.0
//! Selector-based change notification.
//!
//! Subscribers register a selector over [`StoreState`] and a callback. On
//! each published snapshot the selector runs again and the callback fires
//! only when the selected value differs from the previous one.
//!
//! Callbacks run outside of every lock, so they may call back into the
//! manager. Snapshots published from inside a callback are queued and
//! delivered, in order, once the current pass completes. A snapshot older
//! than one already delivered is dropped.
//!
//! A panicking callback is reported as an error and stays subscribed; the
//! other subscribers still receive the snapshot.

use super::store::StoreState;
use crate::diagnostics::{panic_reason, report_error, DiagnosticsHandle, ErrorEvent, ErrorType};
use std::collections::{HashSet, VecDeque};
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::watch;

/// Identifier of a registered subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

trait Listener: Send {
    fn notify(&mut self, state: &StoreState);
}

struct SelectorListener<T, S, C> {
    selector: S,
    last: T,
    callback: C,
}

impl<T, S, C> Listener for SelectorListener<T, S, C>
where
    T: PartialEq + Send,
    S: Fn(&StoreState) -> T + Send,
    C: FnMut(&T) + Send,
{
    fn notify(&mut self, state: &StoreState) {
        let next = (self.selector)(state);
        if next != self.last {
            self.last = next;
            (self.callback)(&self.last);
        }
    }
}

type Slot = (SubscriptionId, Box<dyn Listener>);

#[derive(Default)]
struct RegistryInner {
    slots: Vec<Slot>,
    pending: VecDeque<Arc<StoreState>>,
    /// Ids unsubscribed while their slot was checked out for a pass.
    removed: HashSet<SubscriptionId>,
    notifying: bool,
    last_version: u64,
    next_id: u64,
}

struct Registry {
    inner: Mutex<RegistryInner>,
    watch: watch::Sender<Arc<StoreState>>,
}

impl Registry {
    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.lock();
        if let Some(pos) = inner.slots.iter().position(|(slot_id, _)| *slot_id == id) {
            inner.slots.remove(pos);
            return true;
        }
        if inner.notifying {
            return inner.removed.insert(id);
        }
        false
    }
}

/// Fan-out of store snapshots to selector subscriptions and watch receivers.
#[derive(Clone)]
pub(crate) struct Subscribers {
    registry: Arc<Registry>,
}

impl Subscribers {
    pub(crate) fn new(initial: Arc<StoreState>) -> Self {
        let (watch, _) = watch::channel(initial);
        Self {
            registry: Arc::new(Registry {
                inner: Mutex::new(RegistryInner::default()),
                watch,
            }),
        }
    }

    /// Registers a selector subscription seeded with `current`.
    pub(crate) fn subscribe<T, S, C>(
        &self,
        current: &StoreState,
        selector: S,
        callback: C,
    ) -> Subscription
    where
        T: PartialEq + Send + 'static,
        S: Fn(&StoreState) -> T + Send + 'static,
        C: FnMut(&T) + Send + 'static,
    {
        let last = selector(current);
        let listener = SelectorListener {
            selector,
            last,
            callback,
        };

        let mut inner = self.registry.lock();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.slots.push((id, Box::new(listener)));

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Returns a receiver that always holds the latest snapshot.
    pub(crate) fn watch(&self) -> watch::Receiver<Arc<StoreState>> {
        self.registry.watch.subscribe()
    }

    pub(crate) fn len(&self) -> usize {
        self.registry.lock().slots.len()
    }

    /// Delivers a snapshot to every subscriber.
    pub(crate) fn publish(
        &self,
        state: Arc<StoreState>,
        diagnostics: Option<&DiagnosticsHandle>,
    ) {
        let version = state.version();
        self.registry.watch.send_if_modified(|current| {
            if version > current.version() {
                *current = Arc::clone(&state);
                true
            } else {
                false
            }
        });

        {
            let mut inner = self.registry.lock();
            inner.pending.push_back(state);
            if inner.notifying {
                return;
            }
            inner.notifying = true;
        }

        loop {
            let (state, mut slots) = {
                let mut inner = self.registry.lock();
                let Some(state) = inner.pending.pop_front() else {
                    inner.notifying = false;
                    inner.removed.clear();
                    return;
                };
                if state.version() <= inner.last_version {
                    continue;
                }
                inner.last_version = state.version();
                (state, std::mem::take(&mut inner.slots))
            };

            for (id, listener) in &mut slots {
                let delivered =
                    std::panic::catch_unwind(AssertUnwindSafe(|| listener.notify(&state)));
                if let Err(payload) = delivered {
                    report_error(
                        diagnostics,
                        ErrorEvent::new(
                            ErrorType::SubscriberPanicked,
                            format!(
                                "subscription #{} panicked: {}",
                                id.0,
                                panic_reason(payload.as_ref())
                            ),
                        ),
                    );
                }
            }

            let mut inner = self.registry.lock();
            let removed = std::mem::take(&mut inner.removed);
            slots.retain(|(id, _)| !removed.contains(id));
            let added = std::mem::take(&mut inner.slots);
            slots.extend(added);
            inner.slots = slots;
        }
    }
}

/// Handle returned by `subscribe`; call [`Subscription::unsubscribe`] to stop
/// receiving notifications.
///
/// Dropping the handle keeps the subscription alive.
#[derive(Debug)]
#[must_use = "keep the handle to be able to unsubscribe"]
pub struct Subscription {
    id: SubscriptionId,
    registry: Weak<Registry>,
}

impl Subscription {
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Detaches the subscription. Returns false if it was already gone.
    pub fn unsubscribe(self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.unsubscribe(self.id))
    }
}
