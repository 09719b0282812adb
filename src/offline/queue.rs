// SPDX-License-Identifier: MPL-2.0
//! Bounded queue of actions deferred while offline.

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use futures_util::FutureExt;

use crate::diagnostics::{
    panic_reason, report_error, report_warning, CircularBuffer, DiagnosticsHandle, ErrorEvent,
    ErrorType, WarningEvent, WarningType,
};
use crate::domain::feedback::QueueCapacity;

/// Error returned by a queued action.
pub type ActionError = Box<dyn std::error::Error + Send + Sync>;

/// Future produced by a queued action.
pub type ActionFuture = Pin<Box<dyn Future<Output = Result<(), ActionError>> + Send>>;

type Action = Box<dyn FnOnce() -> ActionFuture + Send>;

struct QueuedAction {
    seq: u64,
    queued_at: DateTime<Utc>,
    action: Action,
}

struct QueueInner {
    actions: CircularBuffer<QueuedAction>,
    next_seq: u64,
}

/// Outcome counts of one [`OfflineQueue::process_queue`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessReport {
    pub succeeded: usize,
    pub failed: usize,
    pub panicked: usize,
}

impl ProcessReport {
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.panicked
    }
}

/// FIFO of deferred async actions.
///
/// When full, queuing a new action drops the oldest one. Cloning yields
/// another handle to the same queue.
#[derive(Clone)]
pub struct OfflineQueue {
    inner: Arc<Mutex<QueueInner>>,
    diagnostics: Option<DiagnosticsHandle>,
}

impl OfflineQueue {
    #[must_use]
    pub fn new(capacity: QueueCapacity) -> Self {
        Self {
            inner: Arc::new(Mutex::new(QueueInner {
                actions: CircularBuffer::with_raw_capacity(capacity.value()),
                next_seq: 0,
            })),
            diagnostics: None,
        }
    }

    #[must_use]
    pub fn with_diagnostics(mut self, handle: DiagnosticsHandle) -> Self {
        self.diagnostics = Some(handle);
        self
    }

    fn lock(&self) -> MutexGuard<'_, QueueInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends an action. Returns false if the oldest action was dropped to
    /// make room.
    pub fn queue_action<F, Fut>(&self, action: F) -> bool
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
    {
        let evicted = {
            let mut inner = self.lock();
            let seq = inner.next_seq;
            inner.next_seq += 1;
            inner.actions.push(QueuedAction {
                seq,
                queued_at: Utc::now(),
                action: Box::new(move || -> ActionFuture { Box::pin(action()) }),
            })
        };

        match evicted {
            Some(dropped) => {
                report_warning(
                    self.diagnostics.as_ref(),
                    WarningEvent::new(
                        WarningType::QueueOverflow,
                        format!(
                            "offline queue full, dropped action #{} queued at {}",
                            dropped.seq,
                            dropped.queued_at.to_rfc3339()
                        ),
                    ),
                );
                false
            }
            None => true,
        }
    }

    /// Runs every queued action in order.
    ///
    /// The queue is emptied before the first action runs; actions queued
    /// meanwhile wait for the next call. Errors and panics are logged per
    /// action and never stop the run.
    pub async fn process_queue(&self) -> ProcessReport {
        let pending = self.lock().actions.drain_all();
        let mut report = ProcessReport::default();

        for queued in pending {
            let seq = queued.seq;
            let action = queued.action;
            let future = match std::panic::catch_unwind(AssertUnwindSafe(action)) {
                Ok(future) => future,
                Err(payload) => {
                    self.log_panic(seq, payload.as_ref());
                    report.panicked += 1;
                    continue;
                }
            };

            match AssertUnwindSafe(future).catch_unwind().await {
                Ok(Ok(())) => report.succeeded += 1,
                Ok(Err(err)) => {
                    report_error(
                        self.diagnostics.as_ref(),
                        ErrorEvent::new(
                            ErrorType::ActionFailed,
                            format!("queued action #{seq} failed: {err}"),
                        ),
                    );
                    report.failed += 1;
                }
                Err(payload) => {
                    self.log_panic(seq, payload.as_ref());
                    report.panicked += 1;
                }
            }
        }
        report
    }

    fn log_panic(&self, seq: u64, payload: &(dyn std::any::Any + Send)) {
        let reason = panic_reason(payload);
        report_error(
            self.diagnostics.as_ref(),
            ErrorEvent::new(
                ErrorType::ActionPanicked,
                format!("queued action #{seq} panicked: {reason}"),
            ),
        );
    }

    #[must_use]
    pub fn queue_size(&self) -> usize {
        self.lock().actions.len()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.lock().actions.capacity()
    }

    /// Drops every queued action without running it.
    pub fn clear_queue(&self) {
        self.lock().actions.clear();
    }
}

impl Default for OfflineQueue {
    fn default() -> Self {
        Self::new(QueueCapacity::default())
    }
}

impl fmt::Debug for OfflineQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("OfflineQueue")
            .field("size", &inner.actions.len())
            .field("capacity", &inner.actions.capacity())
            .finish()
    }
}
