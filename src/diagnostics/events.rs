// SPDX-License-Identifier: MPL-2.0
//! Diagnostic event types for feedback lifecycle tracking.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::feedback::{FeedbackKind, ItemId, Status};

/// Lifecycle transitions recorded by the feedback manager.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// An item was admitted to the store.
    Added { id: ItemId, kind: FeedbackKind },

    /// An item moved forward in its lifecycle.
    StatusChanged { id: ItemId, status: Status },

    /// The oldest active item was forced out to make room.
    Evicted { id: ItemId, kind: FeedbackKind },

    /// An item was deferred because its kind was at capacity.
    Queued { id: ItemId, kind: FeedbackKind },

    /// A deferred item was admitted after space freed up.
    Promoted { id: ItemId, kind: FeedbackKind },

    /// An item left the store (or the deferred queue).
    Removed { id: ItemId },
}

/// Categories of warnings raised by the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningType {
    /// The offline queue dropped its oldest action.
    QueueOverflow,
    /// Persistent storage could not be read or written.
    StorageUnavailable,
    /// A connectivity probe failed.
    HealthCheckFailed,
    /// A loading indicator could not be shown for a wrapped operation.
    IndicatorUnavailable,
    /// Other warning type not covered by specific categories.
    Other,
}

/// Categories of errors raised by the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// A replayed offline action returned an error.
    ActionFailed,
    /// A replayed offline action panicked.
    ActionPanicked,
    /// A subscription callback panicked while a snapshot was delivered.
    SubscriberPanicked,
    /// Other error type not covered by specific categories.
    Other,
}

/// A warning with its category and a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningEvent {
    pub warning_type: WarningType,
    pub message: String,
}

impl WarningEvent {
    #[must_use]
    pub fn new(warning_type: WarningType, message: impl Into<String>) -> Self {
        Self {
            warning_type,
            message: message.into(),
        }
    }
}

/// An error with its category and a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub error_type: ErrorType,
    pub message: String,
}

impl ErrorEvent {
    #[must_use]
    pub fn new(error_type: ErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
        }
    }
}

/// A diagnostic event captured during runtime.
#[derive(Debug, Clone)]
pub struct DiagnosticEvent {
    /// When the event occurred (monotonic clock for duration calculations)
    pub timestamp: Instant,
    /// The type and data of the event
    pub kind: DiagnosticEventKind,
}

impl DiagnosticEvent {
    /// Creates a new diagnostic event with the current timestamp.
    #[must_use]
    pub fn new(kind: DiagnosticEventKind) -> Self {
        Self {
            timestamp: Instant::now(),
            kind,
        }
    }

    /// Creates a new diagnostic event with a specific timestamp.
    #[must_use]
    pub fn with_timestamp(kind: DiagnosticEventKind, timestamp: Instant) -> Self {
        Self { timestamp, kind }
    }
}

/// The type and associated data for a diagnostic event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiagnosticEventKind {
    Lifecycle { event: LifecycleEvent },
    Warning { event: WarningEvent },
    Error { event: ErrorEvent },
}
