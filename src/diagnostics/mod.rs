// SPDX-License-Identifier: MPL-2.0
//! Diagnostics for the feedback lifecycle.
//!
//! The manager, the offline queue and the loading wrappers report what they
//! do through a [`DiagnosticsHandle`]. Nothing is recorded unless a handle
//! has been attached.

mod buffer;
mod collector;
mod events;

pub use buffer::{BufferCapacity, CircularBuffer};
pub use collector::{DiagnosticReport, DiagnosticsCollector, DiagnosticsHandle, SerializableEvent};
pub use events::{
    DiagnosticEvent, DiagnosticEventKind, ErrorEvent, ErrorType, LifecycleEvent, WarningEvent,
    WarningType,
};

/// Sends a warning to `handle`, or to stderr when no handle is attached.
pub(crate) fn report_warning(handle: Option<&DiagnosticsHandle>, event: WarningEvent) {
    match handle {
        Some(handle) => handle.log_warning(event),
        None => eprintln!("[WARN] {}", event.message),
    }
}

/// Extracts the message of a caught panic.
pub(crate) fn panic_reason(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Sends an error to `handle`, or to stderr when no handle is attached.
pub(crate) fn report_error(handle: Option<&DiagnosticsHandle>, event: ErrorEvent) {
    match handle {
        Some(handle) => handle.log_error(event),
        None => eprintln!("[ERROR] {}", event.message),
    }
}
