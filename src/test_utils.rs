// SPDX-License-Identifier: MPL-2.0
//! Test utilities shared by the unit tests.
//!
//! Re-exports the `approx` assertion macros for float comparison and builds
//! managers driven by a virtual clock.

use std::sync::Arc;

pub use approx::{assert_abs_diff_eq, assert_relative_eq};

use crate::feedback::{FeedbackManager, ManagerConfig, ManualScheduler};

/// Default epsilon for f32 comparisons.
pub const F32_EPSILON: f32 = 1e-6;

/// Default epsilon for f64 comparisons.
pub const F64_EPSILON: f64 = 1e-10;

/// Returns a manager with default settings and the clock that drives it.
pub fn manual_manager() -> (FeedbackManager, ManualScheduler) {
    manual_manager_with(ManagerConfig::default())
}

pub fn manual_manager_with(config: ManagerConfig) -> (FeedbackManager, ManualScheduler) {
    let scheduler = ManualScheduler::new();
    let manager = FeedbackManager::new(config, Arc::new(scheduler.clone()));
    (manager, scheduler)
}
