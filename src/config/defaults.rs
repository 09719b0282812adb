// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! # Categories
//!
//! - **Lifecycle**: Animation delays, display durations, visibility caps
//! - **Progress**: Completion delay before auto-removal
//! - **Offline**: Action queue size, health check timeout
//! - **Gesture**: Drag threshold and release thresholds

use std::time::Duration;

use crate::domain::feedback::{max_visible_bounds, queue_capacity_bounds};
use crate::feedback::FeedbackKind;

// ==========================================================================
// Lifecycle Defaults
// ==========================================================================

/// Delay between `entering` and `visible`.
pub const DEFAULT_ENTER_ANIMATION_MS: u64 = 200;

/// Delay between `exiting` and deletion.
pub const DEFAULT_EXIT_ANIMATION_MS: u64 = 150;

/// Upper bound accepted for either animation delay.
pub const MAX_ANIMATION_MS: u64 = 10_000;

/// How long a toast stays visible before auto-dismissal.
pub const DEFAULT_TOAST_DURATION_MS: u64 = 4_000;

/// Cap for stacking surfaces (toast, loading, progress).
pub const DEFAULT_MAX_VISIBLE_STACKED: usize = 5;

/// Cap for inline surfaces (alert, banner).
pub const DEFAULT_MAX_VISIBLE_INLINE: usize = 3;

/// Cap for single-instance surfaces (dialogs, panels, results).
pub const DEFAULT_MAX_VISIBLE_SINGLE: usize = 1;

/// Cap for skeleton placeholders, which are usually shown in bulk.
pub const DEFAULT_MAX_VISIBLE_SKELETON: usize = 50;

/// Returns the built-in visibility cap for `kind`.
#[must_use]
pub fn default_max_visible(kind: FeedbackKind) -> usize {
    match kind {
        FeedbackKind::Toast | FeedbackKind::Loading | FeedbackKind::Progress => {
            DEFAULT_MAX_VISIBLE_STACKED
        }
        FeedbackKind::Alert | FeedbackKind::Banner => DEFAULT_MAX_VISIBLE_INLINE,
        FeedbackKind::Skeleton => DEFAULT_MAX_VISIBLE_SKELETON,
        FeedbackKind::Modal
        | FeedbackKind::Confirm
        | FeedbackKind::Drawer
        | FeedbackKind::Popconfirm
        | FeedbackKind::Sheet
        | FeedbackKind::Prompt
        | FeedbackKind::Result => DEFAULT_MAX_VISIBLE_SINGLE,
    }
}

/// Returns the built-in display duration for `kind`.
///
/// Only toasts dismiss themselves; everything else persists until removed.
#[must_use]
pub fn default_duration(kind: FeedbackKind) -> Duration {
    match kind {
        FeedbackKind::Toast => Duration::from_millis(DEFAULT_TOAST_DURATION_MS),
        _ => Duration::ZERO,
    }
}

// ==========================================================================
// Progress Defaults
// ==========================================================================

/// Delay between `complete` and removal of a progress item.
pub const DEFAULT_PROGRESS_COMPLETION_DELAY_MS: u64 = 500;

/// Default `max` of a progress item.
pub const DEFAULT_PROGRESS_MAX: f64 = 100.0;

// ==========================================================================
// Offline Defaults
// ==========================================================================

/// Default number of actions held while offline.
pub const DEFAULT_MAX_QUEUE_SIZE: usize = queue_capacity_bounds::DEFAULT;

/// Default timeout of a connectivity probe (in seconds).
pub const DEFAULT_HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

/// Minimum health check timeout (in seconds).
pub const MIN_HEALTH_CHECK_TIMEOUT_SECS: u64 = 1;

/// Maximum health check timeout (in seconds).
pub const MAX_HEALTH_CHECK_TIMEOUT_SECS: u64 = 60;

// ==========================================================================
// Gesture Defaults
// ==========================================================================

/// Movement (in pixels) a pointer must exceed before a drag starts.
pub const DEFAULT_DRAG_THRESHOLD_PX: f32 = 10.0;

/// Release velocity (px/ms) that dismisses a panel regardless of distance.
pub const DEFAULT_DISMISS_VELOCITY: f32 = 0.5;

/// Release distance (px) that dismisses a panel.
pub const DEFAULT_DISMISS_DISTANCE_PX: f32 = 100.0;

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    // Lifecycle validation
    assert!(DEFAULT_ENTER_ANIMATION_MS <= MAX_ANIMATION_MS);
    assert!(DEFAULT_EXIT_ANIMATION_MS <= MAX_ANIMATION_MS);
    assert!(DEFAULT_TOAST_DURATION_MS > 0);

    // Cap validation
    assert!(DEFAULT_MAX_VISIBLE_SINGLE >= max_visible_bounds::MIN);
    assert!(DEFAULT_MAX_VISIBLE_INLINE >= DEFAULT_MAX_VISIBLE_SINGLE);
    assert!(DEFAULT_MAX_VISIBLE_STACKED >= DEFAULT_MAX_VISIBLE_INLINE);
    assert!(DEFAULT_MAX_VISIBLE_SKELETON <= max_visible_bounds::MAX);

    // Offline validation
    assert!(DEFAULT_MAX_QUEUE_SIZE >= queue_capacity_bounds::MIN);
    assert!(DEFAULT_MAX_QUEUE_SIZE <= queue_capacity_bounds::MAX);
    assert!(MIN_HEALTH_CHECK_TIMEOUT_SECS > 0);
    assert!(DEFAULT_HEALTH_CHECK_TIMEOUT_SECS >= MIN_HEALTH_CHECK_TIMEOUT_SECS);
    assert!(DEFAULT_HEALTH_CHECK_TIMEOUT_SECS <= MAX_HEALTH_CHECK_TIMEOUT_SECS);

    // Gesture validation
    assert!(DEFAULT_DRAG_THRESHOLD_PX >= 0.0);
    assert!(DEFAULT_DISMISS_VELOCITY > 0.0);
    assert!(DEFAULT_DISMISS_DISTANCE_PX > DEFAULT_DRAG_THRESHOLD_PX);

    // Progress validation
    assert!(DEFAULT_PROGRESS_MAX > 0.0);
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn animation_defaults_are_valid() {
        assert_eq!(DEFAULT_ENTER_ANIMATION_MS, 200);
        assert_eq!(DEFAULT_EXIT_ANIMATION_MS, 150);
    }

    #[test]
    fn only_toasts_auto_dismiss() {
        for kind in FeedbackKind::ALL {
            let duration = default_duration(kind);
            if kind == FeedbackKind::Toast {
                assert_eq!(duration, Duration::from_millis(4_000));
            } else {
                assert_eq!(duration, Duration::ZERO, "{kind} should persist");
            }
        }
    }

    #[test]
    fn caps_are_within_bounds() {
        for kind in FeedbackKind::ALL {
            let cap = default_max_visible(kind);
            assert!(cap >= max_visible_bounds::MIN);
            assert!(cap <= max_visible_bounds::MAX);
        }
        assert_eq!(default_max_visible(FeedbackKind::Modal), 1);
        assert_eq!(default_max_visible(FeedbackKind::Toast), 5);
    }

    #[test]
    fn offline_defaults_are_valid() {
        assert_eq!(DEFAULT_MAX_QUEUE_SIZE, 100);
        assert_eq!(DEFAULT_HEALTH_CHECK_TIMEOUT_SECS, 5);
    }

    #[test]
    fn progress_completion_delay_is_half_a_second() {
        assert_eq!(DEFAULT_PROGRESS_COMPLETION_DELAY_MS, 500);
    }
}
