// SPDX-License-Identifier: MPL-2.0
//! Feedback lifecycle newtypes.
//!
//! These wrappers keep caps and capacities inside sane bounds so the
//! lifecycle manager and the offline queue never have to re-validate them.

// =============================================================================
// Max Visible Bounds
// =============================================================================

/// Bounds for the per-kind visibility cap.
pub mod max_visible_bounds {
    /// At least one item of every kind can be shown.
    pub const MIN: usize = 1;
    /// Upper bound on concurrently shown items of one kind.
    pub const MAX: usize = 100;
    /// Cap used for kinds without an explicit entry.
    pub const DEFAULT: usize = 5;
}

// =============================================================================
// MaxVisible
// =============================================================================

/// Maximum number of items of one kind that may be `entering` or `visible`
/// at the same time.
///
/// # Example
///
/// ```
/// use feedback_kit::domain::feedback::MaxVisible;
///
/// assert_eq!(MaxVisible::new(3).value(), 3);
/// assert_eq!(MaxVisible::new(0).value(), 1); // Clamped to min
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaxVisible(usize);

impl MaxVisible {
    /// Creates a cap, clamping to the valid range.
    #[must_use]
    pub fn new(value: usize) -> Self {
        Self(value.clamp(max_visible_bounds::MIN, max_visible_bounds::MAX))
    }

    /// Returns the cap.
    #[must_use]
    pub fn value(self) -> usize {
        self.0
    }

    /// Returns true if `active` items already fill the cap.
    #[must_use]
    pub fn is_reached_by(self, active: usize) -> bool {
        active >= self.0
    }
}

impl Default for MaxVisible {
    fn default() -> Self {
        Self(max_visible_bounds::DEFAULT)
    }
}

// =============================================================================
// Queue Capacity Bounds
// =============================================================================

/// Bounds for the offline action queue.
pub mod queue_capacity_bounds {
    /// Minimum queue size.
    pub const MIN: usize = 1;
    /// Maximum queue size.
    pub const MAX: usize = 10_000;
    /// Default queue size.
    pub const DEFAULT: usize = 100;
}

// =============================================================================
// QueueCapacity
// =============================================================================

/// Capacity of the offline action queue (1–10000, default 100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueCapacity(usize);

impl QueueCapacity {
    /// Creates a capacity, clamping to the valid range.
    #[must_use]
    pub fn new(value: usize) -> Self {
        Self(value.clamp(queue_capacity_bounds::MIN, queue_capacity_bounds::MAX))
    }

    /// Returns the capacity.
    #[must_use]
    pub fn value(self) -> usize {
        self.0
    }
}

impl Default for QueueCapacity {
    fn default() -> Self {
        Self(queue_capacity_bounds::DEFAULT)
    }
}

// =============================================================================
// Tests
// =============================================================================
