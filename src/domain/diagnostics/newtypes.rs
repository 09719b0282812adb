// SPDX-License-Identifier: MPL-2.0
//! Diagnostics newtypes.
//!
//! Range-checked wrappers for the diagnostics event log.

// =============================================================================
// Buffer Capacity Bounds
// =============================================================================

/// Event log capacity bounds (100 to 10000 events).
pub mod buffer_capacity_bounds {
    /// Minimum number of retained events.
    pub const MIN: usize = 100;
    /// Maximum number of retained events.
    pub const MAX: usize = 10_000;
    /// Default number of retained events.
    pub const DEFAULT: usize = 1_000;
}

// =============================================================================
// BufferCapacity
// =============================================================================

/// Number of diagnostic events kept before the oldest are overwritten.
///
/// Values outside 100–10000 are clamped on construction.
///
/// # Example
///
/// ```
/// use feedback_kit::domain::diagnostics::BufferCapacity;
///
/// assert_eq!(BufferCapacity::new(250).value(), 250);
/// assert_eq!(BufferCapacity::new(1).value(), 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferCapacity(usize);

impl BufferCapacity {
    /// Creates a capacity, clamping to the valid range.
    #[must_use]
    pub fn new(value: usize) -> Self {
        Self(value.clamp(buffer_capacity_bounds::MIN, buffer_capacity_bounds::MAX))
    }

    /// Returns the number of events.
    #[must_use]
    pub fn value(self) -> usize {
        self.0
    }
}

impl Default for BufferCapacity {
    fn default() -> Self {
        Self(buffer_capacity_bounds::DEFAULT)
    }
}
