// SPDX-License-Identifier: MPL-2.0
//! Feedback lifecycle domain types.
//!
//! - [`MaxVisible`]: Per-kind cap on concurrently shown items
//! - [`QueueCapacity`]: Bound of the offline action queue

mod newtypes;

pub use newtypes::{max_visible_bounds, queue_capacity_bounds, MaxVisible, QueueCapacity};
