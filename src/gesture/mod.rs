// SPDX-License-Identifier: MPL-2.0
//! Pointer gestures for dismissible surfaces.

mod drag;

pub use drag::{
    release_decision, Axis, Bounds, Direction, DragCallback, DragConfig, DragGesture, DragState,
    Phase, Point, Release,
};
