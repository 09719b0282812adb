// SPDX-License-Identifier: MPL-2.0
//! Drag state management
//!
//! Turns raw pointer samples into an offset, a velocity and a direction,
//! and tells committed drags apart from taps. Timestamps are passed in by
//! the caller so the machine stays deterministic.

use std::fmt;
use std::time::Instant;

use crate::config::defaults::DEFAULT_DRAG_THRESHOLD_PX;

/// A position or a 2D vector, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis along which the gesture is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    X,
    #[default]
    Y,
    Both,
}

impl Axis {
    fn project(self, vector: Point) -> Point {
        match self {
            Axis::X => Point::new(vector.x, 0.0),
            Axis::Y => Point::new(0.0, vector.y),
            Axis::Both => vector,
        }
    }

    /// Clamps the tracked components of `vector` to `bounds`.
    fn clamp(self, vector: Point, bounds: Bounds) -> Point {
        match self {
            Axis::X => Point::new(bounds.clamp(vector.x), vector.y),
            Axis::Y => Point::new(vector.x, bounds.clamp(vector.y)),
            Axis::Both => Point::new(bounds.clamp(vector.x), bounds.clamp(vector.y)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    #[default]
    None,
}

impl Direction {
    /// Direction of `velocity`, using its dominant component.
    fn of(velocity: Point) -> Self {
        if velocity.x == 0.0 && velocity.y == 0.0 {
            return Direction::None;
        }
        if velocity.y.abs() >= velocity.x.abs() {
            if velocity.y < 0.0 {
                Direction::Up
            } else {
                Direction::Down
            }
        } else if velocity.x < 0.0 {
            Direction::Left
        } else {
            Direction::Right
        }
    }

    /// Signed component of `vector` along this direction.
    fn component(self, vector: Point) -> f32 {
        match self {
            Direction::Up => -vector.y,
            Direction::Down => vector.y,
            Direction::Left => -vector.x,
            Direction::Right => vector.x,
            Direction::None => vector.x.hypot(vector.y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// Pointer is down but has not moved past the threshold.
    Armed,
    Dragging,
}

/// Observable drag state handed to callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragState {
    /// Whether a drag operation is currently active
    pub is_dragging: bool,
    /// Displacement from the pointer-down position, projected on the axis
    /// and clamped to the bounds.
    pub offset: Point,
    /// Pixels per millisecond between the last two samples.
    pub velocity: Point,
    pub direction: Direction,
}

/// Inclusive clamp range for the tracked offset components.
///
/// Reversed ends are swapped and a NaN end leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f32,
    pub max: f32,
}

impl Bounds {
    /// Creates a range from two ends given in any order.
    #[must_use]
    pub fn new(a: f32, b: f32) -> Self {
        let a = if a.is_nan() { f32::NEG_INFINITY } else { a };
        let b = if b.is_nan() { f32::INFINITY } else { b };
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    fn clamp(self, value: f32) -> f32 {
        let Bounds { min, max } = Bounds::new(self.min, self.max);
        value.clamp(min, max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragConfig {
    pub axis: Axis,
    /// Distance the pointer must exceed before the drag starts.
    pub threshold: f32,
    pub bounds: Option<Bounds>,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            axis: Axis::default(),
            threshold: DEFAULT_DRAG_THRESHOLD_PX,
            bounds: None,
        }
    }
}

/// Drag callback.
pub type DragCallback = Box<dyn FnMut(&DragState) + Send>;

/// Pointer-driven state machine: `Idle → Armed → Dragging → Idle`.
///
/// `on_drag_start` and `on_drag_end` only fire for gestures that crossed
/// the threshold; a tap leaves no trace.
pub struct DragGesture {
    config: DragConfig,
    phase: Phase,
    origin: Point,
    last_sample: Option<(Point, Instant)>,
    state: DragState,
    on_drag_start: Option<DragCallback>,
    on_drag: Option<DragCallback>,
    on_drag_end: Option<DragCallback>,
}

impl DragGesture {
    #[must_use]
    pub fn new(config: DragConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            origin: Point::ORIGIN,
            last_sample: None,
            state: DragState::default(),
            on_drag_start: None,
            on_drag: None,
            on_drag_end: None,
        }
    }

    #[must_use]
    pub fn on_drag_start(mut self, callback: impl FnMut(&DragState) + Send + 'static) -> Self {
        self.on_drag_start = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn on_drag(mut self, callback: impl FnMut(&DragState) + Send + 'static) -> Self {
        self.on_drag = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn on_drag_end(mut self, callback: impl FnMut(&DragState) + Send + 'static) -> Self {
        self.on_drag_end = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn state(&self) -> &DragState {
        &self.state
    }

    #[must_use]
    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    /// Starts tracking a gesture.
    pub fn pointer_down(&mut self, position: Point, at: Instant) {
        self.reset();
        self.phase = Phase::Armed;
        self.origin = position;
        self.last_sample = Some((position, at));
    }

    /// Feeds a pointer sample. Returns true while dragging.
    pub fn pointer_move(&mut self, position: Point, at: Instant) -> bool {
        if self.phase == Phase::Idle {
            return false;
        }
        let raw = self.sample(position, at);

        if self.phase == Phase::Armed {
            if self.distance(raw) <= self.config.threshold {
                return false;
            }
            self.phase = Phase::Dragging;
            self.state.is_dragging = true;
            self.apply_offset(raw);
            if let Some(callback) = self.on_drag_start.as_mut() {
                callback(&self.state);
            }
        } else {
            self.apply_offset(raw);
        }

        if let Some(callback) = self.on_drag.as_mut() {
            callback(&self.state);
        }
        true
    }

    /// Ends the gesture and returns its final state if it was a drag.
    pub fn pointer_up(&mut self, position: Point, at: Instant) -> Option<DragState> {
        if self.phase != Phase::Dragging {
            self.reset();
            return None;
        }

        let raw = self.sample(position, at);
        self.apply_offset(raw);
        let mut finished = self.state;
        finished.is_dragging = false;

        if let Some(callback) = self.on_drag_end.as_mut() {
            callback(&finished);
        }
        self.reset();
        Some(finished)
    }

    /// Abandons the gesture without firing `on_drag_end`.
    pub fn cancel(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.origin = Point::ORIGIN;
        self.last_sample = None;
        self.state = DragState::default();
    }

    /// Updates velocity from the previous sample and returns the projected
    /// displacement from the origin.
    fn sample(&mut self, position: Point, at: Instant) -> Point {
        if let Some((previous, previous_at)) = self.last_sample {
            let elapsed_ms = at.saturating_duration_since(previous_at).as_secs_f32() * 1000.0;
            if elapsed_ms > 0.0 {
                let velocity = Point::new(
                    (position.x - previous.x) / elapsed_ms,
                    (position.y - previous.y) / elapsed_ms,
                );
                self.state.velocity = self.config.axis.project(velocity);
                self.state.direction = Direction::of(self.state.velocity);
            }
        }
        self.last_sample = Some((position, at));

        self.config.axis.project(Point::new(
            position.x - self.origin.x,
            position.y - self.origin.y,
        ))
    }

    fn distance(&self, raw: Point) -> f32 {
        match self.config.axis {
            Axis::X => raw.x.abs(),
            Axis::Y => raw.y.abs(),
            Axis::Both => raw.x.hypot(raw.y),
        }
    }

    fn apply_offset(&mut self, raw: Point) {
        self.state.offset = match self.config.bounds {
            Some(bounds) => self.config.axis.clamp(raw, bounds),
            None => raw,
        };
    }
}

impl Default for DragGesture {
    fn default() -> Self {
        Self::new(DragConfig::default())
    }
}

impl fmt::Debug for DragGesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragGesture")
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// What a released panel should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    Dismiss,
    /// Return to the resting position.
    Snap,
}

/// Decides whether a finished drag dismisses a panel.
///
/// Dismisses when the offset or the velocity along `dismiss_direction`
/// reaches its threshold. [`Direction::None`] accepts any direction.
#[must_use]
pub fn release_decision(
    state: &DragState,
    dismiss_distance: f32,
    flick_velocity: f32,
    dismiss_direction: Direction,
) -> Release {
    let travelled = dismiss_direction.component(state.offset);
    let speed = dismiss_direction.component(state.velocity);
    if travelled >= dismiss_distance || speed >= flick_velocity {
        Release::Dismiss
    } else {
        Release::Snap
    }
}
