use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

pub mod collapse_gesture;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TouchPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// A single-pointer touch event in container coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub pos: Point,
    /// Monotonic time of the event.
    pub timestamp: Duration,
}

impl TouchEvent {
    pub fn new(phase: TouchPhase, pos: impl Into<Point>, timestamp: Duration) -> Self {
        Self {
            phase,
            pos: pos.into(),
            timestamp,
        }
    }
}
