use std::collections::VecDeque;
use std::time::Duration;

use crate::geometry::Point;

/// Only samples this recent relative to the latest one contribute to the velocity.
const HISTORY_LIMIT: Duration = Duration::from_millis(100);

/// Estimates pointer velocity during a drag.
#[derive(Debug)]
pub struct VelocityTracker {
    history: VecDeque<Sample>,
    active: bool,
    /// Pixels per this many milliseconds.
    units: f64,
    maximum_minor_velocity: f64,
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    pos: Point,
    timestamp: Duration,
}

impl VelocityTracker {
    pub fn new(velocity_units: i32, maximum_minor_velocity: i32) -> Self {
        Self {
            history: VecDeque::new(),
            active: false,
            units: f64::from(velocity_units),
            maximum_minor_velocity: f64::from(maximum_minor_velocity),
        }
    }

    /// Starts a new session, dropping any previous samples.
    pub fn begin(&mut self) {
        self.history.clear();
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Adds a sample to the current session.
    pub fn push(&mut self, pos: Point, timestamp: Duration) {
        if !self.active {
            return;
        }

        if let Some(last) = self.history.back() {
            if timestamp < last.timestamp {
                trace!(
                    "ignoring sample with timestamp {timestamp:?} earlier than last {:?}",
                    last.timestamp
                );
                return;
            }
        }

        self.history.push_back(Sample { pos, timestamp });
        self.trim_history();
    }

    /// Per-axis velocity over the retained samples.
    pub fn velocity(&self) -> Point {
        let (Some(first), Some(last)) = (self.history.front(), self.history.back()) else {
            return Point::default();
        };

        let total_ms = (last.timestamp - first.timestamp).as_secs_f64() * 1000.;
        if total_ms == 0. {
            return Point::default();
        }

        let scale = self.units / total_ms;
        Point::new(
            (last.pos.x - first.pos.x) * scale,
            (last.pos.y - first.pos.y) * scale,
        )
    }

    /// Ends the session and returns the signed velocity along the axis.
    ///
    /// The cross-axis component is capped before it's folded into the magnitude, the sign
    /// comes from the axis component.
    pub fn resolve(&mut self, vertical: bool) -> f64 {
        let velocity = self.velocity();
        self.cancel();

        let (major, minor) = if vertical {
            (velocity.y, velocity.x)
        } else {
            (velocity.x, velocity.y)
        };
        let minor = minor.abs().min(self.maximum_minor_velocity);

        let magnitude = major.hypot(minor);
        if major < 0. {
            -magnitude
        } else {
            magnitude
        }
    }

    /// Ends the session without computing anything.
    pub fn cancel(&mut self) {
        self.history.clear();
        self.active = false;
    }

    fn trim_history(&mut self) {
        let Some(&Sample { timestamp, .. }) = self.history.back() else {
            return;
        };

        while let Some(first) = self.history.front() {
            if timestamp <= first.timestamp + HISTORY_LIMIT {
                break;
            }

            let _ = self.history.pop_front();
        }
    }
}
