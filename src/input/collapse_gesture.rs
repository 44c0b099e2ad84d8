//! Closing an open drawer by swiping its content.
//!
//! Touches that land on the content never reach the handle. While the drawer is open, this
//! adapter watches them and, once a swipe clearly heads towards the closed edge, hands the
//! whole touch sequence over to the controller as if it had started there.

use arrayvec::ArrayVec;

use super::{TouchEvent, TouchPhase};
use crate::axis::{AxisModel, Target};
use crate::geometry::Point;

/// How many times larger the axis movement must be than the cross-axis movement.
const DOMINANCE_RATIO: f64 = 4.;

#[derive(Debug)]
pub struct CollapseGesture {
    touch_slop: f64,
    down: Option<TouchEvent>,
    last_scroll: Point,
    state: State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    /// Waiting for the first dominant movement.
    Pending,
    /// Past the touch slop.
    Scrolling,
    /// Forwarding the sequence to the controller.
    Intercepting,
    /// Ignoring the rest of the sequence.
    Filtered,
}

/// Events to forward to the controller.
pub type Forwarded = ArrayVec<TouchEvent, 2>;

impl CollapseGesture {
    pub fn new(touch_slop: i32) -> Self {
        Self {
            touch_slop: f64::from(touch_slop),
            down: None,
            last_scroll: Point::default(),
            state: State::Idle,
        }
    }

    pub fn is_intercepting(&self) -> bool {
        self.state == State::Intercepting
    }

    /// Feeds one content touch event.
    ///
    /// `opened` is only consulted at touch-down; the adapter stays out of the way for
    /// sequences that start while the drawer isn't open.
    pub fn process(&mut self, event: TouchEvent, axis: &AxisModel, opened: bool) -> Forwarded {
        let mut forwarded = Forwarded::new();

        match event.phase {
            TouchPhase::Down => {
                self.down = Some(event);
                self.last_scroll = event.pos;
                self.state = if opened {
                    State::Pending
                } else {
                    State::Filtered
                };
            }
            TouchPhase::Move => match self.state {
                State::Pending | State::Scrolling => self.on_move(event, axis, &mut forwarded),
                State::Intercepting => forwarded.push(event),
                State::Idle | State::Filtered => (),
            },
            TouchPhase::Up | TouchPhase::Cancel => {
                if self.state == State::Intercepting {
                    forwarded.push(event);
                }
                self.down = None;
                self.state = State::Idle;
            }
        }

        forwarded
    }

    fn on_move(&mut self, event: TouchEvent, axis: &AxisModel, forwarded: &mut Forwarded) {
        let Some(down) = self.down else {
            return;
        };

        if self.state == State::Pending {
            let dx = event.pos.x - down.pos.x;
            let dy = event.pos.y - down.pos.y;
            if dx * dx + dy * dy <= self.touch_slop * self.touch_slop {
                return;
            }
            self.state = State::Scrolling;
        }

        let major = axis.axis_value(event.pos) - axis.axis_value(self.last_scroll);
        let minor = axis.cross_value(event.pos) - axis.cross_value(self.last_scroll);
        self.last_scroll = event.pos;

        if (minor * DOMINANCE_RATIO).abs() > major.abs() {
            return;
        }

        if major * axis.direction(Target::Closed) > 0. {
            trace!("intercepting content swipe towards the closed edge");
            self.state = State::Intercepting;
            forwarded.push(down);
            forwarded.push(event);
        } else {
            self.state = State::Filtered;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sliding_drawer_config::Orientation;

    use super::*;
    use crate::axis::EdgeOffsets;
    use crate::geometry::Size;

    fn make_axis(orientation: Orientation) -> AxisModel {
        AxisModel::new(
            orientation,
            Size::new(300, 300),
            Size::new(40, 40),
            EdgeOffsets::default(),
        )
    }

    fn ev(phase: TouchPhase, x: f64, y: f64, ms: u64) -> TouchEvent {
        TouchEvent::new(phase, (x, y), Duration::from_millis(ms))
    }

    #[test]
    fn swipe_towards_closed_edge_is_intercepted() {
        let axis = make_axis(Orientation::LeftToRight);
        let mut gesture = CollapseGesture::new(8);

        assert!(gesture
            .process(ev(TouchPhase::Down, 150., 100., 0), &axis, true)
            .is_empty());
        // Within the slop.
        assert!(gesture
            .process(ev(TouchPhase::Move, 145., 100., 10), &axis, true)
            .is_empty());

        let forwarded = gesture.process(ev(TouchPhase::Move, 130., 101., 20), &axis, true);
        assert_eq!(
            forwarded.as_slice(),
            [
                ev(TouchPhase::Down, 150., 100., 0),
                ev(TouchPhase::Move, 130., 101., 20)
            ]
        );
        assert!(gesture.is_intercepting());

        let forwarded = gesture.process(ev(TouchPhase::Move, 150., 101., 30), &axis, true);
        assert_eq!(forwarded.len(), 1);
        let forwarded = gesture.process(ev(TouchPhase::Up, 150., 101., 40), &axis, true);
        assert_eq!(forwarded[0].phase, TouchPhase::Up);
        assert!(!gesture.is_intercepting());
    }

    #[test]
    fn swipe_towards_open_edge_is_filtered() {
        let axis = make_axis(Orientation::LeftToRight);
        let mut gesture = CollapseGesture::new(8);

        gesture.process(ev(TouchPhase::Down, 100., 100., 0), &axis, true);
        assert!(gesture
            .process(ev(TouchPhase::Move, 120., 100., 10), &axis, true)
            .is_empty());
        // Turning around later doesn't help.
        assert!(gesture
            .process(ev(TouchPhase::Move, 60., 100., 20), &axis, true)
            .is_empty());
        assert!(gesture
            .process(ev(TouchPhase::Up, 60., 100., 30), &axis, true)
            .is_empty());
    }

    #[test]
    fn cross_axis_movement_keeps_waiting() {
        let axis = make_axis(Orientation::LeftToRight);
        let mut gesture = CollapseGesture::new(8);

        gesture.process(ev(TouchPhase::Down, 100., 100., 0), &axis, true);
        assert!(gesture
            .process(ev(TouchPhase::Move, 98., 120., 10), &axis, true)
            .is_empty());
        assert!(!gesture.is_intercepting());

        let forwarded = gesture.process(ev(TouchPhase::Move, 80., 121., 20), &axis, true);
        assert_eq!(forwarded.len(), 2);
    }

    #[test]
    fn closed_drawer_is_left_alone() {
        let axis = make_axis(Orientation::LeftToRight);
        let mut gesture = CollapseGesture::new(8);

        gesture.process(ev(TouchPhase::Down, 100., 100., 0), &axis, false);
        assert!(gesture
            .process(ev(TouchPhase::Move, 50., 100., 10), &axis, true)
            .is_empty());
    }

    #[test]
    fn vertical_orientations() {
        // Bottom-up closes downwards.
        let axis = make_axis(Orientation::BottomUp);
        let mut gesture = CollapseGesture::new(8);
        gesture.process(ev(TouchPhase::Down, 100., 100., 0), &axis, true);
        let forwarded = gesture.process(ev(TouchPhase::Move, 101., 130., 10), &axis, true);
        assert_eq!(forwarded.len(), 2);

        let axis = make_axis(Orientation::TopDown);
        let mut gesture = CollapseGesture::new(8);
        gesture.process(ev(TouchPhase::Down, 100., 100., 0), &axis, true);
        let forwarded = gesture.process(ev(TouchPhase::Move, 101., 130., 10), &axis, true);
        assert!(forwarded.is_empty());
    }
}
