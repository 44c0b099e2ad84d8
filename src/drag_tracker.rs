use crate::axis::{AxisModel, HandlePosition};

/// Handle offset and the drag session moving it.
#[derive(Debug)]
pub struct DragTracker {
    offset: i32,
    session: Option<DragSession>,
}

#[derive(Debug, Clone, Copy)]
struct DragSession {
    /// Distance from the handle's leading edge to the touch point at touch-down.
    touch_delta: i32,
    /// Last non-zero step, used to detect direction reversals.
    last_step: i32,
}

impl DragTracker {
    pub fn new(offset: i32) -> Self {
        Self {
            offset,
            session: None,
        }
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Moves the handle to the start position and opens a session.
    pub fn begin(&mut self, axis: &AxisModel, start: HandlePosition, touch_delta: i32) {
        self.move_to(axis, start);
        self.session = Some(DragSession {
            touch_delta,
            last_step: 0,
        });
    }

    /// Follows the pointer to a new axis position.
    ///
    /// Returns whether the motion reversed direction, or `None` without an open session.
    pub fn update(&mut self, axis: &AxisModel, raw_axis_value: f64) -> Option<bool> {
        let session = self.session.as_mut()?;

        let position = (raw_axis_value as i32).saturating_sub(session.touch_delta);
        let step = position.saturating_sub(self.offset);

        let reversed = session.last_step.signum() * step.signum() < 0;
        if step != 0 {
            session.last_step = step;
        }

        self.offset = axis.clamp(position);
        Some(reversed)
    }

    /// Closes the session, returning the final offset.
    pub fn end(&mut self) -> i32 {
        self.session = None;
        self.offset
    }

    pub fn move_to(&mut self, axis: &AxisModel, position: HandlePosition) -> i32 {
        self.offset = axis.resolve(position);
        self.offset
    }
}
