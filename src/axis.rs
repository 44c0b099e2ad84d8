//! Orientation-dependent projection of the drawer onto its sliding axis.
//!
//! The handle offset is the coordinate of the handle's leading edge along the axis. On the
//! inverted orientations (top-down and left-to-right) the drawer opens towards larger
//! coordinates, on the others towards smaller ones.

use sliding_drawer_config::Orientation;

use crate::geometry::{Point, Rect, Size};

/// Where to put the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlePosition {
    /// At the fully open bound.
    ExpandedFullOpen,
    /// At the fully closed bound.
    CollapsedFullClosed,
    /// At a specific offset, clamped to the allowed range.
    At(i32),
}

/// Final state an animation runs towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Open,
    Closed,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EdgeOffsets {
    /// How far the handle hides past the closed edge.
    pub collapsed: i32,
    /// How far the handle stops short of the open edge.
    pub expanded: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisModel {
    orientation: Orientation,
    container: Size,
    handle: Size,
    offsets: EdgeOffsets,
}

impl Target {
    pub fn opposite(self) -> Self {
        match self {
            Target::Open => Target::Closed,
            Target::Closed => Target::Open,
        }
    }
}

impl AxisModel {
    pub fn new(orientation: Orientation, container: Size, handle: Size, offsets: EdgeOffsets) -> Self {
        Self {
            orientation,
            container,
            handle,
            offsets,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn is_vertical(&self) -> bool {
        self.orientation.is_vertical()
    }

    /// Whether opening moves the handle towards larger coordinates.
    pub fn is_inverted(&self) -> bool {
        matches!(
            self.orientation,
            Orientation::TopDown | Orientation::LeftToRight
        )
    }

    /// Container extent along the axis.
    pub fn length(&self) -> i32 {
        if self.is_vertical() {
            self.container.h
        } else {
            self.container.w
        }
    }

    /// Handle extent along the axis.
    pub fn handle_length(&self) -> i32 {
        if self.is_vertical() {
            self.handle.h
        } else {
            self.handle.w
        }
    }

    /// Projects a point onto the axis.
    pub fn axis_value(&self, point: Point) -> f64 {
        if self.is_vertical() {
            point.y
        } else {
            point.x
        }
    }

    /// Projects a point onto the cross axis.
    pub fn cross_value(&self, point: Point) -> f64 {
        if self.is_vertical() {
            point.x
        } else {
            point.y
        }
    }

    /// Smallest allowed handle offset.
    pub fn min_offset(&self) -> i32 {
        if self.is_inverted() {
            -self.offsets.collapsed
        } else {
            self.offsets.expanded
        }
    }

    /// Largest allowed handle offset.
    pub fn max_offset(&self) -> i32 {
        let travel = self.length() - self.handle_length();
        let max = if self.is_inverted() {
            travel - self.offsets.expanded
        } else {
            travel + self.offsets.collapsed
        };
        // A handle longer than the container pins everything at the minimum.
        max.max(self.min_offset())
    }

    /// Offset of the fully open or fully closed handle.
    pub fn bound_for(&self, expanded: bool) -> i32 {
        if expanded == self.is_inverted() {
            self.max_offset()
        } else {
            self.min_offset()
        }
    }

    pub fn clamp(&self, offset: i32) -> i32 {
        offset.clamp(self.min_offset(), self.max_offset())
    }

    pub fn resolve(&self, position: HandlePosition) -> i32 {
        match position {
            HandlePosition::ExpandedFullOpen => self.bound_for(true),
            HandlePosition::CollapsedFullClosed => self.bound_for(false),
            HandlePosition::At(offset) => self.clamp(offset),
        }
    }

    /// Sign of handle motion towards the target.
    pub fn direction(&self, target: Target) -> f64 {
        match (target, self.is_inverted()) {
            (Target::Open, true) | (Target::Closed, false) => 1.,
            (Target::Open, false) | (Target::Closed, true) => -1.,
        }
    }

    /// Position a released handle has to pass to leave the state it started from.
    ///
    /// The point sits a quarter of the container length in from the starting edge.
    pub fn rollback_point(&self, expanded: bool) -> i32 {
        let quarter = self.length() / 4;
        match (expanded, self.is_inverted()) {
            (true, true) => self.length() - self.offsets.expanded - quarter,
            (true, false) => self.offsets.expanded + quarter,
            (false, true) => quarter,
            (false, false) => self.length() - quarter,
        }
    }

    /// Whether an animation at this position has reached the open end.
    pub fn open_reached(&self, position: f64) -> bool {
        if self.is_inverted() {
            position >= f64::from(self.length() - self.offsets.expanded - 1)
        } else {
            position < f64::from(self.offsets.expanded)
        }
    }

    /// Whether an animation at this position has reached the closed end.
    pub fn close_reached(&self, position: f64) -> bool {
        if self.is_inverted() {
            position < f64::from(-self.offsets.collapsed)
        } else {
            position >= f64::from(self.length() + self.offsets.collapsed - 1)
        }
    }

    /// Frame of the handle at the given offset, centered on the cross axis.
    pub fn handle_frame(&self, offset: i32) -> Rect {
        let Size { w, h } = self.handle;
        if self.is_vertical() {
            Rect::new((self.container.w - w) / 2, offset, w, h)
        } else {
            Rect::new(offset, (self.container.h - h) / 2, w, h)
        }
    }
}
