//! The drawer state machine.
//!
//! [`DrawerController`] owns the handle offset and ties the pieces together: touch input
//! drives the [`DragTracker`] and [`VelocityTracker`], releases go through
//! [`FlingDecision`], and the [`KinematicAnimator`] carries the handle to its final bound on
//! timer callbacks from the [`Scheduler`]. Layout stays with the host, which reads
//! [`DrawerController::offset`] and reports size changes through [`DrawerController::layout`].

use std::time::Duration;

use sliding_drawer_config::{Config, Orientation};

use crate::animation::{KinematicAnimator, Step};
use crate::axis::{AxisModel, EdgeOffsets, HandlePosition, Target};
use crate::drag_tracker::DragTracker;
use crate::fling::{Fling, FlingDecision};
use crate::geometry::{Geometry, Point, Rect};
use crate::input::{TouchEvent, TouchPhase};
use crate::listener::DrawerListener;
use crate::scheduler::{Scheduler, TimerToken};
use crate::utils::to_physical;
use crate::velocity_tracker::VelocityTracker;


/// Controller settings with every length in physical pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub orientation: Orientation,
    pub handle: String,
    pub content: String,
    pub collapsed_offset: i32,
    pub expanded_offset: i32,
    pub allow_single_tap: bool,
    pub animate_on_click: bool,
    pub lock_content: bool,
    /// Finish animated transitions immediately.
    pub animations_off: bool,
    pub tap_threshold: i32,
    pub maximum_tap_velocity: i32,
    pub maximum_minor_velocity: i32,
    pub maximum_major_velocity: i32,
    pub maximum_acceleration: i32,
    pub velocity_units: i32,
    pub touch_slop: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum DrawerError {
    #[error("the handle attribute is required and must refer to a valid child")]
    MissingHandle,
    #[error("the content attribute is required and must refer to a valid child")]
    MissingContent,
    #[error("the content and handle attributes must refer to different children")]
    SameHandleAndContent,
    #[error("{role} {id:?} does not refer to an existing child")]
    UnresolvedChild { role: &'static str, id: String },
    #[error("{name} must be at least one pixel, got {value}")]
    NonPositivePhysics { name: &'static str, value: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawerState {
    Closed,
    Dragging,
    AnimatingOpen,
    AnimatingClose,
    Open,
}

type TransitionObserver = Box<dyn FnMut(DrawerState, DrawerState)>;

pub struct DrawerController<S, G> {
    options: Options,
    scheduler: S,
    geometry: G,
    /// Whether the drawer counts as open. Only flips at the end of a transition.
    expanded: bool,
    locked: bool,
    content_locked: bool,
    drag: DragTracker,
    velocity: VelocityTracker,
    animator: KinematicAnimator,
    fling: FlingDecision,
    listener: Option<Box<dyn DrawerListener>>,
    observer: Option<TransitionObserver>,
}

impl Options {
    pub fn from_config(config: &Config) -> Self {
        let drawer = &config.drawer;
        let physics = &config.physics;
        let density = physics.density.0;
        let scale = |value: u32| to_physical(f64::from(value), density);

        Self {
            orientation: drawer.orientation,
            handle: drawer.handle.clone().unwrap_or_default(),
            content: drawer.content.clone().unwrap_or_default(),
            collapsed_offset: i32::from(drawer.collapsed_offset),
            expanded_offset: i32::from(drawer.expanded_offset),
            allow_single_tap: drawer.allow_single_tap,
            animate_on_click: drawer.animate_on_click,
            lock_content: drawer.lock_content,
            animations_off: config.animations.off,
            tap_threshold: scale(u32::from(physics.tap_threshold)),
            maximum_tap_velocity: scale(physics.maximum_tap_velocity),
            maximum_minor_velocity: scale(physics.maximum_minor_velocity),
            maximum_major_velocity: scale(physics.maximum_major_velocity),
            maximum_acceleration: scale(physics.maximum_acceleration),
            velocity_units: scale(physics.velocity_units),
            touch_slop: scale(u32::from(physics.touch_slop)),
        }
    }

    /// Checks that the handle and content ids are set and distinct, and that the motion
    /// constants can actually move the handle.
    pub fn validate(&self) -> Result<(), DrawerError> {
        if self.handle.is_empty() {
            return Err(DrawerError::MissingHandle);
        }
        if self.content.is_empty() {
            return Err(DrawerError::MissingContent);
        }
        if self.handle == self.content {
            return Err(DrawerError::SameHandleAndContent);
        }
        // A tiny density can still round these down to nothing.
        for (name, value) in [
            ("maximum major velocity", self.maximum_major_velocity),
            ("maximum acceleration", self.maximum_acceleration),
            ("velocity units", self.velocity_units),
        ] {
            if value <= 0 {
                return Err(DrawerError::NonPositivePhysics { name, value });
            }
        }
        Ok(())
    }

    fn fling_decision(&self) -> FlingDecision {
        FlingDecision {
            tap_threshold: self.tap_threshold,
            maximum_major_velocity: f64::from(self.maximum_major_velocity),
            maximum_acceleration: f64::from(self.maximum_acceleration),
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl<S: Scheduler, G: Geometry> DrawerController<S, G> {
    /// Creates a closed drawer.
    ///
    /// Fails if the handle or content ids are empty, equal, or don't name a child.
    pub fn new(options: Options, geometry: G, scheduler: S) -> Result<Self, DrawerError> {
        options.validate()?;
        for (role, id) in [("handle", &options.handle), ("content", &options.content)] {
            if geometry.child_size(id).is_none() {
                return Err(DrawerError::UnresolvedChild {
                    role,
                    id: id.clone(),
                });
            }
        }

        let mut rv = Self {
            velocity: VelocityTracker::new(
                options.velocity_units,
                options.maximum_minor_velocity,
            ),
            fling: options.fling_decision(),
            content_locked: options.lock_content,
            options,
            scheduler,
            geometry,
            expanded: false,
            locked: false,
            drag: DragTracker::new(0),
            animator: KinematicAnimator::new(),
            listener: None,
            observer: None,
        };

        let axis = rv.axis();
        rv.drag.move_to(&axis, HandlePosition::CollapsedFullClosed);
        debug!(
            "created {} drawer, handle at {}",
            rv.options.orientation,
            rv.drag.offset()
        );

        Ok(rv)
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    /// Mutable access to the geometry. Call [`Self::layout`] after changing it.
    pub fn geometry_mut(&mut self) -> &mut G {
        &mut self.geometry
    }

    pub fn set_listener(&mut self, listener: impl DrawerListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    /// Sets a callback invoked with the old and new state on every state change.
    pub fn set_transition_observer(
        &mut self,
        observer: impl FnMut(DrawerState, DrawerState) + 'static,
    ) {
        self.observer = Some(Box::new(observer));
    }

    /// Axis projection for the current geometry.
    pub fn axis(&self) -> AxisModel {
        let handle = self
            .geometry
            .child_size(&self.options.handle)
            .unwrap_or_default();
        AxisModel::new(
            self.options.orientation,
            self.geometry.container_size(),
            handle,
            EdgeOffsets {
                collapsed: self.options.collapsed_offset,
                expanded: self.options.expanded_offset,
            },
        )
    }

    pub fn state(&self) -> DrawerState {
        if self.drag.is_active() {
            return DrawerState::Dragging;
        }

        match self.animator.target() {
            Some(Target::Open) => DrawerState::AnimatingOpen,
            Some(Target::Closed) => DrawerState::AnimatingClose,
            None if self.expanded => DrawerState::Open,
            None => DrawerState::Closed,
        }
    }

    /// Handle offset along the axis.
    pub fn offset(&self) -> i32 {
        self.drag.offset()
    }

    /// Handle frame in container coordinates.
    pub fn handle_frame(&self) -> Rect {
        self.axis().handle_frame(self.offset())
    }

    pub fn is_opened(&self) -> bool {
        self.expanded
    }

    /// Whether the handle is being dragged or animated.
    pub fn is_moving(&self) -> bool {
        self.drag.is_active() || self.animator.is_running()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Ignores touch input and handle clicks until [`Self::unlock`].
    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn is_content_locked(&self) -> bool {
        self.content_locked
    }

    /// Only accept touches on the handle, even while open.
    pub fn lock_content(&mut self) {
        self.content_locked = true;
    }

    pub fn unlock_content(&mut self) {
        self.content_locked = false;
    }

    /// Opens the drawer immediately, cancelling any motion.
    pub fn open(&mut self) {
        self.transition(|this| {
            this.interrupt();
            this.open_drawer();
        });
    }

    /// Closes the drawer immediately, cancelling any motion.
    pub fn close(&mut self) {
        self.transition(|this| {
            this.interrupt();
            this.close_drawer();
        });
    }

    pub fn toggle(&mut self) {
        if self.expanded {
            self.close();
        } else {
            self.open();
        }
    }

    pub fn animate_open(&mut self) {
        self.animate_to(Target::Open);
    }

    pub fn animate_close(&mut self) {
        self.animate_to(Target::Closed);
    }

    /// Animates towards the opposite state, reversing an animation that's in flight.
    pub fn animate_toggle(&mut self) {
        let target = match self.state() {
            DrawerState::AnimatingOpen | DrawerState::Open => Target::Closed,
            DrawerState::AnimatingClose | DrawerState::Closed => Target::Open,
            DrawerState::Dragging if self.expanded => Target::Closed,
            DrawerState::Dragging => Target::Open,
        };
        self.animate_to(target);
    }

    /// Reacts to a click on the handle.
    pub fn on_handle_click(&mut self) {
        if self.locked {
            return;
        }

        if self.options.animate_on_click {
            self.animate_toggle();
        } else {
            self.toggle();
        }
    }

    /// Re-places the handle after a geometry change.
    ///
    /// A handle under the pointer stays where it is.
    pub fn layout(&mut self) {
        if self.drag.is_active() {
            return;
        }

        let axis = self.axis();
        let position = if self.animator.is_running() {
            HandlePosition::At(self.drag.offset())
        } else if self.expanded {
            HandlePosition::ExpandedFullOpen
        } else {
            HandlePosition::CollapsedFullClosed
        };
        self.drag.move_to(&axis, position);
    }

    /// Feeds a touch event, returning whether the controller consumed it.
    pub fn on_touch(&mut self, event: TouchEvent) -> bool {
        match event.phase {
            TouchPhase::Down => self.on_touch_down(event.pos, event.timestamp),
            TouchPhase::Move => self.on_touch_move(event.pos, event.timestamp),
            TouchPhase::Up => self.on_touch_up(event.pos, event.timestamp),
            TouchPhase::Cancel => self.on_touch_cancel(event.pos, event.timestamp),
        }
    }

    pub fn on_touch_down(&mut self, pos: Point, timestamp: Duration) -> bool {
        let _span = tracy_client::span!("DrawerController::on_touch_down");

        if self.locked {
            return true;
        }
        if self.drag.is_active() {
            trace!("ignoring touch-down during a drag");
            return true;
        }

        let axis = self.axis();
        let on_handle = axis.handle_frame(self.drag.offset()).contains(pos);
        if !on_handle && (self.content_locked || !self.expanded) {
            return false;
        }

        self.transition(|this| {
            let was_animating = this.stop_animation();
            if !was_animating {
                this.notify(|l| l.pre_scroll_started());
            }
            this.notify(|l| l.scroll_started());

            let touch_delta = axis.axis_value(pos) as i32 - this.drag.offset();
            let start = if this.expanded {
                HandlePosition::At(this.drag.offset())
            } else {
                HandlePosition::CollapsedFullClosed
            };
            this.drag.begin(&axis, start, touch_delta);

            this.velocity.begin();
            this.velocity.push(pos, timestamp);
        });

        true
    }

    pub fn on_touch_move(&mut self, pos: Point, timestamp: Duration) -> bool {
        if self.locked {
            return true;
        }
        if !self.drag.is_active() {
            return false;
        }

        self.velocity.push(pos, timestamp);

        let axis = self.axis();
        if let Some(reversed) = self.drag.update(&axis, axis.axis_value(pos)) {
            self.notify(|l| l.scroll(reversed));
        }

        true
    }

    pub fn on_touch_up(&mut self, pos: Point, timestamp: Duration) -> bool {
        self.release(pos, timestamp)
    }

    pub fn on_touch_cancel(&mut self, pos: Point, timestamp: Duration) -> bool {
        self.release(pos, timestamp)
    }

    /// Handles a fired timer.
    pub fn on_timer(&mut self, token: TimerToken) {
        let axis = self.axis();

        // The animator stops itself on the final tick, so the state is read before ticking.
        self.transition(|this| {
            match this.animator.tick(&mut this.scheduler, token, &axis) {
                Some(Step::Moved(position)) => {
                    this.drag.move_to(&axis, HandlePosition::At(position as i32));
                }
                Some(Step::Finished(target)) => this.finish(target),
                None => (),
            }
        });
    }

    fn release(&mut self, pos: Point, timestamp: Duration) -> bool {
        let _span = tracy_client::span!("DrawerController::release");

        if self.locked {
            return true;
        }
        if !self.drag.is_active() {
            return false;
        }

        self.transition(|this| {
            let axis = this.axis();
            this.velocity.push(pos, timestamp);
            let velocity = this.velocity.resolve(axis.is_vertical());
            let position = this.drag.end();
            let position = this.drag.move_to(&axis, HandlePosition::At(position));
            this.notify(|l| l.scroll_ended());

            let is_tap = this.options.allow_single_tap
                && velocity.abs() < f64::from(this.options.maximum_tap_velocity)
                && this.fling.is_single_tap(&axis, position, this.expanded);

            let fling = if is_tap {
                let target = if this.expanded {
                    Target::Closed
                } else {
                    Target::Open
                };
                this.fling.animate_to(&axis, position, target)
            } else {
                this.fling
                    .decide(&axis, position, velocity, this.expanded, false)
            };

            debug!(
                "released at {position} with velocity {velocity:.1}, tap={is_tap}, going to {:?}",
                fling.target
            );
            this.start_animation(position, fling);
        });

        true
    }

    fn animate_to(&mut self, target: Target) {
        let state = self.state();
        let already_there = match target {
            Target::Open => matches!(state, DrawerState::Open | DrawerState::AnimatingOpen),
            Target::Closed => matches!(state, DrawerState::Closed | DrawerState::AnimatingClose),
        };
        if already_there {
            return;
        }

        self.transition(|this| {
            let was_animating = this.stop_animation();
            this.end_drag();
            if !was_animating {
                this.notify(|l| l.pre_scroll_started());
            }

            let axis = this.axis();
            let start = if state == DrawerState::Closed {
                HandlePosition::CollapsedFullClosed
            } else {
                HandlePosition::At(this.drag.offset())
            };
            let position = this.drag.move_to(&axis, start);
            let fling = this.fling.animate_to(&axis, position, target);
            this.start_animation(position, fling);
        });
    }

    fn start_animation(&mut self, position: i32, fling: Fling) {
        self.notify(|l| l.scroll_started());

        if self.options.animations_off {
            self.finish(fling.target);
            return;
        }

        self.animator
            .start(&mut self.scheduler, f64::from(position), fling);
    }

    /// Ends a motion session at the target bound.
    fn finish(&mut self, target: Target) {
        self.notify(|l| l.scroll_ended());
        match target {
            Target::Open => self.open_drawer(),
            Target::Closed => self.close_drawer(),
        }
    }

    /// Stops any drag or animation, closing its motion session.
    fn interrupt(&mut self) {
        self.stop_animation();
        self.end_drag();
    }

    fn stop_animation(&mut self) -> bool {
        if !self.animator.cancel(&mut self.scheduler) {
            return false;
        }

        self.notify(|l| l.scroll_ended());
        true
    }

    fn end_drag(&mut self) {
        if !self.drag.is_active() {
            return;
        }

        self.drag.end();
        self.velocity.cancel();
        self.notify(|l| l.scroll_ended());
    }

    fn open_drawer(&mut self) {
        let axis = self.axis();
        self.drag.move_to(&axis, HandlePosition::ExpandedFullOpen);

        if self.expanded {
            return;
        }
        self.expanded = true;
        self.notify(|l| l.drawer_opened());
    }

    fn close_drawer(&mut self) {
        let axis = self.axis();
        self.drag.move_to(&axis, HandlePosition::CollapsedFullClosed);

        if !self.expanded {
            return;
        }
        self.expanded = false;
        self.notify(|l| l.drawer_closed());
    }

    fn notify(&mut self, f: impl FnOnce(&mut dyn DrawerListener)) {
        if let Some(listener) = &mut self.listener {
            f(listener.as_mut());
        }
    }

    /// Runs `f`, reporting a state change if it caused one.
    fn transition<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let before = self.state();
        let rv = f(self);
        let after = self.state();

        if before != after {
            debug!("drawer state {before:?} -> {after:?} at {}", self.offset());
            if let Some(observer) = &mut self.observer {
                observer(before, after);
            }
        }

        rv
    }
}
