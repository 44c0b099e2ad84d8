use std::time::Duration;

use crate::axis::{AxisModel, Target};
use crate::fling::Fling;
use crate::scheduler::{Scheduler, TimerToken};

mod clock;
pub use clock::Clock;

/// Interval between animation ticks.
pub const FRAME_DURATION: Duration = Duration::from_nanos(1_000_000_000 / 60);

/// Kinematic state of a running animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationFrame {
    /// Handle offset along the axis.
    pub position: f64,
    /// Pixels per second.
    pub velocity: f64,
    /// Pixels per second squared.
    pub acceleration: f64,
    pub last_tick_time: Duration,
}

/// Outcome of one animation tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Moved(f64),
    Finished(Target),
}

/// Constant-acceleration motion of the released handle.
///
/// At most one tick is scheduled at any time. Ticks land on a fixed grid of
/// [`FRAME_DURATION`] intervals from the start, but each one integrates over the real time
/// since the previous tick.
#[derive(Debug, Default)]
pub struct KinematicAnimator {
    frame: Option<AnimationFrame>,
    target: Option<Target>,
    timer: Option<TimerToken>,
    next_tick: Duration,
}

impl AnimationFrame {
    /// Integrates the motion up to the given time.
    pub fn advance(&mut self, now: Duration) {
        let t = now.saturating_sub(self.last_tick_time).as_secs_f64();
        self.position += self.velocity * t + 0.5 * self.acceleration * t * t;
        self.velocity += self.acceleration * t;
        self.last_tick_time = now;
    }
}

impl KinematicAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.frame.is_some()
    }

    pub fn target(&self) -> Option<Target> {
        self.target
    }

    pub fn frame(&self) -> Option<&AnimationFrame> {
        self.frame.as_ref()
    }

    pub fn start(&mut self, scheduler: &mut impl Scheduler, position: f64, fling: Fling) {
        let _span = tracy_client::span!("KinematicAnimator::start");

        self.cancel(scheduler);

        let now = scheduler.now();
        trace!(
            "starting animation to {:?} at {position}, v={} a={}",
            fling.target,
            fling.velocity,
            fling.acceleration
        );

        self.frame = Some(AnimationFrame {
            position,
            velocity: fling.velocity,
            acceleration: fling.acceleration,
            last_tick_time: now,
        });
        self.target = Some(fling.target);
        self.next_tick = now + FRAME_DURATION;
        self.timer = Some(scheduler.schedule_at(self.next_tick));
    }

    /// Stops the animation, returning whether it was running.
    pub fn cancel(&mut self, scheduler: &mut impl Scheduler) -> bool {
        if let Some(token) = self.timer.take() {
            scheduler.cancel(token);
        }
        self.target = None;
        self.frame.take().is_some()
    }

    /// Advances the animation in response to a fired timer.
    ///
    /// Returns `None` if the token doesn't belong to the running animation.
    pub fn tick(
        &mut self,
        scheduler: &mut impl Scheduler,
        token: TimerToken,
        axis: &AxisModel,
    ) -> Option<Step> {
        if self.timer != Some(token) {
            trace!("ignoring stale animation tick {token:?}");
            return None;
        }
        self.timer = None;

        let _span = tracy_client::span!("KinematicAnimator::tick");

        let frame = self.frame.as_mut()?;
        frame.advance(scheduler.now());
        let position = frame.position;

        let finished = if axis.open_reached(position) {
            Some(Target::Open)
        } else if axis.close_reached(position) {
            Some(Target::Closed)
        } else {
            None
        };

        if let Some(target) = finished {
            self.frame = None;
            self.target = None;
            return Some(Step::Finished(target));
        }

        self.next_tick += FRAME_DURATION;
        self.timer = Some(scheduler.schedule_at(self.next_tick));
        Some(Step::Moved(position))
    }
}
