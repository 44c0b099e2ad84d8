//! Touch traces: recorded input played back against a drawer.
//!
//! A trace is a JSON document with the container and handle sizes and a list of timed touch
//! events and controller calls. [`simulate`] runs it on virtual time, [`replay`] plays it in
//! real time on a calloop event loop.

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{ensure, Context};
use calloop::timer::{TimeoutAction, Timer};
use calloop::EventLoop;
use serde::{Deserialize, Serialize};

use crate::animation::Clock;
use crate::controller::{DrawerController, DrawerState, Options};
use crate::geometry::{Size, StaticGeometry};
use crate::input::{TouchEvent, TouchPhase};
use crate::listener::{DrawerEvent, DrawerListener};
use crate::scheduler::{CalloopScheduler, ManualScheduler, Scheduler, TimerToken};

/// Upper bound on how long a simulation keeps running after the last trace event.
const SETTLE_LIMIT: Duration = Duration::from_secs(10);

/// Longest a replay sleeps without checking whether it's done.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub container: [i32; 2],
    pub handle: [i32; 2],
    #[serde(default)]
    pub events: Vec<TraceEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Time since the start of the trace.
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Touch { phase: TouchPhase, x: f64, y: f64 },
    Call(Call),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Call {
    Open,
    Close,
    Toggle,
    AnimateOpen,
    AnimateClose,
    AnimateToggle,
    Lock,
    Unlock,
    LockContent,
    UnlockContent,
    Click,
    Layout,
}

impl Trace {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("error reading {path:?}"))?;
        Self::parse(&contents).with_context(|| format!("error parsing {path:?}"))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let trace: Self = serde_json::from_str(text)?;

        let mut last = 0;
        for event in &trace.events {
            ensure!(
                event.at_ms >= last,
                "event at {} ms comes after an event at {last} ms",
                event.at_ms
            );
            last = event.at_ms;
        }

        Ok(trace)
    }

    /// Geometry with the drawer's handle and content children.
    ///
    /// The content fills the container.
    pub fn geometry(&self, options: &Options) -> StaticGeometry {
        let container = Size::new(self.container[0], self.container[1]);
        let handle = Size::new(self.handle[0], self.handle[1]);
        StaticGeometry::new(container)
            .with_child(options.handle.clone(), handle)
            .with_child(options.content.clone(), container)
    }

    /// Time of the last event.
    pub fn duration(&self) -> Duration {
        let last = self.events.last().map_or(0, |event| event.at_ms);
        Duration::from_millis(last)
    }
}

impl Action {
    fn apply<S: Scheduler>(self, controller: &mut DrawerController<S, StaticGeometry>) {
        match self {
            Action::Touch { phase, x, y } => {
                let timestamp = controller.scheduler().now();
                let consumed = controller.on_touch(TouchEvent::new(phase, (x, y), timestamp));
                trace!("{phase:?} at ({x}, {y}), consumed={consumed}");
            }
            Action::Call(call) => call.apply(controller),
        }
    }
}

impl Call {
    fn apply<S: Scheduler>(self, controller: &mut DrawerController<S, StaticGeometry>) {
        match self {
            Call::Open => controller.open(),
            Call::Close => controller.close(),
            Call::Toggle => controller.toggle(),
            Call::AnimateOpen => controller.animate_open(),
            Call::AnimateClose => controller.animate_close(),
            Call::AnimateToggle => controller.animate_toggle(),
            Call::Lock => controller.lock(),
            Call::Unlock => controller.unlock(),
            Call::LockContent => controller.lock_content(),
            Call::UnlockContent => controller.unlock_content(),
            Call::Click => controller.on_handle_click(),
            Call::Layout => controller.layout(),
        }
    }
}

/// Collects listener events and state changes as timestamped lines.
#[derive(Debug, Clone)]
struct Transcript {
    clock: Clock,
    start: Duration,
    lines: Rc<RefCell<Vec<String>>>,
}

impl Transcript {
    fn new(clock: Clock) -> Self {
        Self {
            start: clock.now(),
            clock,
            lines: Rc::default(),
        }
    }

    fn push(&self, what: impl std::fmt::Display) {
        let elapsed = self.clock.now().saturating_sub(self.start);
        let line = format!("[{:>6.1} ms] {what}", elapsed.as_secs_f64() * 1000.);
        debug!("{line}");
        self.lines.borrow_mut().push(line);
    }

    fn attach<S: Scheduler>(&self, controller: &mut DrawerController<S, StaticGeometry>) {
        controller.set_listener(self.clone());

        let transcript = self.clone();
        controller.set_transition_observer(move |from, to| {
            transcript.push(format_args!("state {from:?} -> {to:?}"));
        });
    }

    fn finish<S: Scheduler>(self, controller: &DrawerController<S, StaticGeometry>) -> Vec<String> {
        self.push(format_args!(
            "final {:?} at offset {}",
            controller.state(),
            controller.offset()
        ));
        self.lines.take()
    }
}

impl DrawerListener for Transcript {
    fn pre_scroll_started(&mut self) {
        self.push(DrawerEvent::PreScrollStarted);
    }

    fn scroll_started(&mut self) {
        self.push(DrawerEvent::ScrollStarted);
    }

    fn scroll(&mut self, reversed: bool) {
        self.push(DrawerEvent::Scroll { reversed });
    }

    fn scroll_ended(&mut self) {
        self.push(DrawerEvent::ScrollEnded);
    }

    fn drawer_opened(&mut self) {
        self.push(DrawerEvent::Opened);
    }

    fn drawer_closed(&mut self) {
        self.push(DrawerEvent::Closed);
    }
}

/// Runs the trace on virtual time, then lets any animation settle.
///
/// Returns the transcript of listener events and state changes.
pub fn simulate(trace: &Trace, options: Options) -> anyhow::Result<Vec<String>> {
    let _span = tracy_client::span!("simulate");

    let clock = Clock::with_time(Duration::ZERO);
    let geometry = trace.geometry(&options);
    let scheduler = ManualScheduler::new(clock.clone());
    let mut controller = DrawerController::new(options, geometry, scheduler)?;

    let transcript = Transcript::new(clock);
    transcript.attach(&mut controller);

    for event in &trace.events {
        let time = Duration::from_millis(event.at_ms);
        fire_timers_until(&mut controller, time);
        let now = controller.scheduler().now();
        controller.scheduler_mut().set_time(time.max(now));
        event.action.apply(&mut controller);
    }

    fire_timers_until(&mut controller, trace.duration() + SETTLE_LIMIT);
    if is_animating(controller.state()) {
        warn!("animation still running after {SETTLE_LIMIT:?}");
    }

    Ok(transcript.finish(&controller))
}

fn is_animating(state: DrawerState) -> bool {
    matches!(state, DrawerState::AnimatingOpen | DrawerState::AnimatingClose)
}

/// Fires timers in deadline order up to the given time.
///
/// The clock is left at the last fired deadline.
fn fire_timers_until(
    controller: &mut DrawerController<ManualScheduler, StaticGeometry>,
    time: Duration,
) {
    while let Some(deadline) = controller.scheduler().next_deadline() {
        if deadline > time {
            break;
        }

        let now = controller.scheduler().now();
        controller.scheduler_mut().set_time(deadline.max(now));
        while let Some(token) = controller.scheduler_mut().pop_due() {
            controller.on_timer(token);
        }
    }
}

struct ReplayState {
    controller: DrawerController<CalloopScheduler<ReplayState>, StaticGeometry>,
    remaining: usize,
}

fn on_animation_timer(state: &mut ReplayState, token: TimerToken) {
    state.controller.on_timer(token);
}

/// Plays the trace back in real time on a calloop event loop.
pub fn replay(trace: &Trace, options: Options) -> anyhow::Result<Vec<String>> {
    let _span = tracy_client::span!("replay");

    let mut event_loop: EventLoop<'static, ReplayState> =
        EventLoop::try_new().context("error creating event loop")?;
    let handle = event_loop.handle();

    let mut clock = Clock::default();
    let geometry = trace.geometry(&options);
    let scheduler = CalloopScheduler::new(handle.clone(), clock.clone(), on_animation_timer);
    let mut controller = DrawerController::new(options, geometry, scheduler)?;

    let transcript = Transcript::new(clock.clone());
    transcript.attach(&mut controller);

    for event in trace.events.iter().copied() {
        let timer = Timer::from_duration(Duration::from_millis(event.at_ms));
        handle
            .insert_source(timer, move |_, _, state| {
                event.action.apply(&mut state.controller);
                state.remaining -= 1;
                TimeoutAction::Drop
            })
            .map_err(|err| err.error)
            .context("error scheduling trace event")?;
    }

    let mut state = ReplayState {
        controller,
        remaining: trace.events.len(),
    };

    let signal = event_loop.get_signal();
    let deadline = clock.now() + trace.duration() + SETTLE_LIMIT;
    event_loop
        .run(POLL_INTERVAL, &mut state, |state| {
            let _span = tracy_client::span!("loop callback");

            // A drag left open by the trace has nothing more to wait for.
            let settled = state.remaining == 0 && !is_animating(state.controller.state());
            if settled {
                signal.stop();
            } else if clock.now() > deadline {
                warn!("replay did not settle after {SETTLE_LIMIT:?}");
                signal.stop();
            }

            clock.clear();
        })
        .context("error running event loop")?;

    Ok(transcript.finish(&state.controller))
}
