use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use calloop::timer::{TimeoutAction, Timer};
use calloop::{LoopHandle, RegistrationToken};

use super::{Scheduler, TimerToken, TokenSource};
use crate::animation::Clock;

/// Scheduler backed by calloop timers.
///
/// When a timer fires, `on_timer` runs with the event loop data and the token that was
/// returned from [`Scheduler::schedule_at`].
pub struct CalloopScheduler<D: 'static> {
    handle: LoopHandle<'static, D>,
    clock: Clock,
    on_timer: fn(&mut D, TimerToken),
    tokens: TokenSource,
    /// Timers that haven't fired yet. Each timer removes its own entry when it fires.
    timers: Rc<RefCell<HashMap<TimerToken, RegistrationToken>>>,
}

impl<D: 'static> CalloopScheduler<D> {
    pub fn new(
        handle: LoopHandle<'static, D>,
        clock: Clock,
        on_timer: fn(&mut D, TimerToken),
    ) -> Self {
        Self {
            handle,
            clock,
            on_timer,
            tokens: TokenSource::default(),
            timers: Rc::default(),
        }
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Number of timers that haven't fired or been cancelled.
    pub fn pending(&self) -> usize {
        self.timers.borrow().len()
    }
}

impl<D: 'static> Scheduler for CalloopScheduler<D> {
    fn now(&self) -> Duration {
        self.clock.now()
    }

    fn schedule_at(&mut self, deadline: Duration) -> TimerToken {
        let now = self.clock.now();

        let token = self.tokens.next();
        let on_timer = self.on_timer;
        let timers = self.timers.clone();
        let timer = Timer::from_duration(deadline.saturating_sub(now));
        let rv = self.handle.insert_source(timer, move |_, _, data| {
            timers.borrow_mut().remove(&token);
            on_timer(data, token);
            TimeoutAction::Drop
        });

        match rv {
            Ok(registration) => {
                self.timers.borrow_mut().insert(token, registration);
            }
            Err(err) => warn!("error scheduling timer: {err:?}"),
        }

        token
    }

    fn cancel(&mut self, token: TimerToken) {
        let registration = self.timers.borrow_mut().remove(&token);
        if let Some(registration) = registration {
            self.handle.remove(registration);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use calloop::EventLoop;

    use super::*;

    #[derive(Default)]
    struct Data {
        fired: Vec<TimerToken>,
    }

    fn on_timer(data: &mut Data, token: TimerToken) {
        data.fired.push(token);
    }

    #[test]
    fn fires_and_cancels() {
        let mut event_loop = EventLoop::<Data>::try_new().unwrap();
        let mut scheduler =
            CalloopScheduler::new(event_loop.handle(), Clock::default(), on_timer);

        let now = scheduler.now();
        let fired = scheduler.schedule_at(now);
        let cancelled = scheduler.schedule_at(now);
        scheduler.cancel(cancelled);

        let mut data = Data::default();
        event_loop
            .dispatch(Some(Duration::from_millis(100)), &mut data)
            .unwrap();

        assert_eq!(data.fired, [fired]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn overdue_timers_can_still_be_cancelled() {
        let mut event_loop = EventLoop::<Data>::try_new().unwrap();
        let mut clock = Clock::default();
        let mut scheduler = CalloopScheduler::new(event_loop.handle(), clock.clone(), on_timer);

        let now = scheduler.now();
        let overdue = scheduler.schedule_at(now);

        // The loop hasn't dispatched yet, so the first timer is past due but still pending.
        clock.set(now + Duration::from_secs(1));
        let later = scheduler.schedule_at(now + Duration::from_secs(1));
        assert_eq!(scheduler.pending(), 2);

        scheduler.cancel(overdue);
        assert_eq!(scheduler.pending(), 1);

        let mut data = Data::default();
        event_loop
            .dispatch(Some(Duration::from_millis(100)), &mut data)
            .unwrap();

        assert_eq!(data.fired, [later]);
        assert_eq!(scheduler.pending(), 0);
    }
}
