//! Deferred callbacks for the animation loop.
//!
//! The controller never sleeps or spawns anything itself. It asks a [`Scheduler`] for a timer
//! and the host calls back into the controller with the [`TimerToken`] once the deadline
//! passes.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::animation::Clock;

mod event_loop;
pub use event_loop::CalloopScheduler;

/// Identifies one scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

pub trait Scheduler {
    /// Current time on the scheduler's monotonic clock.
    fn now(&self) -> Duration;

    /// Schedules a callback at the given time.
    fn schedule_at(&mut self, deadline: Duration) -> TimerToken;

    /// Cancels a pending callback. Unknown or fired tokens are ignored.
    fn cancel(&mut self, token: TimerToken);
}

impl TimerToken {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Hands out increasing token ids.
#[derive(Debug, Default)]
struct TokenSource {
    next: u64,
}

impl TokenSource {
    fn next(&mut self) -> TimerToken {
        let token = TimerToken(self.next);
        self.next += 1;
        token
    }
}

/// Scheduler driven by explicitly setting the time.
///
/// Nothing fires on its own; the caller pops due tokens with [`ManualScheduler::pop_due`]
/// after moving the clock forward.
#[derive(Debug)]
pub struct ManualScheduler {
    clock: Clock,
    tokens: TokenSource,
    pending: BTreeMap<TimerToken, Duration>,
}

impl ManualScheduler {
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            tokens: TokenSource::default(),
            pending: BTreeMap::new(),
        }
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn set_time(&mut self, time: Duration) {
        self.clock.set(time);
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.values().min().copied()
    }

    /// Removes and returns the earliest callback that's due, if any.
    pub fn pop_due(&mut self) -> Option<TimerToken> {
        let now = self.clock.now();
        let (&token, _) = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .min_by_key(|(token, deadline)| (**deadline, **token))?;
        self.pending.remove(&token);
        Some(token)
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Duration {
        self.clock.now()
    }

    fn schedule_at(&mut self, deadline: Duration) -> TimerToken {
        let token = self.tokens.next();
        self.pending.insert(token, deadline);
        token
    }

    fn cancel(&mut self, token: TimerToken) {
        self.pending.remove(&token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn pops_in_deadline_order() {
        let mut scheduler = ManualScheduler::new(Clock::with_time(Duration::ZERO));
        let late = scheduler.schedule_at(ms(30));
        let early = scheduler.schedule_at(ms(10));
        let never = scheduler.schedule_at(ms(100));
        assert_ne!(late, early);

        assert_eq!(scheduler.next_deadline(), Some(ms(10)));
        assert_eq!(scheduler.pop_due(), None);

        scheduler.set_time(ms(50));
        assert_eq!(scheduler.pop_due(), Some(early));
        assert_eq!(scheduler.pop_due(), Some(late));
        assert_eq!(scheduler.pop_due(), None);

        scheduler.cancel(never);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn cancelling_unknown_token_is_harmless() {
        let mut scheduler = ManualScheduler::new(Clock::with_time(Duration::ZERO));
        let token = scheduler.schedule_at(ms(10));
        scheduler.set_time(ms(10));
        assert_eq!(scheduler.pop_due(), Some(token));
        scheduler.cancel(token);
        assert_eq!(scheduler.pending(), 0);
    }
}
