use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::utils::get_monotonic_time;

/// Shareable lazy clock.
///
/// The clock will fetch the monotonic time once and then retain it until explicitly cleared
/// with [`Clock::clear`], so that everything handled in one event loop dispatch sees the same
/// time. Setting the time freezes the clock until the next set or clear.
#[derive(Debug, Default, Clone)]
pub struct Clock {
    inner: Rc<RefCell<LazyClock>>,
}

#[derive(Debug, Default)]
struct LazyClock {
    time: Option<Duration>,
}

impl Clock {
    /// Creates a new clock frozen at the given time.
    pub fn with_time(time: Duration) -> Self {
        Self {
            inner: Rc::new(RefCell::new(LazyClock { time: Some(time) })),
        }
    }

    /// Returns the current time.
    pub fn now(&self) -> Duration {
        self.inner.borrow_mut().now()
    }

    /// Sets the clock time.
    pub fn set(&mut self, time: Duration) {
        self.inner.borrow_mut().time = Some(time);
    }

    /// Clears the stored time so it's re-fetched again next.
    pub fn clear(&mut self) {
        self.inner.borrow_mut().time = None;
    }
}

impl PartialEq for Clock {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Clock {}

impl LazyClock {
    fn now(&mut self) -> Duration {
        *self.time.get_or_insert_with(get_monotonic_time)
    }
}
