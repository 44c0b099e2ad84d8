use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Receives drawer lifecycle notifications.
///
/// Every motion session, whether a drag or an animation, is bracketed by
/// [`scroll_started`](Self::scroll_started) and [`scroll_ended`](Self::scroll_ended).
pub trait DrawerListener {
    /// A touch or programmatic animation is about to set the drawer in motion.
    fn pre_scroll_started(&mut self) {}
    fn scroll_started(&mut self) {}
    /// The handle followed the pointer. `reversed` is set when the drag changed direction.
    fn scroll(&mut self, reversed: bool) {
        let _ = reversed;
    }
    fn scroll_ended(&mut self) {}
    fn drawer_opened(&mut self) {}
    fn drawer_closed(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawerEvent {
    PreScrollStarted,
    ScrollStarted,
    Scroll { reversed: bool },
    ScrollEnded,
    Opened,
    Closed,
}

/// Listener that records every notification.
///
/// Clones share the same log, so one clone can be handed to the controller and the other
/// kept for inspection.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Rc<RefCell<Vec<DrawerEvent>>>,
}

impl fmt::Display for DrawerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawerEvent::PreScrollStarted => f.write_str("pre-scroll-started"),
            DrawerEvent::ScrollStarted => f.write_str("scroll-started"),
            DrawerEvent::Scroll { reversed } => write!(f, "scroll reversed={reversed}"),
            DrawerEvent::ScrollEnded => f.write_str("scroll-ended"),
            DrawerEvent::Opened => f.write_str("opened"),
            DrawerEvent::Closed => f.write_str("closed"),
        }
    }
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: DrawerEvent) {
        self.events.borrow_mut().push(event);
    }

    /// Removes and returns the recorded events.
    pub fn take(&self) -> Vec<DrawerEvent> {
        self.events.take()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Removes the recorded events and formats them one per line.
    pub fn snapshot(&self) -> String {
        let events = self.take();
        let lines: Vec<_> = events.iter().map(ToString::to_string).collect();
        lines.join("\n")
    }
}

impl DrawerListener for EventLog {
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
