//! Timer scheduling
//!
//! Each entry arms two one-shot timers when it is created: the overlay timer
//! and the spinner timer. The scheduler only has to deliver a fired
//! [`TimerId`] back to [`Coordinator::on_timer`](crate::Coordinator::on_timer);
//! the coordinator re-checks the entry before acting, so a timer that fires
//! in the same turn as its entry's terminal signal is harmless.

use std::fmt;
use std::time::Duration;

use crate::registry::EntryId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKind {
    Overlay,
    Spinner,
}

/// Identifies one armed timer. An entry owns at most one timer per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId {
    pub entry: EntryId,
    pub kind: TimerKind,
}

impl TimerId {
    pub fn overlay(entry: EntryId) -> Self {
        Self {
            entry,
            kind: TimerKind::Overlay,
        }
    }

    pub fn spinner(entry: EntryId) -> Self {
        Self {
            entry,
            kind: TimerKind::Spinner,
        }
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            TimerKind::Overlay => "overlay",
            TimerKind::Spinner => "spinner",
        };
        write!(f, "{}/{}", self.entry, kind)
    }
}

/// One-shot delayed callbacks on the host event loop.
pub trait TimerScheduler {
    /// Fire `timer` once after `delay`. Arming an id that is already pending
    /// replaces the pending one.
    fn arm(&mut self, timer: TimerId, delay: Duration);

    /// Cancel a timer. Canceling a fired or unknown timer is a no-op.
    fn cancel(&mut self, timer: TimerId);
}
