//! `setTimeout`-backed timer scheduler.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Weak;
use std::time::Duration;

use gloo_timers::callback::Timeout;

use hxbusy_core::{TimerId, TimerScheduler};

use crate::DomCoordinator;

/// Schedules timers on the browser event loop and delivers them back to the
/// coordinator that owns this scheduler.
pub struct GlooScheduler {
    coordinator: Weak<RefCell<DomCoordinator>>,
    /// Fired timers stay here until canceled or re-armed; dropping a fired
    /// `Timeout` only clears an id the browser has already forgotten.
    pending: HashMap<TimerId, Timeout>,
}

impl GlooScheduler {
    pub fn new(coordinator: Weak<RefCell<DomCoordinator>>) -> Self {
        Self {
            coordinator,
            pending: HashMap::new(),
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl TimerScheduler for GlooScheduler {
    fn arm(&mut self, timer: TimerId, delay: Duration) {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        let coordinator = self.coordinator.clone();
        let timeout = Timeout::new(millis, move || {
            let Some(coordinator) = coordinator.upgrade() else {
                return;
            };
            match coordinator.try_borrow_mut() {
                Ok(mut coordinator) => coordinator.on_timer(timer),
                Err(_) => tracing::warn!(%timer, "Coordinator busy, timer dropped"),
            };
        });
        // Replacing an entry drops (and clears) the previous timeout.
        self.pending.insert(timer, timeout);
    }

    fn cancel(&mut self, timer: TimerId) {
        self.pending.remove(&timer);
    }
}
