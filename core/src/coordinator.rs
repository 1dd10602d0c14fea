//! Indicator coordinator
//!
//! The explicit context object that owns the registration table, the
//! presentation port and the timer scheduler for one page session.
//!
//! # Lifecycle of an entry
//!
//! ```text
//!             start (new region)            overlay timer         spinner timer
//!   ─────────▶ Pending ─────────────────▶ OverlayVisible ──────▶ SpinnerVisible
//!                 │                              │                      │
//!                 └──────────────┬───────────────┴──────────────────────┘
//!                                │ last release / element match / force-clear
//!                                ▼
//!                            Finalized (absorbing)
//! ```
//!
//! Every path into `Finalized` goes through [`Coordinator::finalize`], which
//! takes the entry out of the table first; a second call finds nothing and
//! returns without side effects. That is what makes duplicate terminal
//! signals, timer/terminal races and force-clears safe to interleave.

use std::hash::Hash;
use std::time::Duration;

use hxbusy_types::{EventTable, IndicatorConfig, OverlayTracking, TerminalKind};

use crate::events::{self, Classified, EventDetail, Signal, StartRequest, Target};
use crate::presentation::{LoadingMarker, PresentationPort};
use crate::registry::{Entry, EntryId, EntryState, OpId, Registry, Scope};
use crate::scheduler::{TimerId, TimerKind, TimerScheduler};

/// What handling one signal did. Mostly useful for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not tracked: unknown event, exclusion, or coordinator not installed.
    Ignored,
    Registered {
        op: OpId,
        entry: EntryId,
        /// Joined an existing entry instead of creating one.
        joined: bool,
    },
    Released {
        op: OpId,
        entry: EntryId,
        finalized: bool,
    },
    /// Element fallback finalized this many entries.
    FinalizedByElement(usize),
    /// Force-clear finalized this many entries.
    Cleared(usize),
    /// Neither the handle nor the element matched anything.
    NoMatch,
}

/// Per-entry diagnostic view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySnapshot {
    pub id: EntryId,
    pub scope: Scope,
    pub state: EntryState,
    pub ops: Vec<OpId>,
    pub has_overlay: bool,
    pub has_spinner: bool,
}

/// Diagnostic view of the whole table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub entries: Vec<EntrySnapshot>,
    pub operations: usize,
    pub handles: usize,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.operations == 0 && self.handles == 0
    }
}

/// Owns all indicator state for one page session.
///
/// `H` is the host's request handle type; bindings that cannot hash their
/// native request objects stamp them with a key instead.
pub struct Coordinator<P: PresentationPort, S: TimerScheduler, H = u64> {
    registry: Registry<P, H>,
    presenter: P,
    scheduler: S,
    events: EventTable,
    overlay_delay: Duration,
    spinner_delay: Duration,
    tracking: OverlayTracking,
    next_op: u64,
    installed: bool,
}

impl<P, S, H> Coordinator<P, S, H>
where
    P: PresentationPort,
    S: TimerScheduler,
    H: Eq + Hash + Clone + std::fmt::Debug,
{
    /// Build a coordinator. It ignores every signal until [`install`](Self::install).
    pub fn new(config: &IndicatorConfig, presenter: P, scheduler: S) -> Self {
        Self {
            registry: Registry::new(),
            presenter,
            scheduler,
            events: config.events.clone(),
            overlay_delay: config.overlay_delay(),
            spinner_delay: config.spinner_delay(),
            tracking: config.tracking,
            next_op: 1,
            installed: false,
        }
    }

    pub fn install(&mut self) {
        if self.installed {
            tracing::warn!("Coordinator already installed");
            return;
        }
        self.installed = true;
        tracing::info!(
            overlay_delay_ms = self.overlay_delay.as_millis() as u64,
            spinner_delay_ms = self.spinner_delay.as_millis() as u64,
            events = self.events.len(),
            "Busy indicator coordinator installed"
        );
    }

    /// Finalize everything, release the presenter's visuals and stop
    /// accepting signals. The coordinator can be installed again.
    pub fn dispose(&mut self) {
        if !self.installed {
            return;
        }
        let cleared = self.force_clear_all();
        self.presenter.dispose();
        self.installed = false;
        tracing::info!(cleared, "Busy indicator coordinator disposed");
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    pub fn events(&self) -> &EventTable {
        &self.events
    }

    pub fn tracking(&self) -> OverlayTracking {
        self.tracking
    }

    pub fn registry(&self) -> &Registry<P, H> {
        &self.registry
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Ingress
    // ─────────────────────────────────────────────────────────────────────────

    /// Classify a host event by name and handle it.
    pub fn dispatch(&mut self, name: &str, detail: EventDetail<P::Region, H>) -> Outcome {
        match events::classify(&self.events, name, detail) {
            Classified::Signal(signal) => self.handle(signal),
            Classified::Excluded(reason) => {
                tracing::debug!(event = name, reason = reason.as_str(), "Request not tracked");
                Outcome::Ignored
            }
            Classified::Unknown => Outcome::Ignored,
        }
    }

    pub fn handle(&mut self, signal: Signal<P::Region, H>) -> Outcome {
        if !self.installed {
            tracing::debug!("Signal received before install, ignoring");
            return Outcome::Ignored;
        }

        match signal {
            Signal::Start(start) => self.start(start),
            Signal::Terminal {
                kind,
                request,
                element,
            } => self.settle(kind, request, element),
            Signal::NavigationInvalidate => Outcome::Cleared(self.force_clear_all()),
            Signal::PreCleanup { element } => match element {
                Some(element) => match self.release_by_element(&element) {
                    0 => Outcome::NoMatch,
                    n => Outcome::FinalizedByElement(n),
                },
                None => Outcome::NoMatch,
            },
        }
    }

    fn start(&mut self, start: StartRequest<P::Region, H>) -> Outcome {
        let op = OpId(self.next_op);
        self.next_op += 1;

        let StartRequest { target, request } = start;
        let joined = match target {
            Target::Page => self.registry.global().is_some(),
            Target::Region(ref region) => self.registry.find_local(region).is_some(),
        };
        let entry = match target {
            Target::Page => self.register_global(op, request),
            Target::Region(region) => self.register_local(op, region, request),
        };
        Outcome::Registered { op, entry, joined }
    }

    fn settle(
        &mut self,
        kind: TerminalKind,
        request: Option<H>,
        element: Option<P::Region>,
    ) -> Outcome {
        if let Some(op) = request.as_ref().and_then(|h| self.registry.op_for_handle(h))
            && let Some((entry, finalized)) = self.release(op)
        {
            tracing::trace!(%op, %entry, %kind, finalized, "Request settled");
            return Outcome::Released {
                op,
                entry,
                finalized,
            };
        }

        if let Some(element) = element {
            let finalized = self.release_by_element(&element);
            if finalized > 0 {
                return Outcome::FinalizedByElement(finalized);
            }
        }

        tracing::trace!(%kind, ?request, "Terminal signal matched nothing");
        Outcome::NoMatch
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Registration
    // ─────────────────────────────────────────────────────────────────────────

    /// Attach `op` to the live entry for `target`, creating it (and arming its
    /// timers) if there is none.
    pub fn register_local(&mut self, op: OpId, target: P::Region, request: Option<H>) -> EntryId {
        let entry = match self.registry.find_local(&target) {
            Some(entry) => entry,
            None => {
                let entry = self.registry.create(Scope::Local, Some(target));
                self.arm_timers(entry);
                entry
            }
        };
        self.registry.attach(op, entry, request);
        tracing::debug!(
            %op,
            %entry,
            scope = "local",
            refs = self.ref_count(entry),
            "Operation registered"
        );
        entry
    }

    /// Attach `op` to the global entry, creating it if there is none.
    pub fn register_global(&mut self, op: OpId, request: Option<H>) -> EntryId {
        let entry = match self.registry.global() {
            Some(entry) => entry,
            None => {
                let entry = self.registry.create(Scope::Global, None);
                self.arm_timers(entry);
                entry
            }
        };
        self.registry.attach(op, entry, request);
        tracing::debug!(
            %op,
            %entry,
            scope = "global",
            refs = self.ref_count(entry),
            "Operation registered"
        );
        entry
    }

    /// Drop `op` from its entry, finalizing the entry when it was the last
    /// reference. `None` if `op` was not registered.
    pub fn release(&mut self, op: OpId) -> Option<(EntryId, bool)> {
        let (entry, remaining) = self.registry.detach(op)?;
        let finalized = remaining == 0 && self.finalize(entry);
        Some((entry, finalized))
    }

    /// Finalize every local entry whose target equals, contains, or lies
    /// inside `element`. Returns how many entries were finalized.
    pub fn release_by_element(&mut self, element: &P::Region) -> usize {
        self.registry
            .find_overlapping(element)
            .into_iter()
            .filter(|entry| self.finalize(*entry))
            .count()
    }

    /// Finalize every entry regardless of reference counts.
    pub fn force_clear_all(&mut self) -> usize {
        let cleared = self
            .registry
            .entry_ids()
            .into_iter()
            .filter(|entry| self.finalize(*entry))
            .count();
        if cleared > 0 {
            tracing::debug!(cleared, "Force-cleared all indicators");
        }
        cleared
    }

    fn ref_count(&self, entry: EntryId) -> usize {
        self.registry.get(entry).map_or(0, Entry::ref_count)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Timers
    // ─────────────────────────────────────────────────────────────────────────

    fn arm_timers(&mut self, id: EntryId) {
        let Some(entry) = self.registry.get_mut(id) else {
            return;
        };
        let overlay = TimerId::overlay(id);
        let spinner = TimerId::spinner(id);
        entry.overlay_timer = Some(overlay);
        entry.spinner_timer = Some(spinner);
        self.scheduler.arm(overlay, self.overlay_delay);
        self.scheduler.arm(spinner, self.spinner_delay);
    }

    /// Deliver a fired timer. Stale timers (entry finalized or gone) are dropped.
    pub fn on_timer(&mut self, timer: TimerId) {
        let Self {
            registry,
            presenter,
            ..
        } = self;
        let Some(entry) = registry.get_mut(timer.entry) else {
            tracing::trace!(%timer, "Timer fired for finalized entry");
            return;
        };
        if entry.refs.is_empty() || entry.state == EntryState::Finalized {
            return;
        }

        match timer.kind {
            TimerKind::Overlay => {
                entry.overlay_timer = None;
                reveal_overlay(entry, presenter);
            }
            TimerKind::Spinner => {
                entry.spinner_timer = None;
                reveal_overlay(entry, presenter);
                reveal_spinner(entry, presenter);
            }
        }
        tracing::debug!(%timer, state = ?entry.state, "Indicator revealed");
    }

    /// Re-position visible local overlays. Only acts under
    /// [`OverlayTracking::FollowLayout`].
    pub fn refresh_layout(&mut self) {
        if self.tracking != OverlayTracking::FollowLayout {
            return;
        }
        let Self {
            registry,
            presenter,
            ..
        } = self;
        for entry in registry.entries_mut() {
            if let (Some(overlay), Some(target)) = (&entry.overlay, &entry.target) {
                presenter.position_overlay(overlay, target);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Finalization
    // ─────────────────────────────────────────────────────────────────────────

    /// Tear down one entry. Returns `false` if it was already finalized.
    pub fn finalize(&mut self, id: EntryId) -> bool {
        let Some(mut entry) = self.registry.take(id) else {
            return false;
        };
        let previous = entry.state;
        entry.state = EntryState::Finalized;

        // Fired timers are canceled too; the scheduler treats that as a no-op.
        self.scheduler.cancel(TimerId::overlay(id));
        self.scheduler.cancel(TimerId::spinner(id));
        entry.overlay_timer = None;
        entry.spinner_timer = None;

        match entry.scope {
            Scope::Global => self.presenter.hide_global(),
            Scope::Local => {
                if let Some(target) = &entry.target {
                    self.presenter.set_marker(target, LoadingMarker::Spinner, false);
                    self.presenter.set_marker(target, LoadingMarker::Loading, false);
                }
                if let Some(spinner) = entry.spinner.take() {
                    self.presenter.remove_spinner(spinner);
                }
                if let Some(overlay) = entry.overlay.take() {
                    self.presenter.remove_overlay(overlay);
                }
            }
        }

        tracing::debug!(
            entry = %id,
            scope = %entry.scope,
            from = ?previous,
            dropped_refs = entry.refs.len(),
            "Indicator finalized"
        );
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Diagnostics
    // ─────────────────────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Snapshot {
        let mut entries: Vec<EntrySnapshot> = self
            .registry
            .entries()
            .map(|entry| EntrySnapshot {
                id: entry.id,
                scope: entry.scope,
                state: entry.state,
                ops: entry.refs.iter().copied().collect(),
                has_overlay: entry.overlay.is_some(),
                has_spinner: entry.spinner.is_some(),
            })
            .collect();
        entries.sort_by_key(|entry| entry.id);
        Snapshot {
            entries,
            operations: self.registry.operation_count(),
            handles: self.registry.handle_count(),
        }
    }
}

fn reveal_overlay<P: PresentationPort>(entry: &mut Entry<P>, presenter: &mut P) {
    match entry.scope {
        Scope::Global => {
            // The spinner timer may beat the overlay timer with custom delays.
            if entry.state < EntryState::OverlayVisible {
                presenter.show_global_overlay();
            }
        }
        Scope::Local => {
            let Some(target) = &entry.target else {
                return;
            };
            match &entry.overlay {
                Some(overlay) => presenter.attach_overlay(overlay, target),
                None => entry.overlay = presenter.create_overlay(target),
            }
            if entry.overlay.is_none() {
                return;
            }
            presenter.set_marker(target, LoadingMarker::Loading, true);
        }
    }
    entry.advance(EntryState::OverlayVisible);
}

fn reveal_spinner<P: PresentationPort>(entry: &mut Entry<P>, presenter: &mut P) {
    match entry.scope {
        Scope::Global => presenter.show_global_spinner(),
        Scope::Local => {
            let (Some(target), Some(overlay)) = (&entry.target, &entry.overlay) else {
                return;
            };
            if entry.spinner.is_none() {
                entry.spinner = presenter.create_spinner(overlay);
            }
            if entry.spinner.is_none() {
                return;
            }
            presenter.set_marker(target, LoadingMarker::Spinner, true);
        }
    }
    entry.advance(EntryState::SpinnerVisible);
}
