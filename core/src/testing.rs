//! Headless doubles for exercising the coordinator without a browser.
//!
//! - [`TestRegion`]: a node in a fake document tree, with ancestor links so
//!   containment can be checked.
//! - [`HeadlessPresenter`]: records every visual as plain data.
//! - [`VirtualScheduler`]: a manual clock; [`Coordinator::advance`] fires due
//!   timers in deadline order.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::hash::Hash;
use std::rc::Rc;
use std::time::Duration;

use crate::coordinator::Coordinator;
use crate::presentation::{LoadingMarker, PresentationPort, Region};
use crate::scheduler::{TimerId, TimerScheduler};

// ─────────────────────────────────────────────────────────────────────────────
// Regions
// ─────────────────────────────────────────────────────────────────────────────

/// A node identified by a number, carrying its ancestor chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRegion {
    id: u32,
    ancestors: Rc<[u32]>,
}

impl TestRegion {
    pub fn root(id: u32) -> Self {
        Self {
            id,
            ancestors: Rc::from(Vec::new()),
        }
    }

    pub fn child(&self, id: u32) -> Self {
        let mut ancestors = self.ancestors.to_vec();
        ancestors.push(self.id);
        Self {
            id,
            ancestors: Rc::from(ancestors),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }
}

impl Region for TestRegion {
    fn same_node(&self, other: &Self) -> bool {
        self.id == other.id
    }

    fn contains(&self, other: &Self) -> bool {
        self.id == other.id || other.ancestors.contains(&self.id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Presenter
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct HeadlessOverlay(u32);

#[derive(Debug)]
pub struct HeadlessSpinner(u32);

#[derive(Debug, Clone, PartialEq, Eq)]
struct OverlayNode {
    region: u32,
    attached: bool,
    spinner: Option<u32>,
}

/// Visual transitions, in the order the presenter received them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentEvent {
    OverlayCreated { region: u32 },
    OverlayReattached { region: u32 },
    OverlayPositioned { region: u32 },
    OverlayRemoved { region: u32 },
    SpinnerCreated { region: u32 },
    SpinnerRemoved { region: u32 },
    GlobalShown,
    GlobalSpinnerShown,
    GlobalReattached,
    GlobalHidden,
}

#[derive(Debug, Default)]
pub struct HeadlessPresenter {
    next_node: u32,
    overlays: BTreeMap<u32, OverlayNode>,
    markers: BTreeSet<(u32, LoadingMarker)>,
    global_overlay_created: bool,
    global_overlay_visible: bool,
    global_overlay_attached: bool,
    global_spinner_created: bool,
    global_spinner_attached: bool,
    log: Vec<PresentEvent>,
}

impl HeadlessPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Local overlays currently in the document.
    pub fn local_overlay_count(&self) -> usize {
        self.overlays.values().filter(|node| node.attached).count()
    }

    /// Local spinners currently in the document.
    pub fn local_spinner_count(&self) -> usize {
        self.overlays
            .values()
            .filter(|node| node.attached && node.spinner.is_some())
            .count()
    }

    pub fn has_overlay_for(&self, region: &TestRegion) -> bool {
        self.overlays
            .values()
            .any(|node| node.attached && node.region == region.id)
    }

    pub fn has_spinner_for(&self, region: &TestRegion) -> bool {
        self.overlays
            .values()
            .any(|node| node.attached && node.region == region.id && node.spinner.is_some())
    }

    pub fn has_marker(&self, region: &TestRegion, marker: LoadingMarker) -> bool {
        self.markers.contains(&(region.id, marker))
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// 0 or 1: the global overlay is created once and kept.
    pub fn global_overlay_count(&self) -> usize {
        usize::from(self.global_overlay_created)
    }

    pub fn global_overlay_visible(&self) -> bool {
        self.global_overlay_created && self.global_overlay_attached && self.global_overlay_visible
    }

    /// Global spinners currently in the document (0 or 1).
    pub fn global_spinner_count(&self) -> usize {
        usize::from(self.global_spinner_created && self.global_spinner_attached)
    }

    /// Simulate a swap that detached the overlay for `region` from the document.
    pub fn detach_overlay_for(&mut self, region: &TestRegion) {
        for node in self.overlays.values_mut() {
            if node.region == region.id {
                node.attached = false;
            }
        }
    }

    /// Simulate a body swap that dropped the global overlay from the document.
    pub fn detach_global_overlay(&mut self) {
        self.global_overlay_attached = false;
        self.global_spinner_attached = false;
    }

    pub fn log(&self) -> &[PresentEvent] {
        &self.log
    }

    pub fn count(&self, event: PresentEvent) -> usize {
        self.log.iter().filter(|e| **e == event).count()
    }

    fn node_id(&mut self) -> u32 {
        self.next_node += 1;
        self.next_node
    }
}

impl PresentationPort for HeadlessPresenter {
    type Region = TestRegion;
    type Overlay = HeadlessOverlay;
    type Spinner = HeadlessSpinner;

    fn create_overlay(&mut self, region: &TestRegion) -> Option<HeadlessOverlay> {
        let id = self.node_id();
        self.overlays.insert(
            id,
            OverlayNode {
                region: region.id,
                attached: true,
                spinner: None,
            },
        );
        self.log.push(PresentEvent::OverlayCreated { region: region.id });
        Some(HeadlessOverlay(id))
    }

    fn attach_overlay(&mut self, overlay: &HeadlessOverlay, region: &TestRegion) {
        if let Some(node) = self.overlays.get_mut(&overlay.0)
            && !node.attached
        {
            node.attached = true;
            self.log.push(PresentEvent::OverlayReattached { region: region.id });
        }
    }

    fn position_overlay(&mut self, overlay: &HeadlessOverlay, region: &TestRegion) {
        if self.overlays.contains_key(&overlay.0) {
            self.log.push(PresentEvent::OverlayPositioned { region: region.id });
        }
    }

    fn remove_overlay(&mut self, overlay: HeadlessOverlay) {
        if let Some(node) = self.overlays.remove(&overlay.0) {
            self.log.push(PresentEvent::OverlayRemoved { region: node.region });
        }
    }

    fn create_spinner(&mut self, overlay: &HeadlessOverlay) -> Option<HeadlessSpinner> {
        let id = self.node_id();
        let node = self.overlays.get_mut(&overlay.0)?;
        node.spinner = Some(id);
        let region = node.region;
        self.log.push(PresentEvent::SpinnerCreated { region });
        Some(HeadlessSpinner(id))
    }

    fn remove_spinner(&mut self, spinner: HeadlessSpinner) {
        for node in self.overlays.values_mut() {
            if node.spinner == Some(spinner.0) {
                node.spinner = None;
                self.log.push(PresentEvent::SpinnerRemoved { region: node.region });
            }
        }
    }

    fn set_marker(&mut self, region: &TestRegion, marker: LoadingMarker, on: bool) {
        if on {
            self.markers.insert((region.id, marker));
        } else {
            self.markers.remove(&(region.id, marker));
        }
    }

    fn show_global_overlay(&mut self) {
        self.global_overlay_created = true;
        self.global_overlay_visible = true;
        self.global_overlay_attached = true;
        self.global_spinner_attached = false;
        self.log.push(PresentEvent::GlobalShown);
    }

    fn show_global_spinner(&mut self) {
        if !self.global_overlay_created {
            return;
        }
        if !self.global_overlay_attached {
            self.global_overlay_attached = true;
            self.log.push(PresentEvent::GlobalReattached);
        }
        self.global_spinner_created = true;
        self.global_spinner_attached = true;
        self.log.push(PresentEvent::GlobalSpinnerShown);
    }

    fn hide_global(&mut self) {
        self.global_overlay_visible = false;
        self.global_spinner_attached = false;
        self.log.push(PresentEvent::GlobalHidden);
    }

    fn dispose(&mut self) {
        self.overlays.clear();
        self.markers.clear();
        self.global_overlay_created = false;
        self.global_overlay_visible = false;
        self.global_overlay_attached = false;
        self.global_spinner_created = false;
        self.global_spinner_attached = false;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scheduler
// ─────────────────────────────────────────────────────────────────────────────

/// Manual clock. Timers fire only when the test advances time.
#[derive(Debug, Default)]
pub struct VirtualScheduler {
    now: Duration,
    seq: u64,
    /// (deadline, arm order) -> timer
    pending: BTreeMap<(Duration, u64), TimerId>,
    fired: Vec<TimerId>,
    canceled: HashSet<TimerId>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_armed(&self, timer: TimerId) -> bool {
        self.pending.values().any(|t| *t == timer)
    }

    pub fn fired(&self) -> &[TimerId] {
        &self.fired
    }

    pub fn was_canceled(&self, timer: TimerId) -> bool {
        self.canceled.contains(&timer)
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<TimerId> {
        let (&key, _) = self.pending.iter().next().filter(|((at, _), _)| *at <= until)?;
        let timer = self.pending.remove(&key)?;
        self.now = key.0;
        self.fired.push(timer);
        Some(timer)
    }

    fn set_now(&mut self, now: Duration) {
        if now > self.now {
            self.now = now;
        }
    }
}

impl TimerScheduler for VirtualScheduler {
    fn arm(&mut self, timer: TimerId, delay: Duration) {
        self.pending.retain(|_, t| *t != timer);
        self.seq += 1;
        self.pending.insert((self.now + delay, self.seq), timer);
    }

    fn cancel(&mut self, timer: TimerId) {
        let before = self.pending.len();
        self.pending.retain(|_, t| *t != timer);
        if self.pending.len() < before {
            self.canceled.insert(timer);
        }
    }
}

impl<P, H> Coordinator<P, VirtualScheduler, H>
where
    P: PresentationPort,
    H: Eq + Hash + Clone + std::fmt::Debug,
{
    /// Move the virtual clock to `at`, firing every timer due on the way.
    pub fn advance_to(&mut self, at: Duration) {
        while let Some(timer) = self.scheduler_mut().pop_due(at) {
            self.on_timer(timer);
        }
        self.scheduler_mut().set_now(at);
    }

    /// Advance the virtual clock by `ms` milliseconds.
    pub fn advance(&mut self, ms: u64) {
        let at = self.scheduler().now() + Duration::from_millis(ms);
        self.advance_to(at);
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.scheduler().now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::EntryId;

    #[test]
    fn virtual_scheduler_fires_in_deadline_order() {
        let mut scheduler = VirtualScheduler::new();
        let late = TimerId::spinner(EntryId(1));
        let early = TimerId::overlay(EntryId(1));
        scheduler.arm(late, Duration::from_millis(400));
        scheduler.arm(early, Duration::from_millis(100));

        assert_eq!(scheduler.pop_due(Duration::from_millis(50)), None);
        assert_eq!(scheduler.pop_due(Duration::from_millis(500)), Some(early));
        assert_eq!(scheduler.now(), Duration::from_millis(100));
        assert_eq!(scheduler.pop_due(Duration::from_millis(500)), Some(late));
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn cancel_only_records_pending_timers() {
        let mut scheduler = VirtualScheduler::new();
        let timer = TimerId::overlay(EntryId(3));
        scheduler.cancel(timer);
        assert!(!scheduler.was_canceled(timer));

        scheduler.arm(timer, Duration::from_millis(10));
        assert!(scheduler.is_armed(timer));
        scheduler.cancel(timer);
        assert!(scheduler.was_canceled(timer));
        assert!(!scheduler.is_armed(timer));
    }

    #[test]
    fn region_containment() {
        let page = TestRegion::root(1);
        let panel = page.child(2);
        let row = panel.child(3);

        assert!(page.contains(&row));
        assert!(panel.contains(&panel));
        assert!(!row.contains(&panel));
        assert!(row.overlaps(&page));
        assert!(!page.child(4).overlaps(&row));
    }
}
