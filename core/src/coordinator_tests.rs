//! Tests for the indicator coordinator
//!
//! Drives the coordinator through the headless presenter and the virtual
//! clock: delay tiers, shared entries, repeated terminal signals, element
//! fallback, force-clear and the global singleton.

use std::time::Duration;

use hxbusy_types::{EventTable, IndicatorConfig, OverlayTracking, SignalKind, TerminalKind};

use crate::coordinator::{Coordinator, Outcome};
use crate::events::{EventDetail, Signal, StartRequest, Target};
use crate::presentation::LoadingMarker;
use crate::registry::{EntryState, OpId, Scope};
use crate::scheduler::TimerId;
use crate::testing::{HeadlessPresenter, PresentEvent, TestRegion, VirtualScheduler};

type TestCoordinator = Coordinator<HeadlessPresenter, VirtualScheduler, u32>;

fn coordinator() -> TestCoordinator {
    coordinator_with(IndicatorConfig::default())
}

fn coordinator_with(config: IndicatorConfig) -> TestCoordinator {
    let mut coordinator =
        Coordinator::new(&config, HeadlessPresenter::new(), VirtualScheduler::new());
    coordinator.install();
    coordinator
}

fn start_local(c: &mut TestCoordinator, region: &TestRegion, request: u32) -> Outcome {
    c.handle(Signal::Start(StartRequest {
        target: Target::Region(region.clone()),
        request: Some(request),
    }))
}

fn start_global(c: &mut TestCoordinator, request: u32) -> Outcome {
    c.handle(Signal::Start(StartRequest {
        target: Target::Page,
        request: Some(request),
    }))
}

fn terminal(c: &mut TestCoordinator, request: u32) -> Outcome {
    c.handle(Signal::Terminal {
        kind: TerminalKind::Success,
        request: Some(request),
        element: None,
    })
}

fn terminal_with(
    c: &mut TestCoordinator,
    kind: TerminalKind,
    request: Option<u32>,
    element: Option<&TestRegion>,
) -> Outcome {
    c.handle(Signal::Terminal {
        kind,
        request,
        element: element.cloned(),
    })
}

fn registered_op(outcome: &Outcome) -> OpId {
    match outcome {
        Outcome::Registered { op, .. } => *op,
        other => panic!("expected registration, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Delay tiers
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn fast_request_shows_nothing() {
    let mut c = coordinator();
    let panel = TestRegion::root(1);

    start_local(&mut c, &panel, 10);
    c.advance(99);
    terminal(&mut c, 10);
    c.advance(1_000);

    assert!(c.presenter().log().is_empty());
    assert_eq!(c.presenter().marker_count(), 0);
    assert_eq!(c.scheduler().pending_count(), 0);
    assert!(c.snapshot().is_empty());
}

#[test]
fn moderate_request_shows_overlay_only() {
    let mut c = coordinator();
    let panel = TestRegion::root(1);

    start_local(&mut c, &panel, 10);
    c.advance(100);
    assert!(c.presenter().has_overlay_for(&panel));
    assert!(c.presenter().has_marker(&panel, LoadingMarker::Loading));
    assert!(!c.presenter().has_spinner_for(&panel));

    c.advance(200);
    terminal(&mut c, 10);
    c.advance(1_000);

    assert_eq!(c.presenter().local_overlay_count(), 0);
    assert_eq!(
        c.presenter().count(PresentEvent::SpinnerCreated { region: 1 }),
        0
    );
    assert_eq!(c.presenter().marker_count(), 0);
}

#[test]
fn slow_request_shows_both_then_removes_both() {
    let mut c = coordinator();
    let panel = TestRegion::root(1);

    start_local(&mut c, &panel, 10);
    c.advance(400);
    assert!(c.presenter().has_overlay_for(&panel));
    assert!(c.presenter().has_spinner_for(&panel));
    assert!(c.presenter().has_marker(&panel, LoadingMarker::Spinner));
    assert_eq!(c.snapshot().entries[0].state, EntryState::SpinnerVisible);

    terminal(&mut c, 10);
    assert_eq!(c.presenter().local_overlay_count(), 0);
    assert_eq!(c.presenter().local_spinner_count(), 0);
    assert_eq!(c.presenter().marker_count(), 0);
    assert_eq!(
        c.presenter().log(),
        &[
            PresentEvent::OverlayCreated { region: 1 },
            PresentEvent::SpinnerCreated { region: 1 },
            PresentEvent::SpinnerRemoved { region: 1 },
            PresentEvent::OverlayRemoved { region: 1 },
        ]
    );
}

#[test]
fn spinner_timer_creates_overlay_when_it_fires_first() {
    let mut c = coordinator_with(IndicatorConfig {
        overlay_delay_ms: 500,
        spinner_delay_ms: 100,
        ..Default::default()
    });
    let panel = TestRegion::root(1);

    start_local(&mut c, &panel, 10);
    c.advance(100);
    assert!(c.presenter().has_overlay_for(&panel));
    assert!(c.presenter().has_spinner_for(&panel));

    c.advance(400);
    assert_eq!(
        c.presenter().count(PresentEvent::OverlayCreated { region: 1 }),
        1
    );
    assert_eq!(
        c.presenter().count(PresentEvent::SpinnerCreated { region: 1 }),
        1
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Reference counting
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn concurrent_requests_share_one_entry() {
    let mut c = coordinator();
    let panel = TestRegion::root(1);

    let first = start_local(&mut c, &panel, 10);
    let second = start_local(&mut c, &panel, 20);
    let (
        Outcome::Registered {
            entry: a,
            joined: false,
            ..
        },
        Outcome::Registered {
            entry: b,
            joined: true,
            ..
        },
    ) = (&first, &second)
    else {
        panic!("unexpected outcomes {first:?} / {second:?}");
    };
    assert_eq!(a, b);
    assert_eq!(c.scheduler().pending_count(), 2);

    let released = terminal(&mut c, 10);
    assert!(matches!(released, Outcome::Released { finalized: false, .. }));
    assert_eq!(c.registry().len(), 1);

    let released = terminal(&mut c, 20);
    assert!(matches!(released, Outcome::Released { finalized: true, .. }));
    assert!(c.registry().is_empty());
    assert_eq!(c.scheduler().pending_count(), 0);
}

#[test]
fn scenario_join_release_and_cancel_spinner() {
    let mut c = coordinator();
    let region = TestRegion::root(7);

    let op1 = registered_op(&start_local(&mut c, &region, 1));
    c.advance_to(Duration::from_millis(50));
    let op2 = registered_op(&start_local(&mut c, &region, 2));
    let entry = c.registry().entry_of(op1).unwrap();
    assert_eq!(c.registry().entry_of(op2), Some(entry));
    // Joining arms nothing new.
    assert_eq!(c.scheduler().pending_count(), 2);

    c.advance_to(Duration::from_millis(90));
    assert_eq!(
        terminal(&mut c, 1),
        Outcome::Released {
            op: op1,
            entry,
            finalized: false
        }
    );

    c.advance_to(Duration::from_millis(100));
    assert!(c.presenter().has_overlay_for(&region));

    c.advance_to(Duration::from_millis(120));
    assert_eq!(
        terminal(&mut c, 2),
        Outcome::Released {
            op: op2,
            entry,
            finalized: true
        }
    );
    assert!(!c.presenter().has_overlay_for(&region));
    assert!(c.scheduler().was_canceled(TimerId::spinner(entry)));

    c.advance_to(Duration::from_millis(1_000));
    assert!(!c.scheduler().fired().contains(&TimerId::spinner(entry)));
    assert_eq!(
        c.presenter().count(PresentEvent::SpinnerCreated { region: 7 }),
        0
    );
}

#[test]
fn different_regions_get_separate_entries() {
    let mut c = coordinator();
    let page = TestRegion::root(1);
    let left = page.child(2);
    let right = page.child(3);

    start_local(&mut c, &left, 10);
    start_local(&mut c, &right, 20);
    c.advance(150);
    assert_eq!(c.registry().len(), 2);
    assert_eq!(c.presenter().local_overlay_count(), 2);

    terminal(&mut c, 10);
    assert!(!c.presenter().has_overlay_for(&left));
    assert!(c.presenter().has_overlay_for(&right));
}

// ─────────────────────────────────────────────────────────────────────────────
// Idempotence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn repeated_terminal_signals_only_act_once() {
    let mut c = coordinator();
    let panel = TestRegion::root(1);

    start_local(&mut c, &panel, 10);
    c.advance(500);
    let first = terminal_with(&mut c, TerminalKind::Error, Some(10), Some(&panel));
    assert!(matches!(first, Outcome::Released { finalized: true, .. }));
    let log_len = c.presenter().log().len();

    // responseError, afterRequest, afterSwap, loadend... all for the same request.
    for kind in TerminalKind::ALL {
        let outcome = terminal_with(&mut c, kind, Some(10), Some(&panel));
        assert_eq!(outcome, Outcome::NoMatch);
    }
    assert_eq!(c.presenter().log().len(), log_len);
}

#[test]
fn released_handle_no_longer_resolves() {
    let mut c = coordinator();
    let panel = TestRegion::root(1);

    start_local(&mut c, &panel, 10);
    start_local(&mut c, &panel, 20);
    c.advance(150);

    terminal(&mut c, 10);
    // Handle-only repeat: nothing to resolve, no element to fall back to.
    assert_eq!(terminal(&mut c, 10), Outcome::NoMatch);
    assert!(c.presenter().has_overlay_for(&panel));
    assert_eq!(c.registry().len(), 1);
    assert_eq!(c.registry().op_for_handle(&10), None);
}

#[test]
fn overlapping_requests_on_one_region_do_not_accumulate_handles() {
    let mut c = coordinator();
    let panel = TestRegion::root(1);

    // Polling with slow responses: the next request starts before the
    // previous one settles, so the entry is never finalized.
    start_local(&mut c, &panel, 0);
    for request in 1..1_000 {
        start_local(&mut c, &panel, request);
        terminal(&mut c, request - 1);
        let snapshot = c.snapshot();
        assert_eq!(snapshot.handles, snapshot.operations);
    }

    let snapshot = c.snapshot();
    assert_eq!(snapshot.entries.len(), 1);
    assert_eq!(snapshot.operations, 1);
    assert_eq!(snapshot.handles, 1);
}

#[test]
fn finalize_twice_is_a_no_op() {
    let mut c = coordinator();
    let panel = TestRegion::root(1);

    start_local(&mut c, &panel, 10);
    c.advance(500);
    let entry = c.registry().entry_ids()[0];

    assert!(c.finalize(entry));
    let log_len = c.presenter().log().len();
    assert!(!c.finalize(entry));
    assert_eq!(c.release_by_element(&panel), 0);
    assert_eq!(c.force_clear_all(), 0);
    assert_eq!(c.presenter().log().len(), log_len);
}

#[test]
fn timer_for_finalized_entry_is_dropped() {
    let mut c = coordinator();
    let panel = TestRegion::root(1);

    start_local(&mut c, &panel, 10);
    let entry = c.registry().entry_ids()[0];
    terminal(&mut c, 10);

    // Same-turn race: the host delivers the already-queued callback anyway.
    c.on_timer(TimerId::overlay(entry));
    c.on_timer(TimerId::spinner(entry));
    assert!(c.presenter().log().is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Element fallback and cleanup
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn terminal_with_only_element_finalizes_matching_entry() {
    let mut c = coordinator();
    let panel = TestRegion::root(1);

    start_local(&mut c, &panel, 10);
    c.advance(150);
    let outcome = terminal_with(&mut c, TerminalKind::Abort, None, Some(&panel));
    assert_eq!(outcome, Outcome::FinalizedByElement(1));
    assert!(c.registry().is_empty());
    assert_eq!(c.registry().handle_count(), 0);
}

#[test]
fn unknown_handle_falls_back_to_element() {
    let mut c = coordinator();
    let panel = TestRegion::root(1);

    start_local(&mut c, &panel, 10);
    let outcome = terminal_with(&mut c, TerminalKind::Timeout, Some(99), Some(&panel));
    assert_eq!(outcome, Outcome::FinalizedByElement(1));
}

#[test]
fn element_fallback_matches_containment_both_ways() {
    let mut c = coordinator();
    let page = TestRegion::root(1);
    let panel = page.child(2);
    let row = panel.child(3);
    let other = page.child(4);

    start_local(&mut c, &panel, 10);
    start_local(&mut c, &other, 20);

    // Subtree replaced: the event names a descendant of the original target.
    assert_eq!(c.release_by_element(&row), 1);
    assert_eq!(c.registry().len(), 1);

    start_local(&mut c, &panel, 30);
    // Ancestor removed: both remaining local entries live inside it.
    assert_eq!(c.release_by_element(&page), 2);
    assert!(c.registry().is_empty());
}

#[test]
fn element_fallback_leaves_global_entry_alone() {
    let mut c = coordinator();
    let body = TestRegion::root(1);

    start_global(&mut c, 10);
    assert_eq!(c.release_by_element(&body), 0);
    assert_eq!(c.registry().len(), 1);
}

#[test]
fn pre_cleanup_finalizes_removed_subtree() {
    let mut c = coordinator();
    let page = TestRegion::root(1);
    let panel = page.child(2);

    start_local(&mut c, &panel, 10);
    c.advance(150);
    let outcome = c.handle(Signal::PreCleanup {
        element: Some(panel.child(5)),
    });
    assert_eq!(outcome, Outcome::FinalizedByElement(1));
    assert!(!c.presenter().has_overlay_for(&panel));

    let outcome = c.handle(Signal::PreCleanup { element: None });
    assert_eq!(outcome, Outcome::NoMatch);
}

#[test]
fn miss_on_handle_and_element_is_no_match() {
    let mut c = coordinator();
    let panel = TestRegion::root(1);

    start_local(&mut c, &panel, 10);
    let outcome = terminal_with(&mut c, TerminalKind::Success, Some(42), Some(&TestRegion::root(9)));
    assert_eq!(outcome, Outcome::NoMatch);
    assert_eq!(c.registry().len(), 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Force-clear
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn navigation_invalidate_clears_everything() {
    let mut c = coordinator();
    let page = TestRegion::root(1);
    let left = page.child(2);
    let right = page.child(3);

    start_local(&mut c, &left, 10);
    start_local(&mut c, &left, 11);
    start_local(&mut c, &right, 20);
    start_global(&mut c, 30);
    c.advance(500);
    assert_eq!(c.registry().len(), 3);

    let outcome = c.handle(Signal::NavigationInvalidate);
    assert_eq!(outcome, Outcome::Cleared(3));
    assert!(c.snapshot().is_empty());
    assert_eq!(c.presenter().local_overlay_count(), 0);
    assert!(!c.presenter().global_overlay_visible());
    assert_eq!(c.scheduler().pending_count(), 0);

    // Late terminal signals for the cleared requests find nothing.
    assert_eq!(terminal(&mut c, 11), Outcome::NoMatch);
    assert_eq!(terminal(&mut c, 30), Outcome::NoMatch);
}

#[test]
fn force_clear_cancels_unfired_timers() {
    let mut c = coordinator();
    let panel = TestRegion::root(1);

    start_local(&mut c, &panel, 10);
    assert_eq!(c.force_clear_all(), 1);
    c.advance(1_000);
    assert!(c.scheduler().fired().is_empty());
    assert!(c.presenter().log().is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Global singleton
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn concurrent_global_requests_share_one_overlay() {
    let mut c = coordinator();

    for request in 1..=5 {
        start_global(&mut c, request);
    }
    assert_eq!(c.registry().len(), 1);
    assert_eq!(c.scheduler().pending_count(), 2);

    c.advance(500);
    assert_eq!(c.presenter().global_overlay_count(), 1);
    assert_eq!(c.presenter().global_spinner_count(), 1);
    assert!(c.presenter().global_overlay_visible());

    for request in 1..=4 {
        terminal(&mut c, request);
        assert!(c.presenter().global_overlay_visible());
    }

    terminal(&mut c, 5);
    assert!(!c.presenter().global_overlay_visible());
    // Hidden, not destroyed.
    assert_eq!(c.presenter().global_overlay_count(), 1);
    assert_eq!(c.presenter().global_spinner_count(), 0);
    assert_eq!(c.registry().global(), None);
}

#[test]
fn global_visuals_are_reused_across_requests() {
    let mut c = coordinator();

    start_global(&mut c, 1);
    c.advance(500);
    terminal(&mut c, 1);

    start_global(&mut c, 2);
    c.advance(500);
    assert!(c.presenter().global_overlay_visible());
    assert_eq!(c.presenter().global_overlay_count(), 1);
    assert_eq!(c.presenter().global_spinner_count(), 1);
    assert_eq!(c.presenter().count(PresentEvent::GlobalHidden), 1);
}

#[test]
fn global_spinner_reattaches_an_overlay_dropped_by_a_swap() {
    let mut c = coordinator();

    start_global(&mut c, 1);
    c.advance(100);
    c.presenter_mut().detach_global_overlay();
    assert!(!c.presenter().global_overlay_visible());

    c.advance(300);
    assert!(c.presenter().global_overlay_visible());
    assert_eq!(c.presenter().global_spinner_count(), 1);
    assert_eq!(c.presenter().count(PresentEvent::GlobalReattached), 1);
    assert_eq!(c.presenter().count(PresentEvent::GlobalShown), 1);
}

#[test]
fn global_and_local_entries_are_independent() {
    let mut c = coordinator();
    let panel = TestRegion::root(2);

    start_global(&mut c, 1);
    start_local(&mut c, &panel, 2);
    c.advance(150);
    terminal(&mut c, 1);

    assert!(!c.presenter().global_overlay_visible());
    assert!(c.presenter().has_overlay_for(&panel));
    assert_eq!(c.snapshot().entries[0].scope, Scope::Local);
}

// ─────────────────────────────────────────────────────────────────────────────
// Presentation details
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn detached_overlay_is_reattached_on_next_show() {
    let mut c = coordinator();
    let panel = TestRegion::root(1);

    start_local(&mut c, &panel, 10);
    c.advance(150);
    c.presenter_mut().detach_overlay_for(&panel);
    assert!(!c.presenter().has_overlay_for(&panel));

    c.advance(300);
    assert!(c.presenter().has_overlay_for(&panel));
    assert_eq!(
        c.presenter().count(PresentEvent::OverlayReattached { region: 1 }),
        1
    );
    assert_eq!(
        c.presenter().count(PresentEvent::OverlayCreated { region: 1 }),
        1
    );
}

#[test]
fn follow_layout_repositions_visible_overlays() {
    let mut c = coordinator_with(IndicatorConfig {
        tracking: OverlayTracking::FollowLayout,
        ..Default::default()
    });
    let panel = TestRegion::root(1);

    start_local(&mut c, &panel, 10);
    c.refresh_layout();
    assert_eq!(
        c.presenter().count(PresentEvent::OverlayPositioned { region: 1 }),
        0
    );

    c.advance(150);
    c.refresh_layout();
    c.refresh_layout();
    assert_eq!(
        c.presenter().count(PresentEvent::OverlayPositioned { region: 1 }),
        2
    );
}

#[test]
fn static_tracking_ignores_layout_changes() {
    let mut c = coordinator();
    let panel = TestRegion::root(1);

    start_local(&mut c, &panel, 10);
    c.advance(150);
    c.refresh_layout();
    assert_eq!(
        c.presenter().count(PresentEvent::OverlayPositioned { region: 1 }),
        0
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Ingress and lifecycle
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn dispatch_classifies_host_event_names() {
    let mut c = coordinator();
    let panel = TestRegion::root(2);

    let started = c.dispatch(
        "htmx:beforeRequest",
        EventDetail::new().with_target(panel.clone()).with_request(10),
    );
    assert!(matches!(started, Outcome::Registered { joined: false, .. }));

    let ignored = c.dispatch("htmx:configRequest", EventDetail::new().with_request(10));
    assert_eq!(ignored, Outcome::Ignored);

    let settled = c.dispatch("htmx:responseError", EventDetail::new().with_request(10));
    assert!(matches!(settled, Outcome::Released { finalized: true, .. }));

    let again = c.dispatch(
        "htmx:afterRequest",
        EventDetail::new().with_request(10).with_target(panel),
    );
    assert_eq!(again, Outcome::NoMatch);
}

#[test]
fn dispatch_routes_boosted_and_body_requests_to_global() {
    let mut c = coordinator();
    let main = TestRegion::root(3);

    c.dispatch(
        "htmx:beforeRequest",
        EventDetail::new().with_target(main.clone()).with_request(1).boosted(),
    );
    c.dispatch(
        "htmx:beforeRequest",
        EventDetail::new().with_target(TestRegion::root(1)).with_request(2).page_root(),
    );
    assert_eq!(c.registry().len(), 1);
    assert!(c.registry().global().is_some());
}

#[test]
fn excluded_requests_are_not_tracked() {
    let mut c = coordinator();
    let panel = TestRegion::root(2);

    let mut preloaded = EventDetail::new().with_target(panel.clone()).with_request(1);
    preloaded.preloaded = true;
    assert_eq!(c.dispatch("htmx:beforeRequest", preloaded), Outcome::Ignored);

    let mut opted_out = EventDetail::new().with_target(panel).with_request(2);
    opted_out.opted_out = true;
    assert_eq!(c.dispatch("htmx:beforeRequest", opted_out), Outcome::Ignored);

    assert!(c.registry().is_empty());
    assert_eq!(c.scheduler().pending_count(), 0);
}

#[test]
fn custom_event_table_is_honoured() {
    let mut events = EventTable::empty();
    events.insert("app:busy", SignalKind::Start);
    events.insert("app:idle", SignalKind::Terminal(TerminalKind::Success));
    let mut c = coordinator_with(IndicatorConfig {
        events,
        ..Default::default()
    });
    let panel = TestRegion::root(2);

    assert_eq!(
        c.dispatch(
            "htmx:beforeRequest",
            EventDetail::new().with_target(panel.clone()).with_request(1)
        ),
        Outcome::Ignored
    );
    assert!(matches!(
        c.dispatch("app:busy", EventDetail::new().with_target(panel).with_request(1)),
        Outcome::Registered { .. }
    ));
    assert!(matches!(
        c.dispatch("app:idle", EventDetail::new().with_request(1)),
        Outcome::Released { finalized: true, .. }
    ));
}

#[test]
fn signals_before_install_are_ignored() {
    let config = IndicatorConfig::default();
    let mut c: TestCoordinator =
        Coordinator::new(&config, HeadlessPresenter::new(), VirtualScheduler::new());
    let panel = TestRegion::root(1);

    assert_eq!(start_local(&mut c, &panel, 1), Outcome::Ignored);
    assert!(!c.is_installed());
    assert!(c.registry().is_empty());
}

#[test]
fn dispose_drains_state_and_allows_reinstall() {
    let mut c = coordinator();
    let panel = TestRegion::root(1);

    start_local(&mut c, &panel, 1);
    start_global(&mut c, 2);
    c.advance(500);

    c.dispose();
    assert!(!c.is_installed());
    assert!(c.snapshot().is_empty());
    assert_eq!(c.presenter().global_overlay_count(), 0);
    assert_eq!(c.presenter().local_overlay_count(), 0);
    assert_eq!(start_local(&mut c, &panel, 3), Outcome::Ignored);

    c.install();
    assert!(matches!(
        start_local(&mut c, &panel, 4),
        Outcome::Registered { joined: false, .. }
    ));
}

#[test]
fn operation_ids_are_never_reused() {
    let mut c = coordinator();
    let panel = TestRegion::root(1);

    let mut seen = Vec::new();
    for request in 0..4 {
        let op = registered_op(&start_local(&mut c, &panel, request));
        assert!(!seen.contains(&op));
        seen.push(op);
        terminal(&mut c, request);
    }
}

#[test]
fn snapshot_reports_entry_state_and_refs() {
    let mut c = coordinator();
    let panel = TestRegion::root(1);

    let a = registered_op(&start_local(&mut c, &panel, 1));
    let b = registered_op(&start_local(&mut c, &panel, 2));
    c.advance(150);

    let snapshot = c.snapshot();
    assert_eq!(snapshot.entries.len(), 1);
    assert_eq!(snapshot.entries[0].ops, vec![a, b]);
    assert_eq!(snapshot.entries[0].state, EntryState::OverlayVisible);
    assert!(snapshot.entries[0].has_overlay);
    assert!(!snapshot.entries[0].has_spinner);
    assert_eq!(snapshot.operations, 2);
    assert_eq!(snapshot.handles, 2);
}
