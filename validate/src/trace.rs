//! Event traces and headless replay.
//!
//! A trace is a TOML document naming a small region tree and a list of
//! timestamped htmx events:
//!
//! ```toml
//! [regions]
//! main = {}
//! list = { parent = "main" }
//!
//! [[step]]
//! at_ms = 0
//! event = "htmx:beforeRequest"
//! target = "list"
//! request = 1
//!
//! [[step]]
//! at_ms = 450
//! event = "htmx:afterRequest"
//! request = 1
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use hxbusy_core::testing::{HeadlessPresenter, PresentEvent, TestRegion, VirtualScheduler};
use hxbusy_core::{Coordinator, EventDetail, IndicatorConfig, Outcome, Snapshot, TimerId};

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Parse error in trace: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Step {step} names unknown region `{name}`")]
    UnknownRegion { step: usize, name: String },
    #[error("Region `{0}` has an unknown parent or sits in a parent cycle")]
    BadParent(String),
    #[error("Step {step} at {at_ms}ms is earlier than the step before it")]
    OutOfOrder { step: usize, at_ms: u64 },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegionSpec {
    pub parent: Option<String>,
}

/// One recorded host event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Step {
    pub at_ms: u64,
    pub event: String,
    pub target: Option<String>,
    pub element: Option<String>,
    pub request: Option<u64>,
    pub boosted: bool,
    /// The target is the document body.
    pub page: bool,
    pub preloaded: bool,
    pub opted_out: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Trace {
    pub regions: BTreeMap<String, RegionSpec>,
    #[serde(rename = "step")]
    pub steps: Vec<Step>,
    /// Keep the clock running after the last step (defaults to the last step).
    pub until_ms: Option<u64>,
}

impl Trace {
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let contents = fs::read_to_string(path).map_err(|e| ReplayError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ReplayError> {
        Ok(toml::from_str(contents)?)
    }

    /// Build the region tree, numbering regions in name order.
    fn resolve_regions(&self) -> Result<BTreeMap<String, TestRegion>, ReplayError> {
        let ids: BTreeMap<&str, u32> = self
            .regions
            .keys()
            .zip(1u32..)
            .map(|(name, id)| (name.as_str(), id))
            .collect();

        let mut resolved = BTreeMap::new();
        for name in self.regions.keys() {
            let mut chain = vec![name.as_str()];
            let mut cursor = name.as_str();
            while let Some(parent) = self.regions.get(cursor).and_then(|r| r.parent.as_deref()) {
                if !ids.contains_key(parent) || chain.contains(&parent) {
                    return Err(ReplayError::BadParent(name.clone()));
                }
                chain.push(parent);
                cursor = parent;
            }

            let mut names = chain.into_iter().rev();
            let mut region = names
                .next()
                .and_then(|root| ids.get(root))
                .map(|id| TestRegion::root(*id))
                .ok_or_else(|| ReplayError::BadParent(name.clone()))?;
            for link in names {
                region = region.child(ids[link]);
            }
            resolved.insert(name.clone(), region);
        }
        Ok(resolved)
    }
}

/// What produced a timeline row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    Event { name: String, outcome: Outcome },
    Timer(TimerId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub at: Duration,
    pub kind: RowKind,
    /// Visual transitions this row caused.
    pub visuals: Vec<PresentEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Timeline {
    pub rows: Vec<Row>,
    /// Table state after the last row. Anything left here never got torn down.
    pub remaining: Snapshot,
}

type HeadlessCoordinator = Coordinator<HeadlessPresenter, VirtualScheduler, u64>;

/// Run `trace` through a fresh coordinator built from `config`.
pub fn replay(config: &IndicatorConfig, trace: &Trace) -> Result<Timeline, ReplayError> {
    let regions = resolve_regions_checked(trace)?;
    let mut coordinator: HeadlessCoordinator =
        Coordinator::new(config, HeadlessPresenter::new(), VirtualScheduler::new());
    coordinator.install();

    let mut rows = Vec::new();
    let mut seen = 0;
    let mut last_at = 0;

    for (index, step) in trace.steps.iter().enumerate() {
        if step.at_ms < last_at {
            return Err(ReplayError::OutOfOrder {
                step: index,
                at_ms: step.at_ms,
            });
        }
        last_at = step.at_ms;
        run_timers(&mut coordinator, Duration::from_millis(step.at_ms), &mut rows, &mut seen);

        let detail = step_detail(index, step, &regions)?;
        let outcome = coordinator.dispatch(&step.event, detail);
        rows.push(Row {
            at: coordinator.now(),
            kind: RowKind::Event {
                name: step.event.clone(),
                outcome,
            },
            visuals: drain_visuals(&coordinator, &mut seen),
        });
    }

    let until = trace.until_ms.unwrap_or(last_at).max(last_at);
    run_timers(&mut coordinator, Duration::from_millis(until), &mut rows, &mut seen);

    tracing::debug!(rows = rows.len(), "Trace replayed");
    Ok(Timeline {
        rows,
        remaining: coordinator.snapshot(),
    })
}

fn resolve_regions_checked(trace: &Trace) -> Result<BTreeMap<String, TestRegion>, ReplayError> {
    let regions = trace.resolve_regions()?;
    for (index, step) in trace.steps.iter().enumerate() {
        for name in [&step.target, &step.element].into_iter().flatten() {
            if !regions.contains_key(name) {
                return Err(ReplayError::UnknownRegion {
                    step: index,
                    name: name.clone(),
                });
            }
        }
    }
    Ok(regions)
}

fn step_detail(
    index: usize,
    step: &Step,
    regions: &BTreeMap<String, TestRegion>,
) -> Result<EventDetail<TestRegion, u64>, ReplayError> {
    let lookup = |name: &Option<String>| -> Result<Option<TestRegion>, ReplayError> {
        name.as_ref()
            .map(|name| {
                regions
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ReplayError::UnknownRegion {
                        step: index,
                        name: name.clone(),
                    })
            })
            .transpose()
    };

    Ok(EventDetail {
        target: lookup(&step.target)?,
        element: lookup(&step.element)?,
        request: step.request,
        boosted: step.boosted,
        target_is_page_root: step.page,
        preloaded: step.preloaded,
        opted_out: step.opted_out,
    })
}

/// Fire every timer due at or before `until`, one row per timer.
fn run_timers(
    coordinator: &mut HeadlessCoordinator,
    until: Duration,
    rows: &mut Vec<Row>,
    seen: &mut usize,
) {
    while let Some(timer) = coordinator.scheduler_mut().pop_due(until) {
        let at = coordinator.now();
        coordinator.on_timer(timer);
        rows.push(Row {
            at,
            kind: RowKind::Timer(timer),
            visuals: drain_visuals(coordinator, seen),
        });
    }
    coordinator.advance_to(until);
}

fn drain_visuals(coordinator: &HeadlessCoordinator, seen: &mut usize) -> Vec<PresentEvent> {
    let log = coordinator.presenter().log();
    let fresh = log[*seen..].to_vec();
    *seen = log.len();
    fresh
}
