//! Debounced busy indicators for in-flight htmx requests.
//!
//! The crate is the host-independent core: it maps requests to indicator
//! entries, merges concurrent requests on one region into a shared entry,
//! delays visuals with two timers, and tears every entry down exactly once.
//! Document access and timers sit behind [`PresentationPort`] and
//! [`TimerScheduler`], so the same coordinator runs in the browser binding
//! and in headless tests.

pub mod config;
pub mod coordinator;
pub mod events;
pub mod presentation;
pub mod registry;
pub mod scheduler;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

#[cfg(test)]
mod coordinator_tests;

pub use config::ConfigError;
pub use coordinator::{Coordinator, EntrySnapshot, Outcome, Snapshot};
pub use events::{Classified, EventDetail, Exclusion, Signal, StartRequest, Target};
pub use presentation::{LoadingMarker, PresentationPort, Region};
pub use registry::{EntryId, EntryState, OpId, Registry, Scope};
pub use scheduler::{TimerId, TimerKind, TimerScheduler};

pub use hxbusy_types::{EventTable, IndicatorConfig, OverlayTracking, SignalKind, TerminalKind};
