//! Offline tooling for hxbusy configs.
//!
//! The binary checks a TOML config, prints the effective settings, and
//! replays recorded htmx event traces through the headless coordinator so
//! timing and teardown can be inspected without a browser.

pub mod trace;

pub use trace::{ReplayError, Row, RowKind, Timeline, Trace, replay};
