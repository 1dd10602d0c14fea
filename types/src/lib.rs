//! Shared types for hxbusy: configuration and the host signal vocabulary.
//!
//! Kept free of runtime dependencies so both the browser binding and native
//! tooling can deserialize the same configuration.

pub mod config;
pub mod signal;

pub use config::{
    ClassNames, DEFAULT_OVERLAY_DELAY_MS, DEFAULT_SPINNER_DELAY_MS, ExclusionRules,
    IndicatorConfig, OverlayTracking, StyleConfig,
};
pub use signal::{EventTable, SignalKind, TerminalKind};
