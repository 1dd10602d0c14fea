//! Indicator configuration.
//!
//! Every field has a default matching the stock extension behavior, so an
//! empty TOML document or an empty JS object is a valid configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::signal::EventTable;

pub const DEFAULT_OVERLAY_DELAY_MS: u32 = 100;
pub const DEFAULT_SPINNER_DELAY_MS: u32 = 400;

/// Top-level configuration for one coordinator context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// Delay before the dimming overlay appears (0 = immediately).
    pub overlay_delay_ms: u32,
    /// Delay before the spinner appears inside the overlay.
    pub spinner_delay_ms: u32,
    pub tracking: OverlayTracking,
    pub classes: ClassNames,
    pub exclusion: ExclusionRules,
    /// Replaces the stock htmx table entirely when present.
    pub events: EventTable,
    pub style: StyleConfig,
    /// Level for the browser console subscriber (`error` .. `trace`).
    pub log_level: String,
}

impl IndicatorConfig {
    pub fn overlay_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.overlay_delay_ms))
    }

    pub fn spinner_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.spinner_delay_ms))
    }
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            overlay_delay_ms: DEFAULT_OVERLAY_DELAY_MS,
            spinner_delay_ms: DEFAULT_SPINNER_DELAY_MS,
            tracking: OverlayTracking::default(),
            classes: ClassNames::default(),
            exclusion: ExclusionRules::default(),
            events: EventTable::default(),
            style: StyleConfig::default(),
            log_level: "warn".to_string(),
        }
    }
}

/// How a local overlay follows its region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayTracking {
    /// Bounds are captured once when the overlay is shown.
    #[default]
    Static,
    /// Bounds are re-read on every scroll and resize.
    FollowLayout,
}

/// CSS class names applied to overlays, spinners and target regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassNames {
    pub local_overlay: String,
    pub local_spinner: String,
    pub global_overlay: String,
    pub global_spinner: String,
    /// Added to the target once its overlay is visible.
    pub loading: String,
    /// Added to the target once its spinner is visible.
    pub show_spinner: String,
}

impl ClassNames {
    /// `(field, value)` pairs, for validation and diagnostics.
    pub fn iter(&self) -> [(&'static str, &str); 6] {
        [
            ("local_overlay", self.local_overlay.as_str()),
            ("local_spinner", self.local_spinner.as_str()),
            ("global_overlay", self.global_overlay.as_str()),
            ("global_spinner", self.global_spinner.as_str()),
            ("loading", self.loading.as_str()),
            ("show_spinner", self.show_spinner.as_str()),
        ]
    }
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            local_overlay: "htmx-local-overlay".to_string(),
            local_spinner: "htmx-local-spinner".to_string(),
            global_overlay: "htmx-global-overlay-spinner".to_string(),
            global_spinner: "htmx-global-spinner".to_string(),
            loading: "htmx-loading".to_string(),
            show_spinner: "show-spinner".to_string(),
        }
    }
}

/// Markers that decide whether a request is tracked at all, and at which scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExclusionRules {
    /// Request header set by the preload extension.
    pub preload_header: String,
    pub preload_value: String,
    /// Space-separated token list attribute on the initiating element.
    pub opt_out_attribute: String,
    pub opt_out_token: String,
    /// Attribute that makes a request page-scoped.
    pub boost_attribute: String,
}

impl ExclusionRules {
    /// CSS selector matching an initiating element that opted out.
    pub fn opt_out_selector(&self) -> String {
        format!("[{}~=\"{}\"]", self.opt_out_attribute, self.opt_out_token)
    }

    /// Token-list membership test, equivalent to the `~=` selector.
    pub fn is_opted_out(&self, attribute_value: Option<&str>) -> bool {
        attribute_value
            .is_some_and(|value| value.split_whitespace().any(|t| t == self.opt_out_token))
    }

    pub fn is_preloaded(&self, header_value: Option<&str>) -> bool {
        header_value.is_some_and(|value| value == self.preload_value)
    }
}

impl Default for ExclusionRules {
    fn default() -> Self {
        Self {
            preload_header: "HX-Preloaded".to_string(),
            preload_value: "true".to_string(),
            opt_out_attribute: "hx-disinherit".to_string(),
            opt_out_token: "global-indicator".to_string(),
            boost_attribute: "hx-boost".to_string(),
        }
    }
}

/// Styling constants for the injected stylesheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Skip stylesheet injection when the page ships its own rules.
    pub inject: bool,
    pub local_background: String,
    pub global_background: String,
    /// Background used under a `.dark` ancestor.
    pub dark_background: String,
    pub blur_px: u32,
    pub accent: String,
    pub dark_accent: String,
    pub spinner_size_rem: f32,
    pub spinner_border_px: u32,
    pub spin_duration_ms: u32,
    /// Local overlays use this value, spinners one above, the global overlay two above.
    pub z_index: i32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            inject: true,
            local_background: "rgba(255, 255, 255)".to_string(),
            global_background: "oklch(0.145 0 0)".to_string(),
            dark_background: "oklch(0.145 0 0)".to_string(),
            blur_px: 2,
            accent: "#2563eb".to_string(),
            dark_accent: "white".to_string(),
            spinner_size_rem: 3.0,
            spinner_border_px: 3,
            spin_duration_ms: 700,
            z_index: 99998,
        }
    }
}
