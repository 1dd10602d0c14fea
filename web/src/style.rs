//! Injected stylesheet.
//!
//! Rendered from [`StyleConfig`] and [`ClassNames`] so renamed classes and
//! palette changes need no hand-written CSS.

use hxbusy_types::{ClassNames, StyleConfig};

/// Id of the injected `<style>` element.
pub const STYLE_ELEMENT_ID: &str = "hxbusy-style";

/// Build the stylesheet text.
pub fn stylesheet(style: &StyleConfig, classes: &ClassNames) -> String {
    let StyleConfig {
        local_background,
        global_background,
        dark_background,
        blur_px,
        accent,
        dark_accent,
        spinner_size_rem,
        spinner_border_px,
        spin_duration_ms,
        z_index,
        ..
    } = style;
    let spinner_z = z_index.saturating_add(1);
    let global_z = z_index.saturating_add(2);
    let spin_secs = *spin_duration_ms as f32 / 1000.0;

    format!(
        r#".{loading} {{ position: relative; }}
.{local_overlay} {{
  position: fixed;
  background: {local_background};
  backdrop-filter: blur({blur_px}px);
  z-index: {z_index};
  pointer-events: auto;
}}
.dark .{local_overlay} {{ background: {dark_background}; }}
.{local_spinner} {{
  position: absolute;
  top: 50%; left: 50%;
  transform: translate(-50%, -50%);
  width: {spinner_size_rem}rem; height: {spinner_size_rem}rem;
  border: {spinner_border_px}px solid;
  border-color: {accent} transparent {accent} transparent;
  border-radius: 50%;
  animation: hxbusy-spin {spin_secs}s ease-in-out infinite;
  z-index: {spinner_z};
  pointer-events: none;
}}
.dark .{local_spinner} {{ border-color: {dark_accent} transparent {dark_accent} transparent; }}
@keyframes hxbusy-spin {{
  from {{ transform: rotate(0deg); }}
  to {{ transform: rotate(360deg); }}
}}
.{global_overlay} {{
  display: none;
  position: fixed;
  top: 0; left: 0; width: 100vw; height: 100vh;
  z-index: {global_z};
  background: {global_background};
  align-items: center;
  justify-content: center;
}}
.dark .{global_overlay} {{ background: {dark_background}; }}
.{global_spinner} {{
  width: {spinner_size_rem}rem; height: {spinner_size_rem}rem;
  border: {spinner_border_px}px solid {accent};
  border-color: {accent} transparent {accent} transparent;
  border-radius: 50%;
  animation: hxbusy-spin {spin_secs}s ease-in-out infinite;
}}
.dark .{global_spinner} {{ border-color: {dark_accent} transparent {dark_accent} transparent; }}
"#,
        loading = classes.loading,
        local_overlay = classes.local_overlay,
        local_spinner = classes.local_spinner,
        global_overlay = classes.global_overlay,
        global_spinner = classes.global_spinner,
    )
}
