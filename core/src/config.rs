//! Configuration loading and validation
//!
//! Configuration is a single TOML document deserialized into
//! [`IndicatorConfig`]. Missing fields fall back to the stock defaults; the
//! only hard failures are unreadable files, malformed TOML, and settings that
//! would make the coordinator inert or produce unusable CSS.

use std::fs;
use std::path::{Path, PathBuf};

use hxbusy_types::IndicatorConfig;

/// Errors that can occur during config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Parse error in {path:?}: {source}")]
    Parse {
        path: Option<PathBuf>,
        source: toml::de::Error,
    },
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid class name for `{field}`: {value:?}")]
    InvalidClassName { field: &'static str, value: String },
    #[error("Event table has no start event; no request would ever be tracked")]
    MissingStartEvent,
}

/// Load and validate a TOML config file.
pub fn load_file(path: &Path) -> Result<IndicatorConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: IndicatorConfig = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: Some(path.to_path_buf()),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Parse and validate a TOML document.
pub fn from_toml_str(contents: &str) -> Result<IndicatorConfig, ConfigError> {
    let config: IndicatorConfig =
        toml::from_str(contents).map_err(|e| ConfigError::Parse { path: None, source: e })?;
    validate(&config)?;
    Ok(config)
}

/// Render a config back to TOML, e.g. to print the effective settings.
pub fn to_toml_string(config: &IndicatorConfig) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(config)?)
}

/// Check settings that deserialize fine but cannot work.
pub fn validate(config: &IndicatorConfig) -> Result<(), ConfigError> {
    for (field, value) in config.classes.iter() {
        if !is_class_name(value) {
            return Err(ConfigError::InvalidClassName {
                field,
                value: value.to_string(),
            });
        }
    }

    if !config.events.has_start() {
        return Err(ConfigError::MissingStartEvent);
    }

    if config.spinner_delay_ms < config.overlay_delay_ms {
        tracing::warn!(
            overlay_delay_ms = config.overlay_delay_ms,
            spinner_delay_ms = config.spinner_delay_ms,
            "Spinner delay is shorter than overlay delay; the overlay will appear with the spinner"
        );
    }
    Ok(())
}

/// A single CSS class token: non-empty, no whitespace, no leading digit.
fn is_class_name(value: &str) -> bool {
    let Some(first) = value.chars().next() else {
        return false;
    };
    !first.is_ascii_digit()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
