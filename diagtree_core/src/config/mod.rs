//! Diagnostics configuration.
//!
//! Read from JSON, e.g.:
//!
//! ```json
//! {
//!   "enable": true,
//!   "debounce_delay": 50,
//!   "show_on_dirs": true,
//!   "show_on_open_dirs": false,
//!   "severity": { "min": "hint", "max": "error" },
//!   "icons": { "error": "E", "warning": "W", "info": "I", "hint": "H" }
//! }
//! ```
//!
//! Every key is optional.

mod config_errors;

pub use config_errors::ConfigError;

use std::fs;
use std::path::Path;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::matcher::MatchPolicy;
use crate::severity::{Severity, SeverityRange};

/// Settings for the diagnostics overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Turns the whole feature on or off.
    pub enable: bool,
    /// Quiet period in milliseconds before a cycle runs. Zero or less runs on the next tick.
    pub debounce_delay: i64,
    /// Which severities are shown.
    pub severity: SeverityRange,
    /// Roll file severities up onto their directories.
    pub show_on_dirs: bool,
    /// Keep rolled-up severities on directories that are open.
    pub show_on_open_dirs: bool,
    /// Marker text per severity, handed to the presentation sink.
    pub icons: DiagnosticIcons,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enable: false,
            debounce_delay: 50,
            severity: SeverityRange::default(),
            show_on_dirs: false,
            show_on_open_dirs: true,
            icons: DiagnosticIcons::default(),
        }
    }
}

impl DiagnosticsConfig {
    /// The debounce delay, with non-positive values meaning no wait.
    pub fn debounce_duration(&self) -> Duration {
        u64::try_from(self.debounce_delay)
            .map(Duration::from_millis)
            .unwrap_or(Duration::ZERO)
    }

    pub fn match_policy(&self) -> MatchPolicy {
        MatchPolicy {
            show_on_dirs: self.show_on_dirs,
            show_on_open_dirs: self.show_on_open_dirs,
        }
    }

    /// Checks that the configuration describes something displayable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.severity.is_inverted() {
            return Err(ConfigError::ValidationError(format!(
                "severity.min ({}) is more severe than severity.max ({}); no diagnostic could be shown",
                self.severity.min, self.severity.max
            )));
        }
        Ok(())
    }
}

/// Marker text for each severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticIcons {
    pub hint: String,
    pub info: String,
    pub warning: String,
    pub error: String,
}

impl Default for DiagnosticIcons {
    fn default() -> Self {
        Self {
            hint: "\u{f0835}".to_string(),
            info: "\u{f05a}".to_string(),
            warning: "\u{f071}".to_string(),
            error: "\u{f057}".to_string(),
        }
    }
}

impl DiagnosticIcons {
    /// ASCII markers for terminals without an icon font.
    pub fn ascii() -> Self {
        Self {
            hint: "H".to_string(),
            info: "I".to_string(),
            warning: "W".to_string(),
            error: "E".to_string(),
        }
    }

    pub fn icon(&self, severity: Severity) -> &str {
        match severity {
            Severity::Error => &self.error,
            Severity::Warning => &self.warning,
            Severity::Information => &self.info,
            Severity::Hint => &self.hint,
        }
    }
}

/// Loads and validates a JSON configuration file.
pub fn load_config(path: &Path) -> Result<DiagnosticsConfig, ConfigError> {
    debug!("Loading diagnostics configuration from {}", path.display());
    let content = fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a JSON configuration.
pub fn load_config_from_str(content: &str) -> Result<DiagnosticsConfig, ConfigError> {
    let config: DiagnosticsConfig =
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    config.validate()?;
    Ok(config)
}
