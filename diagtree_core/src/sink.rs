//! The presentation boundary: where severity decisions become visible.

use crate::config::DiagnosticIcons;
use crate::severity::Severity;

/// Receives the diagnostics decisions for a tree's display lines.
///
/// The sink owns every visual choice. It is told which line carries which
/// severity and nothing else.
pub trait PresentationSink: Send {
    /// Registers the marker appearance for each severity. Called once at setup.
    fn define_signs(&mut self, _signs: &SignSet) {}

    /// Removes every marker and highlight placed by earlier cycles.
    fn clear_all_markers(&mut self);

    /// Places a marker (e.g. a gutter sign) on a line.
    fn place_marker(&mut self, line: usize, severity: Severity);

    /// Highlights a line's text.
    fn apply_highlight(&mut self, line: usize, severity: Severity);
}

/// How a marker for one severity looks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignDefinition {
    pub severity: Severity,
    /// Sign name, e.g. `DiagTreeSignError`.
    pub name: String,
    /// Marker text, usually a single icon.
    pub text: String,
    /// Highlight group applied to the marker and the line.
    pub highlight: String,
}

/// One sign definition per severity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignSet {
    signs: [SignDefinition; 4],
}

impl SignSet {
    pub fn from_icons(icons: &DiagnosticIcons) -> Self {
        Self {
            signs: Severity::ALL.map(|severity| SignDefinition {
                severity,
                name: format!("DiagTreeSign{}", severity_title(severity)),
                text: icons.icon(severity).to_string(),
                highlight: format!("DiagTreeDiagnostics{}", severity_title(severity)),
            }),
        }
    }

    /// Gets the definition for a severity.
    pub fn get(&self, severity: Severity) -> &SignDefinition {
        &self.signs[severity.level() as usize - 1]
    }

    pub fn iter(&self) -> impl Iterator<Item = &SignDefinition> {
        self.signs.iter()
    }
}

impl Default for SignSet {
    fn default() -> Self {
        Self::from_icons(&DiagnosticIcons::default())
    }
}

fn severity_title(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "Error",
        Severity::Warning => "Warning",
        Severity::Information => "Information",
        Severity::Hint => "Hint",
    }
}
