//! Shared test helpers for diagtree_core tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use diagtree_core::{
    DiagnosticRecord, DiagnosticSource, FileTree, PresentationSink, Severity, SignSet, SourceError,
};
use tempfile::TempDir;

/// Routes `log` output through the test harness. Set `RUST_LOG=trace` to see it.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Everything a presentation sink was told, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Define(usize),
    Clear,
    Marker(usize, Severity),
    Highlight(usize, Severity),
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub calls: Vec<SinkCall>,
}

impl RecordingSink {
    /// Markers placed since the last clear.
    pub fn markers(&self) -> Vec<(usize, Severity)> {
        let start = self
            .calls
            .iter()
            .rposition(|call| *call == SinkCall::Clear)
            .map_or(0, |i| i + 1);
        self.calls[start..]
            .iter()
            .filter_map(|call| match call {
                SinkCall::Marker(line, severity) => Some((*line, *severity)),
                _ => None,
            })
            .collect()
    }
}

impl PresentationSink for RecordingSink {
    fn define_signs(&mut self, signs: &SignSet) {
        self.calls.push(SinkCall::Define(signs.iter().count()));
    }

    fn clear_all_markers(&mut self) {
        self.calls.push(SinkCall::Clear);
    }

    fn place_marker(&mut self, line: usize, severity: Severity) {
        self.calls.push(SinkCall::Marker(line, severity));
    }

    fn apply_highlight(&mut self, line: usize, severity: Severity) {
        self.calls.push(SinkCall::Highlight(line, severity));
    }
}

/// A source whose records can be swapped while a decorator holds it.
pub struct SharedSource {
    name: &'static str,
    active: bool,
    records: Arc<Mutex<Vec<DiagnosticRecord>>>,
}

impl SharedSource {
    pub fn new(name: &'static str, active: bool) -> (Arc<Self>, Arc<Mutex<Vec<DiagnosticRecord>>>) {
        let records = Arc::new(Mutex::new(Vec::new()));
        let source = Arc::new(Self {
            name,
            active,
            records: records.clone(),
        });
        (source, records)
    }
}

impl DiagnosticSource for SharedSource {
    fn name(&self) -> &str {
        self.name
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn diagnostics(&self) -> Result<Vec<DiagnosticRecord>, SourceError> {
        Ok(self.records.lock().unwrap().clone())
    }
}

/// Create a workspace on disk with the given files and scan it.
///
/// Returns the TempDir (must be kept alive) and the scanned tree.
pub fn create_workspace(files: &[&str]) -> (TempDir, FileTree) {
    let dir = TempDir::new().expect("Failed to create temp dir");

    for path in files {
        let file_path = dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&file_path, "").expect("Failed to write file");
    }

    let tree = FileTree::scan(dir.path()).expect("Failed to scan workspace");
    (dir, tree)
}

/// An absolute path string for a file inside a workspace.
pub fn abs(root: &Path, relative: &str) -> String {
    root.join(relative).to_string_lossy().to_string()
}
