//! Terminal rendering of an annotated file tree.

use std::collections::BTreeMap;
use std::path::Path;

use console::{StyledObject, style};
use diagtree_core::{Annotation, FileTree, PresentationSink, Severity, SignSet, TreeView};
use serde::Serialize;

/// A presentation sink that remembers markers per line and renders them as text.
#[derive(Debug, Default)]
pub struct TerminalSink {
    signs: SignSet,
    markers: BTreeMap<usize, Severity>,
    highlights: BTreeMap<usize, Severity>,
}

impl PresentationSink for TerminalSink {
    fn define_signs(&mut self, signs: &SignSet) {
        self.signs = signs.clone();
    }

    fn clear_all_markers(&mut self) {
        self.markers.clear();
        self.highlights.clear();
    }

    fn place_marker(&mut self, line: usize, severity: Severity) {
        self.markers.insert(line, severity);
    }

    fn apply_highlight(&mut self, line: usize, severity: Severity) {
        self.highlights.insert(line, severity);
    }
}

impl TerminalSink {
    pub fn marker(&self, line: usize) -> Option<Severity> {
        self.markers.get(&line).copied()
    }

    /// Renders every visible line of `tree` with its gutter marker.
    pub fn render(&self, tree: &FileTree) -> String {
        tree.nodes_by_line()
            .iter()
            .map(|(line, node)| {
                let gutter = match self.markers.get(&line) {
                    Some(severity) => paint(&self.signs.get(*severity).text, *severity).to_string(),
                    None => " ".to_string(),
                };

                let name = tree.name(node.id).unwrap_or(&node.absolute_path);
                let label = if node.is_directory {
                    let arrow = if node.is_open { "▾" } else { "▸" };
                    format!("{} {}/", arrow, name)
                } else {
                    format!("  {}", name)
                };
                let label = match self.highlights.get(&line) {
                    Some(severity) => paint(&label, *severity).to_string(),
                    None => label,
                };

                let indent = "  ".repeat(tree.depth(node.id).unwrap_or(0));
                format!("{} {}{}", gutter, indent, label)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn paint(text: &str, severity: Severity) -> StyledObject<&str> {
    let styled = style(text);
    match severity {
        Severity::Error => styled.red(),
        Severity::Warning => styled.yellow(),
        Severity::Information => styled.blue(),
        Severity::Hint => styled.cyan(),
    }
}

/// One annotated line, for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationReport {
    pub line: usize,
    /// Path relative to the workspace root.
    pub path: String,
    pub is_directory: bool,
    pub severity: Severity,
}

pub fn annotation_reports(tree: &FileTree, annotations: &[Annotation]) -> Vec<AnnotationReport> {
    annotations
        .iter()
        .filter_map(|annotation| {
            let node = tree.node(annotation.node)?;
            Some(AnnotationReport {
                line: annotation.line,
                path: relative_path(&node.absolute_path, tree.root()),
                is_directory: node.is_directory,
                severity: annotation.severity,
            })
        })
        .collect()
}

fn relative_path(path: &str, root: &Path) -> String {
    pathdiff::diff_paths(path, root)
        .map(|relative| relative.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|| path.to_string())
}
