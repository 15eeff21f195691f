//! The diagnostics cycle: collect, match, annotate.

use std::collections::HashMap;
use std::time::Instant;

use log::{debug, info, trace};

use crate::config::DiagnosticsConfig;
use crate::matcher::{Annotation, match_nodes};
use crate::severity::Severity;
use crate::sink::{PresentationSink, SignSet};
use crate::source::{FileSeverityMap, SourceSet};
use crate::tree::{NodeId, TreeView};

/// The severity currently shown on each node.
///
/// Owned by the decorator and rebuilt from scratch every cycle; the tree
/// layer reads it but never writes it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagnosticStatus {
    by_node: HashMap<NodeId, Severity>,
}

impl DiagnosticStatus {
    pub fn get(&self, node: NodeId) -> Option<Severity> {
        self.by_node.get(&node).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, Severity)> {
        self.by_node.iter().map(|(node, severity)| (*node, *severity))
    }

    pub fn len(&self) -> usize {
        self.by_node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_node.is_empty()
    }

    fn set(&mut self, node: NodeId, severity: Severity) {
        self.by_node.insert(node, severity);
    }

    fn clear(&mut self) {
        self.by_node.clear();
    }
}

/// What a call to [`DiagnosticsDecorator::refresh`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// The feature is turned off.
    Disabled,
    /// The tree view was not loaded; nothing was touched.
    Skipped,
    /// Markers were cleared and rewritten.
    Completed {
        /// Name of the source that was read, if any was active.
        source: Option<String>,
        annotations: Vec<Annotation>,
    },
}

/// Overlays diagnostics from a set of sources onto a tree view.
///
/// Do not call [`refresh`](Self::refresh) from several places at once:
/// route recompute requests through a [`crate::updater::DiagnosticsUpdater`]
/// so cycles stay serialized and debounced.
pub struct DiagnosticsDecorator<T, S> {
    config: DiagnosticsConfig,
    sources: SourceSet,
    tree: T,
    sink: S,
    status: DiagnosticStatus,
}

impl<T: TreeView, S: PresentationSink> DiagnosticsDecorator<T, S> {
    pub fn new(config: DiagnosticsConfig, sources: SourceSet, tree: T, sink: S) -> Self {
        Self {
            config,
            sources,
            tree,
            sink,
            status: DiagnosticStatus::default(),
        }
    }

    /// Hands the sign definitions to the sink. Does nothing while disabled.
    pub fn setup(&mut self) {
        if !self.config.enable {
            return;
        }
        info!(
            "Diagnostics enabled: severities {}, show_on_dirs={}, show_on_open_dirs={}",
            self.config.severity, self.config.show_on_dirs, self.config.show_on_open_dirs
        );
        self.sink.define_signs(&SignSet::from_icons(&self.config.icons));
    }

    /// Removes every marker and forgets every node status.
    ///
    /// Does nothing while disabled or while the tree view is not loaded.
    pub fn clear(&mut self) {
        if !self.config.enable || !self.tree.is_valid() {
            return;
        }
        self.sink.clear_all_markers();
        self.status.clear();
    }

    /// Runs one diagnostics cycle.
    pub fn refresh(&mut self) -> CycleOutcome {
        if !self.config.enable {
            return CycleOutcome::Disabled;
        }
        if !self.tree.is_valid() {
            debug!("Tree view is not loaded, skipping diagnostics update");
            return CycleOutcome::Skipped;
        }

        let started = Instant::now();
        trace!("Diagnostics update started");

        self.sink.clear_all_markers();
        self.status.clear();

        let (source, severities) = match self.sources.active() {
            Some(source) => {
                debug!("Reading diagnostics from '{}'", source.name());
                (
                    Some(source.name().to_string()),
                    source.collect(&self.config.severity),
                )
            }
            None => {
                debug!("No active diagnostic source");
                (None, FileSeverityMap::new())
            }
        };

        for (path, severity) in severities.iter() {
            trace!("File '{}' has severity {}", path, severity);
        }

        let view = self.tree.nodes_by_line();
        let annotations = match_nodes(&severities, &view, &self.config.match_policy());

        for annotation in &annotations {
            self.status.set(annotation.node, annotation.severity);
            self.sink.place_marker(annotation.line, annotation.severity);
            self.sink.apply_highlight(annotation.line, annotation.severity);
        }

        debug!(
            "Diagnostics update took {:?}: {} of {} visible nodes annotated",
            started.elapsed(),
            annotations.len(),
            view.len()
        );

        CycleOutcome::Completed {
            source,
            annotations,
        }
    }

    pub fn status(&self) -> &DiagnosticStatus {
        &self.status
    }

    pub fn config(&self) -> &DiagnosticsConfig {
        &self.config
    }

    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// Mutable access to the tree, e.g. to open a directory.
    ///
    /// Changes are not reflected until the next cycle.
    pub fn tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn sources(&self) -> &SourceSet {
        &self.sources
    }
}
