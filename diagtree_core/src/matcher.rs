//! Matching per-file severities onto visible tree nodes.

use log::trace;
use serde::Serialize;

use crate::path::canonical_path;
use crate::severity::Severity;
use crate::source::FileSeverityMap;
use crate::tree::{LineNodeView, NodeId, TreeNode};

/// Which directories may carry a rolled-up severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPolicy {
    /// Show the worst descendant severity on directories.
    pub show_on_dirs: bool,
    /// Also show it on directories that are open. Only meaningful with `show_on_dirs`.
    pub show_on_open_dirs: bool,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            show_on_dirs: false,
            show_on_open_dirs: true,
        }
    }
}

/// A severity decided for one visible line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Annotation {
    pub line: usize,
    pub node: NodeId,
    pub severity: Severity,
}

/// Computes the severity to display on every visible node, in line order.
///
/// Nodes without a severity are left out.
pub fn match_nodes(
    severities: &FileSeverityMap,
    view: &LineNodeView,
    policy: &MatchPolicy,
) -> Vec<Annotation> {
    if severities.is_empty() {
        return Vec::new();
    }

    view.iter()
        .filter_map(|(line, node)| {
            node_severity(severities, node, policy).map(|severity| Annotation {
                line,
                node: node.id,
                severity,
            })
        })
        .collect()
}

/// Computes the severity to display on a single node.
///
/// Files match their own path exactly. Directories take the worst severity
/// among files strictly below them, when the policy allows it for the
/// directory's open state.
pub fn node_severity(
    severities: &FileSeverityMap,
    node: &TreeNode,
    policy: &MatchPolicy,
) -> Option<Severity> {
    let node_path = canonical_path(&node.absolute_path);

    if node.is_directory {
        if !policy.show_on_dirs || (node.is_open && !policy.show_on_open_dirs) {
            return None;
        }
        let severity = severities.worst_below(&node_path)?;
        trace!("Matched directory node '{}' with {}", node.absolute_path, severity);
        Some(severity)
    } else {
        let severity = severities.get(&node_path)?;
        trace!("Matched file node '{}' with {}", node.absolute_path, severity);
        Some(severity)
    }
}
