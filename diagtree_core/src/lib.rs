//! Diagnostic aggregation for file trees.
//!
//! Collects per-file severities from a diagnostic source, rolls them up onto
//! directories and hands the result for each visible line to a presentation
//! sink. Recompute requests are debounced so bursts of changes cost one cycle.

pub mod config;
pub mod debounce;
pub mod decorator;
pub mod matcher;
pub mod path;
pub mod severity;
pub mod sink;
pub mod source;
pub mod tree;
pub mod updater;

pub use config::{ConfigError, DiagnosticIcons, DiagnosticsConfig, load_config, load_config_from_str};
pub use debounce::{DebouncePhase, Debouncer};
pub use decorator::{CycleOutcome, DiagnosticStatus, DiagnosticsDecorator};
pub use matcher::{Annotation, MatchPolicy, match_nodes};
pub use path::{CanonicalPath, canonical_path};
pub use severity::{Severity, SeverityOrdering, SeverityRange};
pub use sink::{PresentationSink, SignDefinition, SignSet};
pub use source::{
    DiagnosticRecord, DiagnosticService, DiagnosticSource, FileSeverityMap, JsonFileService,
    ServiceDiagnostics, SourceError, SourceSet,
};
pub use tree::{FileTree, LineNodeView, NodeId, TreeNode, TreeView};
pub use updater::{DIAGNOSTICS_KEY, DiagnosticsUpdater};
