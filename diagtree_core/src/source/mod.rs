//! Diagnostic sources and per-file severity aggregation.
//!
//! A source enumerates raw `(file, severity)` records. The provided
//! [`DiagnosticSource::collect`] method filters them by the configured range
//! and reduces them to one worst severity per canonical file path.

mod service;
mod source_errors;

pub use service::{DiagnosticService, JsonFileService, ServiceDiagnostics, parse_diagnostic_list};
pub use source_errors::SourceError;

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};

use crate::path::{CanonicalPath, canonical_path};
use crate::severity::{Severity, SeverityRange};

/// A single diagnostic, reduced to what the tree needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    pub file_path: String,
    pub severity: Severity,
}

impl DiagnosticRecord {
    pub fn new(file_path: impl Into<String>, severity: Severity) -> Self {
        Self {
            file_path: file_path.into(),
            severity,
        }
    }
}

/// The worst accepted severity per canonical file path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileSeverityMap {
    files: HashMap<CanonicalPath, Severity>,
}

impl FileSeverityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from records, keeping only those accepted by `range`.
    pub fn from_records<I>(records: I, range: &SeverityRange) -> Self
    where
        I: IntoIterator<Item = DiagnosticRecord>,
    {
        let mut map = Self::new();
        for record in records {
            if record.severity.in_range(range) {
                map.record(&record.file_path, record.severity);
            }
        }
        map
    }

    /// Records a severity for a file, keeping the worst one seen so far.
    pub fn record(&mut self, file_path: &str, severity: Severity) {
        let path = canonical_path(file_path);
        if path.as_str().is_empty() {
            return;
        }
        self.files
            .entry(path)
            .and_modify(|current| *current = current.worst_of(severity))
            .or_insert(severity);
    }

    /// Gets the severity recorded for a file.
    pub fn get(&self, path: &CanonicalPath) -> Option<Severity> {
        self.files.get(path).copied()
    }

    /// Gets the worst severity among files strictly below a directory.
    pub fn worst_below(&self, dir: &CanonicalPath) -> Option<Severity> {
        Severity::worst(
            self.files
                .iter()
                .filter(|(path, _)| path.is_strict_descendant_of(dir))
                .map(|(_, severity)| *severity),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalPath, Severity)> {
        self.files.iter().map(|(path, severity)| (path, *severity))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// A provider of diagnostics.
///
/// Implementors only enumerate records; filtering, canonicalization and
/// reduction happen in [`DiagnosticSource::collect`].
pub trait DiagnosticSource: Send + Sync {
    /// A short name used in logs.
    fn name(&self) -> &str;

    /// Whether this source should be used right now.
    fn is_active(&self) -> bool;

    /// Enumerates every diagnostic currently known to the source.
    ///
    /// Individual records that cannot be interpreted should be skipped; an
    /// error means the whole response was unusable.
    fn diagnostics(&self) -> Result<Vec<DiagnosticRecord>, SourceError>;

    /// Collects the worst severity per file, restricted to `range`.
    ///
    /// Never fails: an unusable source yields an empty map.
    fn collect(&self, range: &SeverityRange) -> FileSeverityMap {
        match self.diagnostics() {
            Ok(records) => {
                let total = records.len();
                let map = FileSeverityMap::from_records(records, range);
                debug!(
                    "Source '{}' reported {} diagnostics across {} files in range {}",
                    self.name(),
                    total,
                    map.len(),
                    range
                );
                map
            }
            Err(err) => {
                warn!("Ignoring diagnostics from '{}': {}", self.name(), err);
                FileSeverityMap::new()
            }
        }
    }
}

/// Diagnostic sources in priority order.
///
/// The first active source wins each cycle.
#[derive(Clone, Default)]
pub struct SourceSet {
    sources: Vec<Arc<dyn DiagnosticSource>>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a source with lower priority than every source already added.
    pub fn with_source(mut self, source: Arc<dyn DiagnosticSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn push(&mut self, source: Arc<dyn DiagnosticSource>) {
        self.sources.push(source);
    }

    /// Returns the highest-priority active source.
    pub fn active(&self) -> Option<&Arc<dyn DiagnosticSource>> {
        self.sources.iter().find(|source| source.is_active())
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource {
        name: &'static str,
        active: bool,
        result: fn() -> Result<Vec<DiagnosticRecord>, SourceError>,
    }

    impl DiagnosticSource for FixedSource {
        fn name(&self) -> &str {
            self.name
        }

        fn is_active(&self) -> bool {
            self.active
        }

        fn diagnostics(&self) -> Result<Vec<DiagnosticRecord>, SourceError> {
            (self.result)()
        }
    }

    fn two_files() -> Result<Vec<DiagnosticRecord>, SourceError> {
        Ok(vec![
            DiagnosticRecord::new("/proj/a.txt", Severity::Hint),
            DiagnosticRecord::new("/proj/a.txt", Severity::Warning),
            DiagnosticRecord::new("/proj/b.txt", Severity::Information),
            DiagnosticRecord::new(r"\proj\a.txt", Severity::Information),
        ])
    }

    fn unavailable() -> Result<Vec<DiagnosticRecord>, SourceError> {
        Err(SourceError::Unavailable("not initialized".to_string()))
    }

    #[test]
    fn test_collect_reduces_to_worst_per_file() {
        let source = FixedSource {
            name: "fixed",
            active: true,
            result: two_files,
        };

        let map = source.collect(&SeverityRange::default());

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&canonical_path("/proj/a.txt")), Some(Severity::Warning));
        assert_eq!(map.get(&canonical_path("/proj/b.txt")), Some(Severity::Information));
    }

    #[test]
    fn test_collect_filters_by_range() {
        let source = FixedSource {
            name: "fixed",
            active: true,
            result: two_files,
        };

        let map = source.collect(&SeverityRange::new(Severity::Information, Severity::Information));

        assert_eq!(map.get(&canonical_path("/proj/a.txt")), Some(Severity::Information));
        assert_eq!(map.get(&canonical_path("/proj/b.txt")), Some(Severity::Information));
    }

    #[test]
    fn test_collect_degrades_to_empty_on_error() {
        let source = FixedSource {
            name: "broken",
            active: true,
            result: unavailable,
        };

        assert!(source.collect(&SeverityRange::default()).is_empty());
    }

    #[test]
    fn test_worst_below_only_counts_strict_descendants() {
        let mut map = FileSeverityMap::new();
        map.record("/proj/a.txt", Severity::Hint);
        map.record("/proj/src/b.txt", Severity::Warning);
        map.record("/project/c.txt", Severity::Error);

        assert_eq!(map.worst_below(&canonical_path("/proj")), Some(Severity::Warning));
        assert_eq!(map.worst_below(&canonical_path("/proj/src")), Some(Severity::Warning));
        assert_eq!(map.worst_below(&canonical_path("/proj/a.txt")), None);
    }

    #[test]
    fn test_record_ignores_empty_paths() {
        let mut map = FileSeverityMap::new();
        map.record("  ", Severity::Error);
        assert!(map.is_empty());
    }

    #[test]
    fn test_source_set_picks_first_active() {
        let set = SourceSet::new()
            .with_source(Arc::new(FixedSource {
                name: "service",
                active: false,
                result: unavailable,
            }))
            .with_source(Arc::new(FixedSource {
                name: "native",
                active: true,
                result: two_files,
            }));

        assert_eq!(set.active().map(|s| s.name()), Some("native"));
    }

    #[test]
    fn test_source_set_without_active_source() {
        let set = SourceSet::new().with_source(Arc::new(FixedSource {
            name: "service",
            active: false,
            result: unavailable,
        }));

        assert!(set.active().is_none());
        assert!(SourceSet::new().active().is_none());
    }
}
