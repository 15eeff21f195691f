//! The latest published diagnostics per document.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use diagtree_core::{DiagnosticRecord, DiagnosticSource, Severity, SourceError};
use log::{debug, trace, warn};
use serde_json::Value;
use tower_lsp_server::lsp_types::{Diagnostic, DiagnosticSeverity, PublishDiagnosticsParams, Uri};

use crate::uri::file_uri_to_path;

/// Diagnostics as language servers publish them, keyed by document URI.
///
/// Feed it every `textDocument/publishDiagnostics` notification. As a
/// [`DiagnosticSource`] it is always active, so it belongs last in a
/// [`diagtree_core::SourceSet`].
#[derive(Debug, Default)]
pub struct LspDiagnosticStore {
    documents: RwLock<HashMap<String, Vec<Diagnostic>>>,
}

impl LspDiagnosticStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the diagnostics of one document. An empty list forgets the document.
    pub fn publish(&self, params: PublishDiagnosticsParams) {
        let key = params.uri.as_str().to_string();
        let mut documents = self.write();
        if params.diagnostics.is_empty() {
            trace!("Diagnostics cleared for {}", key);
            documents.remove(&key);
        } else {
            trace!("{} diagnostics published for {}", params.diagnostics.len(), key);
            documents.insert(key, params.diagnostics);
        }
    }

    /// Forgets one document.
    pub fn remove(&self, uri: &Uri) {
        self.write().remove(uri.as_str());
    }

    /// Forgets every document.
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Number of documents that currently have diagnostics.
    pub fn document_count(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Ingests a JSON array of `publishDiagnostics` params.
    ///
    /// Entries that do not parse are skipped with a warning. Returns how many
    /// entries were applied.
    pub fn load_json(&self, text: &str) -> Result<usize, SourceError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| SourceError::Malformed(format!("invalid JSON: {}", e)))?;
        let Value::Array(entries) = value else {
            return Err(SourceError::Malformed(
                "expected a list of publishDiagnostics params".to_string(),
            ));
        };

        let mut applied = 0;
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<PublishDiagnosticsParams>(entry) {
                Ok(params) => {
                    self.publish(params);
                    applied += 1;
                }
                Err(e) => warn!("Skipping publishDiagnostics entry {}: {}", index, e),
            }
        }
        debug!("Loaded {} publishDiagnostics entries", applied);
        Ok(applied)
    }

    /// Replaces every document with the contents of a JSON array of
    /// `publishDiagnostics` params.
    ///
    /// The current contents are kept when `text` is not such an array.
    pub fn replace_json(&self, text: &str) -> Result<usize, SourceError> {
        let staged = LspDiagnosticStore::new();
        let applied = staged.load_json(text)?;
        let documents = staged
            .documents
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        *self.write() = documents;
        Ok(applied)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Vec<Diagnostic>>> {
        self.documents.write().unwrap_or_else(|poisoned| {
            warn!("LSP diagnostic store was poisoned, continuing with its contents");
            PoisonError::into_inner(poisoned)
        })
    }
}

impl DiagnosticSource for LspDiagnosticStore {
    fn name(&self) -> &str {
        "lsp"
    }

    fn is_active(&self) -> bool {
        true
    }

    fn diagnostics(&self) -> Result<Vec<DiagnosticRecord>, SourceError> {
        let documents = self.documents.read().map_err(|_| {
            SourceError::Unavailable("LSP diagnostic store is poisoned".to_string())
        })?;

        let mut records = Vec::new();
        for (uri, diagnostics) in documents.iter() {
            let Some(path) = file_uri_to_path(uri) else {
                trace!("Ignoring diagnostics for non-file document {}", uri);
                continue;
            };
            records.extend(
                diagnostics
                    .iter()
                    .filter_map(|d| to_severity(d.severity))
                    .map(|severity| DiagnosticRecord::new(path.clone(), severity)),
            );
        }
        Ok(records)
    }
}

/// Maps an LSP severity. A missing severity is treated as an error.
fn to_severity(severity: Option<DiagnosticSeverity>) -> Option<Severity> {
    match severity {
        None | Some(DiagnosticSeverity::ERROR) => Some(Severity::Error),
        Some(DiagnosticSeverity::WARNING) => Some(Severity::Warning),
        Some(DiagnosticSeverity::INFORMATION) => Some(Severity::Information),
        Some(DiagnosticSeverity::HINT) => Some(Severity::Hint),
        Some(other) => {
            trace!("Ignoring diagnostic with unknown severity {:?}", other);
            None
        }
    }
}
