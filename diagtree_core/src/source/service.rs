//! Diagnostics reported by a companion diagnostic service.
//!
//! The service answers with a JSON list shaped like
//! `[{ "file": "/abs/path", "severity": "Warning", ... }]`. Extra keys are
//! ignored. The service is only consulted once it reports being initialized.

use std::fs;
use std::path::{Path, PathBuf};

use log::trace;
use serde_json::Value;

use super::{DiagnosticRecord, DiagnosticSource, SourceError};
use crate::severity::Severity;

/// A companion service that can list the diagnostics it knows about.
pub trait DiagnosticService: Send + Sync {
    /// Whether the service has finished starting up.
    fn is_initialized(&self) -> bool;

    /// The raw diagnostic list, as the service reports it.
    fn diagnostic_list(&self) -> Result<Value, SourceError>;
}

/// Diagnostic source backed by a [`DiagnosticService`].
pub struct ServiceDiagnostics<S> {
    service: S,
}

impl<S: DiagnosticService> ServiceDiagnostics<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }
}

impl<S: DiagnosticService> DiagnosticSource for ServiceDiagnostics<S> {
    fn name(&self) -> &str {
        "service"
    }

    fn is_active(&self) -> bool {
        self.service.is_initialized()
    }

    fn diagnostics(&self) -> Result<Vec<DiagnosticRecord>, SourceError> {
        if !self.service.is_initialized() {
            return Err(SourceError::Unavailable(
                "diagnostic service is not initialized".to_string(),
            ));
        }

        let list = self.service.diagnostic_list()?;
        parse_diagnostic_list(&list)
    }
}

/// Interprets a service diagnostic list.
///
/// Entries without a string `file` or a recognizable `severity` are skipped.
/// `null` counts as an empty list; any other non-array value is malformed.
pub fn parse_diagnostic_list(list: &Value) -> Result<Vec<DiagnosticRecord>, SourceError> {
    let items = match list {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            return Err(SourceError::Malformed(format!(
                "expected a list of diagnostics, got {}",
                json_kind(other)
            )));
        }
    };

    let records: Vec<DiagnosticRecord> = items.iter().filter_map(parse_entry).collect();

    let skipped = items.len() - records.len();
    if skipped > 0 {
        trace!("Skipped {} unreadable service diagnostics", skipped);
    }

    Ok(records)
}

fn parse_entry(item: &Value) -> Option<DiagnosticRecord> {
    let file = item.get("file")?.as_str()?;
    let severity = match item.get("severity")? {
        Value::String(name) => Severity::from_name(name)?,
        Value::Number(level) => Severity::from_level(level.as_u64()?)?,
        _ => return None,
    };
    Some(DiagnosticRecord::new(file, severity))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// A service whose diagnostic list is a JSON file on disk.
///
/// The service counts as initialized while the file exists.
#[derive(Debug, Clone)]
pub struct JsonFileService {
    path: PathBuf,
}

impl JsonFileService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DiagnosticService for JsonFileService {
    fn is_initialized(&self) -> bool {
        self.path.is_file()
    }

    fn diagnostic_list(&self) -> Result<Value, SourceError> {
        let text = fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| {
            SourceError::Malformed(format!("{} is not valid JSON: {}", self.path.display(), e))
        })
    }
}
