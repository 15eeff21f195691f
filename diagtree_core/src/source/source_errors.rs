//! Error types for diagnostic sources

use std::{fmt, io};

/// Errors a diagnostic source can report while enumerating diagnostics.
///
/// None of these reach the tree: [`super::DiagnosticSource::collect`] turns
/// every one of them into an empty severity map.
#[derive(Debug)]
pub enum SourceError {
    /// The source cannot be queried right now (e.g. its service is not initialized)
    Unavailable(String),
    /// The source answered with data that is not a diagnostic list
    Malformed(String),
    /// Reading the source's backing data failed
    Io(io::Error),
}

impl From<io::Error> for SourceError {
    fn from(err: io::Error) -> Self {
        SourceError::Io(err)
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Unavailable(reason) => {
                write!(f, "Diagnostic source is unavailable: {}", reason)
            }
            SourceError::Malformed(reason) => {
                write!(f, "Diagnostic source returned malformed data: {}", reason)
            }
            SourceError::Io(error) => {
                write!(f, "There was a problem reading diagnostics: {}", error)
            }
        }
    }
}

impl std::error::Error for SourceError {}
