use std::fmt;

/// Failures that end a CLI command.
///
/// Details are printed through [`crate::ui`] where the failure happens; the
/// error itself only decides the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliError {
    InputError,
    FileError,
    ConfigError,
    RuntimeError,
}

impl CliError {
    pub fn exit_code(self) -> u8 {
        match self {
            CliError::InputError => 2,
            CliError::FileError => 3,
            CliError::ConfigError => 4,
            CliError::RuntimeError => 5,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::InputError => write!(f, "Invalid input"),
            CliError::FileError => write!(f, "File error"),
            CliError::ConfigError => write!(f, "Configuration error"),
            CliError::RuntimeError => write!(f, "Runtime error"),
        }
    }
}

impl std::error::Error for CliError {}
