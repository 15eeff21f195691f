use std::{fmt, io};

/// Defines the errors you might encounter loading diagnostics configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError(io::Error),
    ParseError(String),
    ValidationError(String),
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(error) => {
                write!(f, "There was a problem reading the configuration: {}", error)
            }
            ConfigError::ParseError(error) => {
                write!(f, "Configuration could not be parsed: {}", error)
            }
            ConfigError::ValidationError(error) => {
                write!(f, "Configuration was invalid: {}", error)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
