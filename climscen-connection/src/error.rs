//! Error types for climscen-connection

use thiserror::Error;

/// Result type alias using ConnectionError
pub type Result<T> = std::result::Result<T, ConnectionError>;

/// Connection-related errors
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Malformed INI text
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Malformed bracketed array literal
    #[error("Invalid array literal {literal:?}: {message}")]
    Array { literal: String, message: String },

    /// Local I/O failure (reading a config file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Core library error
    #[error(transparent)]
    Core(#[from] climscen_core::Error),

    /// Remote drive backend error
    #[error(transparent)]
    Drive(#[from] climscen_storage_drive::DriveError),
}

impl ConnectionError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        ConnectionError::InvalidConfig(msg.into())
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        ConnectionError::Parse {
            line,
            message: message.into(),
        }
    }

    /// Create an array literal error
    pub fn array(literal: impl Into<String>, message: impl Into<String>) -> Self {
        ConnectionError::Array {
            literal: literal.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        ConnectionError::NotFound(msg.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        match self {
            ConnectionError::NotFound(_) => true,
            ConnectionError::Core(e) => e.is_not_found(),
            _ => false,
        }
    }
}
