//! Error types for the remote drive backend

use thiserror::Error;

/// Errors from remote drive operations
#[derive(Debug, Error)]
pub enum DriveError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Token exchange failed
    #[error("Authentication error: {0}")]
    Auth(String),

    /// HTTP/network error
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success response from the files API
    #[error("Drive API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl DriveError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

/// Result type for remote drive operations
pub type Result<T> = std::result::Result<T, DriveError>;

impl From<reqwest::Error> for DriveError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DriveError::Http(format!("Request timeout: {}", err))
        } else if err.is_connect() {
            DriveError::Http(format!("Connection error: {}", err))
        } else if err.is_decode() {
            DriveError::Decode(err.to_string())
        } else {
            DriveError::Http(err.to_string())
        }
    }
}

// Convert to climscen_core errors
impl From<DriveError> for climscen_core::Error {
    fn from(err: DriveError) -> Self {
        match err {
            DriveError::NotFound(msg) => climscen_core::Error::not_found(msg),
            DriveError::Auth(msg) => climscen_core::Error::auth(msg),
            DriveError::Http(msg) => climscen_core::Error::io(msg),
            _ => climscen_core::Error::storage(err.to_string()),
        }
    }
}
