//! Error types for climscen-catalog

use thiserror::Error;

/// Result type alias using CatalogError
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Catalog errors
///
/// Absence is not an error here: a dimension with no backing artifacts
/// resolves to an empty catalog and a missing artifact loads as `None`.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A code is not in the dimension's current catalog
    #[error("Unknown {dimension} code: {code}")]
    UnknownCode {
        dimension: &'static str,
        code: String,
    },

    /// A horizon input could not be normalized to `<start>-<end>`
    #[error("Invalid horizon: {0}")]
    InvalidHorizon(String),

    /// A concrete path was requested but a dimension is unresolved
    #[error("Cannot build artifact path: no {dimension} selected")]
    Incomplete { dimension: &'static str },

    /// The context belongs to a different project than the catalog
    #[error("Context is for project '{context}', catalog is for '{catalog}'")]
    ProjectMismatch { context: String, catalog: String },

    /// Connection / session error
    #[error(transparent)]
    Connection(#[from] climscen_connection::ConnectionError),

    /// Core library error
    #[error(transparent)]
    Core(#[from] climscen_core::Error),
}

impl CatalogError {
    pub fn unknown_code(dimension: &'static str, code: impl Into<String>) -> Self {
        CatalogError::UnknownCode {
            dimension,
            code: code.into(),
        }
    }

    pub fn invalid_horizon(msg: impl Into<String>) -> Self {
        CatalogError::InvalidHorizon(msg.into())
    }

    pub fn incomplete(dimension: &'static str) -> Self {
        CatalogError::Incomplete { dimension }
    }
}
