//! Catalog error types.

use thiserror::Error;

use quizkit_core::error::TransportError;

/// Why the remote source catalog could not be used.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The catalog could not be fetched.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The catalog is not valid JSON.
    #[error("catalog is not valid JSON: {0}")]
    InvalidJson(String),

    /// The catalog is valid JSON but not an array.
    #[error("catalog has the wrong shape: expected an array of sources")]
    NotAnArray,
}
