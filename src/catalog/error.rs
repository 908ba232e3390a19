//! Catalog-specific error types
//!
//! This module defines the errors that can occur while reading, writing or
//! walking a catalog. Read failures of the catalog file itself are normally
//! swallowed by [`super::CatalogStore::load`]; these variants surface from the
//! strict entry points and from writes.

use thiserror::Error;

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Represents an I/O error on the catalog file or the asset tree
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog file is not a valid record array
    #[error("Error while decoding catalog: {0}")]
    Decode(String),

    /// The catalog could not be serialized
    #[error("Error while encoding catalog: {0}")]
    Encode(String),

    /// Error while walking the asset tree
    #[error("Error while walking asset tree: {0}")]
    Walk(String),

    /// Asset file pattern is invalid
    #[error("Invalid asset pattern '{0}': {1}")]
    InvalidPattern(String, String),

    /// A path is not located under the asset root
    #[error("Path is outside the asset root: {0}")]
    OutsideRoot(String),

    /// No catalog entry matches the given name or path
    #[error("Asset not found in catalog: {0}")]
    NotFound(String),
}

impl From<walkdir::Error> for CatalogError {
    fn from(err: walkdir::Error) -> Self {
        Self::Walk(err.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
