//! Thumbnail pipeline errors

use crate::catalog::CatalogError;
use crate::host::HostError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThumbnailError {
    /// Represents an I/O error while writing thumbnails
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The rendered raster could not be decoded or encoded
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// The host failed to open, prepare or render the asset
    #[error("{0}")]
    Host(#[from] HostError),

    /// The library layout could not be resolved
    #[error("{0}")]
    Catalog(#[from] CatalogError),

    /// A thumbnail edge length of zero was requested
    #[error("Invalid thumbnail size: {0}")]
    InvalidSize(u32),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
