//! Famlib - an incremental catalog for design-asset libraries
//!
//! This library keeps a persisted catalog of asset files (files embedding
//! several named variants plus a category) in sync with a directory tree,
//! renders square preview thumbnails per asset and per variant, filters the
//! catalog by tags, display mode and free text, and imports selected assets
//! into a target workspace with conflict handling.
//!
//! The host application that actually opens, renders and imports assets is
//! abstracted behind the traits in [`host`]; [`host::portable`] provides a
//! directory-based implementation used by the `famlib` binary.

use thiserror::Error;

pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod filter;
pub mod host;
pub mod indexer;
pub mod loader;
pub mod output;
pub mod placement;
pub mod session;
pub mod tags;
pub mod tasks;
pub mod thumbnails;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum FamlibError {
    /// Catalog error
    #[error("Catalog error: {0}")]
    Catalog(#[from] catalog::CatalogError),
    /// Host capability error
    #[error("Host error: {0}")]
    Host(#[from] host::HostError),
    /// Thumbnail rendering error
    #[error("Thumbnail error: {0}")]
    Thumbnail(#[from] thumbnails::ThumbnailError),
    /// Batch loading error
    #[error("Load error: {0}")]
    Load(#[from] loader::LoadError),
    /// Library session error
    #[error("{0}")]
    Session(#[from] session::SessionError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
