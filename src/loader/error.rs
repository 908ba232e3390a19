//! Batch loader errors
//!
//! Per-item import failures are counted in the [`super::LoadSummary`] and never
//! surface here. These variants abort a whole batch.

use crate::host::HostError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    /// The workspace transaction could not be opened or committed
    #[error("Workspace error: {0}")]
    Workspace(#[from] HostError),

    /// The conflict prompt failed
    #[error("Prompt failed: {0}")]
    Prompt(String),
}

impl From<dialoguer::Error> for LoadError {
    fn from(err: dialoguer::Error) -> Self {
        Self::Prompt(err.to_string())
    }
}
