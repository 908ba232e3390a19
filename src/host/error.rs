//! Host capability errors
//!
//! Every fallible call across the host boundary reports one of these. The
//! library decides per call site whether a failure is fatal, counted or
//! swallowed.

use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by an [`super::AssetHost`], its documents or a [`super::Workspace`]
#[derive(Debug, Error)]
pub enum HostError {
    /// Represents an I/O error inside the host
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The asset file could not be opened as a document
    #[error("Cannot open '{}': {reason}", path.display())]
    Open { path: PathBuf, reason: String },

    /// Render or export failure
    #[error("Render failed: {0}")]
    Render(String),

    /// A scoped mutation or transaction could not be started or committed
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// A named view, variant or asset does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The host rejected the operation
    #[error("Operation rejected: {0}")]
    Rejected(String),
}

impl HostError {
    pub fn open(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Open {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_open_error_display() {
        let error = HostError::open("/lib/A.rfa", "bad manifest");
        assert_eq!(error.to_string(), "Cannot open '/lib/A.rfa': bad manifest");
    }

    #[test]
    fn test_io_error_has_source() {
        let error: HostError = std::io::Error::other("disk").into();
        assert!(error.source().is_some());
        assert!(HostError::Render("x".into()).source().is_none());
    }
}
