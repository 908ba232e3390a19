//! Index command - synchronize the catalog with the asset files

use super::{library_root, run_task};
use crate::config::Settings;
use crate::host::portable::PortableHost;
use crate::indexer::PrunePolicy;
use crate::tasks::{LibraryExecutor, TaskRequest, TaskResult};
use crate::{FamlibError, output};

type Result<T> = std::result::Result<T, FamlibError>;

/// Execute the index command
///
/// # Errors
/// Returns an error if the library root is not usable or the catalog cannot be written
pub fn execute(settings: &Settings, prune: bool, quiet: bool) -> Result<()> {
    let root = library_root(settings)?;
    let prune = if prune {
        PrunePolicy::RemoveMissing
    } else {
        PrunePolicy::Keep
    };

    let host = PortableHost;
    let mut executor = LibraryExecutor::new(&host).with_pattern(settings.pattern()?);
    if let TaskResult::Indexed(report) =
        run_task(&mut executor, TaskRequest::BuildIndex { root, prune })?
        && !quiet
    {
        output::print_index_report(&report);
    }
    Ok(())
}
