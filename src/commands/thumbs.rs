//! Thumbs command - render asset and variant thumbnails

use super::{library_root, run_task};
use crate::config::Settings;
use crate::host::portable::PortableHost;
use crate::tasks::{LibraryExecutor, TaskRequest, TaskResult};
use crate::{FamlibError, output};

type Result<T> = std::result::Result<T, FamlibError>;

/// Execute the thumbs command
///
/// Renders at `size` if given, otherwise at the configured thumbnail size,
/// and re-indexes afterwards unless `no_index` is set.
///
/// # Errors
/// Returns an error if the library root is not usable or the output folders cannot be created
pub fn execute(settings: &Settings, size: Option<u32>, no_index: bool, quiet: bool) -> Result<()> {
    let root = library_root(settings)?;
    let pixel_size = size.unwrap_or(settings.thumbnail_pixel_size);
    if pixel_size == 0 {
        return Err(FamlibError::InvalidInput("Thumbnail size must be positive".into()));
    }

    let host = PortableHost;
    let mut executor = LibraryExecutor::new(&host).with_pattern(settings.pattern()?);
    let request = TaskRequest::GenerateThumbnails {
        root,
        pixel_size,
        reindex: !no_index,
    };

    if let TaskResult::Thumbnails { report, index } = run_task(&mut executor, request)?
        && !quiet
    {
        output::print_thumbnail_report(&report);
        if let Some(index) = index {
            output::print_index_report(&index);
        }
    }
    Ok(())
}
