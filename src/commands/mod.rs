//! Command implementations
//!
//! Each command is a module with an execute function that takes parsed CLI args
//! and runs the operation against the configured library. Long-running work
//! (indexing, rendering, loading) goes through a [`TaskQueue`] so it runs one
//! task at a time and reports back through a completion message.

pub mod config;
pub mod index;
pub mod list;
pub mod load;
pub mod tag;
pub mod tags;
pub mod thumbs;

// Re-export execute functions for convenience
pub use self::config::execute as config;
pub use index::execute as index;
pub use list::execute as list;
pub use load::execute as load;
pub use tag::execute as tag;
pub use tag::untag;
pub use tags::execute as tags;
pub use thumbs::execute as thumbs;

use crate::FamlibError;
use crate::config::Settings;
use crate::output;
use crate::session::LibrarySession;
use crate::tasks::{TaskExecutor, TaskQueue, TaskRequest, TaskResult};
use std::path::PathBuf;

type Result<T> = std::result::Result<T, FamlibError>;

/// The configured library root, which must exist
///
/// # Errors
///
/// Returns `FamlibError::InvalidInput` if no root is configured or the folder is missing.
pub fn library_root(settings: &Settings) -> Result<PathBuf> {
    if !settings.has_library_root() {
        return Err(FamlibError::InvalidInput(
            "No library root configured. Use 'famlib config set-root <DIR>' or --root <DIR>.".into(),
        ));
    }
    if !settings.library_root.is_dir() {
        return Err(FamlibError::InvalidInput(format!(
            "Library root '{}' does not exist",
            settings.library_root.display()
        )));
    }
    Ok(settings.library_root.clone())
}

/// Open a session on the configured library
///
/// # Errors
///
/// Returns `FamlibError` if no root is configured or the catalog cannot be opened.
pub fn open_session(settings: &Settings) -> Result<LibrarySession> {
    library_root(settings)?;
    let mut session = LibrarySession::open(settings.clone())?;
    if let Ok(path) = Settings::settings_path() {
        session = session.with_settings_path(path);
    }
    Ok(session)
}

/// Queue one request, run it and return its result
///
/// Notices produced by the task are printed as they arrive.
///
/// # Errors
///
/// Returns the task's own error if it failed.
pub fn run_task<E: TaskExecutor + ?Sized>(
    executor: &mut E,
    request: TaskRequest,
) -> Result<TaskResult> {
    let (mut queue, completed) = TaskQueue::new();
    let id = queue.submit(request);
    queue.run_all(executor);

    for done in completed.try_iter() {
        for notice in &done.notices {
            output::print_notice(notice);
        }
        if done.id == id {
            return done.result;
        }
    }
    Err(FamlibError::InvalidInput("task finished without a result".into()))
}
