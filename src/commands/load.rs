//! Load command - import assets into a workspace folder

use super::{library_root, run_task};
use crate::FamlibError;
use crate::config::Settings;
use crate::host::portable::{ConsolePlacement, DirectoryWorkspace, IdleFlag, PortableHost};
use crate::loader::{
    ConflictChoice, ConflictResolver, DialoguerResolver, FixedResolver, LoadOutcome, LoadRequest,
    existing_unique_paths,
};
use crate::placement::DeferredPlacement;
use crate::session::LibrarySession;
use crate::tasks::{LibraryExecutor, TaskRequest, TaskResult, WorkspaceLoader};
use colored::Colorize;
use std::path::{Path, PathBuf};

type Result<T> = std::result::Result<T, FamlibError>;

/// Options of one load invocation
#[derive(Debug, Clone, Default)]
pub struct LoadArgs {
    pub workspace: PathBuf,
    pub assets: Vec<String>,
    pub place: bool,
    pub overwrite: bool,
    pub skip_existing: bool,
    pub on_conflict: Option<ConflictChoice>,
}

impl LoadArgs {
    /// Answer given up front for every collision, `None` to prompt
    #[must_use]
    pub fn fixed_choice(&self) -> Option<ConflictChoice> {
        if self.on_conflict.is_some() {
            self.on_conflict
        } else if self.overwrite {
            Some(ConflictChoice::Overwrite)
        } else if self.skip_existing {
            Some(ConflictChoice::Skip)
        } else {
            None
        }
    }
}

/// Execute the load command
///
/// Asset arguments may be file paths or catalog keys (relative path or
/// display name). Collisions are resolved interactively unless
/// `--overwrite`, `--skip-existing` or `--on-conflict` was given.
///
/// # Errors
/// Returns an error if an asset cannot be resolved, the workspace cannot be
/// opened, or the batch could not run
pub fn execute(settings: &Settings, args: &LoadArgs, quiet: bool) -> Result<()> {
    let paths = resolve_assets(settings, &args.assets)?;
    let paths = existing_unique_paths(paths.iter().map(PathBuf::as_path));
    if paths.is_empty() {
        if !quiet {
            println!("No existing asset files selected.");
        }
        return Ok(());
    }

    let mut workspace = DirectoryWorkspace::open(&args.workspace, settings.pattern()?)?;
    let mut resolver: Box<dyn ConflictResolver> = match args.fixed_choice() {
        Some(choice) => Box::new(FixedResolver(choice)),
        None => Box::new(DialoguerResolver::new()),
    };
    let mut placement = DeferredPlacement::new(IdleFlag::default());

    let host = PortableHost;
    let request = TaskRequest::LoadSelected(LoadRequest::new(paths).with_placement(args.place));
    let result = {
        let mut executor = LibraryExecutor::new(&host).with_loader(WorkspaceLoader {
            workspace: &mut workspace,
            resolver: resolver.as_mut(),
            placement: &mut placement,
        });
        run_task(&mut executor, request)?
    };

    let TaskResult::Loaded(outcome) = result else {
        return Ok(());
    };
    report(&outcome, quiet);

    if placement.is_armed() {
        let mut host = ConsolePlacement {
            quiet,
            ..ConsolePlacement::default()
        };
        if !placement.on_idle(&mut host) && !quiet {
            println!("{}", "Placement could not be started".yellow());
        }
    }
    Ok(())
}

fn report(outcome: &LoadOutcome, quiet: bool) {
    if quiet {
        return;
    }
    match outcome {
        LoadOutcome::Nothing => println!("Nothing to load."),
        LoadOutcome::Cancelled => {
            println!("{}", "Load cancelled, nothing was imported.".yellow());
        }
        LoadOutcome::Completed(summary) => summary.print(),
        LoadOutcome::PlacementArmed { summary, variant } => {
            summary.print();
            println!("\nActivated {}", variant.bold());
        }
        LoadOutcome::PlacementUnavailable(summary) => {
            summary.print();
            println!("\n{}", "No placeable variant found".yellow());
        }
    }
}

/// Turn asset arguments into file paths
///
/// Existing files are taken as they are; anything else is looked up in the
/// catalog of the configured library.
fn resolve_assets(settings: &Settings, assets: &[String]) -> Result<Vec<PathBuf>> {
    let mut session: Option<LibrarySession> = None;
    let mut paths = Vec::with_capacity(assets.len());

    for asset in assets {
        let as_path = Path::new(asset);
        if as_path.is_file() {
            paths.push(as_path.to_path_buf());
            continue;
        }

        if session.is_none() {
            library_root(settings)?;
            session = Some(LibrarySession::open(settings.clone())?);
        }
        if let Some(session) = &session {
            let index = session.find(asset)?;
            if let Some(item) = session.item(index) {
                paths.push(item.full_path.clone());
            }
        }
    }
    Ok(paths)
}
