//! Conflict-aware batch import
//!
//! [`load_selected`] imports a list of asset files into a [`Workspace`]
//! inside one transaction. Collisions with assets already in the workspace
//! (compared by name, ignoring case) go through a [`ConflictResolver`];
//! answering "cancel" rolls the entire batch back.
//!
//! After a single-file import the caller may ask for placement. The first
//! variant of the imported asset is then activated and handed to a
//! [`DeferredPlacement`] coordinator.

pub mod conflict;
pub mod error;
pub mod summary;

pub use conflict::{
    ConflictChoice, ConflictResolver, DialoguerResolver, FixedResolver, Resolution,
    ScriptedResolver, StickyPolicy,
};
pub use error::LoadError;
pub use summary::LoadSummary;

use crate::catalog::display_name_of;
use crate::host::{HostError, Workspace};
use crate::placement::{DeferredPlacement, IdleSource};
use std::collections::HashSet;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

type Result<T> = std::result::Result<T, LoadError>;

const LOAD_TRANSACTION: &str = "Load assets";
const ACTIVATE_TRANSACTION: &str = "Activate variant";

/// Assets to import and what to do afterwards
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadRequest {
    pub paths: Vec<PathBuf>,
    pub place_after_loading: bool,
}

impl LoadRequest {
    #[must_use]
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            place_after_loading: false,
        }
    }

    #[must_use]
    pub const fn with_placement(mut self, place: bool) -> Self {
        self.place_after_loading = place;
        self
    }
}

/// Result of a load batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No paths were given
    Nothing,
    /// The user cancelled and every change was rolled back
    Cancelled,
    /// The batch was committed
    Completed(LoadSummary),
    /// The batch was committed and placement waits for the next idle signal
    PlacementArmed { summary: LoadSummary, variant: String },
    /// The asset was imported but no placeable variant could be activated
    PlacementUnavailable(LoadSummary),
}

impl LoadOutcome {
    #[must_use]
    pub const fn summary(&self) -> Option<&LoadSummary> {
        match self {
            Self::Nothing | Self::Cancelled => None,
            Self::Completed(summary)
            | Self::PlacementArmed { summary, .. }
            | Self::PlacementUnavailable(summary) => Some(summary),
        }
    }
}

/// Open workspace transaction that rolls back unless committed
struct TransactionGuard<'w, W: Workspace> {
    workspace: &'w mut W,
    open: bool,
}

impl<'w, W: Workspace> TransactionGuard<'w, W> {
    fn begin(workspace: &'w mut W, name: &str) -> std::result::Result<Self, HostError> {
        workspace.begin_transaction(name)?;
        Ok(Self {
            workspace,
            open: true,
        })
    }

    fn commit(mut self) -> std::result::Result<(), HostError> {
        self.open = false;
        self.workspace.commit_transaction()
    }
}

impl<W: Workspace> Deref for TransactionGuard<'_, W> {
    type Target = W;

    fn deref(&self) -> &W {
        self.workspace
    }
}

impl<W: Workspace> DerefMut for TransactionGuard<'_, W> {
    fn deref_mut(&mut self) -> &mut W {
        self.workspace
    }
}

impl<W: Workspace> Drop for TransactionGuard<'_, W> {
    fn drop(&mut self) {
        if self.open {
            self.workspace.rollback_transaction();
        }
    }
}

/// Import the requested asset files into `workspace`
///
/// # Errors
///
/// Returns `LoadError` if the transaction cannot be opened or committed or
/// the conflict prompt fails. In both cases nothing is imported.
pub fn load_selected<W, R, I>(
    workspace: &mut W,
    request: &LoadRequest,
    resolver: &mut R,
    placement: &mut DeferredPlacement<W::Variant, I>,
) -> Result<LoadOutcome>
where
    W: Workspace,
    W::Variant: std::fmt::Display,
    R: ConflictResolver + ?Sized,
    I: IdleSource,
{
    if request.paths.is_empty() {
        return Ok(LoadOutcome::Nothing);
    }

    let mut existing: HashSet<String> = workspace
        .asset_names()
        .iter()
        .map(|n| n.to_lowercase())
        .collect();
    let mut policy = StickyPolicy::default();
    let mut summary = LoadSummary::new();
    let mut first_loaded = None;

    {
        let mut tx = TransactionGuard::begin(workspace, LOAD_TRANSACTION)?;
        for path in &request.paths {
            if !path.is_file() {
                summary.add_failure(format!("not found: {}", path.display()));
                continue;
            }

            let name = display_name_of(path);
            let key = name.to_lowercase();
            let exists = !name.is_empty() && existing.contains(&key);
            if exists {
                match policy.resolve(resolver, &name, path)? {
                    Resolution::Cancel => {
                        info!("load cancelled, rolling back");
                        return Ok(LoadOutcome::Cancelled);
                    }
                    Resolution::Skip => {
                        summary.add_skip();
                        continue;
                    }
                    Resolution::Overwrite => {}
                }
            }

            match tx.load_asset(path, exists) {
                Ok(Some(asset)) => {
                    summary.add_loaded(&name);
                    existing.insert(key);
                    if first_loaded.is_none() {
                        first_loaded = Some(asset);
                    }
                }
                Ok(None) => summary.add_failure(format!("{name}: declined by workspace")),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "asset failed to load");
                    summary.add_failure(format!("{name}: {e}"));
                }
            }
        }
        tx.commit()?;
    }
    debug!(
        loaded = summary.loaded,
        skipped = summary.skipped,
        failed = summary.failed,
        "load batch committed"
    );

    if request.place_after_loading
        && request.paths.len() == 1
        && let Some(asset) = first_loaded
    {
        return Ok(arm_placement(workspace, &asset, summary, placement));
    }
    Ok(LoadOutcome::Completed(summary))
}

fn arm_placement<W, I>(
    workspace: &mut W,
    asset: &W::Asset,
    summary: LoadSummary,
    placement: &mut DeferredPlacement<W::Variant, I>,
) -> LoadOutcome
where
    W: Workspace,
    W::Variant: std::fmt::Display,
    I: IdleSource,
{
    let Some(variant) = workspace.first_variant(asset) else {
        info!(?asset, "imported asset has no placeable variant");
        return LoadOutcome::PlacementUnavailable(summary);
    };
    if let Err(e) = activate(workspace, &variant) {
        warn!(%variant, error = %e, "variant could not be activated");
        return LoadOutcome::PlacementUnavailable(summary);
    }

    let label = variant.to_string();
    if placement.start(variant) {
        LoadOutcome::PlacementArmed {
            summary,
            variant: label,
        }
    } else {
        LoadOutcome::PlacementUnavailable(summary)
    }
}

fn activate<W: Workspace>(
    workspace: &mut W,
    variant: &W::Variant,
) -> std::result::Result<(), HostError> {
    let mut tx = TransactionGuard::begin(workspace, ACTIVATE_TRANSACTION)?;
    tx.activate_variant(variant)?;
    tx.commit()
}

/// Resolve selected paths, dropping missing files and duplicates
#[must_use]
pub fn existing_unique_paths<'a, I>(paths: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = &'a Path>,
{
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter(|p| p.is_file())
        .filter(|p| seen.insert(p.to_string_lossy().to_lowercase()))
        .map(Path::to_path_buf)
        .collect()
}
