//! Directory-backed host
//!
//! Asset files are small TOML manifests:
//!
//! ```toml
//! category = "Doors"
//! saved_in = "Autodesk Revit 2022"
//!
//! [[variants]]
//! name = "600 x 2100"
//! width = 600
//! depth = 2100
//! ```
//!
//! Rendering paints a raster whose aspect ratio follows the active variant's
//! width and depth and whose color is derived from the variant name, so the
//! same asset always renders the same pixels. A [`DirectoryWorkspace`] imports
//! assets by copying them into a folder through a staging area that is either
//! moved into place on commit or deleted on rollback.

use super::{
    AssetDocument, AssetHost, ClutterCategory, ElementClass, FileInfo, HostError, Result,
    ViewHandle, Workspace,
};
use crate::catalog::layout::RENDER_FILE_PREFIX;
use crate::catalog::{AssetPattern, display_name_of};
use crate::placement::{IdleSource, PlacementHost};
use colored::Colorize;
use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};

const STAGING_DIR: &str = ".famlib-staging";
const BACKUP_DIR: &str = "replaced";
const DEFAULT_ASPECT: (u32, u32) = (4, 3);

static RENDER_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// One variant entry of an asset manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantSpec {
    pub name: String,
    pub width: u32,
    pub depth: u32,
}

impl VariantSpec {
    #[must_use]
    pub fn new(name: &str, width: u32, depth: u32) -> Self {
        Self {
            name: name.to_string(),
            width,
            depth,
        }
    }
}

/// Contents of a portable asset file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetManifest {
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_in: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_build: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    pub variants: Vec<VariantSpec>,
}

impl AssetManifest {
    #[must_use]
    pub fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_variant(mut self, name: &str, width: u32, depth: u32) -> Self {
        self.variants.push(VariantSpec::new(name, width, depth));
        self
    }

    #[must_use]
    pub fn saved_in(mut self, version: &str) -> Self {
        self.saved_in = Some(version.to_string());
        self
    }

    /// # Errors
    ///
    /// Returns `HostError::Open` if the file is missing or not a valid manifest.
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| HostError::open(path, e))?;
        toml::from_str(&text).map_err(|e| HostError::open(path, e.message()))
    }

    /// # Errors
    ///
    /// Returns `HostError` if the manifest cannot be serialized or written.
    pub fn write(&self, path: &Path) -> Result<()> {
        let text = toml::to_string_pretty(self).map_err(|e| HostError::Rejected(e.to_string()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, text)?;
        Ok(())
    }

    fn summary(&self) -> String {
        [
            Some(self.category.as_str()),
            self.saved_in.as_deref(),
            self.app_version.as_deref(),
            self.format.as_deref(),
            self.app_build.as_deref(),
            self.build.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
    }
}

/// Host that reads manifests from disk
#[derive(Debug, Clone, Copy, Default)]
pub struct PortableHost;

impl AssetHost for PortableHost {
    type Document = ManifestDocument;

    fn open_document(&self, path: &Path) -> Result<ManifestDocument> {
        let manifest = AssetManifest::read(path)?;
        debug!(path = %path.display(), "opened asset");
        Ok(ManifestDocument::new(path, manifest))
    }

    fn file_info(&self, path: &Path) -> Result<FileInfo> {
        let manifest = AssetManifest::read(path)?;
        Ok(FileInfo {
            saved_in_version: manifest.saved_in.clone(),
            app_version: manifest.app_version.clone(),
            format: manifest.format.clone(),
            app_build: manifest.app_build.clone(),
            build: manifest.build.clone(),
            summary: Some(manifest.summary()),
        })
    }
}

#[derive(Debug, Clone, Default)]
struct PreviewView {
    name: String,
    hidden_categories: Vec<ClutterCategory>,
    hidden_classes: Vec<ElementClass>,
}

#[derive(Debug, Clone)]
struct Snapshot {
    views: Vec<PreviewView>,
    active: Option<usize>,
}

/// An opened manifest
#[derive(Debug)]
pub struct ManifestDocument {
    path: PathBuf,
    manifest: AssetManifest,
    views: Vec<PreviewView>,
    active: Option<usize>,
    scratch: Option<Snapshot>,
    closed: bool,
}

impl ManifestDocument {
    fn new(path: &Path, manifest: AssetManifest) -> Self {
        Self {
            path: path.to_path_buf(),
            manifest,
            views: Vec::new(),
            active: None,
            scratch: None,
            closed: false,
        }
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    fn view_mut(&mut self, view: ViewHandle) -> Result<&mut PreviewView> {
        self.views
            .get_mut(view.0)
            .ok_or_else(|| HostError::NotFound(format!("view #{}", view.0)))
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(HostError::Rejected(format!(
                "document '{}' is closed",
                self.path.display()
            )));
        }
        Ok(())
    }

    fn raster_size(&self, pixel_size: u32) -> (u32, u32) {
        let (w, h) = self
            .active
            .and_then(|i| self.manifest.variants.get(i))
            .filter(|v| v.width > 0 && v.depth > 0)
            .map_or(DEFAULT_ASPECT, |v| (v.width, v.depth));
        let long = pixel_size.max(1);
        let scale = |a: u32, b: u32| {
            let scaled = u64::from(long) * u64::from(a) / u64::from(b.max(1));
            u32::try_from(scaled).unwrap_or(long).max(1)
        };
        if w >= h {
            (long, scale(h, w))
        } else {
            (scale(w, h), long)
        }
    }

    fn render_color(&self) -> Rgb<u8> {
        let key = self
            .active
            .and_then(|i| self.manifest.variants.get(i))
            .map_or_else(|| display_name_of(&self.path), |v| v.name.clone());
        let hash = fnv1a(key.as_bytes());
        let [r, g, b, ..] = hash.to_le_bytes();
        // keep clear of the white padding
        Rgb([r % 200, g % 200, b % 200])
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(0x0100_0000_01b3)
    })
}

impl AssetDocument for ManifestDocument {
    fn category(&self) -> Option<String> {
        Some(self.manifest.category.clone()).filter(|c| !c.is_empty())
    }

    fn variant_names(&self) -> Vec<String> {
        self.manifest.variants.iter().map(|v| v.name.clone()).collect()
    }

    fn begin_scratch(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.scratch.is_some() {
            return Err(HostError::Transaction("scratch group already open".into()));
        }
        self.scratch = Some(Snapshot {
            views: self.views.clone(),
            active: self.active,
        });
        Ok(())
    }

    fn rollback_scratch(&mut self) {
        if let Some(snapshot) = self.scratch.take() {
            self.views = snapshot.views;
            self.active = snapshot.active;
        }
    }

    fn find_view(&self, name: &str) -> Option<ViewHandle> {
        self.views
            .iter()
            .position(|v| v.name == name)
            .map(ViewHandle)
    }

    fn create_view(&mut self, name: &str) -> Result<ViewHandle> {
        self.ensure_open()?;
        self.views.push(PreviewView {
            name: name.to_string(),
            ..PreviewView::default()
        });
        Ok(ViewHandle(self.views.len() - 1))
    }

    fn hide_category(&mut self, view: ViewHandle, category: ClutterCategory) -> Result<()> {
        let view = self.view_mut(view)?;
        if !view.hidden_categories.contains(&category) {
            view.hidden_categories.push(category);
        }
        Ok(())
    }

    fn hide_elements_of_class(&mut self, view: ViewHandle, class: ElementClass) -> Result<()> {
        let view = self.view_mut(view)?;
        if !view.hidden_classes.contains(&class) {
            view.hidden_classes.push(class);
        }
        Ok(())
    }

    fn activate_variant(&mut self, name: &str) -> Result<()> {
        self.ensure_open()?;
        let index = self
            .manifest
            .variants
            .iter()
            .position(|v| v.name == name)
            .ok_or_else(|| HostError::NotFound(format!("variant '{name}'")))?;
        self.active = Some(index);
        Ok(())
    }

    fn regenerate(&mut self) -> Result<()> {
        self.ensure_open()
    }

    fn render(&mut self, view: ViewHandle, pixel_size: u32, dest_dir: &Path) -> Result<PathBuf> {
        self.ensure_open()?;
        if view.0 >= self.views.len() {
            return Err(HostError::NotFound(format!("view #{}", view.0)));
        }
        if pixel_size == 0 {
            return Err(HostError::Render("pixel size must be positive".into()));
        }

        let (width, height) = self.raster_size(pixel_size);
        let raster = RgbImage::from_pixel(width, height, self.render_color());

        fs::create_dir_all(dest_dir)?;
        let n = RENDER_COUNTER.fetch_add(1, Ordering::Relaxed);
        let out = dest_dir.join(format!("{RENDER_FILE_PREFIX}{}-{n}.png", std::process::id()));
        raster
            .save(&out)
            .map_err(|e| HostError::Render(e.to_string()))?;
        Ok(out)
    }

    fn close(&mut self) {
        if !self.closed {
            self.rollback_scratch();
            self.closed = true;
            debug!(path = %self.path.display(), "closed asset");
        }
    }
}

/// An asset imported into a [`DirectoryWorkspace`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceAsset {
    pub name: String,
    pub path: PathBuf,
    pub variants: Vec<String>,
}

/// A variant of an imported asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortableVariant {
    pub asset: String,
    pub name: String,
}

impl fmt::Display for PortableVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.asset, self.name)
    }
}

/// One file waiting in the staging area
///
/// `replaces` holds workspace files that name the same asset under a
/// different letter case; they disappear when the transaction commits.
#[derive(Debug)]
struct Staged {
    staged: PathBuf,
    target: PathBuf,
    replaces: Vec<PathBuf>,
}

/// Moves made while committing, undone in reverse on failure
#[derive(Debug, Default)]
struct CommitLog {
    moved_aside: Vec<(PathBuf, PathBuf)>,
    placed: Vec<PathBuf>,
}

impl CommitLog {
    fn apply(&mut self, staged: &[Staged], backup_dir: &Path) -> io::Result<()> {
        fs::create_dir_all(backup_dir)?;
        for entry in staged {
            for old in std::iter::once(&entry.target).chain(&entry.replaces) {
                if old.is_dir() {
                    return Err(io::Error::other(format!(
                        "{} is a directory",
                        old.display()
                    )));
                }
                if old.exists() {
                    let backup = backup_dir.join(self.moved_aside.len().to_string());
                    fs::rename(old, &backup)?;
                    self.moved_aside.push((old.clone(), backup));
                }
            }
            fs::rename(&entry.staged, &entry.target)?;
            self.placed.push(entry.target.clone());
        }
        Ok(())
    }

    /// Put the workspace back the way it was, `false` if a backup is stuck
    fn restore(&self) -> bool {
        let mut restored = true;
        for placed in self.placed.iter().rev() {
            if let Err(e) = fs::remove_file(placed) {
                warn!(path = %placed.display(), error = %e, "could not remove placed file");
            }
        }
        for (original, backup) in self.moved_aside.iter().rev() {
            if let Err(e) = fs::rename(backup, original) {
                warn!(path = %original.display(), error = %e, "could not restore replaced file");
                restored = false;
            }
        }
        restored
    }
}

#[derive(Debug, Default)]
struct Transaction {
    staged: Vec<Staged>,
    activated: Option<PortableVariant>,
}

/// Folder acting as an import target
#[derive(Debug)]
pub struct DirectoryWorkspace {
    dir: PathBuf,
    pattern: AssetPattern,
    transaction: Option<Transaction>,
    active_variant: Option<PortableVariant>,
}

impl DirectoryWorkspace {
    /// # Errors
    ///
    /// Returns `HostError::Io` if the folder cannot be created.
    pub fn open(dir: &Path, pattern: AssetPattern) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            pattern,
            transaction: None,
            active_variant: None,
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Variant activated by the last committed transaction
    #[must_use]
    pub const fn active_variant(&self) -> Option<&PortableVariant> {
        self.active_variant.as_ref()
    }

    fn staging_dir(&self) -> PathBuf {
        self.dir.join(STAGING_DIR)
    }

    /// Workspace files whose display name equals `key` ignoring case
    fn files_named(&self, key: &str) -> Vec<PathBuf> {
        if key.is_empty() {
            return Vec::new();
        }
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        entries
            .filter_map(std::result::Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_file() && self.pattern.matches(p))
            .filter(|p| display_name_of(p).to_lowercase() == key)
            .collect()
    }

    fn transaction_mut(&mut self) -> Result<&mut Transaction> {
        self.transaction
            .as_mut()
            .ok_or_else(|| HostError::Transaction("no transaction open".into()))
    }
}

impl Workspace for DirectoryWorkspace {
    type Asset = WorkspaceAsset;
    type Variant = PortableVariant;

    fn asset_names(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        entries
            .filter_map(std::result::Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_file() && self.pattern.matches(p))
            .map(|p| display_name_of(&p))
            .collect()
    }

    fn begin_transaction(&mut self, name: &str) -> Result<()> {
        if self.transaction.is_some() {
            return Err(HostError::Transaction("transaction already open".into()));
        }
        fs::create_dir_all(self.staging_dir())?;
        self.transaction = Some(Transaction::default());
        debug!(name, "workspace transaction started");
        Ok(())
    }

    fn commit_transaction(&mut self) -> Result<()> {
        let Some(tx) = self.transaction.take() else {
            return Err(HostError::Transaction("no transaction open".into()));
        };
        let mut log = CommitLog::default();
        if let Err(e) = log.apply(&tx.staged, &self.staging_dir().join(BACKUP_DIR)) {
            warn!(error = %e, "workspace commit failed, restoring");
            if log.restore() {
                let _ = fs::remove_dir_all(self.staging_dir());
            }
            return Err(e.into());
        }
        if tx.activated.is_some() {
            self.active_variant = tx.activated;
        }
        let _ = fs::remove_dir_all(self.staging_dir());
        debug!(count = tx.staged.len(), "workspace transaction committed");
        Ok(())
    }

    fn rollback_transaction(&mut self) {
        if self.transaction.take().is_some() {
            let _ = fs::remove_dir_all(self.staging_dir());
            debug!("workspace transaction rolled back");
        }
    }

    fn load_asset(&mut self, path: &Path, overwrite: bool) -> Result<Option<WorkspaceAsset>> {
        let manifest = AssetManifest::read(path)?;
        let file_name = path
            .file_name()
            .ok_or_else(|| HostError::open(path, "not a file"))?
            .to_os_string();
        let target = self.dir.join(&file_name);
        let staged_path = self.staging_dir().join(&file_name);
        let key = display_name_of(path).to_lowercase();
        let mut replaces = self.files_named(&key);

        let tx = self.transaction_mut()?;
        let pending = tx
            .staged
            .iter()
            .position(|s| s.target == target || display_name_of(&s.target).to_lowercase() == key);
        if (target.exists() || !replaces.is_empty() || pending.is_some()) && !overwrite {
            return Ok(None);
        }
        if let Some(index) = pending {
            let previous = tx.staged.remove(index);
            if previous.staged.exists() {
                fs::remove_file(&previous.staged)?;
            }
        }
        fs::copy(path, &staged_path)?;
        replaces.retain(|p| *p != target);
        tx.staged.push(Staged {
            staged: staged_path,
            target: target.clone(),
            replaces,
        });

        Ok(Some(WorkspaceAsset {
            name: display_name_of(path),
            path: target,
            variants: manifest.variants.into_iter().map(|v| v.name).collect(),
        }))
    }

    fn first_variant(&self, asset: &WorkspaceAsset) -> Option<PortableVariant> {
        asset.variants.first().map(|name| PortableVariant {
            asset: asset.name.clone(),
            name: name.clone(),
        })
    }

    fn activate_variant(&mut self, variant: &PortableVariant) -> Result<()> {
        self.transaction_mut()?.activated = Some(variant.clone());
        Ok(())
    }
}

impl Drop for DirectoryWorkspace {
    fn drop(&mut self) {
        self.rollback_transaction();
    }
}

/// Idle source for hosts without an event loop
///
/// The owner polls [`IdleFlag::is_subscribed`] and delivers the idle signal itself.
#[derive(Debug, Default)]
pub struct IdleFlag {
    subscribed: bool,
}

impl IdleSource for IdleFlag {
    fn subscribe(&mut self) {
        self.subscribed = true;
    }

    fn unsubscribe(&mut self) {
        self.subscribed = false;
    }

    fn is_subscribed(&self) -> bool {
        self.subscribed
    }
}

/// Placement host that reports the placement on the terminal
#[derive(Debug, Default)]
pub struct ConsolePlacement {
    pub quiet: bool,
    pub placed: Vec<PortableVariant>,
}

impl PlacementHost<PortableVariant> for ConsolePlacement {
    fn hide_window(&mut self) -> Result<()> {
        Ok(())
    }

    fn request_placement(&mut self, target: &PortableVariant) -> Result<()> {
        if !self.quiet {
            println!("{} {}", "Ready to place".green(), target.to_string().bold());
        }
        self.placed.push(target.clone());
        Ok(())
    }
}
