//! Host application boundary
//!
//! The catalog never touches asset internals itself. Opening an asset,
//! reading its metadata, rendering previews and importing it somewhere are
//! capabilities of a host application, modeled here as traits:
//!
//! - [`AssetHost`] opens asset files as [`AssetDocument`]s and reads file info
//! - [`AssetDocument`] exposes metadata, preview views and the render capability
//! - [`Workspace`] is the target that assets get imported into
//!
//! Two RAII guards keep host resources balanced: [`DocumentGuard`] always
//! closes an opened document and [`ScratchScope`] always rolls back a scoped
//! mutation group.
//!
//! [`portable`] implements all of these on top of plain directories.

pub mod error;
pub mod portable;

pub use error::HostError;

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, HostError>;

/// Version-related strings a host reports about an asset file
///
/// All fields are optional because hosts differ in what they expose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileInfo {
    /// Application release the file was last saved in
    pub saved_in_version: Option<String>,
    /// Application version string
    pub app_version: Option<String>,
    /// File format identifier
    pub format: Option<String>,
    /// Application build string
    pub app_build: Option<String>,
    /// Generic build string
    pub build: Option<String>,
    /// Free-form description of the whole record
    pub summary: Option<String>,
}

/// Opaque handle to a view inside an open document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewHandle(pub usize);

/// Annotation categories hidden from preview renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClutterCategory {
    Dimensions,
    Constraints,
    CenterLines,
    ReferenceLines,
    Connectors,
}

impl ClutterCategory {
    pub const ALL: [Self; 5] = [
        Self::Dimensions,
        Self::Constraints,
        Self::CenterLines,
        Self::ReferenceLines,
        Self::Connectors,
    ];
}

/// Element classes hidden from preview renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementClass {
    Dimension,
    ReferencePlane,
    ReferencePoint,
}

impl ElementClass {
    pub const ALL: [Self; 3] = [Self::Dimension, Self::ReferencePlane, Self::ReferencePoint];
}

/// An asset file opened by the host
pub trait AssetDocument {
    /// Category of the asset, if the document has one
    fn category(&self) -> Option<String>;

    /// Names of the variants embedded in the asset, in document order
    fn variant_names(&self) -> Vec<String>;

    /// Start a scoped mutation group that will only ever be rolled back
    ///
    /// # Errors
    ///
    /// Returns `HostError::Transaction` if a group is already open.
    fn begin_scratch(&mut self) -> Result<()>;

    /// Discard every change made since [`Self::begin_scratch`]
    fn rollback_scratch(&mut self);

    /// Look up a view by name
    fn find_view(&self, name: &str) -> Option<ViewHandle>;

    /// Create a new view with the given name
    ///
    /// # Errors
    ///
    /// Returns `HostError` if the document cannot hold another view.
    fn create_view(&mut self, name: &str) -> Result<ViewHandle>;

    /// Hide an annotation category in a view
    ///
    /// # Errors
    ///
    /// Returns `HostError` if the category cannot be hidden in this view.
    fn hide_category(&mut self, view: ViewHandle, category: ClutterCategory) -> Result<()>;

    /// Hide every element of a class in a view
    ///
    /// # Errors
    ///
    /// Returns `HostError` if the elements cannot be hidden.
    fn hide_elements_of_class(&mut self, view: ViewHandle, class: ElementClass) -> Result<()>;

    /// Make a variant the active one
    ///
    /// # Errors
    ///
    /// Returns `HostError::NotFound` for unknown variant names.
    fn activate_variant(&mut self, name: &str) -> Result<()>;

    /// Bring the document up to date after a change
    ///
    /// # Errors
    ///
    /// Returns `HostError` if regeneration fails.
    fn regenerate(&mut self) -> Result<()>;

    /// Export a view to a raster file inside `dest_dir`
    ///
    /// The image is rendered at roughly `pixel_size` on its long side and is
    /// not required to be square. Returns the written file.
    ///
    /// # Errors
    ///
    /// Returns `HostError::Render` if nothing could be exported.
    fn render(&mut self, view: ViewHandle, pixel_size: u32, dest_dir: &Path) -> Result<PathBuf>;

    /// Release the document without saving
    fn close(&mut self);
}

/// Host application able to open asset files
pub trait AssetHost {
    type Document: AssetDocument;

    /// Open an asset file for reading and rendering
    ///
    /// # Errors
    ///
    /// Returns `HostError::Open` if the file is not a readable asset.
    fn open_document(&self, path: &Path) -> Result<Self::Document>;

    /// Read version information without opening the document
    ///
    /// # Errors
    ///
    /// Returns `HostError` if the file cannot be inspected.
    fn file_info(&self, path: &Path) -> Result<FileInfo>;
}

/// Target that assets get imported into
pub trait Workspace {
    /// An asset after import
    type Asset: fmt::Debug;
    /// A placeable variant of an imported asset
    type Variant: Clone + fmt::Debug;

    /// Names of the assets already present
    fn asset_names(&self) -> Vec<String>;

    /// # Errors
    ///
    /// Returns `HostError::Transaction` if a transaction is already open.
    fn begin_transaction(&mut self, name: &str) -> Result<()>;

    /// # Errors
    ///
    /// Returns `HostError` if the staged changes cannot be applied.
    fn commit_transaction(&mut self) -> Result<()>;

    /// Discard everything staged since the transaction began
    fn rollback_transaction(&mut self);

    /// Import an asset file
    ///
    /// Returns `Ok(None)` when the host declines to import it, for example
    /// because an asset of that name exists and `overwrite` is false.
    ///
    /// # Errors
    ///
    /// Returns `HostError` if the import itself fails.
    fn load_asset(&mut self, path: &Path, overwrite: bool) -> Result<Option<Self::Asset>>;

    /// First variant of an imported asset that can be placed
    fn first_variant(&self, asset: &Self::Asset) -> Option<Self::Variant>;

    /// Make a variant ready for placement
    ///
    /// # Errors
    ///
    /// Returns `HostError` if the variant cannot be activated.
    fn activate_variant(&mut self, variant: &Self::Variant) -> Result<()>;
}

/// Open document that is closed when the guard drops
pub struct DocumentGuard<D: AssetDocument> {
    doc: D,
}

impl<D: AssetDocument> DocumentGuard<D> {
    /// Open `path` through `host` and guard the resulting document
    ///
    /// # Errors
    ///
    /// Returns the host's open error.
    pub fn open<H>(host: &H, path: &Path) -> Result<Self>
    where
        H: AssetHost<Document = D>,
    {
        host.open_document(path).map(|doc| Self { doc })
    }
}

impl<D: AssetDocument> Deref for DocumentGuard<D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.doc
    }
}

impl<D: AssetDocument> DerefMut for DocumentGuard<D> {
    fn deref_mut(&mut self) -> &mut D {
        &mut self.doc
    }
}

impl<D: AssetDocument> Drop for DocumentGuard<D> {
    fn drop(&mut self) {
        self.doc.close();
    }
}

/// Scoped mutation group that is rolled back when dropped and never committed
pub struct ScratchScope<'a, D: AssetDocument> {
    doc: &'a mut D,
}

impl<'a, D: AssetDocument> ScratchScope<'a, D> {
    /// # Errors
    ///
    /// Returns the document's error if the group cannot be started.
    pub fn begin(doc: &'a mut D) -> Result<Self> {
        doc.begin_scratch()?;
        Ok(Self { doc })
    }
}

impl<D: AssetDocument> Deref for ScratchScope<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        self.doc
    }
}

impl<D: AssetDocument> DerefMut for ScratchScope<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        self.doc
    }
}

impl<D: AssetDocument> Drop for ScratchScope<'_, D> {
    fn drop(&mut self) {
        self.doc.rollback_scratch();
    }
}
