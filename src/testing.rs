//! Testing utilities for famlib
//!
//! This module provides a temporary library folder ([`TempLibrary`]) and an
//! in-memory host ([`RecordingHost`]) that counts how documents are opened,
//! closed, rolled back and rendered.
//!
//! Only available when compiled with `cfg(test)`.

use crate::catalog::layout::{FAMILIES_DIR, RENDER_FILE_PREFIX};
use crate::catalog::{CatalogItem, CatalogStore, path_key};
use crate::host::{
    AssetDocument, AssetHost, ClutterCategory, ElementClass, FileInfo, HostError, Result,
    ViewHandle,
};
use image::{Rgb, RgbImage};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;
use tempfile::TempDir;

/// Library root in a temporary directory, removed on drop
///
/// Assets are created below `<root>/Families`.
pub struct TempLibrary {
    dir: TempDir,
}

impl TempLibrary {
    /// # Panics
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp library"),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Create an asset file at `relative` below the assets folder
    ///
    /// # Panics
    /// Panics if the file cannot be written.
    pub fn asset(&self, relative: &str) -> PathBuf {
        let path = self.root().join(FAMILIES_DIR).join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create asset folder");
        }
        fs::write(&path, b"asset").expect("Failed to write asset");
        path
    }

    /// Entries of the stored catalog
    #[must_use]
    pub fn catalog(&self) -> Vec<CatalogItem> {
        CatalogStore::for_root(self.root()).load()
    }

    /// Move the modification time of `path` forward by `by`
    ///
    /// # Panics
    /// Panics if the file time cannot be changed.
    pub fn touch_later(&self, path: &Path, by: Duration) {
        let modified = fs::metadata(path)
            .and_then(|m| m.modified())
            .expect("Failed to read modification time");
        fs::File::options()
            .write(true)
            .open(path)
            .and_then(|f| f.set_modified(modified + by))
            .expect("Failed to set modification time");
    }
}

impl Default for TempLibrary {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default)]
struct Entry {
    category: String,
    variants: Vec<String>,
    views: Vec<String>,
    info: FileInfo,
    fail_open: bool,
    fail_render: bool,
}

#[derive(Debug, Default)]
struct Counters {
    opened: Cell<usize>,
    closed: Cell<usize>,
    rollbacks: Cell<usize>,
    views_created: Cell<usize>,
    render_sizes: RefCell<Vec<u32>>,
}

/// In-memory host that records how it is used
///
/// Only paths registered with [`RecordingHost::add`] can be opened.
#[derive(Debug, Default)]
pub struct RecordingHost {
    entries: RefCell<HashMap<String, Entry>>,
    counters: Rc<Counters>,
}

impl RecordingHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the document at `path`
    pub fn add(&self, path: impl AsRef<Path>, category: &str, variants: &[&str]) {
        let mut entries = self.entries.borrow_mut();
        let entry = entries.entry(path_key(path.as_ref())).or_default();
        entry.category = category.to_string();
        entry.variants = variants.iter().map(ToString::to_string).collect();
        entry.fail_open = false;
    }

    pub fn fail_open(&self, path: impl AsRef<Path>) {
        self.with_entry(path.as_ref(), |e| e.fail_open = true);
    }

    pub fn fail_render(&self, path: impl AsRef<Path>) {
        self.with_entry(path.as_ref(), |e| e.fail_render = true);
    }

    /// Report `saved_in` as the release the file was saved in
    pub fn set_info(&self, path: impl AsRef<Path>, saved_in: &str) {
        self.with_entry(path.as_ref(), |e| {
            e.info.saved_in_version = Some(saved_in.to_string());
        });
    }

    /// Give the document a view before it is opened
    pub fn add_view(&self, path: impl AsRef<Path>, name: &str) {
        self.with_entry(path.as_ref(), |e| e.views.push(name.to_string()));
    }

    #[must_use]
    pub fn opened(&self) -> usize {
        self.counters.opened.get()
    }

    #[must_use]
    pub fn closed(&self) -> usize {
        self.counters.closed.get()
    }

    #[must_use]
    pub fn rollbacks(&self) -> usize {
        self.counters.rollbacks.get()
    }

    #[must_use]
    pub fn views_created(&self) -> usize {
        self.counters.views_created.get()
    }

    /// Pixel sizes of every render request, in order
    #[must_use]
    pub fn render_sizes(&self) -> Vec<u32> {
        self.counters.render_sizes.borrow().clone()
    }

    fn with_entry(&self, path: &Path, f: impl FnOnce(&mut Entry)) {
        let mut entries = self.entries.borrow_mut();
        f(entries.entry(path_key(path)).or_default());
    }
}

impl AssetHost for RecordingHost {
    type Document = RecordingDocument;

    fn open_document(&self, path: &Path) -> Result<Self::Document> {
        let entry = self
            .entries
            .borrow()
            .get(&path_key(path))
            .cloned()
            .ok_or_else(|| HostError::open(path, "not registered"))?;
        if entry.fail_open {
            return Err(HostError::open(path, "scripted open failure"));
        }
        self.counters.opened.set(self.counters.opened.get() + 1);
        Ok(RecordingDocument {
            views: entry.views.clone(),
            entry,
            scratch: None,
            counters: Rc::clone(&self.counters),
        })
    }

    fn file_info(&self, path: &Path) -> Result<FileInfo> {
        self.entries
            .borrow()
            .get(&path_key(path))
            .map(|e| e.info.clone())
            .ok_or_else(|| HostError::NotFound(path.display().to_string()))
    }
}

/// Document handed out by [`RecordingHost`]
#[derive(Debug)]
pub struct RecordingDocument {
    entry: Entry,
    views: Vec<String>,
    scratch: Option<Vec<String>>,
    counters: Rc<Counters>,
}

impl AssetDocument for RecordingDocument {
    fn category(&self) -> Option<String> {
        Some(self.entry.category.clone()).filter(|c| !c.is_empty())
    }

    fn variant_names(&self) -> Vec<String> {
        self.entry.variants.clone()
    }

    fn begin_scratch(&mut self) -> Result<()> {
        if self.scratch.is_some() {
            return Err(HostError::Transaction("scratch group already open".into()));
        }
        self.scratch = Some(self.views.clone());
        Ok(())
    }

    fn rollback_scratch(&mut self) {
        if let Some(views) = self.scratch.take() {
            self.views = views;
            self.counters
                .rollbacks
                .set(self.counters.rollbacks.get() + 1);
        }
    }

    fn find_view(&self, name: &str) -> Option<ViewHandle> {
        self.views.iter().position(|v| v == name).map(ViewHandle)
    }

    fn create_view(&mut self, name: &str) -> Result<ViewHandle> {
        self.views.push(name.to_string());
        self.counters
            .views_created
            .set(self.counters.views_created.get() + 1);
        Ok(ViewHandle(self.views.len() - 1))
    }

    fn hide_category(&mut self, _view: ViewHandle, _category: ClutterCategory) -> Result<()> {
        Ok(())
    }

    fn hide_elements_of_class(&mut self, _view: ViewHandle, _class: ElementClass) -> Result<()> {
        Ok(())
    }

    fn activate_variant(&mut self, name: &str) -> Result<()> {
        if self.entry.variants.iter().any(|v| v == name) {
            Ok(())
        } else {
            Err(HostError::NotFound(format!("variant '{name}'")))
        }
    }

    fn regenerate(&mut self) -> Result<()> {
        Ok(())
    }

    fn render(&mut self, view: ViewHandle, pixel_size: u32, dest_dir: &Path) -> Result<PathBuf> {
        self.counters.render_sizes.borrow_mut().push(pixel_size);
        if self.entry.fail_render {
            return Err(HostError::Render("scripted render failure".into()));
        }
        if view.0 >= self.views.len() {
            return Err(HostError::NotFound(format!("view #{}", view.0)));
        }

        // landscape raster so the square fit has something to pad
        let raster = RgbImage::from_pixel(pixel_size, (pixel_size / 2).max(1), Rgb([40, 80, 120]));
        fs::create_dir_all(dest_dir)?;
        let out = dest_dir.join(format!(
            "{RENDER_FILE_PREFIX}{}.png",
            self.counters.render_sizes.borrow().len()
        ));
        raster
            .save(&out)
            .map_err(|e| HostError::Render(e.to_string()))?;
        Ok(out)
    }

    fn close(&mut self) {
        self.counters.closed.set(self.counters.closed.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_library_creates_assets_below_families() {
        let lib = TempLibrary::new();
        let path = lib.asset("Doors/A.rfa");
        assert!(path.is_file());
        assert!(path.starts_with(lib.root().join(FAMILIES_DIR)));
        assert!(lib.catalog().is_empty());
    }

    #[test]
    fn test_touch_later_moves_mtime_forward() {
        let lib = TempLibrary::new();
        let path = lib.asset("A.rfa");
        let before = fs::metadata(&path).unwrap().modified().unwrap();
        lib.touch_later(&path, Duration::from_secs(30));
        let after = fs::metadata(&path).unwrap().modified().unwrap();
        assert!(after > before);
    }

    #[test]
    fn test_recording_host_counts_opens() {
        let host = RecordingHost::new();
        host.add("A.rfa", "Doors", &["600"]);
        let mut doc = host.open_document(Path::new("A.rfa")).unwrap();
        doc.close();
        assert_eq!(host.opened(), 1);
        assert_eq!(host.closed(), 1);

        host.fail_open("A.rfa");
        assert!(host.open_document(Path::new("A.rfa")).is_err());
        assert_eq!(host.opened(), 1);
    }

    #[test]
    fn test_render_writes_png() {
        let tmp = TempDir::new().unwrap();
        let host = RecordingHost::new();
        host.add("A.rfa", "", &[]);
        let mut doc = host.open_document(Path::new("A.rfa")).unwrap();
        let view = doc.create_view("v").unwrap();
        let out = doc.render(view, 20, tmp.path()).unwrap();

        let img = image::open(out).unwrap();
        assert_eq!((img.width(), img.height()), (20, 10));
        assert_eq!(host.render_sizes(), vec![20]);
    }
}
