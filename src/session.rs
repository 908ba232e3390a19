//! Library session management
//!
//! A [`LibrarySession`] is the in-memory view of one library root:
//!
//! - **Catalog**: loaded from the store, derived fields hydrated from disk
//! - **Vocabulary**: saved tags merged with item tags and the required set
//! - **Filter**: the [`FilterEngine`] plus the indices it currently shows
//!
//! # Workflow
//!
//! ```text
//! open(settings)
//!     ↓
//! reload() → hydrate items → build vocabulary → refilter()
//!     ↓
//! ┌─→ user action
//! │   ├─ filter change  → refilter()
//! │   ├─ item tag edit  → save catalog → refilter()
//! │   └─ vocabulary edit → save settings → refilter()
//! └───┘
//! ```
//!
//! Collections never notify; every mutation ends in an explicit
//! [`LibrarySession::refilter`].

use crate::catalog::{CatalogError, CatalogItem, CatalogStore, LibraryLayout};
use crate::config::Settings;
use crate::filter::{DisplayMode, FilterEngine, TagVocabulary};
use crate::tags::{eq_ignore_case, normalize_tag};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Session error type
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors that can occur during a library session
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("No library root configured")]
    NoLibraryRoot,

    #[error("No asset matches '{0}'")]
    UnknownAsset(String),

    #[error("'{0}' matches several assets, use the relative path")]
    AmbiguousAsset(String),

    #[error("Invalid tag: '{0}'")]
    InvalidTag(String),
}

/// In-memory catalog of one library root
pub struct LibrarySession {
    settings: Settings,
    settings_path: Option<PathBuf>,
    layout: LibraryLayout,
    store: CatalogStore,
    items: Vec<CatalogItem>,
    vocabulary: TagVocabulary,
    filter: FilterEngine,
    visible: Vec<usize>,
}

impl LibrarySession {
    /// Open the library configured in `settings` and load its catalog
    ///
    /// A root that does not exist yet yields an empty session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoLibraryRoot` if no root is configured, or
    /// `SessionError::Catalog` if the asset glob is invalid or the layout
    /// cannot be resolved.
    pub fn open(settings: Settings) -> Result<Self> {
        if !settings.has_library_root() {
            return Err(SessionError::NoLibraryRoot);
        }
        let root = settings.library_root.clone();
        let pattern = settings.pattern()?;
        let layout = if root.is_dir() {
            LibraryLayout::resolve(&root, pattern)?
        } else {
            debug!(root = %root.display(), "library root missing, session starts empty");
            LibraryLayout::with_assets_dir(&root, &root.join(crate::catalog::layout::FAMILIES_DIR), pattern)
        };

        let mut session = Self {
            filter: FilterEngine::new(settings.tags.clone()),
            store: CatalogStore::for_root(&root),
            settings,
            settings_path: None,
            layout,
            items: Vec::new(),
            vocabulary: TagVocabulary::default(),
            visible: Vec::new(),
        };
        session.reload();
        Ok(session)
    }

    /// Persist vocabulary edits to this settings file
    #[must_use]
    pub fn with_settings_path(mut self, path: PathBuf) -> Self {
        self.settings_path = Some(path);
        self
    }

    /// Re-read the catalog and recompute every derived field
    pub fn reload(&mut self) {
        self.items = self.store.load();
        for item in &mut self.items {
            hydrate(&self.layout, item);
        }
        self.vocabulary = TagVocabulary::build(
            &self.settings.user_tags,
            &self.items,
            &self.settings.tags.required,
        );
        debug!(
            items = self.items.len(),
            tags = self.vocabulary.tags().len(),
            "session loaded"
        );
        self.refilter();
    }

    /// Recompute the visible items from the current filter
    pub fn refilter(&mut self) {
        self.filter.sync_category(&self.vocabulary);
        self.visible = self.filter.filter_indices(&self.items);
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub const fn layout(&self) -> &LibraryLayout {
        &self.layout
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    #[must_use]
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    #[must_use]
    pub fn item(&self, index: usize) -> Option<&CatalogItem> {
        self.items.get(index)
    }

    pub fn item_mut(&mut self, index: usize) -> Option<&mut CatalogItem> {
        self.items.get_mut(index)
    }

    #[must_use]
    pub const fn vocabulary(&self) -> &TagVocabulary {
        &self.vocabulary
    }

    #[must_use]
    pub const fn filter(&self) -> &FilterEngine {
        &self.filter
    }

    /// Mutable filter access; call [`Self::refilter`] afterwards
    pub fn filter_mut(&mut self) -> &mut FilterEngine {
        &mut self.filter
    }

    /// Visible items, in catalog order
    #[must_use]
    pub fn visible_items(&self) -> Vec<&CatalogItem> {
        self.visible.iter().filter_map(|&i| self.items.get(i)).collect()
    }

    #[must_use]
    pub fn visible_indices(&self) -> &[usize] {
        &self.visible
    }

    /// Category selector choices for the current groups
    #[must_use]
    pub fn visible_categories(&self) -> Vec<String> {
        self.filter.visible_categories(&self.vocabulary)
    }

    pub fn set_mode(&mut self, mode: DisplayMode) {
        self.filter.set_mode(mode);
        self.refilter();
    }

    pub fn set_group(&mut self, name: &str, active: bool) {
        self.filter.set_group(name, active);
        self.refilter();
    }

    pub fn select_category(&mut self, tag: &str) {
        self.filter.select_category(tag);
        self.refilter();
    }

    pub fn set_query(&mut self, query: &str) {
        self.filter.set_query(query);
        self.refilter();
    }

    /// Flag items whose display name matches an asset in the workspace
    pub fn mark_loaded<S: AsRef<str>>(&mut self, names: &[S]) {
        let names: HashSet<String> = names.iter().map(|n| n.as_ref().to_lowercase()).collect();
        for item in &mut self.items {
            item.is_loaded_in_workspace =
                !item.display_name.is_empty() && names.contains(&item.display_name.to_lowercase());
        }
    }

    /// Find an item by relative path, or by display name if that is unique
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownAsset` if nothing matches, or
    /// `SessionError::AmbiguousAsset` if several items share the name.
    pub fn find(&self, key: &str) -> Result<usize> {
        let key = key.trim().replace('\\', "/");
        if let Some(idx) = self
            .items
            .iter()
            .position(|item| eq_ignore_case(&item.relative_path, &key))
        {
            return Ok(idx);
        }

        let matches: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| eq_ignore_case(&item.display_name, &key))
            .map(|(idx, _)| idx)
            .collect();
        match matches.as_slice() {
            [] => Err(SessionError::UnknownAsset(key)),
            [idx] => Ok(*idx),
            _ => Err(SessionError::AmbiguousAsset(key)),
        }
    }

    /// Add or remove a tag on one item and save the catalog
    ///
    /// Returns whether the item carries the tag afterwards.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTag` for blank or reserved tags,
    /// `SessionError::UnknownAsset` for a bad index, or a catalog write error.
    pub fn toggle_item_tag(&mut self, index: usize, tag: &str) -> Result<bool> {
        let tag = normalize_tag(tag).ok_or_else(|| SessionError::InvalidTag(tag.to_string()))?;
        let item = self
            .items
            .get_mut(index)
            .ok_or_else(|| SessionError::UnknownAsset(index.to_string()))?;

        let present = item.user_tags.toggle(&tag);
        debug!(item = %item.display_name, tag = %tag, present, "item tag toggled");
        if present {
            self.vocabulary.ensure(&tag);
        }
        self.save_catalog()?;
        self.refilter();
        Ok(present)
    }

    /// Add tags to one item and save the catalog
    ///
    /// Returns how many tags were new to the item.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownAsset` for a bad index or a catalog write error.
    pub fn add_item_tags<S: AsRef<str>>(&mut self, index: usize, tags: &[S]) -> Result<usize> {
        let item = self
            .items
            .get_mut(index)
            .ok_or_else(|| SessionError::UnknownAsset(index.to_string()))?;

        let mut added = 0;
        for tag in tags {
            if item.user_tags.insert(tag.as_ref()) {
                self.vocabulary.ensure(tag.as_ref());
                added += 1;
            }
        }
        if added > 0 {
            self.save_catalog()?;
            self.refilter();
        }
        Ok(added)
    }

    /// Remove tags from one item and save the catalog
    ///
    /// Returns how many tags were removed.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownAsset` for a bad index or a catalog write error.
    pub fn remove_item_tags<S: AsRef<str>>(&mut self, index: usize, tags: &[S]) -> Result<usize> {
        let item = self
            .items
            .get_mut(index)
            .ok_or_else(|| SessionError::UnknownAsset(index.to_string()))?;

        let removed = tags.iter().filter(|t| item.user_tags.remove(t.as_ref())).count();
        if removed > 0 {
            self.save_catalog()?;
            self.refilter();
        }
        Ok(removed)
    }

    /// Add a tag to the global vocabulary and save the settings
    ///
    /// Returns the stored spelling, or `None` if the tag was already known.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTag` for blank or reserved tags, or a
    /// settings write error.
    pub fn add_tag(&mut self, raw: &str) -> Result<Option<String>> {
        if normalize_tag(raw).is_none() {
            return Err(SessionError::InvalidTag(raw.to_string()));
        }
        let added = self.vocabulary.add(raw);
        self.save_vocabulary()?;
        self.refilter();
        Ok(added)
    }

    /// Remove a tag from the global vocabulary and save the settings
    ///
    /// Items keep the tag; it reappears on the next reload while any item
    /// still carries it.
    ///
    /// # Errors
    ///
    /// Returns a settings write error.
    pub fn remove_tag(&mut self, tag: &str) -> Result<bool> {
        let removed = self.vocabulary.remove(tag);
        self.save_vocabulary()?;
        self.refilter();
        Ok(removed)
    }

    /// Add a tag to the vocabulary unless it is already known
    ///
    /// # Errors
    ///
    /// Returns a settings write error.
    pub fn ensure_tag_exists(&mut self, tag: &str) -> Result<()> {
        if self.vocabulary.contains(tag) || normalize_tag(tag).is_none() {
            return Ok(());
        }
        self.vocabulary.ensure(tag);
        self.save_vocabulary()?;
        self.refilter();
        Ok(())
    }

    /// Write the catalog back to the store
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the file cannot be written.
    pub fn save_catalog(&self) -> Result<()> {
        if !self.root().is_dir() {
            debug!(root = %self.root().display(), "library root missing, catalog not saved");
            return Ok(());
        }
        self.store.save(&self.items)?;
        Ok(())
    }

    fn save_vocabulary(&mut self) -> Result<()> {
        self.settings.user_tags = self.vocabulary.tags().to_vec();
        if let Some(path) = &self.settings_path {
            self.settings.save_to(path)?;
            info!(path = %path.display(), tags = self.settings.user_tags.len(), "vocabulary saved");
        }
        Ok(())
    }
}

/// Recompute the derived fields of an item from the layout and disk
fn hydrate(layout: &LibraryLayout, item: &mut CatalogItem) {
    item.full_path = layout.full_path(&item.relative_path);
    let thumb = layout.thumbnail_path(&item.relative_path);
    item.thumbnail_path = thumb.is_file().then_some(thumb);
    item.set_variant_thumbnails(layout.variant_thumbnails(&item.relative_path));
    item.is_loaded_in_workspace = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogStore;
    use crate::tags::ALL_TAG;
    use tempfile::TempDir;

    struct Fixture {
        session: LibrarySession,
        settings_path: PathBuf,
        _tmp: TempDir,
    }

    fn entry(name: &str, rel: &str, tags: &[&str]) -> CatalogItem {
        CatalogItem {
            display_name: name.to_string(),
            relative_path: rel.to_string(),
            user_tags: tags.iter().copied().collect(),
            ..CatalogItem::default()
        }
    }

    fn fixture(items: &[CatalogItem]) -> Fixture {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("lib");
        std::fs::create_dir_all(root.join("Families")).unwrap();
        CatalogStore::for_root(&root).save(items).unwrap();

        let settings = Settings {
            library_root: root,
            user_tags: vec!["Saved".into()],
            ..Settings::default()
        };
        let settings_path = tmp.path().join("settings.toml");
        let session = LibrarySession::open(settings)
            .unwrap()
            .with_settings_path(settings_path.clone());
        Fixture {
            session,
            settings_path,
            _tmp: tmp,
        }
    }

    #[test]
    fn test_open_requires_root() {
        assert!(matches!(
            LibrarySession::open(Settings::default()),
            Err(SessionError::NoLibraryRoot)
        ));
    }

    #[test]
    fn test_missing_root_gives_empty_session() {
        let settings = Settings {
            library_root: PathBuf::from("/definitely/not/here/famlib"),
            ..Settings::default()
        };
        let session = LibrarySession::open(settings).unwrap();
        assert!(session.items().is_empty());
        assert!(session.save_catalog().is_ok());
    }

    #[test]
    fn test_reload_hydrates_derived_fields() {
        let mut fx = fixture(&[entry("Door", "Doors/Door.rfa", &[])]);
        let root = fx.session.root().to_path_buf();
        let thumb = root.join("Thumbs/Doors/Door.png");
        std::fs::create_dir_all(thumb.parent().unwrap()).unwrap();
        std::fs::write(&thumb, b"png").unwrap();
        let gallery = root.join("Thumbs_Types/Doors/Door");
        std::fs::create_dir_all(&gallery).unwrap();
        std::fs::write(gallery.join("b.png"), b"png").unwrap();
        std::fs::write(gallery.join("A.png"), b"png").unwrap();

        fx.session.reload();
        let item = &fx.session.items()[0];
        assert_eq!(item.full_path, root.join("Families").join("Doors").join("Door.rfa"));
        assert_eq!(item.thumbnail_path.as_deref(), Some(thumb.as_path()));
        assert_eq!(item.variant_thumbnail_paths, vec![gallery.join("A.png"), gallery.join("b.png")]);
        assert_eq!(item.selected_variant_index, 0);
    }

    #[test]
    fn test_vocabulary_merges_sources() {
        let fx = fixture(&[entry("Door", "Door.rfa", &["Kilbid"])]);
        let tags = fx.session.vocabulary().tags();
        for expected in ["2D", "3D", "EA", "EL", "EN", "Kilbid", "Saved"] {
            assert!(tags.iter().any(|t| t == expected), "missing {expected}");
        }
    }

    #[test]
    fn test_toggle_item_tag_persists_catalog() {
        let mut fx = fixture(&[entry("Door", "Door.rfa", &[])]);
        assert!(fx.session.toggle_item_tag(0, "Valgusti").unwrap());

        let stored = CatalogStore::for_root(fx.session.root()).load();
        assert!(stored[0].user_tags.contains("valgusti"));
        assert!(fx.session.vocabulary().contains("Valgusti"));

        assert!(!fx.session.toggle_item_tag(0, "VALGUSTI").unwrap());
        let stored = CatalogStore::for_root(fx.session.root()).load();
        assert!(stored[0].user_tags.is_empty());
    }

    #[test]
    fn test_toggle_rejects_reserved_tag() {
        let mut fx = fixture(&[entry("Door", "Door.rfa", &[])]);
        assert!(matches!(
            fx.session.toggle_item_tag(0, "all"),
            Err(SessionError::InvalidTag(_))
        ));
    }

    #[test]
    fn test_add_tag_saves_settings() {
        let mut fx = fixture(&[]);
        assert_eq!(fx.session.add_tag(" Side ").unwrap(), Some("Side".to_string()));
        assert_eq!(fx.session.add_tag("side").unwrap(), None);

        let saved = Settings::load_from(&fx.settings_path).unwrap();
        assert!(saved.user_tags.iter().any(|t| t == "Side"));

        assert!(fx.session.remove_tag("SIDE").unwrap());
        let saved = Settings::load_from(&fx.settings_path).unwrap();
        assert!(!saved.user_tags.iter().any(|t| t == "Side"));
    }

    #[test]
    fn test_ensure_tag_exists_is_idempotent() {
        let mut fx = fixture(&[]);
        fx.session.ensure_tag_exists("ATS").unwrap();
        fx.session.ensure_tag_exists("ats").unwrap();
        let count = fx
            .session
            .vocabulary()
            .tags()
            .iter()
            .filter(|t| eq_ignore_case(t, "ats"))
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_refilter_after_mutations() {
        let mut fx = fixture(&[
            entry("Flat", "Flat.rfa", &["2D"]),
            entry("Solid", "Solid.rfa", &["3D", "Kilbid"]),
        ]);
        assert_eq!(fx.session.visible_items().len(), 1);

        fx.session.set_mode(DisplayMode::TwoD);
        assert_eq!(fx.session.visible_items()[0].display_name, "Flat");

        fx.session.set_mode(DisplayMode::ThreeD);
        fx.session.select_category("Kilbid");
        assert_eq!(fx.session.visible_items().len(), 1);

        fx.session.set_group("EN", true);
        assert_eq!(fx.session.filter().category(), ALL_TAG);
        assert_eq!(fx.session.visible_items()[0].display_name, "Solid");
    }

    #[test]
    fn test_mark_loaded() {
        let mut fx = fixture(&[entry("Door", "Door.rfa", &[]), entry("Sink", "Sink.rfa", &[])]);
        fx.session.mark_loaded(&["DOOR"]);
        assert!(fx.session.items()[0].is_loaded_in_workspace);
        assert!(!fx.session.items()[1].is_loaded_in_workspace);
    }

    #[test]
    fn test_find_by_path_or_unique_name() {
        let fx = fixture(&[
            entry("Door", "A/Door.rfa", &[]),
            entry("Door", "B/Door.rfa", &[]),
            entry("Sink", "Sink.rfa", &[]),
        ]);
        assert_eq!(fx.session.find("b\\door.rfa").unwrap(), 1);
        assert_eq!(fx.session.find("sink").unwrap(), 2);
        assert!(matches!(fx.session.find("Door"), Err(SessionError::AmbiguousAsset(_))));
        assert!(matches!(fx.session.find("Chair"), Err(SessionError::UnknownAsset(_))));
    }
}
