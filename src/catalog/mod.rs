//! Persisted catalog of library assets
//!
//! The catalog is a single JSON record array stored at `<root>/index.json`.
//! Reading is forgiving: a missing, unreadable or corrupt file is treated as
//! an empty catalog. Writing goes through a temporary file and a rename so a
//! crash never leaves a truncated catalog behind.
//!
//! Records are always written sorted by display name, which together with
//! the deterministic serializer makes re-saving an unchanged catalog produce
//! byte-identical output.

pub mod error;
pub mod item;
pub mod layout;

pub use error::CatalogError;
pub use item::{CatalogItem, display_name_of};
pub use layout::{AssetPattern, LibraryLayout, path_key};

use crate::tags::cmp_ignore_case;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads and writes the catalog file of one library root
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    /// Store for an explicit catalog file path
    #[must_use]
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Store for the catalog file of a library root
    #[must_use]
    pub fn for_root(root: &Path) -> Self {
        Self::new(root.join(layout::CATALOG_FILE_NAME))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the catalog, returning an empty one on any failure
    #[must_use]
    pub fn load(&self) -> Vec<CatalogItem> {
        match self.try_load() {
            Ok(items) => items,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "catalog unreadable, starting empty");
                Vec::new()
            }
        }
    }

    /// Load the catalog, reporting why it could not be read
    ///
    /// A missing file is not an error and yields an empty catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the file cannot be read or
    /// `CatalogError::Decode` if it is not a valid record array.
    pub fn try_load(&self) -> Result<Vec<CatalogItem>, CatalogError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&text).map_err(|e| CatalogError::Decode(e.to_string()))
    }

    /// Persist the catalog sorted by display name
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if serialization fails or the file cannot be written.
    pub fn save(&self, items: &[CatalogItem]) -> Result<(), CatalogError> {
        let mut sorted: Vec<&CatalogItem> = items.iter().collect();
        sorted.sort_by(|a, b| compare_items(a, b));

        let mut json = serde_json::to_string_pretty(&sorted)
            .map_err(|e| CatalogError::Encode(e.to_string()))?;
        json.push('\n');

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        debug!(path = %self.path.display(), count = items.len(), "catalog saved");
        Ok(())
    }
}

/// Catalog order: display name ignoring case, then relative path
pub fn compare_items(a: &CatalogItem, b: &CatalogItem) -> std::cmp::Ordering {
    cmp_ignore_case(&a.display_name, &b.display_name)
        .then_with(|| cmp_ignore_case(&a.relative_path, &b.relative_path))
}

/// Sort items into catalog order in place
pub fn sort_catalog(items: &mut [CatalogItem]) {
    items.sort_by(compare_items);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn item(name: &str) -> CatalogItem {
        CatalogItem::new(Path::new(&format!("/lib/{name}.rfa")), format!("{name}.rfa"))
    }

    #[test]
    fn test_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = CatalogStore::for_root(tmp.path());
        assert!(store.load().is_empty());
        assert!(store.try_load().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = CatalogStore::for_root(tmp.path());
        fs::write(store.path(), "{ not json").unwrap();

        assert!(store.load().is_empty());
        assert!(matches!(store.try_load(), Err(CatalogError::Decode(_))));
    }

    #[test]
    fn test_save_sorts_by_display_name() {
        let tmp = TempDir::new().unwrap();
        let store = CatalogStore::for_root(tmp.path());
        store.save(&[item("zeta"), item("Alpha"), item("beta")]).unwrap();

        let names: Vec<String> = store.load().into_iter().map(|i| i.display_name).collect();
        assert_eq!(names, vec!["Alpha", "beta", "zeta"]);
    }

    #[test]
    fn test_save_is_deterministic() {
        let tmp = TempDir::new().unwrap();
        let store = CatalogStore::for_root(tmp.path());
        let mut a = item("A");
        a.user_tags.insert("EL");
        a.variant_names = vec!["600".into(), "900".into()];

        store.save(&[a.clone()]).unwrap();
        let first = fs::read(store.path()).unwrap();
        let reloaded = store.load();
        store.save(&reloaded).unwrap();
        let second = fs::read(store.path()).unwrap();

        assert_eq!(first, second);
        assert!(!tmp.path().join("index.json.tmp").exists());
    }

    #[test]
    fn test_roundtrip_keeps_persisted_fields_only() {
        let tmp = TempDir::new().unwrap();
        let store = CatalogStore::for_root(tmp.path());
        let mut a = item("A");
        a.is_loaded_in_workspace = true;
        store.save(&[a]).unwrap();

        let loaded = store.load();
        assert_eq!(loaded[0].relative_path, "A.rfa");
        assert!(!loaded[0].is_loaded_in_workspace);
        assert!(loaded[0].full_path.as_os_str().is_empty());
    }
}
