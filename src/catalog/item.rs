//! Catalog record type
//!
//! A [`CatalogItem`] mixes persisted fields (written to the catalog file) with
//! session-derived fields that are recomputed from disk every time the catalog
//! is loaded. Derived fields are `#[serde(skip)]` so they can never be trusted
//! from, or leak into, the persisted file.

use crate::tags::TagSet;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One asset in the catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogItem {
    /// File name without extension
    pub display_name: String,

    /// Category reported by the asset, may be empty
    pub category: String,

    /// Forward-slash path under the asset root; the identity key
    pub relative_path: String,

    /// Names of the variants embedded in the asset, sorted and unique
    pub variant_names: Vec<String>,

    /// Detected origin version (a 4-digit year), empty if unknown
    pub format_version: String,

    /// Source file's modification time at the last successful index pass
    pub last_modified_utc: DateTime<Utc>,

    /// User-assigned classification tags
    pub user_tags: TagSet,

    #[serde(skip)]
    pub full_path: PathBuf,

    #[serde(skip)]
    pub thumbnail_path: Option<PathBuf>,

    #[serde(skip)]
    pub variant_thumbnail_paths: Vec<PathBuf>,

    #[serde(skip)]
    pub selected_variant_index: usize,

    #[serde(skip)]
    pub is_loaded_in_workspace: bool,
}

impl CatalogItem {
    /// Create a fresh item for a file seen for the first time
    #[must_use]
    pub fn new(full_path: &Path, relative_path: String) -> Self {
        let mut item = Self {
            relative_path,
            full_path: full_path.to_path_buf(),
            ..Self::default()
        };
        item.display_name = display_name_of(full_path);
        item
    }

    /// Last modification time in local time, `YYYY-MM-DD HH:MM`
    ///
    /// Empty when the item has never been indexed.
    #[must_use]
    pub fn last_modified_local(&self) -> String {
        if self.last_modified_utc == DateTime::<Utc>::UNIX_EPOCH {
            return String::new();
        }
        self.last_modified_utc
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }

    /// Thumbnail for the selected variant, falling back to the asset thumbnail
    #[must_use]
    pub fn current_thumbnail(&self) -> Option<&Path> {
        if self.variant_thumbnail_paths.is_empty() {
            return self.thumbnail_path.as_deref();
        }
        let idx = self
            .selected_variant_index
            .min(self.variant_thumbnail_paths.len() - 1);
        Some(&self.variant_thumbnail_paths[idx])
    }

    /// Replace the variant gallery and reset the selection
    pub fn set_variant_thumbnails(&mut self, paths: Vec<PathBuf>) {
        self.variant_thumbnail_paths = paths;
        self.selected_variant_index = 0;
    }

    /// Select a variant thumbnail, clamping into the valid range
    pub fn select_thumbnail(&mut self, index: usize) {
        let max = self.variant_thumbnail_paths.len().saturating_sub(1);
        self.selected_variant_index = index.min(max);
    }

    #[must_use]
    pub fn has_multiple_thumbnails(&self) -> bool {
        self.variant_thumbnail_paths.len() > 1
    }

    #[must_use]
    pub fn can_prev_thumbnail(&self) -> bool {
        self.has_multiple_thumbnails() && self.selected_variant_index > 0
    }

    #[must_use]
    pub fn can_next_thumbnail(&self) -> bool {
        self.has_multiple_thumbnails()
            && self.selected_variant_index < self.variant_thumbnail_paths.len() - 1
    }

    pub fn prev_thumbnail(&mut self) {
        if self.can_prev_thumbnail() {
            self.selected_variant_index -= 1;
        }
    }

    pub fn next_thumbnail(&mut self) {
        if self.can_next_thumbnail() {
            self.selected_variant_index += 1;
        }
    }
}

/// Display name for an asset path: the file name without extension
#[must_use]
pub fn display_name_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
