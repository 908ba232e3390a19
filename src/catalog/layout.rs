//! On-disk layout of an asset library
//!
//! ```text
//! <root>/index.json                                   catalog file
//! <root>/Families/**/<asset>                          sources (preferred layout)
//! <root>/**/<asset>                                   sources (legacy flat layout)
//! <root>/Thumbs/<relDir>/<asset>.png                  asset fallback thumbnails
//! <root>/Thumbs_Types/<relDir>/<asset>/<variant>.png  per-variant thumbnails
//! ```
//!
//! Relative paths handed out by this module always use forward slashes.

use super::error::CatalogError;
use crate::tags::cmp_ignore_case;
use glob::{MatchOptions, Pattern};
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

pub const CATALOG_FILE_NAME: &str = "index.json";
pub const FAMILIES_DIR: &str = "Families";
pub const THUMBS_DIR: &str = "Thumbs";
pub const VARIANT_THUMBS_DIR: &str = "Thumbs_Types";
pub const DEFAULT_ASSET_PATTERN: &str = "*.rfa";

/// File name prefix of raw renders awaiting the square fit
pub const RENDER_FILE_PREFIX: &str = "famlib-render-";

const THUMBNAIL_EXTENSION: &str = "png";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Glob pattern selecting asset files by file name
#[derive(Debug, Clone)]
pub struct AssetPattern(Pattern);

impl AssetPattern {
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidPattern` if the glob does not parse.
    pub fn new(pattern: &str) -> Result<Self, CatalogError> {
        Pattern::new(pattern)
            .map(Self)
            .map_err(|e| CatalogError::InvalidPattern(pattern.to_string(), e.to_string()))
    }

    /// Match a path's file name, ignoring case
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| self.0.matches_with(n, MATCH_OPTIONS))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for AssetPattern {
    fn default() -> Self {
        Self(Pattern::new(DEFAULT_ASSET_PATTERN).unwrap_or_default())
    }
}

/// Lowercased path string used to key catalog entries by full path
#[must_use]
pub fn path_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

/// Resolved directories of one library root
#[derive(Debug, Clone)]
pub struct LibraryLayout {
    root: PathBuf,
    assets_dir: PathBuf,
    pattern: AssetPattern,
}

impl LibraryLayout {
    /// Resolve where the asset files of `root` live
    ///
    /// Prefers `<root>/Families` when it holds assets, falls back to the legacy
    /// flat layout when assets sit directly under the root, and otherwise
    /// creates `<root>/Families`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the preferred folder cannot be created.
    pub fn resolve(root: &Path, pattern: AssetPattern) -> Result<Self, CatalogError> {
        let families = root.join(FAMILIES_DIR);
        let assets_dir = if families.is_dir() && has_assets(&families, &pattern, false) {
            families
        } else if has_assets(root, &pattern, true) {
            root.to_path_buf()
        } else {
            fs::create_dir_all(&families)?;
            families
        };

        Ok(Self {
            root: root.to_path_buf(),
            assets_dir,
            pattern,
        })
    }

    /// Layout without probing the filesystem
    #[must_use]
    pub fn with_assets_dir(root: &Path, assets_dir: &Path, pattern: AssetPattern) -> Self {
        Self {
            root: root.to_path_buf(),
            assets_dir: assets_dir.to_path_buf(),
            pattern,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    #[must_use]
    pub const fn pattern(&self) -> &AssetPattern {
        &self.pattern
    }

    #[must_use]
    pub fn catalog_path(&self) -> PathBuf {
        self.root.join(CATALOG_FILE_NAME)
    }

    #[must_use]
    pub fn thumbs_dir(&self) -> PathBuf {
        self.root.join(THUMBS_DIR)
    }

    #[must_use]
    pub fn variant_thumbs_dir(&self) -> PathBuf {
        self.root.join(VARIANT_THUMBS_DIR)
    }

    /// All asset files below the assets folder, sorted
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Walk` if the tree cannot be traversed.
    pub fn asset_files(&self) -> Result<Vec<PathBuf>, CatalogError> {
        let skip_thumbs = self.assets_dir == self.root;
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.assets_dir)
            .into_iter()
            .filter_entry(|e| !(skip_thumbs && is_thumbnail_dir(e)))
        {
            let entry = entry?;
            if entry.file_type().is_file() && self.pattern.matches(entry.path()) {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Forward-slash path of `full_path` relative to the assets folder
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::OutsideRoot` if the file is not below the assets folder.
    pub fn relative_path(&self, full_path: &Path) -> Result<String, CatalogError> {
        let rel = full_path
            .strip_prefix(&self.assets_dir)
            .map_err(|_| CatalogError::OutsideRoot(full_path.display().to_string()))?;
        let parts: Vec<String> = rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        if parts.is_empty() {
            return Err(CatalogError::OutsideRoot(full_path.display().to_string()));
        }
        Ok(parts.join("/"))
    }

    /// Absolute source path for a persisted relative path
    #[must_use]
    pub fn full_path(&self, relative_path: &str) -> PathBuf {
        join_relative(&self.assets_dir, relative_path)
    }

    /// `<root>/Thumbs/<rel>.png`
    #[must_use]
    pub fn thumbnail_path(&self, relative_path: &str) -> PathBuf {
        join_relative(&self.thumbs_dir(), relative_path).with_extension(THUMBNAIL_EXTENSION)
    }

    /// `<root>/Thumbs_Types/<relDir>/<asset name>`
    #[must_use]
    pub fn variant_thumbnail_dir(&self, relative_path: &str) -> PathBuf {
        let rel = join_relative(Path::new(""), relative_path);
        let mut dir = self.variant_thumbs_dir();
        if let Some(parent) = rel.parent() {
            dir.push(parent);
        }
        if let Some(stem) = rel.file_stem() {
            dir.push(stem);
        }
        dir
    }

    /// Existing variant thumbnails of an asset, sorted by name ignoring case
    #[must_use]
    pub fn variant_thumbnails(&self, relative_path: &str) -> Vec<PathBuf> {
        let dir = self.variant_thumbnail_dir(relative_path);
        let Ok(entries) = fs::read_dir(&dir) else {
            return Vec::new();
        };
        let mut files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e.eq_ignore_ascii_case(THUMBNAIL_EXTENSION))
                    && !p
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(RENDER_FILE_PREFIX))
            })
            .collect();
        files.sort_by(|a, b| cmp_ignore_case(&a.to_string_lossy(), &b.to_string_lossy()));
        files
    }
}

fn join_relative(base: &Path, relative_path: &str) -> PathBuf {
    relative_path
        .split(['/', '\\'])
        .filter(|s| !s.is_empty())
        .fold(base.to_path_buf(), |acc, part| acc.join(part))
}

fn is_thumbnail_dir(entry: &DirEntry) -> bool {
    entry.depth() == 1
        && entry.file_type().is_dir()
        && entry.file_name().to_str().is_some_and(|n| {
            n.eq_ignore_ascii_case(THUMBS_DIR) || n.eq_ignore_ascii_case(VARIANT_THUMBS_DIR)
        })
}

fn has_assets(dir: &Path, pattern: &AssetPattern, skip_thumbs: bool) -> bool {
    WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| !(skip_thumbs && is_thumbnail_dir(e)))
        .filter_map(Result::ok)
        .any(|e| e.file_type().is_file() && pattern.matches(e.path()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_resolve_prefers_families() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("Families/Doors/A.rfa"));
        touch(&tmp.path().join("B.rfa"));

        let layout = LibraryLayout::resolve(tmp.path(), AssetPattern::default()).unwrap();
        assert_eq!(layout.assets_dir(), tmp.path().join(FAMILIES_DIR));
    }

    #[test]
    fn test_resolve_legacy_layout() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("Doors/A.rfa"));

        let layout = LibraryLayout::resolve(tmp.path(), AssetPattern::default()).unwrap();
        assert_eq!(layout.assets_dir(), tmp.path());
    }

    #[test]
    fn test_resolve_ignores_assets_in_thumbnail_dirs() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("Thumbs/stray.rfa"));

        let layout = LibraryLayout::resolve(tmp.path(), AssetPattern::default()).unwrap();
        assert_eq!(layout.assets_dir(), tmp.path().join(FAMILIES_DIR));
        assert!(tmp.path().join(FAMILIES_DIR).is_dir());
    }

    #[test]
    fn test_asset_files_case_insensitive_and_sorted() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("Families/b.RFA"));
        touch(&tmp.path().join("Families/sub/a.rfa"));
        touch(&tmp.path().join("Families/notes.txt"));

        let layout = LibraryLayout::resolve(tmp.path(), AssetPattern::default()).unwrap();
        let files = layout.asset_files().unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0] < files[1]);
    }

    #[test]
    fn test_relative_path_uses_forward_slashes() {
        let layout = LibraryLayout::with_assets_dir(
            Path::new("/lib"),
            Path::new("/lib/Families"),
            AssetPattern::default(),
        );
        let rel = layout
            .relative_path(&Path::new("/lib/Families").join("Doors").join("A.rfa"))
            .unwrap();
        assert_eq!(rel, "Doors/A.rfa");
        assert!(layout.relative_path(Path::new("/other/A.rfa")).is_err());
    }

    #[test]
    fn test_derived_paths() {
        let layout = LibraryLayout::with_assets_dir(
            Path::new("/lib"),
            Path::new("/lib/Families"),
            AssetPattern::default(),
        );
        assert_eq!(
            layout.full_path("Doors/A.rfa"),
            Path::new("/lib/Families").join("Doors").join("A.rfa")
        );
        assert_eq!(
            layout.thumbnail_path("Doors/A.rfa"),
            Path::new("/lib/Thumbs").join("Doors").join("A.png")
        );
        assert_eq!(
            layout.variant_thumbnail_dir("Doors/A.rfa"),
            Path::new("/lib/Thumbs_Types").join("Doors").join("A")
        );
        assert_eq!(
            layout.variant_thumbnail_dir("A.rfa"),
            Path::new("/lib/Thumbs_Types").join("A")
        );
    }

    #[test]
    fn test_variant_thumbnails_skip_leftover_renders() {
        let tmp = TempDir::new().unwrap();
        let layout = LibraryLayout::with_assets_dir(
            tmp.path(),
            &tmp.path().join(FAMILIES_DIR),
            AssetPattern::default(),
        );
        let dir = layout.variant_thumbnail_dir("Doors/A.rfa");
        touch(&dir.join("b.png"));
        touch(&dir.join("A.PNG"));
        touch(&dir.join(format!("{RENDER_FILE_PREFIX}42-0.png")));
        touch(&dir.join("c.png.tmp"));

        let names: Vec<String> = layout
            .variant_thumbnails("Doors/A.rfa")
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["A.PNG", "b.png"]);
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(AssetPattern::new("[").is_err());
    }
}
