//! Incremental catalog indexer
//!
//! [`Indexer::build_index`] walks the asset tree of a library root, compares
//! every file's modification time with the stored catalog and opens only new
//! or changed files through the host. Unchanged entries are carried over
//! untouched, so running the indexer twice on an unchanged tree rewrites a
//! byte-identical catalog.
//!
//! Entries whose file has disappeared are kept unless
//! [`PrunePolicy::RemoveMissing`] is selected.

pub mod version;

pub use version::{FormatVersion, VersionDetector, VersionStrategy};

use crate::catalog::{
    AssetPattern, CatalogError, CatalogItem, CatalogStore, LibraryLayout, display_name_of,
    path_key, sort_catalog,
};
use crate::host::{AssetDocument, AssetHost, DocumentGuard, HostError};
use crate::tags::{cmp_ignore_case, eq_ignore_case};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

type Result<T> = std::result::Result<T, CatalogError>;

/// What to do with catalog entries whose file no longer exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PrunePolicy {
    #[default]
    Keep,
    RemoveMissing,
}

#[derive(Debug, Clone, Default)]
pub struct IndexOptions {
    pub prune: PrunePolicy,
    pub pattern: AssetPattern,
}

/// Counters of one index pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexReport {
    /// Asset files found on disk
    pub scanned: usize,
    /// Files whose metadata was extracted
    pub updated: usize,
    /// Unchanged files carried over
    pub skipped: usize,
    /// Files whose extraction failed
    pub failed: usize,
    /// Entries removed because their file is gone
    pub pruned: usize,
}

/// Synchronizes a catalog with the files below a library root
pub struct Indexer<'h, H: AssetHost> {
    host: &'h H,
    options: IndexOptions,
    versions: VersionDetector,
}

impl<'h, H: AssetHost> Indexer<'h, H> {
    #[must_use]
    pub fn new(host: &'h H) -> Self {
        Self {
            host,
            options: IndexOptions::default(),
            versions: VersionDetector::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: IndexOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_versions(mut self, versions: VersionDetector) -> Self {
        self.versions = versions;
        self
    }

    /// Bring the catalog of `root` up to date
    ///
    /// Does nothing when `root` is not an existing directory.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the asset tree cannot be walked or the
    /// catalog cannot be written. Per-file failures are counted, not returned.
    pub fn build_index(&self, root: &Path) -> Result<IndexReport> {
        let mut report = IndexReport::default();
        if !root.is_dir() {
            debug!(root = %root.display(), "library root missing, nothing to index");
            return Ok(report);
        }

        let layout = LibraryLayout::resolve(root, self.options.pattern.clone())?;
        fs::create_dir_all(layout.thumbs_dir())?;

        let store = CatalogStore::for_root(root);
        let mut entries: HashMap<String, CatalogItem> = store
            .load()
            .into_iter()
            .map(|mut item| {
                item.full_path = layout.full_path(&item.relative_path);
                (path_key(&item.full_path), item)
            })
            .collect();

        for file in layout.asset_files()? {
            report.scanned += 1;
            let modified = match modified_utc(&file) {
                Ok(t) => t,
                Err(e) => {
                    warn!(path = %file.display(), error = %e, "cannot read modification time");
                    report.failed += 1;
                    continue;
                }
            };

            let key = path_key(&file);
            if entries
                .get(&key)
                .is_some_and(|existing| existing.last_modified_utc >= modified)
            {
                report.skipped += 1;
                continue;
            }

            let relative_path = layout.relative_path(&file)?;
            let mut item = entries
                .remove(&key)
                .unwrap_or_else(|| CatalogItem::new(&file, relative_path.clone()));
            item.display_name = display_name_of(&file);
            item.relative_path = relative_path;
            item.full_path.clone_from(&file);

            match self.extract(&file, &mut item) {
                Ok(()) => {
                    item.last_modified_utc = modified;
                    report.updated += 1;
                }
                Err(e) => {
                    warn!(path = %file.display(), error = %e, "metadata extraction failed");
                    report.failed += 1;
                }
            }
            entries.insert(key, item);
        }

        if self.options.prune == PrunePolicy::RemoveMissing {
            let before = entries.len();
            entries.retain(|_, item| item.full_path.is_file());
            report.pruned = before - entries.len();
        }

        let mut items: Vec<CatalogItem> = entries.into_values().collect();
        sort_catalog(&mut items);
        store.save(&items)?;

        info!(
            root = %root.display(),
            scanned = report.scanned,
            updated = report.updated,
            skipped = report.skipped,
            failed = report.failed,
            pruned = report.pruned,
            "index built"
        );
        Ok(report)
    }

    /// Read category, variants and version of one file into `item`
    ///
    /// Fields are only overwritten once the document opened successfully.
    fn extract(&self, path: &Path, item: &mut CatalogItem) -> std::result::Result<(), HostError> {
        {
            let doc = DocumentGuard::open(self.host, path)?;
            item.category = doc.category().unwrap_or_default();
            item.variant_names = unique_variant_names(doc.variant_names());
        }

        match self.host.file_info(path) {
            Ok(info) => {
                item.format_version = self
                    .versions
                    .detect(&info)
                    .map(|v| v.to_string())
                    .unwrap_or_default();
            }
            Err(e) => debug!(path = %path.display(), error = %e, "no file info, keeping version"),
        }
        Ok(())
    }
}

fn modified_utc(path: &Path) -> std::io::Result<DateTime<Utc>> {
    Ok(DateTime::<Utc>::from(fs::metadata(path)?.modified()?))
}

/// Trimmed, non-blank, case-insensitively unique and sorted
fn unique_variant_names(names: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim();
        if name.is_empty() || unique.iter().any(|n| eq_ignore_case(n, name)) {
            continue;
        }
        unique.push(name.to_string());
    }
    unique.sort_by(|a, b| cmp_ignore_case(a, b));
    unique
}
