//! Batch thumbnail rendering
//!
//! Every asset is opened through the host, a preview view is prepared inside
//! a scratch group, and each variant is activated and rendered in turn. The
//! scratch group is dropped at the end of each asset, so the asset file is
//! never modified. A failing asset is counted and the run moves on; only the
//! first failure of a run reaches the [`FailureNotifier`].

use super::error::ThumbnailError;
use super::raster::{copy_file, write_square_png};
use crate::catalog::{AssetPattern, LibraryLayout};
use crate::host::{
    AssetDocument, AssetHost, ClutterCategory, DocumentGuard, ElementClass, ScratchScope,
    ViewHandle,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the view used for preview renders
pub const PREVIEW_VIEW_NAME: &str = "Thumbnail_RefLevel";

/// Renders are exported at this multiple of the final size
pub const OVERSAMPLE: u32 = 2;

/// File name used for variants whose name is blank
pub const FALLBACK_VARIANT_NAME: &str = "Type";

const INVALID_FILE_NAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Receives user-facing failure messages
pub trait FailureNotifier {
    fn notify(&mut self, message: &str);
}

impl<F: FnMut(&str)> FailureNotifier for F {
    fn notify(&mut self, message: &str) {
        self(message);
    }
}

/// Counters of one thumbnail run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThumbnailReport {
    /// Asset files found
    pub assets: usize,
    /// Variant thumbnails written
    pub rendered: usize,
    /// Assets that failed
    pub failed: usize,
    /// Message of the first failure, if any
    pub first_failure: Option<String>,
}

pub struct ThumbnailGenerator<'h, H: AssetHost> {
    host: &'h H,
    pattern: AssetPattern,
}

impl<'h, H: AssetHost> ThumbnailGenerator<'h, H> {
    #[must_use]
    pub fn new(host: &'h H) -> Self {
        Self {
            host,
            pattern: AssetPattern::default(),
        }
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: AssetPattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Render thumbnails for every asset below `root`
    ///
    /// Does nothing when `root` is missing or `pixel_size` is zero.
    ///
    /// # Errors
    ///
    /// Returns `ThumbnailError` if the library layout cannot be resolved or
    /// the thumbnail folders cannot be created. Per-asset failures are
    /// reported through `notifier` and counted in the report.
    pub fn generate<N: FailureNotifier>(
        &self,
        root: &Path,
        pixel_size: u32,
        notifier: &mut N,
    ) -> Result<ThumbnailReport, ThumbnailError> {
        let mut report = ThumbnailReport::default();
        if !root.is_dir() || pixel_size == 0 {
            debug!(root = %root.display(), pixel_size, "nothing to render");
            return Ok(report);
        }

        let layout = LibraryLayout::resolve(root, self.pattern.clone())?;
        fs::create_dir_all(layout.thumbs_dir())?;
        fs::create_dir_all(layout.variant_thumbs_dir())?;

        let files = layout.asset_files()?;
        if files.is_empty() {
            notifier.notify(&format!(
                "No asset files found in:\n{}",
                layout.assets_dir().display()
            ));
            return Ok(report);
        }

        for file in &files {
            report.assets += 1;
            match self.render_asset(&layout, file, pixel_size) {
                Ok(count) => report.rendered += count,
                Err(e) => {
                    warn!(path = %file.display(), error = %e, "thumbnail export failed");
                    report.failed += 1;
                    if report.first_failure.is_none() {
                        let message =
                            format!("Thumbnail export failed for:\n{}\n\n{e}", file.display());
                        notifier.notify(&message);
                        report.first_failure = Some(message);
                    }
                }
            }
        }

        info!(
            assets = report.assets,
            rendered = report.rendered,
            failed = report.failed,
            "thumbnails generated"
        );
        Ok(report)
    }

    /// Render all variants of one asset, returning how many were written
    fn render_asset(
        &self,
        layout: &LibraryLayout,
        file: &Path,
        pixel_size: u32,
    ) -> Result<usize, ThumbnailError> {
        let rel = layout.relative_path(file)?;
        let fallback = layout.thumbnail_path(&rel);
        let variant_dir = layout.variant_thumbnail_dir(&rel);
        fs::create_dir_all(&variant_dir)?;
        if let Some(parent) = fallback.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut doc = DocumentGuard::open(self.host, file)?;
        let variants = doc.variant_names();
        let mut scope = ScratchScope::begin(&mut *doc)?;
        let view = prepare_view(&mut *scope)?;
        let export_size = pixel_size.saturating_mul(OVERSAMPLE);

        if variants.is_empty() {
            scope.regenerate()?;
            export_square(&mut *scope, view, export_size, pixel_size, &fallback)?;
            return Ok(0);
        }

        let mut rendered = 0;
        for name in &variants {
            scope.activate_variant(name)?;
            scope.regenerate()?;
            let target = variant_dir.join(format!("{}.png", safe_file_name(name)));
            export_square(&mut *scope, view, export_size, pixel_size, &target)?;

            if rendered == 0 {
                copy_file(&target, &fallback)?;
            }
            rendered += 1;
        }
        Ok(rendered)
    }
}

/// Find or create the preview view and hide annotation clutter in it
fn prepare_view<D: AssetDocument>(doc: &mut D) -> Result<ViewHandle, ThumbnailError> {
    let view = match doc.find_view(PREVIEW_VIEW_NAME) {
        Some(view) => view,
        None => doc.create_view(PREVIEW_VIEW_NAME)?,
    };
    for category in ClutterCategory::ALL {
        if let Err(e) = doc.hide_category(view, category) {
            debug!(?category, error = %e, "category stays visible");
        }
    }
    for class in ElementClass::ALL {
        if let Err(e) = doc.hide_elements_of_class(view, class) {
            debug!(?class, error = %e, "elements stay visible");
        }
    }
    Ok(view)
}

/// Render `view` oversampled and write it square-fitted to `target`
fn export_square<D: AssetDocument>(
    doc: &mut D,
    view: ViewHandle,
    export_size: u32,
    pixel_size: u32,
    target: &Path,
) -> Result<(), ThumbnailError> {
    let dir: PathBuf = target
        .parent()
        .map_or_else(std::env::temp_dir, Path::to_path_buf);
    let raw = doc.render(view, export_size, &dir)?;
    let result = write_square_png(&raw, pixel_size, target);
    if raw != target {
        let _ = fs::remove_file(&raw);
    }
    result
}

/// Variant name usable as a file name
#[must_use]
pub fn safe_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_control() || INVALID_FILE_NAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        FALLBACK_VARIANT_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}
