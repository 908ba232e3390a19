//! Square-fit of rendered previews
//!
//! Renders come out at twice the target size and in whatever aspect ratio
//! the view has. They are scaled down into a white square so every thumbnail
//! in the library has the same edge length and thin linework survives the
//! downsample.

use super::error::ThumbnailError;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::fs;
use std::path::Path;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Scale `src` into a `size` x `size` white canvas, centered, aspect preserved
///
/// # Errors
///
/// Returns `ThumbnailError::InvalidSize` if `size` is zero.
pub fn fit_to_square(src: &DynamicImage, size: u32) -> Result<RgbaImage, ThumbnailError> {
    if size == 0 {
        return Err(ThumbnailError::InvalidSize(size));
    }
    let mut canvas = RgbaImage::from_pixel(size, size, BACKGROUND);
    if src.width() == 0 || src.height() == 0 {
        return Ok(canvas);
    }

    let scaled = src.resize(size, size, FilterType::Lanczos3).to_rgba8();
    let x = (size - scaled.width()) / 2;
    let y = (size - scaled.height()) / 2;
    imageops::overlay(&mut canvas, &scaled, i64::from(x), i64::from(y));
    Ok(canvas)
}

/// Square-fit the image at `src` and write it as PNG to `dest`
///
/// `dest` is replaced only after the new image was written completely.
/// `src` and `dest` may be the same file.
///
/// # Errors
///
/// Returns `ThumbnailError` if decoding, encoding or the file replace fails.
pub fn write_square_png(src: &Path, size: u32, dest: &Path) -> Result<(), ThumbnailError> {
    let image = image::open(src)?;
    let square = fit_to_square(&image, size)?;

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = dest.with_extension("png.tmp");
    if let Err(e) = square.save_with_format(&tmp, ImageFormat::Png) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    replace_file(&tmp, dest)?;
    Ok(())
}

/// Copy `from` to `to` through a temporary file next to `to`
///
/// # Errors
///
/// Returns the I/O error of the copy or the replace. No temporary file is left behind.
pub fn copy_file(from: &Path, to: &Path) -> std::io::Result<()> {
    let tmp = to.with_extension("png.tmp");
    if let Err(e) = fs::copy(from, &tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    replace_file(&tmp, to)
}

/// Move `from` over `to`, deleting any previous `to` first
///
/// # Errors
///
/// Returns the I/O error of the delete or the rename. `from` is removed on failure.
pub fn replace_file(from: &Path, to: &Path) -> std::io::Result<()> {
    let result = (|| {
        if to.exists() {
            fs::remove_file(to)?;
        }
        fs::rename(from, to)
    })();
    if result.is_err() {
        let _ = fs::remove_file(from);
    }
    result
}
