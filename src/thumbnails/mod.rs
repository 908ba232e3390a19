//! Preview thumbnails
//!
//! - [`generator`]: renders every variant of every asset through the host
//! - [`raster`]: square-fits rendered images onto a white canvas

pub mod error;
pub mod generator;
pub mod raster;

pub use error::ThumbnailError;
pub use generator::{
    FailureNotifier, OVERSAMPLE, PREVIEW_VIEW_NAME, ThumbnailGenerator, ThumbnailReport,
    safe_file_name,
};
pub use raster::{fit_to_square, write_square_png};

/// Default thumbnail edge length in pixels
pub const DEFAULT_PIXEL_SIZE: u32 = 384;
