//! Tag vocabulary and catalog filtering
//!
//! The visible part of the catalog is computed by a fixed pipeline:
//!
//! ```text
//! all items
//!   → display mode   (2D / 3D exclusivity)
//!   → toggle groups  (item carries a tag of an active group)
//!   → category       (item carries the selected tag)
//!   → free text      (substring over names, paths, tags, variants)
//!   = visible items, in catalog order
//! ```
//!
//! - [`groups`]: toggle groups and the tag policy (required and banned tags)
//! - [`vocabulary`]: the global tag list and the category selector's choices
//! - [`engine`]: filter state and the pipeline itself

pub mod engine;
pub mod groups;
pub mod vocabulary;

pub use engine::FilterEngine;
pub use groups::{TagPolicy, ToggleGroup};
pub use vocabulary::TagVocabulary;

use std::fmt;
use std::str::FromStr;

/// Exclusive 2D / 3D display mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DisplayMode {
    TwoD,
    #[default]
    ThreeD,
}

impl DisplayMode {
    /// Tag marking an item as belonging to this mode
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::TwoD => "2D",
            Self::ThreeD => "3D",
        }
    }

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::TwoD => Self::ThreeD,
            Self::ThreeD => Self::TwoD,
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "2d" => Ok(Self::TwoD),
            "3d" => Ok(Self::ThreeD),
            other => Err(format!("unknown display mode '{other}', expected 2d or 3d")),
        }
    }
}
