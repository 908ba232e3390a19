//! Configuration module for famlib
//!
//! Manages the per-user settings record: library root, thumbnail size, the
//! saved tag vocabulary, the asset file glob and the tag policy.
//! Settings are stored in the user's config directory.

mod setup;

pub use setup::first_time_setup;

use crate::catalog::{AssetPattern, CatalogError};
use crate::catalog::layout::DEFAULT_ASSET_PATTERN;
use crate::filter::TagPolicy;
use crate::tags::sorted_unique;
use crate::thumbnails::DEFAULT_PIXEL_SIZE;
use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Application settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Root folder of the asset library, empty when not configured
    pub library_root: PathBuf,

    /// Edge length of generated thumbnails in pixels
    pub thumbnail_pixel_size: u32,

    /// Saved global tag vocabulary
    pub user_tags: Vec<String>,

    /// Glob matching asset file names
    pub asset_pattern: String,

    /// Suppress informational output by default
    pub quiet: bool,

    /// Required and banned tags plus toggle groups
    pub tags: TagPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            library_root: PathBuf::new(),
            thumbnail_pixel_size: DEFAULT_PIXEL_SIZE,
            user_tags: Vec::new(),
            asset_pattern: DEFAULT_ASSET_PATTERN.to_string(),
            quiet: false,
            tags: TagPolicy::default(),
        }
    }
}

impl Settings {
    /// Get the path to the settings file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn settings_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine config directory".to_string()))?;

        Ok(config_dir.join("famlib").join("settings.toml"))
    }

    /// Load settings from the user's settings file, creating it if missing
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed, or created.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::settings_path()?;

        if !path.exists() {
            let defaults = Self::default();
            defaults.save_to(&path)?;
            return Ok(defaults);
        }

        Self::load_from(&path)
    }

    /// Load settings from an explicit file
    ///
    /// Keys missing from the file take their default values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .build()?;

        settings.try_deserialize()
    }

    /// Load settings, falling back to defaults on any failure
    #[must_use]
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "settings unreadable, using defaults");
                Self::default()
            }
        }
    }

    /// Load settings, running first-time setup if the file doesn't exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if loading or creating the settings fails.
    pub fn load_or_setup() -> Result<Self, ConfigError> {
        let path = Self::settings_path()?;

        if path.exists() {
            Self::load_from(&path)
        } else {
            first_time_setup()
        }
    }

    /// Save settings to the user's settings file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the settings path cannot be determined or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::settings_path()?)
    }

    /// Save settings to an explicit file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the directory cannot be created, the settings
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Message(format!("Failed to create config directory: {e}")))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize settings: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write settings file: {e}")))?;

        debug!(path = %path.display(), "settings saved");
        Ok(())
    }

    /// Whether a library root has been configured
    #[must_use]
    pub fn has_library_root(&self) -> bool {
        !self.library_root.as_os_str().is_empty()
    }

    /// Compiled asset glob
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidPattern` if the glob is malformed.
    pub fn pattern(&self) -> Result<AssetPattern, CatalogError> {
        AssetPattern::new(&self.asset_pattern)
    }

    /// Replace the saved vocabulary, sorted and unique
    pub fn set_user_tags<S: AsRef<str>>(&mut self, tags: &[S]) {
        self.user_tags = sorted_unique(tags.iter().map(|t| t.as_ref()));
    }
}
