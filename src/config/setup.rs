//! Interactive setup wizard for first-time configuration
//!
//! This module handles the interactive prompts for creating the initial
//! settings when famlib is run for the first time.

use super::Settings;
use crate::thumbnails::DEFAULT_PIXEL_SIZE;
use config::ConfigError;
use dialoguer::{Input, theme::ColorfulTheme};
use std::path::PathBuf;

/// Interactive first-time setup - prompts for the library root and thumbnail size
///
/// 1. Prompts for the library root (default: the current directory)
/// 2. Prompts for the thumbnail edge length (default: 384)
/// 3. Saves the settings
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - User input cannot be read
/// - The settings cannot be saved
pub fn first_time_setup() -> Result<Settings, ConfigError> {
    println!("Welcome to famlib! Let's point it at your asset library.\n");

    let default_root = std::env::current_dir()
        .map(|d| d.to_string_lossy().to_string())
        .unwrap_or_default();

    let root: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Library root")
        .default(default_root)
        .interact_text()
        .map_err(|e| ConfigError::Message(format!("Failed to read input: {e}")))?;

    let size: u32 = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Thumbnail size (pixels)")
        .default(DEFAULT_PIXEL_SIZE)
        .validate_with(validate_size)
        .interact_text()
        .map_err(|e| ConfigError::Message(format!("Failed to read input: {e}")))?;

    let settings = settings_from_answers(&root, size);
    settings.save()?;

    println!("\nSettings saved successfully!");
    Ok(settings)
}

fn validate_size(size: &u32) -> Result<(), &'static str> {
    if *size > 0 {
        Ok(())
    } else {
        Err("size must be positive")
    }
}

fn settings_from_answers(root: &str, size: u32) -> Settings {
    Settings {
        library_root: PathBuf::from(root.trim()),
        thumbnail_pixel_size: size,
        ..Settings::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answers_trimmed_into_settings() {
        let settings = settings_from_answers("  /srv/library \n", 256);
        assert_eq!(settings.library_root, PathBuf::from("/srv/library"));
        assert_eq!(settings.thumbnail_pixel_size, 256);
        assert_eq!(settings.quiet, Settings::default().quiet);
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(validate_size(&0).is_err());
        assert!(validate_size(&1).is_ok());
    }
}
