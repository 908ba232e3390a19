//! Config command - show or change settings

use crate::FamlibError;
use crate::cli::ConfigCommands;
use crate::config::Settings;
use colored::Colorize;
use std::path::Path;

type Result<T> = std::result::Result<T, FamlibError>;

/// Execute the config command
///
/// # Errors
/// Returns an error if a value is invalid or the settings cannot be saved
pub fn execute(mut settings: Settings, command: &ConfigCommands, quiet: bool) -> Result<()> {
    match command {
        ConfigCommands::Show => show(&settings),
        ConfigCommands::SetRoot { root } => {
            if !root.is_dir() {
                return Err(FamlibError::InvalidInput(format!(
                    "'{}' is not a directory",
                    root.display()
                )));
            }
            settings.library_root = absolute(root)?;
            settings.save()?;
            if !quiet {
                println!("Set library_root = {}", settings.library_root.display());
            }
        }
        ConfigCommands::SetSize { size } => {
            settings.thumbnail_pixel_size = *size;
            settings.save()?;
            if !quiet {
                println!("Set thumbnail_pixel_size = {size}");
            }
        }
    }
    Ok(())
}

fn show(settings: &Settings) {
    if let Ok(path) = Settings::settings_path() {
        println!("{} {}", "Settings file:".bold(), path.display());
    }
    let root = if settings.has_library_root() {
        settings.library_root.display().to_string()
    } else {
        "(not set)".dimmed().to_string()
    };
    println!("  library_root = {root}");
    println!("  thumbnail_pixel_size = {}", settings.thumbnail_pixel_size);
    println!("  asset_pattern = {}", settings.asset_pattern);
    println!("  quiet = {}", settings.quiet);
    println!("  user_tags = [{}]", settings.user_tags.join(", "));
    for group in &settings.tags.groups {
        println!("  group {} = [{}]", group.name, group.tags.join(", "));
    }
}

fn absolute(path: &Path) -> Result<std::path::PathBuf> {
    Ok(path.canonicalize()?)
}
