//! Name-collision handling
//!
//! When an asset with the same name already exists in the workspace the user
//! decides what happens. "All" answers are sticky for the rest of the batch
//! and stop further prompts.

use super::error::LoadError;
use dialoguer::Select;
use dialoguer::theme::ColorfulTheme;
use std::collections::VecDeque;
use std::path::Path;

type Result<T> = std::result::Result<T, LoadError>;

/// Answer to a single collision prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictChoice {
    Overwrite,
    Skip,
    OverwriteAll,
    SkipAll,
    Cancel,
}

impl ConflictChoice {
    pub const ALL: [Self; 5] = [
        Self::Overwrite,
        Self::Skip,
        Self::OverwriteAll,
        Self::SkipAll,
        Self::Cancel,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Overwrite => "Overwrite",
            Self::Skip => "Skip",
            Self::OverwriteAll => "Overwrite all",
            Self::SkipAll => "Skip all",
            Self::Cancel => "Cancel",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Overwrite => "replace the existing asset with the library version",
            Self::Skip => "keep the asset already in the workspace",
            Self::OverwriteAll => "replace every existing asset in this batch",
            Self::SkipAll => "keep every existing asset in this batch",
            Self::Cancel => "undo the whole batch",
        }
    }

    /// Parse a typed answer such as `o`, `skip` or `overwrite-all`
    #[must_use]
    pub fn from_response(response: &str) -> Option<Self> {
        match response.trim().to_lowercase().as_str() {
            "o" | "overwrite" => Some(Self::Overwrite),
            "s" | "skip" => Some(Self::Skip),
            "a" | "overwrite-all" => Some(Self::OverwriteAll),
            "n" | "skip-all" => Some(Self::SkipAll),
            "c" | "cancel" => Some(Self::Cancel),
            _ => None,
        }
    }
}

/// What to do with one colliding asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Overwrite,
    Skip,
    Cancel,
}

/// Batch-wide state of collision answers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StickyPolicy {
    #[default]
    Ask,
    OverwriteAll,
    SkipAll,
}

impl StickyPolicy {
    /// Resolve one collision, asking `resolver` only while no "all" answer was given
    ///
    /// # Errors
    ///
    /// Returns the resolver's error.
    pub fn resolve<R: ConflictResolver + ?Sized>(
        &mut self,
        resolver: &mut R,
        asset_name: &str,
        path: &Path,
    ) -> Result<Resolution> {
        match self {
            Self::OverwriteAll => return Ok(Resolution::Overwrite),
            Self::SkipAll => return Ok(Resolution::Skip),
            Self::Ask => {}
        }
        Ok(match resolver.resolve(asset_name, path)? {
            ConflictChoice::Overwrite => Resolution::Overwrite,
            ConflictChoice::Skip => Resolution::Skip,
            ConflictChoice::OverwriteAll => {
                *self = Self::OverwriteAll;
                Resolution::Overwrite
            }
            ConflictChoice::SkipAll => {
                *self = Self::SkipAll;
                Resolution::Skip
            }
            ConflictChoice::Cancel => Resolution::Cancel,
        })
    }
}

/// Decides what happens to an asset whose name already exists
pub trait ConflictResolver {
    /// # Errors
    ///
    /// Returns `LoadError::Prompt` if the answer cannot be obtained.
    fn resolve(&mut self, asset_name: &str, path: &Path) -> Result<ConflictChoice>;
}

/// Interactive terminal prompt
pub struct DialoguerResolver {
    theme: ColorfulTheme,
}

impl DialoguerResolver {
    #[must_use]
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for DialoguerResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DialoguerResolver {
    fn items() -> Vec<String> {
        ConflictChoice::ALL
            .iter()
            .map(|c| format!("{} - {}", c.label(), c.description()))
            .collect()
    }

    /// Escape or an out-of-range index cancels
    fn choice_at(selection: Option<usize>) -> ConflictChoice {
        selection
            .and_then(|i| ConflictChoice::ALL.get(i).copied())
            .unwrap_or(ConflictChoice::Cancel)
    }
}

impl ConflictResolver for DialoguerResolver {
    fn resolve(&mut self, asset_name: &str, path: &Path) -> Result<ConflictChoice> {
        let selection = Select::with_theme(&self.theme)
            .with_prompt(format!(
                "'{asset_name}' is already in the workspace ({})",
                path.display()
            ))
            .items(&Self::items())
            .default(1)
            .interact_opt()?;

        Ok(Self::choice_at(selection))
    }
}

/// Resolver replaying predetermined answers
///
/// Once the script runs out every further collision is skipped.
#[derive(Debug, Clone, Default)]
pub struct ScriptedResolver {
    answers: VecDeque<ConflictChoice>,
    /// Asset names that were asked about, in order
    pub asked: Vec<String>,
}

impl ScriptedResolver {
    #[must_use]
    pub fn new(answers: impl IntoIterator<Item = ConflictChoice>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }
}

impl ConflictResolver for ScriptedResolver {
    fn resolve(&mut self, asset_name: &str, _path: &Path) -> Result<ConflictChoice> {
        self.asked.push(asset_name.to_string());
        Ok(self.answers.pop_front().unwrap_or(ConflictChoice::Skip))
    }
}

/// Resolver giving the same answer to every collision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedResolver(pub ConflictChoice);

impl ConflictResolver for FixedResolver {
    fn resolve(&mut self, _asset_name: &str, _path: &Path) -> Result<ConflictChoice> {
        Ok(self.0)
    }
}
