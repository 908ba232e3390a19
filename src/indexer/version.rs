//! Origin version detection
//!
//! Hosts report version information in different fields depending on their
//! release. Detection tries an ordered list of named strategies, each looking
//! at one field of [`FileInfo`] for a plausible four-digit release year, and
//! returns the first hit.

use crate::host::FileInfo;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

pub const MIN_YEAR: u16 = 2010;
pub const MAX_YEAR: u16 = 2100;

static YEAR: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^20\d{2}").ok());

/// A detected release year together with the strategy that found it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatVersion {
    pub year: u16,
    pub source: &'static str,
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.year)
    }
}

/// One named place to look for a version year
#[derive(Debug, Clone, Copy)]
pub struct VersionStrategy {
    pub name: &'static str,
    field: fn(&FileInfo) -> Option<&str>,
}

impl VersionStrategy {
    #[must_use]
    pub const fn new(name: &'static str, field: fn(&FileInfo) -> Option<&str>) -> Self {
        Self { name, field }
    }

    /// Run this strategy against a file info record
    #[must_use]
    pub fn detect(&self, info: &FileInfo) -> Option<FormatVersion> {
        (self.field)(info)
            .and_then(extract_year)
            .map(|year| FormatVersion {
                year,
                source: self.name,
            })
    }
}

/// Ordered list of version strategies
#[derive(Debug, Clone)]
pub struct VersionDetector {
    strategies: Vec<VersionStrategy>,
}

impl VersionDetector {
    #[must_use]
    pub const fn new(strategies: Vec<VersionStrategy>) -> Self {
        Self { strategies }
    }

    #[must_use]
    pub fn strategies(&self) -> &[VersionStrategy] {
        &self.strategies
    }

    /// First year found by any strategy, in order
    #[must_use]
    pub fn detect(&self, info: &FileInfo) -> Option<FormatVersion> {
        self.strategies.iter().find_map(|s| s.detect(info))
    }
}

impl Default for VersionDetector {
    fn default() -> Self {
        Self::new(vec![
            VersionStrategy::new("saved_in_version", |i| i.saved_in_version.as_deref()),
            VersionStrategy::new("app_version", |i| i.app_version.as_deref()),
            VersionStrategy::new("format", |i| i.format.as_deref()),
            VersionStrategy::new("app_build", |i| i.app_build.as_deref()),
            VersionStrategy::new("build", |i| i.build.as_deref()),
            VersionStrategy::new("summary", |i| i.summary.as_deref()),
        ])
    }
}

/// First `20xx` year in `text` within [`MIN_YEAR`, `MAX_YEAR`]
///
/// Every offset is tried, so candidates may overlap: `"2002019"` yields 2019.
#[must_use]
pub fn extract_year(text: &str) -> Option<u16> {
    let year = YEAR.as_ref()?;
    text.char_indices()
        .filter_map(|(i, _)| year.find(&text[i..]))
        .filter_map(|m| m.as_str().parse::<u16>().ok())
        .find(|y| (MIN_YEAR..=MAX_YEAR).contains(y))
}
