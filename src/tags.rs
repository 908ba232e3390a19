//! Case-insensitive tag sets
//!
//! Tags compare without regard to case but keep the spelling they were first
//! inserted with. The pseudo-tag [`ALL_TAG`] belongs to the category selector
//! and is never stored as a real tag.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Reserved pseudo-tag meaning "no category restriction"
pub const ALL_TAG: &str = "All";

/// Case-insensitive string equality
#[must_use]
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Case-insensitive substring test
///
/// An empty needle or haystack never matches.
#[must_use]
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if haystack.is_empty() || needle.is_empty() {
        return false;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Ordering used everywhere tags or names are displayed sorted
///
/// Compares case-insensitively first and falls back to the raw strings so the
/// result is total and deterministic.
#[must_use]
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Check whether a tag is the reserved [`ALL_TAG`]
#[must_use]
pub fn is_reserved(tag: &str) -> bool {
    eq_ignore_case(tag.trim(), ALL_TAG)
}

/// Trim a user-supplied tag, rejecting blanks and the reserved tag
#[must_use]
pub fn normalize_tag(raw: &str) -> Option<String> {
    let tag = raw.trim();
    if tag.is_empty() || is_reserved(tag) {
        None
    } else {
        Some(tag.to_string())
    }
}

/// Merge tag sources into a sorted, case-insensitively unique list
///
/// The first spelling seen wins. Blank entries and [`ALL_TAG`] are dropped.
#[must_use]
pub fn sorted_unique<I, S>(sources: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut set = TagSet::new();
    for tag in sources {
        set.insert(tag.as_ref());
    }
    let mut tags = set.into_vec();
    tags.sort_by(|a, b| cmp_ignore_case(a, b));
    tags
}

/// Ordered set of tags, unique without regard to case
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet(Vec<String>);

impl TagSet {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert a tag, keeping the existing spelling if it is already present
    ///
    /// Returns `true` if the tag was added.
    pub fn insert(&mut self, tag: &str) -> bool {
        let Some(tag) = normalize_tag(tag) else {
            return false;
        };
        if self.contains(&tag) {
            return false;
        }
        self.0.push(tag);
        true
    }

    /// Remove a tag regardless of case
    ///
    /// Returns `true` if a tag was removed.
    pub fn remove(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        let before = self.0.len();
        self.0.retain(|t| !eq_ignore_case(t, tag));
        self.0.len() != before
    }

    /// Add the tag if missing, remove it if present
    ///
    /// Returns `true` if the tag is present afterwards.
    pub fn toggle(&mut self, tag: &str) -> bool {
        if self.remove(tag) {
            false
        } else {
            self.insert(tag)
        }
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        let tag = tag.trim();
        self.0.iter().any(|t| eq_ignore_case(t, tag))
    }

    /// Check whether any of `tags` is in the set
    #[must_use]
    pub fn contains_any<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        tags.iter().any(|t| self.contains(t.as_ref()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for TagSet {
    fn from(tags: Vec<String>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<TagSet> for Vec<String> {
    fn from(set: TagSet) -> Self {
        set.0
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for tag in iter {
            set.insert(tag.as_ref());
        }
        set
    }
}
