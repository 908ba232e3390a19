//! Global tag vocabulary

use super::groups::TagPolicy;
use crate::catalog::CatalogItem;
use crate::tags::{ALL_TAG, TagSet, cmp_ignore_case, eq_ignore_case, normalize_tag, sorted_unique};

/// Sorted, case-insensitively unique list of every known tag
///
/// Never contains [`ALL_TAG`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagVocabulary {
    tags: Vec<String>,
}

impl TagVocabulary {
    /// Merge saved tags, tags found on items and the required set
    #[must_use]
    pub fn build<S: AsRef<str>>(saved: &[S], items: &[CatalogItem], required: &[S]) -> Self {
        let tags = sorted_unique(
            saved
                .iter()
                .map(|s| s.as_ref())
                .chain(items.iter().flat_map(|item| item.user_tags.iter()))
                .chain(required.iter().map(|s| s.as_ref())),
        );
        Self { tags }
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| eq_ignore_case(t, tag.trim()))
    }

    /// Add a tag to the vocabulary
    ///
    /// Returns the stored spelling when the tag was new, `None` when it was
    /// blank, reserved or already present.
    pub fn add(&mut self, raw: &str) -> Option<String> {
        let tag = normalize_tag(raw)?;
        if self.contains(&tag) {
            return None;
        }
        let pos = self
            .tags
            .partition_point(|t| cmp_ignore_case(t, &tag).is_lt());
        self.tags.insert(pos, tag.clone());
        Some(tag)
    }

    /// Remove a tag regardless of case, returning whether it was present
    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        let tag = tag.trim();
        self.tags.retain(|t| !eq_ignore_case(t, tag));
        self.tags.len() != before
    }

    /// Add the tag if it is not known yet
    pub fn ensure(&mut self, tag: &str) {
        self.add(tag);
    }

    /// Choices for the category selector, [`ALL_TAG`] first
    ///
    /// With no active group every non-banned vocabulary tag is offered;
    /// otherwise the union of the active groups' tags, minus banned tags.
    #[must_use]
    pub fn visible<S: AsRef<str>>(&self, policy: &TagPolicy, active_groups: &[S]) -> Vec<String> {
        let candidates = if active_groups.is_empty() {
            self.tags.clone()
        } else {
            policy.allowed_tags(active_groups)
        };

        let mut visible = vec![ALL_TAG.to_string()];
        visible.extend(candidates.into_iter().filter(|t| !policy.is_banned(t)));
        visible
    }

    /// Tags that no catalog item carries any more
    #[must_use]
    pub fn unused(&self, items: &[CatalogItem]) -> Vec<String> {
        let used: TagSet = items.iter().flat_map(|item| item.user_tags.iter()).collect();
        self.tags
            .iter()
            .filter(|t| !used.contains(t))
            .cloned()
            .collect()
    }
}
