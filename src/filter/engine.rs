//! Filter state and pipeline

use super::groups::TagPolicy;
use super::vocabulary::TagVocabulary;
use super::DisplayMode;
use crate::catalog::CatalogItem;
use crate::tags::{ALL_TAG, contains_ignore_case, eq_ignore_case, is_reserved};
use tracing::debug;

/// Current filter selection over a catalog
///
/// Holds no items. Callers pass the catalog to [`FilterEngine::apply`] after
/// every change, which keeps the result in catalog order.
#[derive(Debug, Clone)]
pub struct FilterEngine {
    policy: TagPolicy,
    mode: DisplayMode,
    active_groups: Vec<String>,
    category: String,
    query: String,
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new(TagPolicy::default())
    }
}

impl FilterEngine {
    #[must_use]
    pub fn new(policy: TagPolicy) -> Self {
        Self {
            policy,
            mode: DisplayMode::default(),
            active_groups: Vec::new(),
            category: ALL_TAG.to_string(),
            query: String::new(),
        }
    }

    #[must_use]
    pub const fn policy(&self) -> &TagPolicy {
        &self.policy
    }

    #[must_use]
    pub const fn mode(&self) -> DisplayMode {
        self.mode
    }

    #[must_use]
    pub fn active_groups(&self) -> &[String] {
        &self.active_groups
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Switch the display mode; a change resets the category
    pub fn set_mode(&mut self, mode: DisplayMode) {
        if self.mode != mode {
            self.mode = mode;
            self.reset_category();
        }
    }

    /// Turn a toggle group on or off
    ///
    /// Unknown group names are ignored. Any change resets the category.
    pub fn set_group(&mut self, name: &str, active: bool) {
        let Some(group) = self.policy.group(name) else {
            debug!(group = name, "Ignoring unknown toggle group");
            return;
        };
        let name = group.name.clone();
        let position = self
            .active_groups
            .iter()
            .position(|g| eq_ignore_case(g, &name));

        match (position, active) {
            (None, true) => self.active_groups.push(name),
            (Some(idx), false) => {
                self.active_groups.remove(idx);
            }
            _ => return,
        }
        self.reset_category();
    }

    /// Flip a toggle group, returning whether it is active afterwards
    pub fn toggle_group(&mut self, name: &str) -> bool {
        let active = self.is_group_active(name);
        self.set_group(name, !active);
        self.is_group_active(name)
    }

    #[must_use]
    pub fn is_group_active(&self, name: &str) -> bool {
        self.active_groups.iter().any(|g| eq_ignore_case(g, name))
    }

    /// Select a category; blank selects [`ALL_TAG`]
    pub fn select_category(&mut self, tag: &str) {
        let tag = tag.trim();
        if tag.is_empty() || is_reserved(tag) {
            self.reset_category();
        } else {
            self.category = tag.to_string();
        }
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    /// Reset everything except the policy
    pub fn clear(&mut self) {
        self.mode = DisplayMode::default();
        self.active_groups.clear();
        self.query.clear();
        self.reset_category();
    }

    /// Category selector choices for the current groups
    #[must_use]
    pub fn visible_categories(&self, vocabulary: &TagVocabulary) -> Vec<String> {
        vocabulary.visible(&self.policy, &self.active_groups)
    }

    /// Reset the category if it is no longer among the visible choices
    pub fn sync_category(&mut self, vocabulary: &TagVocabulary) {
        let visible = self.visible_categories(vocabulary);
        if !visible.iter().any(|t| eq_ignore_case(t, &self.category)) {
            debug!(category = %self.category, "Selected category no longer visible");
            self.reset_category();
        }
    }

    fn reset_category(&mut self) {
        ALL_TAG.clone_into(&mut self.category);
    }

    /// Mode stage: the item has the mode's tag or lacks the opposite one
    #[must_use]
    pub fn passes_mode(&self, item: &CatalogItem) -> bool {
        item.user_tags.contains(self.mode.tag()) || !item.user_tags.contains(self.mode.opposite().tag())
    }

    /// Group stage: with any group active the item needs a tag from their union
    #[must_use]
    pub fn passes_groups(&self, item: &CatalogItem) -> bool {
        if self.active_groups.is_empty() {
            return true;
        }
        item.user_tags
            .contains_any(&self.policy.allowed_tags(&self.active_groups))
    }

    #[must_use]
    pub fn passes_category(&self, item: &CatalogItem) -> bool {
        is_reserved(&self.category) || item.user_tags.contains(&self.category)
    }

    /// Text stage: substring over names, path, tags and variants
    #[must_use]
    pub fn passes_query(&self, item: &CatalogItem) -> bool {
        let query = self.query.trim();
        if query.is_empty() {
            return true;
        }
        contains_ignore_case(&item.display_name, query)
            || contains_ignore_case(&item.category, query)
            || contains_ignore_case(&item.relative_path, query)
            || item.user_tags.iter().any(|t| contains_ignore_case(t, query))
            || item.variant_names.iter().any(|v| contains_ignore_case(v, query))
    }

    /// Run every stage in order
    #[must_use]
    pub fn matches(&self, item: &CatalogItem) -> bool {
        self.passes_mode(item)
            && self.passes_groups(item)
            && self.passes_category(item)
            && self.passes_query(item)
    }

    /// Visible items, in catalog order
    #[must_use]
    pub fn apply<'a>(&self, items: &'a [CatalogItem]) -> Vec<&'a CatalogItem> {
        items.iter().filter(|item| self.matches(item)).collect()
    }

    /// Indices of the visible items, in catalog order
    #[must_use]
    pub fn filter_indices(&self, items: &[CatalogItem]) -> Vec<usize> {
        items
            .iter()
            .enumerate()
            .filter(|(_, item)| self.matches(item))
            .map(|(idx, _)| idx)
            .collect()
    }
}
