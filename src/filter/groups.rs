//! Toggle groups and tag policy

use crate::tags::{eq_ignore_case, sorted_unique};
use serde::{Deserialize, Serialize};

/// Named, fixed set of tags switched on and off as one filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleGroup {
    pub name: String,
    pub tags: Vec<String>,
}

impl ToggleGroup {
    #[must_use]
    pub fn new(name: &str, tags: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            tags: tags.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Fixed tag rules of a library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagPolicy {
    /// Tags always present in the vocabulary
    pub required: Vec<String>,
    /// Tags never offered by the category selector
    pub banned: Vec<String>,
    pub groups: Vec<ToggleGroup>,
}

impl Default for TagPolicy {
    fn default() -> Self {
        let strings = |tags: &[&str]| tags.iter().map(ToString::to_string).collect();
        Self {
            required: strings(&["2D", "3D", "EL", "EN", "EA"]),
            banned: strings(&["EL", "EN", "EA", "2D", "3D"]),
            groups: vec![
                ToggleGroup::new("EL", &["Andurid", "Kilbid", "Lülitid", "Pistikud", "Valgusti"]),
                ToggleGroup::new("EN", &["ATS", "Kilbid", "LPS", "SHS", "Side", "VVS"]),
                ToggleGroup::new("EA", &["Andurid", "Kilbid"]),
            ],
        }
    }
}

impl TagPolicy {
    /// Look up a group by name, ignoring case
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&ToggleGroup> {
        self.groups.iter().find(|g| eq_ignore_case(&g.name, name))
    }

    #[must_use]
    pub fn is_banned(&self, tag: &str) -> bool {
        self.banned.iter().any(|b| eq_ignore_case(b, tag))
    }

    /// Sorted union of the tag sets of the named groups
    #[must_use]
    pub fn allowed_tags<S: AsRef<str>>(&self, active: &[S]) -> Vec<String> {
        sorted_unique(
            active
                .iter()
                .filter_map(|name| self.group(name.as_ref()))
                .flat_map(|g| g.tags.iter()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_groups() {
        let policy = TagPolicy::default();
        assert_eq!(policy.groups.len(), 3);
        assert_eq!(policy.group("ea").unwrap().tags, vec!["Andurid", "Kilbid"]);
        assert!(policy.is_banned("2d"));
        assert!(!policy.is_banned("Kilbid"));
    }

    #[test]
    fn test_allowed_tags_is_union() {
        let policy = TagPolicy {
            groups: vec![
                ToggleGroup::new("G1", &["x", "y"]),
                ToggleGroup::new("G2", &["z", "X"]),
            ],
            ..TagPolicy::default()
        };
        assert_eq!(policy.allowed_tags(&["G1", "G2"]), vec!["x", "y", "z"]);
        assert!(policy.allowed_tags::<&str>(&[]).is_empty());
        assert!(policy.allowed_tags(&["unknown"]).is_empty());
    }

    #[test]
    fn test_policy_roundtrips_through_toml() {
        let policy = TagPolicy::default();
        let text = toml::to_string_pretty(&policy).unwrap();
        let back: TagPolicy = toml::from_str(&text).unwrap();
        assert_eq!(back, policy);
    }
}
