//! Collection goals.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Normalizes a category name: trimmed and lower-cased, so `" Apple"` and
/// `"APPLE"` name the same category.
#[must_use]
pub fn normalize_category(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Required counts per category.
///
/// Goals derived from an item inventory also carry the roster of active
/// item ids; only those ids can be collected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGoals {
    required: BTreeMap<String, u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    roster: Option<BTreeMap<String, String>>,
}

impl CategoryGoals {
    /// Creates an empty goal set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a category requirement.
    #[must_use]
    pub fn with(mut self, category: &str, required: u32) -> Self {
        self.required.insert(normalize_category(category), required);
        self
    }

    /// Derives requirements from a page's item inventory: one required
    /// collection per active item of each category. Inactive items are left
    /// off the roster.
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a CollectibleItem>) -> Self {
        let mut required = BTreeMap::new();
        let mut roster = BTreeMap::new();
        for item in items.into_iter().filter(|item| item.active) {
            let category = normalize_category(&item.category);
            if roster.insert(item.item_id.clone(), category.clone()).is_none() {
                *required.entry(category).or_insert(0) += 1;
            }
        }
        Self {
            required,
            roster: Some(roster),
        }
    }

    /// Returns `true` if `item_id` may be collected for `category`. Without
    /// a roster any id is allowed.
    #[must_use]
    pub fn admits_item(&self, category: &str, item_id: &str) -> bool {
        match &self.roster {
            Some(roster) => roster
                .get(item_id)
                .is_some_and(|listed| *listed == normalize_category(category)),
            None => true,
        }
    }

    /// Returns `true` if there are no categories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }

    /// Returns the number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.required.len()
    }

    /// Returns the requirement for a category.
    #[must_use]
    pub fn required(&self, category: &str) -> Option<u32> {
        self.required.get(&normalize_category(category)).copied()
    }

    /// Iterates over `(category, required)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.required.iter().map(|(name, required)| (name.as_str(), *required))
    }
}

impl<S: AsRef<str>> FromIterator<(S, u32)> for CategoryGoals {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        Self {
            required: iter
                .into_iter()
                .map(|(name, required)| (normalize_category(name.as_ref()), required))
                .collect(),
            roster: None,
        }
    }
}

/// A collectible placed on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectibleItem {
    /// Item identifier reported by interaction signals.
    pub item_id: String,
    /// The category the item counts towards.
    pub category: String,
    /// Inactive items are present in the scene but not part of the goal.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Collected-versus-required count for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectibleCategory {
    /// Normalized name.
    pub name: String,
    /// Number of collections required.
    pub required: u32,
    /// Number of collections so far; never exceeds `required`.
    pub collected: u32,
}

impl CollectibleCategory {
    /// Returns `true` once the requirement is met.
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        self.collected >= self.required
    }

    /// Returns progress in `[0, 1]`; a category with nothing required is
    /// complete.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f32 {
        if self.required == 0 {
            1.0
        } else {
            self.collected as f32 / self.required as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_names_are_normalized() {
        let goals = CategoryGoals::new().with(" Apple ", 5).with("FISH", 2);

        assert_eq!(goals.required("apple"), Some(5));
        assert_eq!(goals.required("Fish"), Some(2));
        assert_eq!(goals.iter().collect::<Vec<_>>(), vec![("apple", 5), ("fish", 2)]);
    }

    #[test]
    fn test_goals_from_items_count_only_active_items() {
        let items = vec![
            CollectibleItem {
                item_id: "apple-1".to_owned(),
                category: "APPLE".to_owned(),
                active: true,
            },
            CollectibleItem {
                item_id: "apple-2".to_owned(),
                category: "apple".to_owned(),
                active: true,
            },
            CollectibleItem {
                item_id: "fish-1".to_owned(),
                category: "fish".to_owned(),
                active: false,
            },
        ];

        let goals = CategoryGoals::from_items(&items);

        assert_eq!(goals.required("apple"), Some(2));
        assert_eq!(goals.required("fish"), None);
        assert!(goals.admits_item("Apple", "apple-2"));
        assert!(!goals.admits_item("fish", "fish-1"));
        assert!(!goals.admits_item("apple", "apple-9"));
        assert!(!goals.admits_item("fish", "apple-1"));
    }

    #[test]
    fn test_declared_goals_admit_any_item() {
        let goals = CategoryGoals::new().with("apple", 1);

        assert!(goals.admits_item("apple", "anything"));
    }

    #[test]
    fn test_zero_requirement_category_is_complete() {
        let category = CollectibleCategory {
            name: "egg".to_owned(),
            required: 0,
            collected: 0,
        };

        assert!(category.is_satisfied());
        assert!((category.fraction() - 1.0).abs() < f32::EPSILON);
    }
}
