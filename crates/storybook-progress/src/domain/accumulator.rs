//! The progress accumulator.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info};

use super::events::ProgressEvent;
use super::goals::{CategoryGoals, CollectibleCategory, normalize_category};

/// Tracks collection progress for one configure cycle.
///
/// Rejections (unknown category, category already full, item already
/// collected) are not errors: they return `false` and change nothing.
#[derive(Debug, Default)]
pub struct ProgressAccumulator {
    goals: Option<CategoryGoals>,
    categories: BTreeMap<String, CollectibleCategory>,
    collected_items: HashSet<String>,
    completed: bool,
    events: Vec<ProgressEvent>,
}

impl ProgressAccumulator {
    /// Creates an unconfigured accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new cycle with the given requirements and every count at
    /// zero. A goal set that is already satisfied completes immediately.
    pub fn configure(&mut self, goals: &CategoryGoals) {
        self.categories = goals
            .iter()
            .map(|(name, required)| {
                (
                    name.to_owned(),
                    CollectibleCategory {
                        name: name.to_owned(),
                        required,
                        collected: 0,
                    },
                )
            })
            .collect();
        self.goals = Some(goals.clone());
        self.collected_items.clear();
        self.completed = false;
        info!(categories = goals.len(), "progress configured");
        self.check_completion();
    }

    /// Re-configures with the current goals, clearing all counts.
    pub fn reset(&mut self) {
        if let Some(goals) = self.goals.take() {
            self.configure(&goals);
        }
    }

    /// Returns to the unconfigured state.
    pub fn clear(&mut self) {
        self.goals = None;
        self.categories.clear();
        self.collected_items.clear();
        self.completed = false;
        self.events.clear();
    }

    /// Counts one collection for `category` if it still needs one.
    pub fn try_accept(&mut self, category: &str) -> bool {
        let name = normalize_category(category);
        let Some(entry) = self.categories.get_mut(&name) else {
            debug!(category = %name, "collection rejected, unknown category");
            return false;
        };
        if entry.is_satisfied() {
            debug!(category = %name, "collection rejected, category already satisfied");
            return false;
        }

        entry.collected += 1;
        let fraction = entry.fraction();
        let overall = self.overall_fraction();
        debug!(category = %name, fraction, overall, "collection accepted");
        self.events.push(ProgressEvent::Accepted {
            category: name,
            fraction,
            overall,
        });
        self.check_completion();
        true
    }

    /// Like [`try_accept`](Self::try_accept), but each item id counts at
    /// most once per configure cycle. Goals derived from an item inventory
    /// only accept the active items listed for that category.
    pub fn try_accept_item(&mut self, category: &str, item_id: &str) -> bool {
        if !self
            .goals
            .as_ref()
            .is_some_and(|goals| goals.admits_item(category, item_id))
        {
            debug!(category, item_id, "collection rejected, item not on the roster");
            return false;
        }
        if self.collected_items.contains(item_id) {
            debug!(item_id, "collection rejected, item already collected");
            return false;
        }
        let accepted = self.try_accept(category);
        if accepted {
            self.collected_items.insert(item_id.to_owned());
        }
        accepted
    }

    /// Returns a category's progress, or `None` for an unknown category.
    #[must_use]
    pub fn fraction(&self, category: &str) -> Option<f32> {
        self.categories
            .get(&normalize_category(category))
            .map(CollectibleCategory::fraction)
    }

    /// Returns overall progress. Categories with nothing required are left
    /// out; if nothing at all is required the result is 1.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn overall_fraction(&self) -> f32 {
        let (collected, required) = self
            .categories
            .values()
            .filter(|c| c.required > 0)
            .fold((0u64, 0u64), |(collected, required), c| {
                (
                    collected + u64::from(c.collected.min(c.required)),
                    required + u64::from(c.required),
                )
            });
        if required == 0 {
            1.0
        } else {
            collected as f32 / required as f32
        }
    }

    /// Returns `true` once every category is satisfied in this cycle.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Returns `true` after `configure` and before `clear`.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.goals.is_some()
    }

    /// Returns one category's counts.
    #[must_use]
    pub fn category(&self, category: &str) -> Option<&CollectibleCategory> {
        self.categories.get(&normalize_category(category))
    }

    /// Iterates over all categories in name order.
    pub fn categories(&self) -> impl Iterator<Item = &CollectibleCategory> {
        self.categories.values()
    }

    /// Removes and returns the events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<ProgressEvent> {
        std::mem::take(&mut self.events)
    }

    fn check_completion(&mut self) {
        if self.completed || !self.categories.values().all(CollectibleCategory::is_satisfied) {
            return;
        }
        self.completed = true;
        info!("all collection goals met");
        self.events.push(ProgressEvent::Completed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::goals::CollectibleItem;

    fn apples_and_fish() -> CategoryGoals {
        CategoryGoals::new().with("apple", 5).with("fish", 2)
    }

    fn completions(events: &[ProgressEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Completed))
            .count()
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn test_seven_accepts_fill_progress_and_complete_once() {
        let mut progress = ProgressAccumulator::new();
        progress.configure(&apples_and_fish());
        let order = ["apple", "apple", "apple", "apple", "apple", "fish", "fish"];

        let mut overall = Vec::new();
        for (i, category) in order.iter().enumerate() {
            assert!(progress.try_accept(category));
            overall.push(progress.overall_fraction());
            let events = progress.drain_events();
            if i < order.len() - 1 {
                assert_eq!(completions(&events), 0, "completed early at accept {}", i + 1);
                assert!(!progress.is_completed());
            } else {
                assert_eq!(completions(&events), 1);
            }
        }

        assert!(overall.windows(2).all(|w| w[0] < w[1]));
        for (i, fraction) in overall.iter().enumerate() {
            let expected = (i + 1) as f32 / 7.0;
            assert!((fraction - expected).abs() < 1e-6);
        }
        assert!(progress.is_completed());
    }

    #[test]
    fn test_over_collection_is_rejected_without_change() {
        let mut progress = ProgressAccumulator::new();
        progress.configure(&CategoryGoals::new().with("fish", 1));
        assert!(progress.try_accept("fish"));
        progress.drain_events();

        assert!(!progress.try_accept("fish"));

        let fish = progress.category("fish").unwrap();
        assert_eq!(fish.collected, 1);
        assert!(progress.drain_events().is_empty());
    }

    #[test]
    fn test_completion_does_not_refire_after_more_accepts() {
        let mut progress = ProgressAccumulator::new();
        progress.configure(&CategoryGoals::new().with("egg", 1).with("duck", 2));
        progress.try_accept("egg");
        progress.try_accept("duck");
        progress.try_accept("duck");
        assert_eq!(completions(&progress.drain_events()), 1);

        for _ in 0..5 {
            progress.try_accept("duck");
            progress.try_accept("egg");
        }

        assert_eq!(completions(&progress.drain_events()), 0);
        assert!(progress.is_completed());
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let mut progress = ProgressAccumulator::new();
        progress.configure(&apples_and_fish());

        assert!(!progress.try_accept("banana"));

        assert!(progress.drain_events().is_empty());
        assert!(progress.overall_fraction().abs() < f32::EPSILON);
    }

    #[test]
    fn test_unconfigured_accumulator_rejects_everything() {
        let mut progress = ProgressAccumulator::new();

        assert!(!progress.try_accept("apple"));
        assert!(!progress.is_configured());
    }

    #[test]
    fn test_category_names_match_case_insensitively() {
        let mut progress = ProgressAccumulator::new();
        progress.configure(&apples_and_fish());

        assert!(progress.try_accept(" APPLE"));

        assert!((progress.fraction("Apple").unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_same_item_counts_only_once() {
        let mut progress = ProgressAccumulator::new();
        progress.configure(&apples_and_fish());

        assert!(progress.try_accept_item("apple", "apple-1"));
        assert!(!progress.try_accept_item("apple", "apple-1"));
        assert!(progress.try_accept_item("apple", "apple-2"));

        assert_eq!(progress.category("apple").unwrap().collected, 2);
    }

    #[test]
    fn test_rejected_item_is_not_remembered() {
        let mut progress = ProgressAccumulator::new();
        progress.configure(&apples_and_fish());

        assert!(!progress.try_accept_item("banana", "x-1"));
        assert!(progress.try_accept_item("apple", "x-1"));
    }

    #[test]
    fn test_zero_requirement_is_excluded_from_overall() {
        let mut progress = ProgressAccumulator::new();
        progress.configure(&CategoryGoals::new().with("apple", 2).with("bonus", 0));

        progress.try_accept("apple");

        assert!((progress.overall_fraction() - 0.5).abs() < 1e-6);
        assert!(!progress.try_accept("bonus"));
    }

    #[test]
    fn test_already_satisfied_goals_complete_on_configure() {
        let mut progress = ProgressAccumulator::new();

        progress.configure(&CategoryGoals::new().with("bonus", 0));

        assert!(progress.is_completed());
        assert_eq!(progress.drain_events(), vec![ProgressEvent::Completed]);
    }

    #[test]
    fn test_reset_clears_counts_and_allows_a_new_completion() {
        let mut progress = ProgressAccumulator::new();
        progress.configure(&CategoryGoals::new().with("egg", 1));
        progress.try_accept_item("egg", "egg-1");
        assert!(progress.is_completed());
        progress.drain_events();

        progress.reset();

        assert!(!progress.is_completed());
        assert_eq!(progress.category("egg").unwrap().collected, 0);
        assert!(progress.try_accept_item("egg", "egg-1"));
        assert_eq!(completions(&progress.drain_events()), 1);
    }

    #[test]
    fn test_clear_returns_to_unconfigured() {
        let mut progress = ProgressAccumulator::new();
        progress.configure(&apples_and_fish());
        progress.try_accept("apple");

        progress.clear();

        assert!(!progress.is_configured());
        assert_eq!(progress.categories().count(), 0);
        assert!(!progress.try_accept("apple"));
    }

    #[test]
    fn test_clear_drops_pending_events() {
        let mut progress = ProgressAccumulator::new();
        progress.configure(&CategoryGoals::new().with("bonus", 0));

        progress.clear();

        assert!(progress.drain_events().is_empty());
    }

    #[test]
    fn test_item_goals_reject_inactive_and_undeclared_items() {
        let items = vec![
            CollectibleItem {
                item_id: "egg-1".to_owned(),
                category: "egg".to_owned(),
                active: true,
            },
            CollectibleItem {
                item_id: "egg-2".to_owned(),
                category: "egg".to_owned(),
                active: true,
            },
            CollectibleItem {
                item_id: "rotten-egg".to_owned(),
                category: "egg".to_owned(),
                active: false,
            },
        ];
        let mut progress = ProgressAccumulator::new();
        progress.configure(&CategoryGoals::from_items(&items));
        progress.drain_events();

        assert!(!progress.try_accept_item("egg", "rotten-egg"));
        assert!(!progress.try_accept_item("egg", "never-declared"));
        assert!(!progress.try_accept_item("duck", "egg-1"));

        assert_eq!(progress.category("egg").unwrap().collected, 0);
        assert!(progress.drain_events().is_empty());
        assert!(progress.try_accept_item("egg", "egg-1"));
        assert!(progress.try_accept_item("egg", "egg-2"));
        assert!(progress.is_completed());
    }
}
