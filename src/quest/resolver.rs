//! Applicable task resolution
//!
//! Given a player and a task type, finds the tasks of that type in the player's
//! active quests that may receive an update right now.

use std::sync::Arc;

use super::definition::{Quest, Task};
use super::registry::QuestRegistry;
use super::store::{ProgressStore, TaskProgressHandle};
use crate::player::TrackedPlayer;

/// Extra eligibility rules applied by the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstraintSet {
    /// Skip tasks that are already completed
    pub task_not_completed: bool,
    /// Skip tasks restricted to other worlds
    pub world: bool,
}

impl ConstraintSet {
    pub const ALL: ConstraintSet = ConstraintSet {
        task_not_completed: true,
        world: true,
    };

    pub const NONE: ConstraintSet = ConstraintSet {
        task_not_completed: false,
        world: false,
    };
}

/// A task eligible for one update pass
#[derive(Debug, Clone)]
pub struct PendingTask {
    pub quest: Arc<Quest>,
    task_index: usize,
    pub progress: TaskProgressHandle,
}

impl PendingTask {
    pub fn task(&self) -> &Task {
        &self.quest.tasks[self.task_index]
    }
}

/// Read-only view over quest definitions and player progress
pub struct ApplicableTaskResolver<'a> {
    quests: &'a QuestRegistry,
    progress: &'a ProgressStore,
}

impl<'a> ApplicableTaskResolver<'a> {
    pub fn new(quests: &'a QuestRegistry, progress: &'a ProgressStore) -> Self {
        Self { quests, progress }
    }

    /// Tasks of `task_type` in the player's active quests, in quest start order
    /// and then task declaration order
    pub fn resolve(
        &self,
        player: &TrackedPlayer,
        task_type: &str,
        constraints: ConstraintSet,
    ) -> Vec<PendingTask> {
        let mut pending = Vec::new();

        for quest_id in self.progress.active_quests(player.id) {
            // Quest may have been removed by a reload
            let Some(quest) = self.quests.get(&quest_id) else {
                continue;
            };

            for (task_index, task) in quest.tasks.iter().enumerate() {
                if task.task_type != task_type {
                    continue;
                }

                if constraints.world {
                    if let Some(worlds) = task.worlds() {
                        if !worlds.contains(&player.world.as_str()) {
                            continue;
                        }
                    }
                }

                let progress = self.progress.handle(player.id, &quest.id, &task.id);
                if constraints.task_not_completed && progress.get().completed {
                    continue;
                }

                pending.push(PendingTask {
                    quest: Arc::clone(&quest),
                    task_index,
                    progress,
                });
            }
        }

        pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::definition::TaskConfig;
    use uuid::Uuid;

    fn task(id: &str, task_type: &str, worlds: Option<&[&str]>) -> Task {
        let mut values = std::collections::BTreeMap::new();
        if let Some(worlds) = worlds {
            values.insert(
                "worlds".to_string(),
                toml::Value::Array(worlds.iter().map(|w| toml::Value::from(*w)).collect()),
            );
        }
        Task {
            id: id.to_string(),
            task_type: task_type.to_string(),
            config: TaskConfig::new(values),
        }
    }

    fn quest(id: &str, tasks: Vec<Task>) -> Quest {
        Quest {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            tasks,
            disabled_tasks: Vec::new(),
        }
    }

    fn setup() -> (QuestRegistry, ProgressStore, TrackedPlayer) {
        let registry = QuestRegistry::from_quests(vec![
            quest(
                "first",
                vec![
                    task("walk", "walking", None),
                    task("mine", "mining", None),
                    task("nether_walk", "walking", Some(&["nether"])),
                ],
            ),
            quest("second", vec![task("walk", "walking", None)]),
            quest("unstarted", vec![task("walk", "walking", None)]),
        ]);
        let store = ProgressStore::new();
        let player = TrackedPlayer::new(Uuid::new_v4(), "alex", "overworld");

        for id in ["second", "first"] {
            store.start_quest(player.id, &registry.get(id).unwrap()).unwrap();
        }

        (registry, store, player)
    }

    fn ids(pending: &[PendingTask]) -> Vec<(String, String)> {
        pending
            .iter()
            .map(|p| (p.quest.id.clone(), p.task().id.clone()))
            .collect()
    }

    #[test]
    fn test_resolves_active_quests_in_start_order() {
        let (registry, store, player) = setup();
        let resolver = ApplicableTaskResolver::new(&registry, &store);

        let pending = resolver.resolve(&player, "walking", ConstraintSet::ALL);
        assert_eq!(
            ids(&pending),
            vec![
                ("second".to_string(), "walk".to_string()),
                ("first".to_string(), "walk".to_string()),
            ]
        );
    }

    #[test]
    fn test_completed_tasks_excluded_under_all() {
        let (registry, store, player) = setup();
        store.mark_completed(player.id, "second", "walk");
        let resolver = ApplicableTaskResolver::new(&registry, &store);

        let pending = resolver.resolve(&player, "walking", ConstraintSet::ALL);
        assert_eq!(ids(&pending), vec![("first".to_string(), "walk".to_string())]);

        let pending = resolver.resolve(&player, "walking", ConstraintSet::NONE);
        assert_eq!(pending.len(), 3);
    }

    #[test]
    fn test_world_gating() {
        let (registry, store, mut player) = setup();
        player.world = "nether".to_string();
        let resolver = ApplicableTaskResolver::new(&registry, &store);

        let pending = resolver.resolve(&player, "walking", ConstraintSet::ALL);
        assert!(ids(&pending).contains(&("first".to_string(), "nether_walk".to_string())));
        assert_eq!(pending.len(), 3);
    }

    #[test]
    fn test_unknown_player_and_removed_quest() {
        let (registry, store, player) = setup();
        let resolver = ApplicableTaskResolver::new(&registry, &store);

        let stranger = TrackedPlayer::new(Uuid::new_v4(), "sam", "overworld");
        assert!(resolver.resolve(&stranger, "walking", ConstraintSet::ALL).is_empty());

        let reloaded = QuestRegistry::from_quests(vec![quest("first", vec![task("walk", "walking", None)])]);
        let resolver = ApplicableTaskResolver::new(&reloaded, &store);
        let pending = resolver.resolve(&player, "walking", ConstraintSet::ALL);
        assert_eq!(ids(&pending), vec![("first".to_string(), "walk".to_string())]);
    }
}
