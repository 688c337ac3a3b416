//! Progress Store
//!
//! Owns every player's quest lifecycle state and task progress. Each
//! (player, quest, task) record sits behind its own mutex, so increments for
//! different records never contend while increment-and-complete on one record
//! is a single critical section.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::definition::Quest;
use super::state::{
    ActiveQuest, Advance, PlayerQuestState, PlayerSnapshot, QuestSnapshot, TaskProgress,
    TaskSnapshot,
};
use crate::error::{QuestError, QuestResult};

/// Identifies one progress record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskKey {
    pub player_id: Uuid,
    pub quest_id: String,
    pub task_id: String,
}

impl TaskKey {
    pub fn new(player_id: Uuid, quest_id: &str, task_id: &str) -> Self {
        Self {
            player_id,
            quest_id: quest_id.to_string(),
            task_id: task_id.to_string(),
        }
    }
}

/// Shared handle to a single progress record
#[derive(Debug, Clone, Default)]
pub struct TaskProgressHandle(Arc<Mutex<TaskProgress>>);

impl TaskProgressHandle {
    fn with(progress: TaskProgress) -> Self {
        Self(Arc::new(Mutex::new(progress)))
    }

    /// Current value
    pub fn get(&self) -> TaskProgress {
        *self.0.lock()
    }

    pub fn increment(&self) -> u32 {
        self.0.lock().increment()
    }

    pub fn mark_completed(&self) -> bool {
        self.0.lock().mark_completed()
    }

    /// Increment, compare against `threshold` and set the completed flag under
    /// one lock
    pub fn advance(&self, threshold: i64) -> Advance {
        self.0.lock().advance(threshold)
    }
}

/// In-memory progress for all tracked players
#[derive(Debug, Default)]
pub struct ProgressStore {
    players: DashMap<Uuid, PlayerQuestState>,
    tasks: DashMap<TaskKey, TaskProgressHandle>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a quest, creating fresh progress records for all of its tasks
    pub fn start_quest(&self, player_id: Uuid, quest: &Quest) -> QuestResult<()> {
        {
            let mut state = self.players.entry(player_id).or_default();
            if state.is_active(&quest.id) {
                return Err(QuestError::AlreadyActive(quest.id.clone()));
            }
            if state.is_completed(&quest.id) {
                return Err(QuestError::AlreadyCompleted(quest.id.clone()));
            }
            state.active.push(ActiveQuest {
                quest_id: quest.id.clone(),
                started_at: Utc::now(),
            });
        }

        for task in &quest.tasks {
            self.tasks.insert(
                TaskKey::new(player_id, &quest.id, &task.id),
                TaskProgressHandle::default(),
            );
        }

        debug!("Player {} started quest {}", player_id, quest.id);
        Ok(())
    }

    /// Drop an active quest and its progress
    pub fn cancel_quest(&self, player_id: Uuid, quest_id: &str) -> QuestResult<()> {
        {
            let mut state = self
                .players
                .get_mut(&player_id)
                .ok_or_else(|| QuestError::NotActive(quest_id.to_string()))?;
            let index = state
                .active
                .iter()
                .position(|q| q.quest_id == quest_id)
                .ok_or_else(|| QuestError::NotActive(quest_id.to_string()))?;
            state.active.remove(index);
        }

        self.tasks
            .retain(|key, _| !(key.player_id == player_id && key.quest_id == quest_id));

        debug!("Player {} cancelled quest {}", player_id, quest_id);
        Ok(())
    }

    /// Move a quest to the completed set and drop its task records. Only the
    /// first call returns true.
    pub fn complete_quest(&self, player_id: Uuid, quest_id: &str) -> bool {
        let completed = self
            .players
            .get_mut(&player_id)
            .is_some_and(|mut state| state.complete(quest_id));

        if completed {
            self.tasks
                .retain(|key, _| !(key.player_id == player_id && key.quest_id == quest_id));
        }
        completed
    }

    pub fn is_quest_active(&self, player_id: Uuid, quest_id: &str) -> bool {
        self.players
            .get(&player_id)
            .is_some_and(|state| state.is_active(quest_id))
    }

    pub fn has_completed(&self, player_id: Uuid, quest_id: &str) -> bool {
        self.players
            .get(&player_id)
            .is_some_and(|state| state.is_completed(quest_id))
    }

    /// Active quest IDs in the order they were started
    pub fn active_quests(&self, player_id: Uuid) -> Vec<String> {
        self.players
            .get(&player_id)
            .map(|state| state.active.iter().map(|q| q.quest_id.clone()).collect())
            .unwrap_or_default()
    }

    /// Handle to a progress record, created on first access
    pub fn handle(&self, player_id: Uuid, quest_id: &str, task_id: &str) -> TaskProgressHandle {
        self.tasks
            .entry(TaskKey::new(player_id, quest_id, task_id))
            .or_default()
            .clone()
    }

    /// Current progress, if a record exists
    pub fn progress(&self, player_id: Uuid, quest_id: &str, task_id: &str) -> Option<TaskProgress> {
        self.tasks
            .get(&TaskKey::new(player_id, quest_id, task_id))
            .map(|handle| handle.get())
    }

    /// Add one to a task's counter, returning the new value
    pub fn increment(&self, player_id: Uuid, quest_id: &str, task_id: &str) -> u32 {
        self.handle(player_id, quest_id, task_id).increment()
    }

    /// Mark a task completed. Marking a completed task again is a no-op.
    pub fn mark_completed(&self, player_id: Uuid, quest_id: &str, task_id: &str) -> bool {
        self.handle(player_id, quest_id, task_id).mark_completed()
    }

    /// Check whether every task of `quest` is completed for this player
    pub fn all_tasks_completed(&self, player_id: Uuid, quest: &Quest) -> bool {
        quest.tasks.iter().all(|task| {
            self.progress(player_id, &quest.id, &task.id)
                .is_some_and(|p| p.completed)
        })
    }

    /// Export a player's state for the external store
    pub fn snapshot(&self, player_id: Uuid) -> PlayerSnapshot {
        let Some(state) = self.players.get(&player_id).map(|s| s.value().clone()) else {
            return PlayerSnapshot::default();
        };

        let active = state
            .active
            .iter()
            .map(|quest| {
                let mut tasks: Vec<TaskSnapshot> = self
                    .tasks
                    .iter()
                    .filter(|entry| {
                        entry.key().player_id == player_id && entry.key().quest_id == quest.quest_id
                    })
                    .map(|entry| TaskSnapshot {
                        task_id: entry.key().task_id.clone(),
                        progress: entry.value().get(),
                    })
                    .collect();
                tasks.sort_by(|a, b| a.task_id.cmp(&b.task_id));

                QuestSnapshot {
                    quest_id: quest.quest_id.clone(),
                    started_at: quest.started_at,
                    tasks,
                }
            })
            .collect();

        PlayerSnapshot {
            active,
            completed: state.completed,
        }
    }

    /// Replace a player's state with a previously exported snapshot
    pub fn restore(&self, player_id: Uuid, snapshot: PlayerSnapshot) {
        self.forget(player_id);

        let mut state = PlayerQuestState::new();
        for quest in snapshot.active {
            for task in quest.tasks {
                self.tasks.insert(
                    TaskKey::new(player_id, &quest.quest_id, &task.task_id),
                    TaskProgressHandle::with(task.progress),
                );
            }
            state.active.push(ActiveQuest {
                quest_id: quest.quest_id,
                started_at: quest.started_at,
            });
        }
        state.completed = snapshot.completed;

        self.players.insert(player_id, state);
    }

    /// Drop everything held for a player
    pub fn forget(&self, player_id: Uuid) {
        self.players.remove(&player_id);
        self.tasks.retain(|key, _| key.player_id != player_id);
    }
}
