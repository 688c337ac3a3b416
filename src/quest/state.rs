//! Quest State Tracking
//!
//! Per-player progress records and the serializable snapshot form handed to the
//! external player-data store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;

/// Progress on a single task for a single player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskProgress {
    pub progress: u32,
    pub completed: bool,
}

/// Outcome of one [`TaskProgress::advance`] step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advance {
    /// State after the step
    pub progress: TaskProgress,
    /// False when the task was already completed and nothing changed
    pub incremented: bool,
    /// True only on the step that crossed the threshold
    pub newly_completed: bool,
}

impl TaskProgress {
    /// Add one to the counter. Completed tasks are left untouched.
    pub fn increment(&mut self) -> u32 {
        if !self.completed {
            self.progress = self.progress.saturating_add(1);
        }
        self.progress
    }

    /// Mark as completed, returning true if this call changed the flag
    pub fn mark_completed(&mut self) -> bool {
        let newly = !self.completed;
        self.completed = true;
        newly
    }

    /// Increment and complete once `threshold` is reached
    pub fn advance(&mut self, threshold: i64) -> Advance {
        if self.completed {
            return Advance {
                progress: *self,
                incremented: false,
                newly_completed: false,
            };
        }

        let progress = self.increment();
        let newly_completed = i64::from(progress) >= threshold && self.mark_completed();

        Advance {
            progress: *self,
            incremented: true,
            newly_completed,
        }
    }
}

/// A quest the player is currently pursuing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveQuest {
    pub quest_id: String,
    pub started_at: DateTime<Utc>,
}

/// A quest the player has finished
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedQuest {
    pub quest_id: String,
    pub completed_at: DateTime<Utc>,
}

/// Quest lifecycle state for a single player
#[derive(Debug, Clone, Default)]
pub struct PlayerQuestState {
    /// Active quests, in the order they were started
    pub active: Vec<ActiveQuest>,
    pub completed: Vec<CompletedQuest>,
}

impl PlayerQuestState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, quest_id: &str) -> bool {
        self.active.iter().any(|q| q.quest_id == quest_id)
    }

    pub fn is_completed(&self, quest_id: &str) -> bool {
        self.completed.iter().any(|q| q.quest_id == quest_id)
    }

    /// Move a quest from active to completed. Returns false if it was not active.
    pub fn complete(&mut self, quest_id: &str) -> bool {
        let Some(index) = self.active.iter().position(|q| q.quest_id == quest_id) else {
            return false;
        };
        self.active.remove(index);
        self.completed.push(CompletedQuest {
            quest_id: quest_id.to_string(),
            completed_at: Utc::now(),
        });
        true
    }
}

/// Task progress entry inside a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub task_id: String,
    #[serde(flatten)]
    pub progress: TaskProgress,
}

/// Snapshot of one active quest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestSnapshot {
    pub quest_id: String,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub tasks: Vec<TaskSnapshot>,
}

/// Everything the tracker knows about one player's quests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    #[serde(default)]
    pub active: Vec<QuestSnapshot>,
    #[serde(default)]
    pub completed: Vec<CompletedQuest>,
}

impl PlayerSnapshot {
    /// Serialize for database storage
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}
