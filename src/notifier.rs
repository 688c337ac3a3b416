//! Progress notifications sent to the host's UI layer.

use tracing::info;

use crate::player::TrackedPlayer;
use crate::quest::definition::{Quest, Task};
use crate::quest::state::TaskProgress;

/// Receiver of progress updates
pub trait ProgressNotifier: Send + Sync {
    /// Called for every applicable task an observation advanced, completed or not
    fn task_progressed(&self, player: &TrackedPlayer, quest: &Quest, task: &Task, progress: TaskProgress);

    /// Called once when the last task of a quest completes
    fn quest_completed(&self, _player: &TrackedPlayer, _quest: &Quest) {}
}

/// Writes progress to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl ProgressNotifier for LogNotifier {
    fn task_progressed(&self, player: &TrackedPlayer, quest: &Quest, task: &Task, progress: TaskProgress) {
        if progress.completed {
            info!(
                "Player {} completed task {} for quest {}",
                player.name, task.id, quest.id
            );
        }
    }

    fn quest_completed(&self, player: &TrackedPlayer, quest: &Quest) {
        info!("Player {} completed quest {} ({})", player.name, quest.id, quest.name);
    }
}
