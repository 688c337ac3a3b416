//! Recording collaborators for tests.

use parking_lot::Mutex;

use crate::notifier::ProgressNotifier;
use crate::player::TrackedPlayer;
use crate::quest::definition::{Quest, Task};
use crate::quest::state::TaskProgress;
use crate::telemetry::{DebugEntry, DebugSink};

/// Keeps every debug message in arrival order
#[derive(Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl DebugSink for RecordingSink {
    fn record(&self, entry: &DebugEntry<'_>) {
        self.messages.lock().push(entry.message.to_string());
    }
}

/// Keeps every progress and quest completion notification
#[derive(Default)]
pub struct RecordingNotifier {
    progress: Mutex<Vec<(String, String, TaskProgress)>>,
    completed: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    /// (quest id, task id, progress) per notification
    pub fn progress_events(&self) -> Vec<(String, String, TaskProgress)> {
        self.progress.lock().clone()
    }

    pub fn completed_quests(&self) -> Vec<String> {
        self.completed.lock().clone()
    }
}

impl ProgressNotifier for RecordingNotifier {
    fn task_progressed(&self, _player: &TrackedPlayer, quest: &Quest, task: &Task, progress: TaskProgress) {
        self.progress
            .lock()
            .push((quest.id.clone(), task.id.clone(), progress));
    }

    fn quest_completed(&self, _player: &TrackedPlayer, quest: &Quest) {
        self.completed.lock().push(quest.id.clone());
    }
}
