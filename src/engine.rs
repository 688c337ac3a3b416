//! Quest Engine
//!
//! Wires the registries, progress store and host collaborators together and
//! dispatches host events to every registered task type. Dispatch is
//! synchronous: each event is fully processed before `dispatch` returns.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, trace};
use uuid::Uuid;

use crate::config::TrackerConfig;
use crate::error::{LoadError, QuestError, QuestResult};
use crate::events::HostEvent;
use crate::notifier::{LogNotifier, ProgressNotifier};
use crate::platform::{ModernHandler, VersionSpecificHandler};
use crate::player::{PlayerTracker, TrackedPlayer};
use crate::quest::registry::{LoadReport, QuestRegistry};
use crate::quest::resolver::{ApplicableTaskResolver, ConstraintSet, PendingTask};
use crate::quest::state::{Advance, PlayerSnapshot};
use crate::quest::store::ProgressStore;
use crate::tasktype::TaskTypeRegistry;
use crate::telemetry::{DebugEntry, DebugSink, Telemetry, TracingDebugSink};

/// Everything a task type may use while handling one event
pub struct TaskContext<'a> {
    pub quests: &'a QuestRegistry,
    pub progress: &'a ProgressStore,
    pub players: &'a PlayerTracker,
    pub platform: &'a dyn VersionSpecificHandler,
    pub notifier: &'a dyn ProgressNotifier,
    pub telemetry: &'a Telemetry,
}

impl TaskContext<'_> {
    /// Tasks of `task_type` the player may advance right now
    pub fn applicable_tasks(
        &self,
        player: &TrackedPlayer,
        task_type: &str,
        constraints: ConstraintSet,
    ) -> Vec<PendingTask> {
        ApplicableTaskResolver::new(self.quests, self.progress).resolve(player, task_type, constraints)
    }

    /// Record a task debug line
    pub fn debug(&self, task_type: &str, message: &str, quest_id: &str, task_id: &str, player_id: Uuid) {
        self.telemetry.record(&DebugEntry {
            task_type,
            message,
            quest_id,
            task_id,
            player_id,
        });
    }

    /// Add one to a pending task, completing it once `threshold` is reached,
    /// and notify the host. Completes the quest when this was its last task.
    pub fn advance(
        &self,
        task_type: &str,
        player: &TrackedPlayer,
        pending: &PendingTask,
        threshold: i64,
    ) -> Advance {
        let quest = &pending.quest;
        let task = pending.task();
        let step = pending.progress.advance(threshold);

        if step.incremented {
            self.debug(
                task_type,
                &format!("Incrementing task progress (now {})", step.progress.progress),
                &quest.id,
                &task.id,
                player.id,
            );
        } else {
            self.debug(
                task_type,
                "Task was completed by a concurrent observation, not incrementing",
                &quest.id,
                &task.id,
                player.id,
            );
        }

        if step.newly_completed {
            self.debug(task_type, "Marking task as complete", &quest.id, &task.id, player.id);
        }

        self.notifier.task_progressed(player, quest, task, step.progress);

        if step.newly_completed
            && self.progress.all_tasks_completed(player.id, quest)
            && self.progress.complete_quest(player.id, &quest.id)
        {
            info!("Player {} completed quest {}", player.name, quest.id);
            self.notifier.quest_completed(player, quest);
        }

        step
    }
}

/// The task-progress tracking engine
pub struct QuestEngine {
    task_types: Arc<TaskTypeRegistry>,
    quests: Arc<QuestRegistry>,
    progress: Arc<ProgressStore>,
    players: Arc<PlayerTracker>,
    platform: Box<dyn VersionSpecificHandler>,
    notifier: Arc<dyn ProgressNotifier>,
    telemetry: Telemetry,
}

impl QuestEngine {
    pub fn builder(data_dir: impl Into<PathBuf>) -> EngineBuilder {
        EngineBuilder::new(data_dir)
    }

    /// Load (or reload) quest definitions from disk
    pub fn load_quests(&self) -> Result<LoadReport, LoadError> {
        self.quests.load_all()
    }

    /// Deliver one host event to every task type
    pub fn dispatch(&self, event: &HostEvent) {
        trace!("Dispatching {} to {} task types", event.event_type(), self.task_types.len());
        let ctx = self.context();
        for task_type in self.task_types.iter() {
            task_type.handle_event(event, &ctx);
        }
    }

    fn context(&self) -> TaskContext<'_> {
        TaskContext {
            quests: &self.quests,
            progress: &self.progress,
            players: &self.players,
            platform: self.platform.as_ref(),
            notifier: self.notifier.as_ref(),
            telemetry: &self.telemetry,
        }
    }

    /// Start tracking a connected player, restoring saved progress if given
    pub fn player_joined(&self, player: TrackedPlayer, saved: Option<PlayerSnapshot>) {
        if let Some(snapshot) = saved {
            self.progress.restore(player.id, snapshot);
        }
        self.players.track(player);
    }

    /// Stop tracking a player and hand back their progress for saving
    pub fn player_left(&self, player_id: Uuid) -> PlayerSnapshot {
        self.players.untrack(player_id);
        let snapshot = self.progress.snapshot(player_id);
        self.progress.forget(player_id);
        debug!("Player {} left, {} active quests saved", player_id, snapshot.active.len());
        snapshot
    }

    pub fn start_quest(&self, player_id: Uuid, quest_id: &str) -> QuestResult<()> {
        let quest = self
            .quests
            .get(quest_id)
            .ok_or_else(|| QuestError::NotFound(quest_id.to_string()))?;
        self.progress.start_quest(player_id, &quest)
    }

    pub fn cancel_quest(&self, player_id: Uuid, quest_id: &str) -> QuestResult<()> {
        self.progress.cancel_quest(player_id, quest_id)
    }

    pub fn task_types(&self) -> &Arc<TaskTypeRegistry> {
        &self.task_types
    }

    pub fn quests(&self) -> &Arc<QuestRegistry> {
        &self.quests
    }

    pub fn progress(&self) -> &Arc<ProgressStore> {
        &self.progress
    }

    pub fn players(&self) -> &Arc<PlayerTracker> {
        &self.players
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn platform_name(&self) -> &'static str {
        self.platform.name()
    }
}

/// Builder for [`QuestEngine`]
pub struct EngineBuilder {
    data_dir: PathBuf,
    task_types: TaskTypeRegistry,
    platform: Box<dyn VersionSpecificHandler>,
    notifier: Arc<dyn ProgressNotifier>,
    debug_sink: Arc<dyn DebugSink>,
    debug_tasks: bool,
}

impl EngineBuilder {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            task_types: TaskTypeRegistry::with_builtin(),
            platform: Box::new(ModernHandler),
            notifier: Arc::new(LogNotifier),
            debug_sink: Arc::new(TracingDebugSink),
            debug_tasks: true,
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(config.data_dir.clone())
            .platform(config.platform.handler())
            .debug_tasks(config.debug_tasks)
    }

    /// Replace the task types (the built-in ones are registered by default)
    pub fn task_types(mut self, task_types: TaskTypeRegistry) -> Self {
        self.task_types = task_types;
        self
    }

    pub fn platform(mut self, platform: Box<dyn VersionSpecificHandler>) -> Self {
        self.platform = platform;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn ProgressNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn debug_sink(mut self, sink: Arc<dyn DebugSink>) -> Self {
        self.debug_sink = sink;
        self
    }

    pub fn debug_tasks(mut self, enabled: bool) -> Self {
        self.debug_tasks = enabled;
        self
    }

    /// Close task type registrations and build the engine. Quests still need
    /// to be loaded with [`QuestEngine::load_quests`].
    pub fn build(mut self) -> QuestEngine {
        self.task_types.close_registrations();
        let task_types = Arc::new(self.task_types);

        QuestEngine {
            quests: Arc::new(QuestRegistry::new(&self.data_dir, Arc::clone(&task_types))),
            task_types,
            progress: Arc::new(ProgressStore::new()),
            players: Arc::new(PlayerTracker::new()),
            platform: self.platform,
            notifier: self.notifier,
            telemetry: Telemetry::new(self.debug_sink, self.debug_tasks),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ActorState, Location, VehicleKind};
    use crate::platform::LegacyHandler;
    use crate::testing::{RecordingNotifier, RecordingSink};
    use std::thread;
    use tempfile::TempDir;

    struct Harness {
        _dir: TempDir,
        engine: QuestEngine,
        notifier: Arc<RecordingNotifier>,
        sink: Arc<RecordingSink>,
    }

    fn harness(quests: &[(&str, &str)]) -> Harness {
        harness_with(quests, |b| b)
    }

    fn harness_with(quests: &[(&str, &str)], configure: impl FnOnce(EngineBuilder) -> EngineBuilder) -> Harness {
        let dir = TempDir::new().unwrap();
        let quest_dir = dir.path().join("quests");
        std::fs::create_dir_all(&quest_dir).unwrap();
        for (name, content) in quests {
            std::fs::write(quest_dir.join(format!("{name}.toml")), content).unwrap();
        }

        let notifier = Arc::new(RecordingNotifier::default());
        let sink = Arc::new(RecordingSink::default());
        let engine = configure(
            QuestEngine::builder(dir.path())
                .notifier(notifier.clone())
                .debug_sink(sink.clone()),
        )
        .build();
        engine.load_quests().unwrap();

        Harness {
            _dir: dir,
            engine,
            notifier,
            sink,
        }
    }

    fn quest(id: &str, tasks: &str) -> String {
        format!("[quest]\nid = \"{id}\"\n\n{tasks}")
    }

    fn join(engine: &QuestEngine, quests: &[&str]) -> Uuid {
        let id = Uuid::new_v4();
        engine.player_joined(TrackedPlayer::new(id, "steve", "overworld"), None);
        for quest_id in quests {
            engine.start_quest(id, quest_id).unwrap();
        }
        id
    }

    /// Moves one cell east per step
    fn walk(actor: ActorState, step: i32) -> HostEvent {
        let x = f64::from(step);
        HostEvent::PlayerMove {
            actor,
            from: Location::new(x + 0.5, 64.0, 0.5),
            to: Location::new(x + 1.5, 64.0, 0.5),
        }
    }

    fn ride(vehicle: VehicleKind, passengers: Vec<ActorState>) -> HostEvent {
        HostEvent::VehicleMove {
            vehicle,
            from: Location::new(0.5, 64.0, 0.5),
            to: Location::new(0.5, 64.0, 1.5),
            passengers,
        }
    }

    fn progress(h: &Harness, player: Uuid, quest: &str, task: &str) -> u32 {
        h.engine
            .progress()
            .progress(player, quest, task)
            .map(|p| p.progress)
            .unwrap_or(0)
    }

    const BASIC: &str = r#"
[[quest.tasks]]
id = "walk"
type = "walking"
distance = 5
"#;

    #[test]
    fn test_each_move_adds_one() {
        let h = harness(&[("basic", &quest("basic", BASIC))]);
        let player = join(&h.engine, &["basic"]);

        for step in 0..3 {
            h.engine.dispatch(&walk(ActorState::player(player), step));
            assert_eq!(progress(&h, player, "basic", "walk"), step as u32 + 1);
        }
        assert_eq!(h.notifier.progress_events().len(), 3);
    }

    #[test]
    fn test_completes_exactly_at_distance() {
        let h = harness(&[("basic", &quest("basic", BASIC))]);
        let player = join(&h.engine, &["basic"]);

        for step in 0..4 {
            h.engine.dispatch(&walk(ActorState::player(player), step));
        }
        let record = h.engine.progress().progress(player, "basic", "walk").unwrap();
        assert!(!record.completed);

        h.engine.dispatch(&walk(ActorState::player(player), 4));
        let (_, _, record) = h.notifier.progress_events().pop().unwrap();
        assert_eq!(record.progress, 5);
        assert!(record.completed);

        // The only task is done, so the quest is done and its records are released
        assert_eq!(h.notifier.completed_quests(), vec!["basic"]);
        assert!(h.engine.progress().has_completed(player, "basic"));
        assert_eq!(h.engine.progress().progress(player, "basic", "walk"), None);

        for step in 5..8 {
            h.engine.dispatch(&walk(ActorState::player(player), step));
        }
        assert_eq!(h.notifier.progress_events().len(), 5);
        assert_eq!(h.notifier.completed_quests().len(), 1);
    }

    #[test]
    fn test_task_stays_completed_while_quest_active() {
        let tasks = r#"
[[quest.tasks]]
id = "walk"
type = "walking"
distance = 2

[[quest.tasks]]
id = "swim"
type = "walking"
distance = 100
mode = "swimming"
"#;
        let h = harness(&[("long", &quest("long", tasks))]);
        let player = join(&h.engine, &["long"]);

        for step in 0..6 {
            h.engine.dispatch(&walk(ActorState::player(player), step));
        }

        let record = h.engine.progress().progress(player, "long", "walk").unwrap();
        assert_eq!(record.progress, 2);
        assert!(record.completed);
        assert!(h.engine.progress().is_quest_active(player, "long"));
        assert!(h.notifier.completed_quests().is_empty());
    }

    #[test]
    fn test_vertical_only_move_ignored() {
        let h = harness(&[("basic", &quest("basic", BASIC))]);
        let player = join(&h.engine, &["basic"]);

        h.engine.dispatch(&HostEvent::PlayerMove {
            actor: ActorState::player(player),
            from: Location::new(3.2, 64.0, 7.9),
            to: Location::new(3.8, 65.3, 7.1),
        });
        h.engine.dispatch(&HostEvent::VehicleMove {
            vehicle: VehicleKind::Minecart,
            from: Location::new(3.2, 64.0, 7.9),
            to: Location::new(3.2, 62.0, 7.9),
            passengers: vec![ActorState::player(player).riding(VehicleKind::Minecart)],
        });

        assert_eq!(progress(&h, player, "basic", "walk"), 0);
        assert!(h.notifier.progress_events().is_empty());
        assert!(h.sink.messages().is_empty());
    }

    #[test]
    fn test_vehicle_passengers_handled_independently() {
        let h = harness(&[("basic", &quest("basic", BASIC))]);
        let first = join(&h.engine, &["basic"]);
        let second = join(&h.engine, &["basic"]);
        let animal = Uuid::new_v4();

        h.engine.dispatch(&ride(
            VehicleKind::Boat,
            vec![
                ActorState::player(first).riding(VehicleKind::Boat),
                ActorState::entity(animal).riding(VehicleKind::Boat),
                ActorState::player(second).riding(VehicleKind::Boat),
            ],
        ));

        assert_eq!(progress(&h, first, "basic", "walk"), 1);
        assert_eq!(progress(&h, second, "basic", "walk"), 1);
        assert_eq!(h.notifier.progress_events().len(), 2);
    }

    #[test]
    fn test_ground_move_while_riding_ignored() {
        let h = harness(&[("basic", &quest("basic", BASIC))]);
        let player = join(&h.engine, &["basic"]);

        h.engine.dispatch(&walk(ActorState::player(player).riding(VehicleKind::Horse), 0));
        assert_eq!(progress(&h, player, "basic", "walk"), 0);
    }

    #[test]
    fn test_npc_and_untracked_actors_ignored() {
        let h = harness(&[("basic", &quest("basic", BASIC))]);
        let player = join(&h.engine, &["basic"]);

        h.engine.dispatch(&walk(ActorState::npc(player), 0));
        h.engine.dispatch(&walk(ActorState::player(Uuid::new_v4()), 0));
        assert_eq!(progress(&h, player, "basic", "walk"), 0);

        h.engine.player_left(player);
        h.engine.dispatch(&walk(ActorState::player(player), 0));
        assert!(h.notifier.progress_events().is_empty());
    }

    #[test]
    fn test_mode_mismatch_skips_only_that_task() {
        let tasks = r#"
[[quest.tasks]]
id = "sneak"
type = "walking"
distance = 10
mode = "sneaking"

[[quest.tasks]]
id = "run"
type = "walking"
distance = 10
mode = "running"
"#;
        let h = harness(&[("modes", &quest("modes", tasks))]);
        let player = join(&h.engine, &["modes"]);

        let runner = ActorState {
            sprinting: true,
            ..ActorState::player(player)
        };
        h.engine.dispatch(&walk(runner, 0));

        assert_eq!(progress(&h, player, "modes", "sneak"), 0);
        assert_eq!(progress(&h, player, "modes", "run"), 1);
        assert!(h
            .sink
            .messages()
            .contains(&"Player's mode does not match required mode, continuing...".to_string()));
    }

    #[test]
    fn test_passenger_takes_vehicle_from_event() {
        let tasks = r#"
[[quest.tasks]]
id = "sail"
type = "walking"
distance = 10
mode = "boat"

[[quest.tasks]]
id = "ride"
type = "walking"
distance = 10
mode = "horse"
"#;
        let h = harness(&[("sea", &quest("sea", tasks))]);
        let player = join(&h.engine, &["sea"]);

        // Host did not fill in the vehicle on the passenger snapshot
        h.engine.dispatch(&ride(VehicleKind::Boat, vec![ActorState::player(player)]));

        assert_eq!(progress(&h, player, "sea", "sail"), 1);
        assert_eq!(progress(&h, player, "sea", "ride"), 0);
    }

    #[test]
    fn test_riding_modes_count_as_passenger() {
        let tasks = r#"
[[quest.tasks]]
id = "pig"
type = "walking"
distance = 10
mode = "pig"

[[quest.tasks]]
id = "strider"
type = "walking"
distance = 10
mode = "strider"
"#;
        let h = harness_with(&[("rides", &quest("rides", tasks))], |b| {
            b.platform(Box::new(LegacyHandler))
        });
        let player = join(&h.engine, &["rides"]);

        h.engine.dispatch(&ride(VehicleKind::Pig, vec![ActorState::player(player).riding(VehicleKind::Pig)]));
        h.engine.dispatch(&ride(
            VehicleKind::Strider,
            vec![ActorState::player(player).riding(VehicleKind::Strider)],
        ));

        assert_eq!(progress(&h, player, "rides", "pig"), 1);
        // Striders don't exist on legacy platforms
        assert_eq!(progress(&h, player, "rides", "strider"), 0);
        assert_eq!(h.engine.platform_name(), "legacy");
    }

    #[test]
    fn test_force_ground_walking() {
        let tasks = r#"
[[quest.tasks]]
id = "grounded"
type = "walking"
distance = 10
force-ground-walking = true

[[quest.tasks]]
id = "anywhere"
type = "walking"
distance = 10
"#;
        let h = harness(&[("ground", &quest("ground", tasks))]);
        let player = join(&h.engine, &["ground"]);

        let airborne = ActorState {
            on_ground: false,
            ..ActorState::player(player)
        };
        h.engine.dispatch(&walk(airborne.clone(), 0));
        assert_eq!(progress(&h, player, "ground", "grounded"), 0);
        assert_eq!(progress(&h, player, "ground", "anywhere"), 1);

        // Passengers are never held to the ground check
        h.engine.dispatch(&ride(VehicleKind::Minecart, vec![airborne.riding(VehicleKind::Minecart)]));
        assert_eq!(progress(&h, player, "ground", "grounded"), 1);
        assert_eq!(progress(&h, player, "ground", "anywhere"), 2);
    }

    #[test]
    fn test_invalid_task_never_progresses() {
        let tasks = r#"
[[quest.tasks]]
id = "broken"
type = "walking"
distance = "ten"

[[quest.tasks]]
id = "fine"
type = "walking"
distance = 10
"#;
        let h = harness(&[("mixed", &quest("mixed", tasks))]);
        let player = join(&h.engine, &["mixed"]);

        for step in 0..3 {
            h.engine.dispatch(&walk(ActorState::player(player), step));
        }

        assert_eq!(h.engine.progress().progress(player, "mixed", "broken"), None);
        assert_eq!(progress(&h, player, "mixed", "fine"), 3);
        assert!(h.notifier.progress_events().iter().all(|(_, task, _)| task == "fine"));
        assert_eq!(h.engine.quests().last_report().disabled_tasks.len(), 1);
    }

    #[test]
    fn test_world_restricted_task() {
        let tasks = r#"
[[quest.tasks]]
id = "nether"
type = "walking"
distance = 10
worlds = ["nether"]
"#;
        let h = harness(&[("hot", &quest("hot", tasks))]);
        let player = join(&h.engine, &["hot"]);

        h.engine.dispatch(&walk(ActorState::player(player), 0));
        assert_eq!(progress(&h, player, "hot", "nether"), 0);

        h.engine.players().set_world(player, "nether");
        h.engine.dispatch(&walk(ActorState::player(player), 1));
        assert_eq!(progress(&h, player, "hot", "nether"), 1);
    }

    #[test]
    fn test_telemetry_trail() {
        let h = harness(&[("basic", &quest("basic", BASIC))]);
        let player = join(&h.engine, &["basic"]);

        h.engine.dispatch(&walk(ActorState::player(player), 0));
        assert_eq!(
            h.sink.messages(),
            vec!["Player moved", "Incrementing task progress (now 1)"]
        );

        h.engine.telemetry().set_enabled(false);
        h.engine.dispatch(&walk(ActorState::player(player), 1));
        assert_eq!(h.sink.messages().len(), 2);
    }

    #[test]
    fn test_leave_and_rejoin_keeps_progress() {
        let h = harness(&[("basic", &quest("basic", BASIC))]);
        let player = join(&h.engine, &["basic"]);

        for step in 0..2 {
            h.engine.dispatch(&walk(ActorState::player(player), step));
        }
        let saved = h.engine.player_left(player);
        assert!(h.engine.progress().active_quests(player).is_empty());

        let json = saved.to_json().unwrap();
        h.engine.player_joined(
            TrackedPlayer::new(player, "steve", "overworld"),
            Some(PlayerSnapshot::from_json(&json).unwrap()),
        );
        h.engine.dispatch(&walk(ActorState::player(player), 2));
        assert_eq!(progress(&h, player, "basic", "walk"), 3);
    }

    #[test]
    fn test_start_unknown_quest() {
        let h = harness(&[("basic", &quest("basic", BASIC))]);
        let player = join(&h.engine, &[]);
        assert_eq!(
            h.engine.start_quest(player, "missing"),
            Err(QuestError::NotFound("missing".to_string()))
        );
        h.engine.start_quest(player, "basic").unwrap();
        h.engine.cancel_quest(player, "basic").unwrap();
        assert!(!h.engine.progress().is_quest_active(player, "basic"));
    }

    #[test]
    fn test_concurrent_ground_and_vehicle_observations() {
        let tasks = r#"
[[quest.tasks]]
id = "walk"
type = "walking"
distance = 300
"#;
        let h = harness(&[("busy", &quest("busy", tasks))]);
        let player = join(&h.engine, &["busy"]);
        let engine = &h.engine;

        thread::scope(|scope| {
            scope.spawn(|| {
                for step in 0..200 {
                    engine.dispatch(&walk(ActorState::player(player), step));
                }
            });
            scope.spawn(|| {
                for _ in 0..200 {
                    engine.dispatch(&ride(
                        VehicleKind::Boat,
                        vec![ActorState::player(player).riding(VehicleKind::Boat)],
                    ));
                }
            });
        });

        let events = h.notifier.progress_events();
        assert!(events.iter().any(|(_, _, p)| p.completed));
        assert_eq!(events.iter().map(|(_, _, p)| p.progress).max(), Some(300));
        assert!(events.iter().all(|(_, _, p)| p.progress <= 300));
        assert_eq!(h.notifier.completed_quests(), vec!["busy"]);
    }
}
