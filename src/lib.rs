//! Quest task-progress tracking.
//!
//! Hosts feed movement observations into a [`QuestEngine`], which hands them
//! to every registered [`TaskType`]. Task types resolve the player's
//! applicable tasks, filter them by their own config and advance progress.

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod notifier;
pub mod platform;
pub mod player;
pub mod quest;
pub mod tasktype;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod testing;

pub use config::TrackerConfig;
pub use engine::{EngineBuilder, QuestEngine, TaskContext};
pub use error::{ConfigProblem, LoadError, QuestError, QuestResult, RegistrationError, SnapshotError};
pub use events::{ActorKind, ActorState, HostEvent, Location, VehicleKind};
pub use notifier::{LogNotifier, ProgressNotifier};
pub use platform::{LegacyHandler, ModernHandler, PlatformVersion, VersionSpecificHandler};
pub use player::{PlayerTracker, TrackedPlayer};
pub use tasktype::{TaskType, TaskTypeRegistry, WalkingTaskType};
pub use telemetry::{DebugEntry, DebugSink, Telemetry, TracingDebugSink};
