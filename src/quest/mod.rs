//! Quest Module
//!
//! Quest definitions loaded from TOML, per-player progress and the resolver
//! that decides which tasks an observation may advance.

pub mod definition;
pub mod registry;
pub mod resolver;
pub mod state;
pub mod store;

pub use definition::{Quest, Task, TaskConfig};
pub use registry::{DisabledTask, HotReloadEvent, LoadReport, QuestRegistry, RejectedFile};
pub use resolver::{ApplicableTaskResolver, ConstraintSet, PendingTask};
pub use state::{Advance, PlayerQuestState, PlayerSnapshot, TaskProgress};
pub use store::{ProgressStore, TaskKey, TaskProgressHandle};
