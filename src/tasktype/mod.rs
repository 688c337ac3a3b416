//! Task Types
//!
//! A task type is a pluggable kind of objective ("walking", ...). It names
//! itself, declares the config keys it understands and reacts to host events by
//! advancing the applicable tasks of tracked players.

pub mod mode;
pub mod validator;
pub mod walking;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::engine::TaskContext;
use crate::error::{ConfigProblem, RegistrationError};
use crate::events::HostEvent;
use crate::quest::definition::TaskConfig;

pub use mode::{MovementMode, mode_matches};
pub use validator::{
    AcceptedValues, BooleanValue, ConfigValidator, IntegerValue, RequiredKey, StringListValue,
    run_validators,
};
pub use walking::WalkingTaskType;

/// Attribution shown for the built-in task types
pub const TASK_ATTRIBUTION: &str = "quest-tracker built-in";

/// A kind of task, registered by name
pub trait TaskType: Send + Sync {
    /// Canonical name used in quest files
    fn name(&self) -> &str;

    fn author(&self) -> &str {
        TASK_ATTRIBUTION
    }

    fn description(&self) -> &str;

    /// Alternative names accepted in quest files
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// Validators for this type's config keys, in the order they run
    fn config_validators(&self) -> &[Box<dyn ConfigValidator>];

    fn validate_config(&self, config: &TaskConfig) -> Vec<ConfigProblem> {
        run_validators(self.config_validators(), config)
    }

    /// React to a host event. Must not block.
    fn handle_event(&self, event: &HostEvent, ctx: &TaskContext<'_>);
}

/// Lookup of task types by name or alias
#[derive(Default)]
pub struct TaskTypeRegistry {
    types: Vec<Arc<dyn TaskType>>,
    /// lowercase name or alias -> index into `types`
    names: HashMap<String, usize>,
    closed: bool,
}

impl TaskTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in task type
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        // A fresh registry is open and empty, so this cannot collide
        let _ = registry.register(WalkingTaskType::new());
        registry
    }

    /// Register a task type. Fails once registrations are closed or when the
    /// name or an alias is taken.
    pub fn register<T: TaskType + 'static>(&mut self, task_type: T) -> Result<(), RegistrationError> {
        let name = task_type.name().to_string();
        if self.closed {
            return Err(RegistrationError::Closed(name));
        }

        let keys: Vec<String> = std::iter::once(task_type.name())
            .chain(task_type.aliases().iter().copied())
            .map(str::to_lowercase)
            .collect();
        if let Some(taken) = keys.iter().find(|k| self.names.contains_key(*k)) {
            return Err(RegistrationError::Duplicate(taken.clone()));
        }

        let index = self.types.len();
        self.types.push(Arc::new(task_type));
        for key in keys {
            self.names.insert(key, index);
        }

        info!("Registered task type: {}", name);
        Ok(())
    }

    /// Stop accepting registrations (called before quests are loaded)
    pub fn close_registrations(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Find a task type by name or alias, ignoring case
    pub fn get(&self, name: &str) -> Option<&Arc<dyn TaskType>> {
        self.names
            .get(&name.to_lowercase())
            .and_then(|&i| self.types.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn TaskType>> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
