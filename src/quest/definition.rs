//! Quest Definition Structures
//!
//! These structures are deserialized from TOML quest files. Every key of a task
//! other than `id` and `type` belongs to the task's config map, which the task's
//! type validates before the task may run.

use std::collections::BTreeMap;

use serde::Deserialize;
use toml::Value;

/// A quest definition loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestFile {
    pub quest: RawQuest,
}

/// Raw quest data as it appears in TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuest {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Quest tasks, in declaration order
    #[serde(default)]
    pub tasks: Vec<RawTask>,
}

/// Raw task as it appears in TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RawTask {
    pub id: String,
    #[serde(rename = "type")]
    pub task_type: String,
    /// Everything else is handed to the task type
    #[serde(flatten)]
    pub config: BTreeMap<String, Value>,
}

/// Flat key -> value config of a single task.
///
/// Values are only trusted after the task type's validators accepted them, so
/// the typed getters return `None` rather than failing on a mismatch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskConfig {
    values: BTreeMap<String, Value>,
}

impl TaskConfig {
    pub fn new(values: BTreeMap<String, Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(Value::as_integer)
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn boolean(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(Value::as_bool)
    }

    /// Boolean value, or `default` when absent
    pub fn boolean_or(&self, key: &str, default: bool) -> bool {
        self.boolean(key).unwrap_or(default)
    }

    /// String list value (e.g. `worlds = ["overworld"]`)
    pub fn string_list(&self, key: &str) -> Option<Vec<&str>> {
        self.values
            .get(key)?
            .as_array()?
            .iter()
            .map(Value::as_str)
            .collect()
    }
}

impl FromIterator<(String, Value)> for TaskConfig {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A loaded task whose config passed validation
#[derive(Debug, Clone)]
pub struct Task {
    pub id: String,
    /// Canonical name of the task type (aliases are resolved at load time)
    pub task_type: String,
    pub config: TaskConfig,
}

impl Task {
    /// Worlds this task is restricted to, if any
    pub fn worlds(&self) -> Option<Vec<&str>> {
        self.config.string_list("worlds")
    }
}

/// A fully resolved quest definition
#[derive(Debug, Clone)]
pub struct Quest {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Enabled tasks in declaration order
    pub tasks: Vec<Task>,
    /// Tasks removed because their config was rejected
    pub disabled_tasks: Vec<String>,
}

impl Quest {
    /// Get task by ID
    pub fn get_task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }
}
