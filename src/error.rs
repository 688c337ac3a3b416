//! Error types shared across the tracker.

use std::path::PathBuf;
use thiserror::Error;

/// A problem found while validating a task's config at load time.
///
/// Problems never surface during gameplay: the offending task is disabled and
/// the problem is listed in the load report instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigProblem {
    /// A required key was not declared
    #[error("required key '{key}' is missing")]
    MissingKey { key: String },
    /// Value is present but not an integer
    #[error("expected an integer for '{key}', found {found}")]
    NotInteger { key: String, found: String },
    /// Value is present but not a boolean
    #[error("expected a boolean for '{key}', found {found}")]
    NotBoolean { key: String, found: String },
    /// Value is not one of the accepted values
    #[error("'{value}' is not an accepted value for '{key}' (accepted: {accepted})")]
    NotAccepted {
        key: String,
        value: String,
        accepted: String,
    },
    /// Value is present but not a list of strings
    #[error("expected a list of strings for '{key}', found {found}")]
    NotStringList { key: String, found: String },
    /// No task type is registered under this name
    #[error("unknown task type '{0}'")]
    UnknownTaskType(String),
    /// Another task of the same quest already uses this id
    #[error("task id '{0}' is already used in this quest")]
    DuplicateTask(String),
}

impl ConfigProblem {
    /// The config key this problem refers to, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            ConfigProblem::MissingKey { key }
            | ConfigProblem::NotInteger { key, .. }
            | ConfigProblem::NotBoolean { key, .. }
            | ConfigProblem::NotAccepted { key, .. }
            | ConfigProblem::NotStringList { key, .. } => Some(key),
            ConfigProblem::UnknownTaskType(_) | ConfigProblem::DuplicateTask(_) => None,
        }
    }
}

/// Errors raised while loading quest definitions or tracker config.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("quest '{quest_id}' in {path:?} is already defined")]
    DuplicateQuest { quest_id: String, path: PathBuf },
    #[error("quest '{0}' declares no tasks")]
    NoTasks(String),
    #[error("task type registrations are still open")]
    RegistrationsOpen,
}

/// Errors for player quest lifecycle operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QuestError {
    /// Quest not found
    #[error("quest not found: {0}")]
    NotFound(String),
    /// Quest already active
    #[error("quest already active: {0}")]
    AlreadyActive(String),
    /// Quest already completed
    #[error("quest already completed: {0}")]
    AlreadyCompleted(String),
    /// Quest not active
    #[error("quest not active: {0}")]
    NotActive(String),
}

/// Result type for quest operations.
pub type QuestResult<T> = Result<T, QuestError>;

/// Errors raised when registering task types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("task type '{0}' is already registered")]
    Duplicate(String),
    #[error("task type registrations are closed, '{0}' was rejected")]
    Closed(String),
}

/// Errors raised when converting progress snapshots.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("invalid progress snapshot: {0}")]
    Json(#[from] serde_json::Error),
}
