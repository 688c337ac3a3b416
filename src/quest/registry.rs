//! Quest Registry
//!
//! Loads, validates and caches quest definitions from TOML files.
//! Supports hot-reloading during development.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::definition::{Quest, RawQuest, RawQuestFile, Task, TaskConfig};
use crate::error::{ConfigProblem, LoadError};
use crate::tasktype::{ConfigValidator, StringListValue, TaskTypeRegistry};

/// A task removed from its quest because its config was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisabledTask {
    pub quest_id: String,
    pub task_id: String,
    pub problems: Vec<ConfigProblem>,
}

/// A quest file that could not be loaded at all
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Operator-facing summary of the last load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// IDs of the loaded quests, sorted
    pub loaded: Vec<String>,
    pub disabled_tasks: Vec<DisabledTask>,
    pub rejected_files: Vec<RejectedFile>,
}

impl LoadReport {
    pub fn has_problems(&self) -> bool {
        !self.disabled_tasks.is_empty() || !self.rejected_files.is_empty()
    }
}

/// Registry for all quest definitions
pub struct QuestRegistry {
    /// Loaded quest definitions
    quests: RwLock<HashMap<String, Arc<Quest>>>,
    /// Task types used to validate task configs
    task_types: Arc<TaskTypeRegistry>,
    /// Directory quest files are read from
    quests_dir: Option<PathBuf>,
    last_report: RwLock<LoadReport>,
}

impl QuestRegistry {
    pub fn new(data_dir: &Path, task_types: Arc<TaskTypeRegistry>) -> Self {
        Self {
            quests: RwLock::new(HashMap::new()),
            task_types,
            quests_dir: Some(data_dir.join("quests")),
            last_report: RwLock::new(LoadReport::default()),
        }
    }

    /// Registry over already-built quests, with no backing directory
    pub fn from_quests(quests: Vec<Quest>) -> Self {
        let quests = quests
            .into_iter()
            .map(|q| (q.id.clone(), Arc::new(q)))
            .collect();

        Self {
            quests: RwLock::new(quests),
            task_types: Arc::new(TaskTypeRegistry::new()),
            quests_dir: None,
            last_report: RwLock::new(LoadReport::default()),
        }
    }

    /// Load all quest definitions, replacing the current set
    pub fn load_all(&self) -> Result<LoadReport, LoadError> {
        if !self.task_types.is_closed() {
            return Err(LoadError::RegistrationsOpen);
        }

        let mut report = LoadReport::default();
        let mut table: HashMap<String, Arc<Quest>> = HashMap::new();

        match &self.quests_dir {
            Some(dir) if dir.exists() => {
                info!("Loading quests from {:?}", dir);

                let mut paths = Vec::new();
                collect_toml_files(dir, &mut paths)?;
                paths.sort();

                for path in paths {
                    match self.load_quest_file(&path, &table) {
                        Ok((quest, disabled)) => {
                            report.disabled_tasks.extend(disabled);
                            table.insert(quest.id.clone(), Arc::new(quest));
                        }
                        Err(e) => {
                            warn!("Failed to load quest {:?}: {}", path, e);
                            report.rejected_files.push(RejectedFile {
                                path,
                                reason: e.to_string(),
                            });
                        }
                    }
                }
            }
            Some(dir) => warn!("Quest directory does not exist: {:?}", dir),
            None => {
                // Nothing to read; keep the quests we were built with
                let quests = self.quests.read();
                report.loaded = sorted_ids(&quests);
                return Ok(report);
            }
        }

        report.loaded = sorted_ids(&table);
        info!("Loaded {} quest definitions", table.len());
        for disabled in &report.disabled_tasks {
            for problem in &disabled.problems {
                warn!(
                    "Task '{}' of quest '{}' disabled: {}",
                    disabled.task_id, disabled.quest_id, problem
                );
            }
        }

        *self.quests.write() = table;
        *self.last_report.write() = report.clone();
        Ok(report)
    }

    /// Reload every quest (for hot-reload)
    pub fn reload(&self) -> Result<LoadReport, LoadError> {
        self.load_all()
    }

    /// Load a single quest file
    fn load_quest_file(
        &self,
        path: &Path,
        loaded: &HashMap<String, Arc<Quest>>,
    ) -> Result<(Quest, Vec<DisabledTask>), LoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let raw: RawQuestFile = toml::from_str(&content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if loaded.contains_key(&raw.quest.id) {
            return Err(LoadError::DuplicateQuest {
                quest_id: raw.quest.id,
                path: path.to_path_buf(),
            });
        }

        self.build_quest(raw.quest)
    }

    /// Validate every task and build the quest from what survives
    pub fn build_quest(&self, raw: RawQuest) -> Result<(Quest, Vec<DisabledTask>), LoadError> {
        if raw.tasks.is_empty() {
            return Err(LoadError::NoTasks(raw.id));
        }

        let worlds = StringListValue::new("worlds");
        let mut tasks = Vec::new();
        let mut disabled = Vec::new();
        let mut seen_ids = HashSet::new();

        for raw_task in raw.tasks {
            // Progress is keyed by task id, so only the first task may own it
            if !seen_ids.insert(raw_task.id.clone()) {
                disabled.push(DisabledTask {
                    quest_id: raw.id.clone(),
                    task_id: raw_task.id.clone(),
                    problems: vec![ConfigProblem::DuplicateTask(raw_task.id)],
                });
                continue;
            }

            let config = TaskConfig::new(raw_task.config);

            let (task_type, problems) = match self.task_types.get(&raw_task.task_type) {
                Some(task_type) => {
                    let mut problems = task_type.validate_config(&config);
                    problems.extend(worlds.validate(&config).err());
                    (Some(task_type.name().to_string()), problems)
                }
                None => (None, vec![ConfigProblem::UnknownTaskType(raw_task.task_type.clone())]),
            };

            match task_type {
                Some(task_type) if problems.is_empty() => tasks.push(Task {
                    id: raw_task.id,
                    task_type,
                    config,
                }),
                _ => disabled.push(DisabledTask {
                    quest_id: raw.id.clone(),
                    task_id: raw_task.id,
                    problems,
                }),
            }
        }

        if tasks.is_empty() {
            warn!("Quest '{}' has no enabled tasks and can never complete", raw.id);
        }

        let quest = Quest {
            name: raw.name.unwrap_or_else(|| raw.id.clone()),
            id: raw.id,
            description: raw.description,
            tasks,
            disabled_tasks: disabled.iter().map(|d| d.task_id.clone()).collect(),
        };

        Ok((quest, disabled))
    }

    /// Get a quest by ID
    pub fn get(&self, quest_id: &str) -> Option<Arc<Quest>> {
        self.quests.read().get(quest_id).cloned()
    }

    /// Get all quest IDs, sorted
    pub fn all_ids(&self) -> Vec<String> {
        sorted_ids(&self.quests.read())
    }

    /// Get count of loaded quests
    pub fn count(&self) -> usize {
        self.quests.read().len()
    }

    /// Summary of the most recent load
    pub fn last_report(&self) -> LoadReport {
        self.last_report.read().clone()
    }

    /// Start file watcher for hot-reload.
    /// Returns a channel receiver that signals when reloads occur.
    pub fn start_watcher(self: &Arc<Self>) -> Result<mpsc::Receiver<HotReloadEvent>, notify::Error> {
        use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
        use std::time::Duration;

        let Some(quests_dir) = self.quests_dir.clone() else {
            return Err(notify::Error::generic("quest registry has no backing directory"));
        };

        let (tx, rx) = mpsc::channel(32);
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| {
                if let Ok(event) = res {
                    let _ = notify_tx.send(event);
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(1)),
        )?;
        watcher.watch(&quests_dir, RecursiveMode::Recursive)?;

        info!("Quest hot-reload watcher started for {:?}", quests_dir);

        let registry = Arc::clone(self);
        std::thread::spawn(move || {
            // Keep the watcher alive for as long as this thread runs
            let _watcher = watcher;

            while let Ok(event) = notify_rx.recv() {
                if !matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                ) {
                    continue;
                }

                let Some(path) = event
                    .paths
                    .iter()
                    .find(|p| p.extension().is_some_and(|ext| ext == "toml"))
                else {
                    continue;
                };

                info!("Detected change in {:?}, triggering reload", path);
                let message = match registry.reload() {
                    Ok(report) => {
                        info!("Hot-reload completed successfully");
                        HotReloadEvent::Reloaded(report)
                    }
                    Err(e) => {
                        error!("Hot-reload failed: {}", e);
                        HotReloadEvent::Error(e.to_string())
                    }
                };

                if tx.blocking_send(message).is_err() {
                    // Receiver dropped, stop watching
                    break;
                }
            }
        });

        Ok(rx)
    }
}

/// Events from the hot-reload watcher
#[derive(Debug, Clone)]
pub enum HotReloadEvent {
    /// Quests were reloaded
    Reloaded(LoadReport),
    /// An error occurred during reload
    Error(String),
}

/// Recursively collect quest files from a directory
fn collect_toml_files(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<(), LoadError> {
    let io_err = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };

    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();

        if path.is_dir() {
            collect_toml_files(&path, paths)?;
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            paths.push(path);
        }
    }

    Ok(())
}

fn sorted_ids(quests: &HashMap<String, Arc<Quest>>) -> Vec<String> {
    let mut ids: Vec<String> = quests.keys().cloned().collect();
    ids.sort();
    ids
}
