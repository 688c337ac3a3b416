//! Tracker configuration, read from `tracker.toml`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::error::LoadError;
use crate::platform::PlatformVersion;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    /// Quests are read from `<data_dir>/quests`
    pub data_dir: PathBuf,
    /// Which version-specific handler answers platform queries
    pub platform: PlatformVersion,
    /// Emit per-task debug telemetry
    pub debug_tasks: bool,
    /// Reload quests when their files change
    pub watch: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            platform: PlatformVersion::Modern,
            debug_tasks: true,
            watch: false,
        }
    }
}

impl TrackerConfig {
    /// Load from a file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            info!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
