//! Storage configuration
//!
//! Loaded from `config.toml` in the platform config directory. Every field
//! has a default, so a missing file or a partial one is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const CONFIG_FILE: &str = "config.toml";
const DEFAULT_DATABASE_FILE: &str = "noticeboard.db";
const DEFAULT_WRITE_TIMEOUT_MS: u64 = 5000;

/// Platform directories for the application
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "onyx", "noticeboard")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the durable database
    pub data_dir: Option<PathBuf>,
    /// Directory holding session-scoped files
    pub session_dir: Option<PathBuf>,
    /// Database file name inside `data_dir`
    pub database_file: String,
    /// Enable the durable tier
    pub durable: bool,
    /// Enable the session tier
    pub session: bool,
    /// Deadline for a single collection write
    pub write_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            session_dir: None,
            database_file: DEFAULT_DATABASE_FILE.to_string(),
            durable: true,
            session: true,
            write_timeout_ms: DEFAULT_WRITE_TIMEOUT_MS,
        }
    }
}

impl StorageConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load from a file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load `config.toml` from the platform config directory
    pub fn load_default() -> Result<Self> {
        match project_dirs() {
            Some(dirs) => Self::load(&dirs.config_dir().join(CONFIG_FILE)),
            None => Ok(Self::default()),
        }
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn resolved_data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let dirs = project_dirs().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine data directory",
            ))
        })?;
        Ok(dirs.data_dir().to_path_buf())
    }

    /// Session files go to the runtime dir when the platform has one,
    /// otherwise to the OS temp dir
    pub fn resolved_session_dir(&self) -> PathBuf {
        if let Some(dir) = &self.session_dir {
            return dir.clone();
        }
        project_dirs()
            .and_then(|dirs| dirs.runtime_dir().map(|d| d.join("session")))
            .unwrap_or_else(|| std::env::temp_dir().join("noticeboard-session"))
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        Ok(self.resolved_data_dir()?.join(&self.database_file))
    }
}
