//! Platform storage locations
//!
//! Session-scoped data prefers the platform runtime directory (wiped at
//! logout on Linux) and falls back to the OS temp directory elsewhere.
//! This module reports where each tier ends up.

use std::path::Path;

use noticeboard_core::config::project_dirs;
use noticeboard_core::StorageConfig;

/// Where session-scoped files live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionScope {
    /// Set explicitly in the config file
    Configured,
    /// Platform runtime directory
    Runtime,
    /// OS temp directory
    Temp,
}

impl SessionScope {
    /// Detect the scope the given config resolves to
    pub fn detect(config: &StorageConfig) -> Self {
        if config.session_dir.is_some() {
            return SessionScope::Configured;
        }

        let has_runtime_dir = project_dirs()
            .map(|dirs| dirs.runtime_dir().is_some())
            .unwrap_or(false);

        if has_runtime_dir {
            SessionScope::Runtime
        } else {
            SessionScope::Temp
        }
    }
}

impl std::fmt::Display for SessionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionScope::Configured => write!(f, "Configured"),
            SessionScope::Runtime => write!(f, "Runtime"),
            SessionScope::Temp => write!(f, "Temp"),
        }
    }
}

/// Log storage locations at startup
pub fn log_platform_info(config: &StorageConfig, data_dir: &Path) {
    tracing::info!(
        data_dir = %data_dir.display(),
        durable = config.durable,
        session = config.session,
        "Storage locations"
    );

    if config.session {
        let scope = SessionScope::detect(config);
        tracing::info!(
            scope = %scope,
            dir = %config.resolved_session_dir().display(),
            "Session storage"
        );
    }

    if let Some(dirs) = project_dirs() {
        tracing::debug!(config_dir = %dirs.config_dir().display(), "Config directory");
    }
}
