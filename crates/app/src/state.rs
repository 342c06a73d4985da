//! Application state management

use std::path::PathBuf;

use noticeboard_core::{JsonStorage, Result, SiteData, StorageBackend, StorageConfig};

/// Main application state
pub struct AppState {
    config: StorageConfig,
    data_dir: PathBuf,
    site: SiteData,
}

impl AppState {
    /// Load `config.toml` and boot the site data
    pub async fn new() -> Result<Self> {
        let config = StorageConfig::load_default()?;
        Self::with_config(config).await
    }

    pub async fn with_config(config: StorageConfig) -> Result<Self> {
        let data_dir = config.resolved_data_dir()?;

        // Ensure data directory exists
        std::fs::create_dir_all(&data_dir)?;

        crate::platform::log_platform_info(&config, &data_dir);

        let storage = JsonStorage::new(StorageBackend::open(&config));
        let site = SiteData::initialize(storage, config.write_timeout()).await;

        Ok(Self {
            config,
            data_dir,
            site,
        })
    }

    pub fn site(&self) -> &SiteData {
        &self.site
    }

    /// Log what the site currently holds
    pub fn log_summary(&self) {
        let site = self.site();
        let status = site.status();
        let tier = site
            .storage()
            .backend()
            .active_tier()
            .map(|kind| kind.to_string())
            .unwrap_or_else(|| "none".to_string());

        tracing::info!(
            status = ?status,
            tier = %tier,
            announcements = site.announcements.len(),
            events = site.events.len(),
            images = site.gallery.len(),
            write_timeout_ms = self.config.write_timeout_ms,
            "Site data summary"
        );

        if let Some(message) = status.error() {
            tracing::warn!(error = message, "Site started with errors");
        }
    }

    /// Write an export snapshot to `<data_dir>/exports`
    pub fn write_export(&self) -> Result<PathBuf> {
        let snapshot = self.site.export();
        let dir = self.data_dir.join("exports");
        std::fs::create_dir_all(&dir)?;

        let path = dir.join(snapshot.file_name());
        std::fs::write(&path, snapshot.to_json_pretty()?)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noticeboard_core::{BootStatus, TierKind};
    use std::path::Path;
    use tempfile::tempdir;

    fn test_config(dir: &Path) -> StorageConfig {
        StorageConfig {
            data_dir: Some(dir.join("data")),
            session_dir: Some(dir.join("session")),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_boot_and_export() {
        let dir = tempdir().unwrap();
        let state = AppState::with_config(test_config(dir.path())).await.unwrap();

        assert_eq!(state.site().status(), BootStatus::Ready);
        assert_eq!(
            state.site().storage().backend().active_tier(),
            Some(TierKind::Durable)
        );

        let path = state.write_export().unwrap();
        assert!(path.starts_with(dir.path().join("data").join("exports")));

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["announcements"].as_array().unwrap().len(), 3);
        assert!(written["exportDate"].is_string());
    }

    #[tokio::test]
    async fn test_data_survives_restart() {
        let dir = tempdir().unwrap();

        {
            let state = AppState::with_config(test_config(dir.path())).await.unwrap();
            state.site().gallery.clear_all().await.unwrap();
        }

        let state = AppState::with_config(test_config(dir.path())).await.unwrap();
        assert!(state.site().gallery.is_empty());
        assert_eq!(state.site().announcements.len(), 3);
    }
}
