use std::path::PathBuf;

use crate::config::Settings;
use crate::error::Result;
use crate::services::AppServices;

/// Paths and files needed to run the usage dashboard backend.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub settings_path: PathBuf,
}

/// Application state shared by frontend backends (HTTP, CLI).
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub services: AppServices,
}

impl AppState {
    pub fn new(settings_path: PathBuf) -> Self {
        let config = AppConfig { settings_path };
        let services = AppServices::new(&config);
        Self { config, services }
    }

    pub fn is_fresh(&self) -> bool {
        !self.config.settings_path.exists()
    }

    /// Writes default settings on first run so users have a file to edit.
    pub fn initialize(&self) -> Result<()> {
        if self.is_fresh() {
            self.services.settings.save(&Settings::default())?;
            tracing::info!(path = %self.config.settings_path.display(), "wrote default settings");
        }
        Ok(())
    }
}
