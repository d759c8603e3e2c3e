use serde::Serialize;
use usage_core::Plan;

use crate::config::{Settings, SettingsUpdate};
use crate::error::Result;
use crate::services::SharedConfig;

/// Settings as shown to clients. The stored token itself never leaves the service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSnapshot {
    pub has_token: bool,
    pub plan: Plan,
    pub refresh_interval_secs: u64,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl From<&Settings> for SettingsSnapshot {
    fn from(settings: &Settings) -> Self {
        Self {
            has_token: settings.has_token(),
            plan: settings.plan,
            refresh_interval_secs: settings.refresh_interval_secs,
            base_url: settings.base_url.clone(),
            timeout_secs: settings.timeout_secs,
        }
    }
}

#[derive(Clone)]
pub struct SettingsService {
    config: SharedConfig,
}

impl SettingsService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    pub fn load(&self) -> Result<Settings> {
        let path = &self.config.settings_path;
        if !path.exists() {
            return Ok(Settings::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        let path = &self.config.settings_path;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(settings)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn get(&self) -> Result<SettingsSnapshot> {
        Ok(SettingsSnapshot::from(&self.load()?))
    }

    pub fn update(&self, update: SettingsUpdate) -> Result<SettingsSnapshot> {
        let mut settings = self.load()?;
        settings.apply(update)?;
        self.save(&settings)?;
        tracing::info!(plan = %settings.plan, has_token = settings.has_token(), "settings updated");
        Ok(SettingsSnapshot::from(&settings))
    }
}
