use std::time::Duration;

use serde::{Deserialize, Serialize};
use usage_client::ClientConfig;
use usage_core::Plan;

use crate::error::{AppError, Result};

pub const TOKEN_ENV: &str = "CURSOR_API_TOKEN";
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 300;
const MIN_REFRESH_INTERVAL_SECS: u64 = 30;

/// User settings persisted between runs.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub plan: Plan,
    pub refresh_interval_secs: u64,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let client = ClientConfig::default();
        Self {
            token: None,
            plan: Plan::default(),
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            base_url: client.base_url,
            timeout_secs: client.timeout.as_secs(),
        }
    }
}

impl Settings {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
            ..ClientConfig::default()
        }
    }

    pub fn has_token(&self) -> bool {
        self.token
            .as_deref()
            .is_some_and(|token| !token.trim().is_empty())
    }

    pub fn apply(&mut self, update: SettingsUpdate) -> Result<()> {
        if let Some(token) = update.token {
            let token = token.trim();
            self.token = (!token.is_empty()).then(|| token.to_string());
        }
        if let Some(plan) = update.plan {
            self.plan = plan.parse()?;
        }
        if let Some(secs) = update.refresh_interval_secs {
            if secs < MIN_REFRESH_INTERVAL_SECS {
                return Err(AppError::InvalidInput(format!(
                    "refresh interval must be at least {} seconds",
                    MIN_REFRESH_INTERVAL_SECS
                )));
            }
            self.refresh_interval_secs = secs;
        }
        if let Some(base_url) = update.base_url {
            let base_url = base_url.trim().trim_end_matches('/');
            if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
                return Err(AppError::InvalidInput(format!(
                    "invalid base url {}",
                    base_url
                )));
            }
            self.base_url = base_url.to_string();
        }
        if let Some(secs) = update.timeout_secs {
            if secs == 0 {
                return Err(AppError::InvalidInput(
                    "timeout must be positive".to_string(),
                ));
            }
            self.timeout_secs = secs;
        }
        Ok(())
    }
}

/// Partial settings change. An empty token clears the stored one.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SettingsUpdate {
    pub token: Option<String>,
    pub plan: Option<String>,
    pub refresh_interval_secs: Option<u64>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Picks the credential: explicit first, then stored, then the environment.
pub fn resolve_token(
    explicit: Option<&str>,
    settings: &Settings,
    env_token: Option<String>,
) -> Result<String> {
    let candidates = [
        explicit.map(str::to_string),
        settings.token.clone(),
        env_token,
    ];
    candidates
        .into_iter()
        .flatten()
        .map(|token| token.trim().to_string())
        .find(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("API token not configured".to_string()))
}
