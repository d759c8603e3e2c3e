mod analytics;
mod settings;

use std::sync::Arc;

use crate::app::AppConfig;

pub use analytics::{AnalyticsService, DEFAULT_REQUESTS_LIMIT, MAX_REQUESTS_LIMIT, RequestsQuery};
pub use settings::{SettingsService, SettingsSnapshot};

type SharedConfig = Arc<AppConfig>;

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub analytics: AnalyticsService,
    pub settings: SettingsService,
}

impl AppServices {
    pub fn new(config: &AppConfig) -> Self {
        let shared = Arc::new(config.clone());
        let settings = SettingsService::new(shared);
        Self {
            analytics: AnalyticsService::new(settings.clone()),
            settings,
        }
    }
}
