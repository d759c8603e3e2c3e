pub mod app;
pub mod config;
pub mod error;
pub mod services;
pub mod startup;
pub mod util;

pub use app::{AppConfig, AppState};
pub use config::{Settings, SettingsUpdate, TOKEN_ENV, resolve_token};
pub use error::{ApiError, AppError, Result};
pub use services::{
    AnalyticsService, AppServices, DEFAULT_REQUESTS_LIMIT, MAX_REQUESTS_LIMIT, RequestsQuery,
    SettingsService, SettingsSnapshot,
};
pub use startup::{AppPaths, SETTINGS_FILE_NAME, ensure_app_data_dir};
pub use util::time::parse_rfc3339_utc;
