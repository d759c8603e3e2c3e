use std::time::Duration;

use serde::{Deserialize, Serialize};
use usage_core::UsageEvent;

pub const DEFAULT_BASE_URL: &str = "https://cursor.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_PAGE_SIZE: u32 = 10_000;

/// Where and how the usage API is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Body of the filtered usage events endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageEventsResponse {
    /// Informational only; the list below is what gets aggregated.
    #[serde(default)]
    pub total_usage_events_count: Option<u64>,
    #[serde(default)]
    pub usage_events_display: Vec<UsageEvent>,
}

/// Errors emitted while talking to the usage API.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("usage API token is required")]
    MissingToken,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("usage API request failed: {status} {message}")]
    Api { status: u16, message: String },
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Upstream HTTP status, when the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|status| status.as_u16()),
            Self::MissingToken | Self::Decode(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
