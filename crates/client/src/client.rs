use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, COOKIE, ORIGIN};
use serde_json::json;
use tracing::{debug, info, instrument};
use usage_core::UsageEvent;

use crate::types::{ClientConfig, ClientError, Result, UsageEventsResponse};

pub const USAGE_EVENTS_PATH: &str = "/api/dashboard/get-filtered-usage-events";
const DASHBOARD_ORIGIN: &str = "https://cursor.com";

/// Authenticated client for the dashboard usage endpoint.
#[derive(Debug, Clone)]
pub struct UsageClient {
    client: Client,
    token: String,
    config: ClientConfig,
}

impl UsageClient {
    pub fn new(token: impl Into<String>, config: ClientConfig) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ClientError::MissingToken);
        }
        let client = Client::builder()
            .user_agent(concat!("cursor-usage/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            token,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn session_cookie(&self) -> String {
        format!(
            "generaltranslation.locale-routing-enabled=true; NEXT_LOCALE=en-US; WorkosCursorSessionToken={}",
            urlencoding::encode(self.token.trim())
        )
    }

    /// Fetches one page of usage events starting at the epoch.
    #[instrument(skip(self), fields(base_url = %self.config.base_url))]
    pub async fn fetch_usage_events(&self) -> Result<UsageEventsResponse> {
        let url = format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            USAGE_EVENTS_PATH
        );
        debug!(url = %url, page_size = self.config.page_size, "requesting usage events");

        let response = self
            .client
            .post(&url)
            .header(COOKIE, self.session_cookie())
            .header(CONTENT_TYPE, "application/json")
            .header(ORIGIN, DASHBOARD_ORIGIN)
            .json(&json!({
                "pageSize": self.config.page_size,
                "startDate": 0,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let parsed: UsageEventsResponse = serde_json::from_str(&body)?;
        info!(
            events = parsed.usage_events_display.len(),
            reported_total = ?parsed.total_usage_events_count,
            "fetched usage events"
        );
        Ok(parsed)
    }

    pub async fn fetch_all_usage_events(&self) -> Result<Vec<UsageEvent>> {
        Ok(self.fetch_usage_events().await?.usage_events_display)
    }
}
