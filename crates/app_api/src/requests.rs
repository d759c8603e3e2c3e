use serde::Deserialize;
use usage_core::UsageEvent;

#[derive(Debug, Deserialize, Default)]
pub struct EmptyRequest {}

#[derive(Debug, Deserialize, Default)]
pub struct ModelsRequest {
    pub sort: Option<String>,
    pub direction: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RequestsRequest {
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
pub struct TimeseriesRequest {
    pub period: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ModelShareRequest {
    pub top: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CostBreakdownRequest {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlanUsageRequest {
    pub plan: Option<String>,
    pub billing_start: Option<String>,
}

/// Events supplied by the caller, e.g. an exported API response.
#[derive(Debug, Deserialize, Default)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub events: Vec<UsageEvent>,
}

/// The upstream base URL is not accepted here; it only changes through the
/// settings file or the CLI, so the stored token never leaves for another host.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPutRequest {
    pub token: Option<String>,
    pub plan: Option<String>,
    pub refresh_interval_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
}
