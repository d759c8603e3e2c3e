mod analytics;
mod classify;
mod de;
mod events;
mod format;
mod plan;
mod timeseries;
mod views;

pub use analytics::{
    ANOMALY_TOKEN_THRESHOLD, AnalyticsSummary, DateRange, MS_PER_DAY, ModelMetrics,
    PROJECTION_DAYS, UsageAnalyticsBundle, aggregate_by_model, aggregate_summary,
    build_analytics, build_analytics_at, cents_to_dollars, date_range, days_spanned,
    percentage_of, ratio, to_iso,
};
pub use classify::{ModelBadge, ModelFamily, classify_badges, classify_family};
pub use events::{TokenUsage, UsageEvent};
pub use format::{format_currency, format_number, format_percentage};
pub use plan::{DEFAULT_CYCLE_DAYS, Plan, PlanLimits, PlanUsage, plan_usage};
pub use timeseries::{TimePeriod, UsageBucket, bucket_token_usage};
pub use views::{
    DEFAULT_COST_LIMIT, DEFAULT_SHARE_TOP, ModelCostRow, ModelShare, ModelSortField,
    OTHERS_LABEL, RequestSortField, SortDirection, model_share, request_cost, sort_models,
    sort_requests, top_models_by_cost,
};

/// Returned when a request names a period, plan or sort field that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported {kind} {value}")]
pub struct ParseVariantError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseVariantError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
