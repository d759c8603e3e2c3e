use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use usage_client::UsageClient;
use usage_core::{
    AnalyticsSummary, DEFAULT_COST_LIMIT, DEFAULT_SHARE_TOP, ModelCostRow, ModelMetrics,
    ModelShare, ModelSortField, Plan, PlanUsage, RequestSortField, SortDirection, TimePeriod,
    UsageAnalyticsBundle, UsageBucket, UsageEvent, aggregate_by_model, aggregate_summary,
    build_analytics, bucket_token_usage, model_share, plan_usage, sort_models, sort_requests,
    top_models_by_cost,
};

use crate::config::{TOKEN_ENV, resolve_token};
use crate::error::{AppError, Result};
use crate::services::SettingsService;
use crate::util::time::parse_rfc3339_utc;

pub const DEFAULT_REQUESTS_LIMIT: usize = 200;
pub const MAX_REQUESTS_LIMIT: usize = 1000;

/// Sorting and paging for the raw request list.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RequestsQuery {
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Fetches usage events and runs them through the aggregation engine.
///
/// Nothing is cached: every call asks the upstream API again.
#[derive(Clone)]
pub struct AnalyticsService {
    settings: SettingsService,
}

impl AnalyticsService {
    pub(super) fn new(settings: SettingsService) -> Self {
        Self { settings }
    }

    pub async fn load_events(&self, token: Option<&str>) -> Result<Vec<UsageEvent>> {
        let settings = self.settings.load()?;
        let token = resolve_token(token, &settings, std::env::var(TOKEN_ENV).ok())?;
        let client = UsageClient::new(token, settings.client_config())?;
        let started = Instant::now();
        let events = client.fetch_all_usage_events().await?;
        tracing::info!(
            events = events.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fetched usage events"
        );
        if events.is_empty() {
            return Err(AppError::NotFound("No usage events found".to_string()));
        }
        Ok(events)
    }

    pub async fn usage(&self, token: Option<&str>) -> Result<UsageAnalyticsBundle> {
        let events = self.load_events(token).await?;
        Ok(self.analyze(events))
    }

    /// Runs the engine over caller-supplied events without touching the network.
    pub fn analyze(&self, events: Vec<UsageEvent>) -> UsageAnalyticsBundle {
        let started = Instant::now();
        let count = events.len();
        let bundle = build_analytics(events);
        tracing::debug!(
            events = count,
            models = bundle.models.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "aggregated usage"
        );
        bundle
    }

    pub async fn summary(&self, token: Option<&str>) -> Result<AnalyticsSummary> {
        let events = self.load_events(token).await?;
        Ok(aggregate_summary(&events))
    }

    pub async fn models(
        &self,
        token: Option<&str>,
        sort: Option<&str>,
        direction: Option<&str>,
    ) -> Result<Vec<ModelMetrics>> {
        let field = parse_or_default::<ModelSortField>(sort)?;
        let direction = parse_or_default::<SortDirection>(direction)?;
        let events = self.load_events(token).await?;
        let mut models = aggregate_by_model(&events);
        sort_models(&mut models, field, direction);
        Ok(models)
    }

    pub async fn requests(
        &self,
        token: Option<&str>,
        query: &RequestsQuery,
    ) -> Result<Vec<UsageEvent>> {
        let field = parse_or_default::<RequestSortField>(query.sort.as_deref())?;
        let direction = parse_or_default::<SortDirection>(query.direction.as_deref())?;
        let limit = query
            .limit
            .unwrap_or(DEFAULT_REQUESTS_LIMIT)
            .min(MAX_REQUESTS_LIMIT);
        let offset = query.offset.unwrap_or(0);
        let mut events = self.load_events(token).await?;
        sort_requests(&mut events, field, direction);
        Ok(events.into_iter().skip(offset).take(limit).collect())
    }

    pub async fn timeseries(
        &self,
        token: Option<&str>,
        period: Option<&str>,
    ) -> Result<Vec<UsageBucket>> {
        let period = parse_or_default::<TimePeriod>(period)?;
        let events = self.load_events(token).await?;
        Ok(bucket_token_usage(&events, period))
    }

    pub async fn model_share(
        &self,
        token: Option<&str>,
        top: Option<usize>,
    ) -> Result<Vec<ModelShare>> {
        let events = self.load_events(token).await?;
        let models = aggregate_by_model(&events);
        Ok(model_share(&models, top.unwrap_or(DEFAULT_SHARE_TOP)))
    }

    pub async fn cost_breakdown(
        &self,
        token: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<ModelCostRow>> {
        let events = self.load_events(token).await?;
        let models = aggregate_by_model(&events);
        Ok(top_models_by_cost(&models, limit.unwrap_or(DEFAULT_COST_LIMIT)))
    }

    /// Plan defaults to the stored one. The billing cycle is anchored on
    /// `billing_start` when given, otherwise on the earliest event.
    pub async fn plan_usage(
        &self,
        token: Option<&str>,
        plan: Option<&str>,
        billing_start: Option<&str>,
    ) -> Result<PlanUsage> {
        let plan = self.resolve_plan(plan)?;
        let billing_start = billing_start.map(parse_rfc3339_utc).transpose()?;
        let events = self.load_events(token).await?;
        Ok(usage_against_plan(&events, plan, billing_start))
    }

    /// Same as [`AnalyticsService::plan_usage`] over events already in hand.
    pub fn plan_usage_for(
        &self,
        events: &[UsageEvent],
        plan: Option<&str>,
        billing_start: Option<&str>,
    ) -> Result<PlanUsage> {
        let plan = self.resolve_plan(plan)?;
        let billing_start = billing_start.map(parse_rfc3339_utc).transpose()?;
        Ok(usage_against_plan(events, plan, billing_start))
    }

    fn resolve_plan(&self, plan: Option<&str>) -> Result<Plan> {
        match plan.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => Ok(name.parse::<Plan>()?),
            None => Ok(self.settings.load()?.plan),
        }
    }
}

fn usage_against_plan(
    events: &[UsageEvent],
    plan: Plan,
    billing_start: Option<DateTime<Utc>>,
) -> PlanUsage {
    let summary = aggregate_summary(events);
    let range_start = billing_start.or_else(|| earliest_event(events));
    plan_usage(&summary, plan, range_start, Utc::now())
}

fn earliest_event(events: &[UsageEvent]) -> Option<DateTime<Utc>> {
    events.iter().filter_map(UsageEvent::occurred_at).min()
}

fn parse_or_default<T>(value: Option<&str>) -> Result<T>
where
    T: std::str::FromStr + Default,
    AppError: From<T::Err>,
{
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => Ok(value.parse::<T>()?),
        None => Ok(T::default()),
    }
}
