use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::{ModelBadge, ModelFamily, classify_badges, classify_family};
use crate::events::UsageEvent;

/// Calls whose input + output tokens exceed this count as anomalies.
pub const ANOMALY_TOKEN_THRESHOLD: u64 = 10_000;
pub const MS_PER_DAY: i64 = 86_400_000;
pub const PROJECTION_DAYS: f64 = 30.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetrics {
    pub model: String,
    pub family: ModelFamily,
    pub calls: u64,
    pub paid_calls: u64,
    pub free_calls: u64,
    pub tokens: u64,
    pub real_api_cost: f64,
    pub cursor_charges: f64,
    pub your_cost: f64,
    pub savings: f64,
    pub savings_percentage: f64,
    pub badges: Vec<ModelBadge>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_tokens: u64,
    pub total_calls: u64,
    pub real_api_cost: f64,
    pub cursor_charges: f64,
    pub your_cost: f64,
    pub savings: f64,
    pub savings_percentage: f64,
    pub daily_average: f64,
    pub projected_monthly: f64,
    /// Always zero: there is no historical baseline to compare against.
    pub trend: f64,
    pub anomalies: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageAnalyticsBundle {
    pub summary: AnalyticsSummary,
    pub models: Vec<ModelMetrics>,
    /// The input events, moved in unchanged.
    pub requests: Vec<UsageEvent>,
    pub last_updated: String,
    pub date_range: DateRange,
}

/// Running cent and token sums shared by both aggregators.
#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    calls: u64,
    tokens: u64,
    real_api_cents: f64,
    charged_cents: f64,
}

impl Tally {
    fn record(&mut self, event: &UsageEvent) {
        self.calls += 1;
        self.tokens = self.tokens.saturating_add(event.total_tokens());
        self.real_api_cents += event.real_api_cost_cents();
        self.charged_cents += event.charged_cents();
    }

    fn costs(&self) -> Costs {
        let real_api_cost = cents_to_dollars(self.real_api_cents);
        let cursor_charges = cents_to_dollars(self.charged_cents);
        let savings = real_api_cost - cursor_charges;
        Costs {
            real_api_cost,
            cursor_charges,
            your_cost: cursor_charges,
            savings,
            savings_percentage: percentage_of(savings, real_api_cost),
        }
    }
}

struct Costs {
    real_api_cost: f64,
    cursor_charges: f64,
    your_cost: f64,
    savings: f64,
    savings_percentage: f64,
}

pub fn cents_to_dollars(cents: f64) -> f64 {
    cents / 100.0
}

/// `part / whole * 100`, or zero whenever that would not be a finite number.
pub fn percentage_of(part: f64, whole: f64) -> f64 {
    ratio(part, whole) * 100.0
}

/// `numerator / denominator`, substituting zero for empty or non-finite ratios.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    let value = numerator / denominator;
    if value.is_finite() { value } else { 0.0 }
}

/// Whole days covered by `[min_ms, max_ms]`, never less than one.
pub fn days_spanned(min_ms: i64, max_ms: i64) -> i64 {
    let span = max_ms.saturating_sub(min_ms).max(0);
    let days = span / MS_PER_DAY + i64::from(span % MS_PER_DAY != 0);
    days.max(1)
}

/// Groups events by exact model string, largest token users first.
pub fn aggregate_by_model(events: &[UsageEvent]) -> Vec<ModelMetrics> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Tally)> = Vec::new();
    for event in events {
        let slot = *index.entry(event.model.as_str()).or_insert_with(|| {
            groups.push((event.model.as_str(), Tally::default()));
            groups.len() - 1
        });
        groups[slot].1.record(event);
    }

    let mut models: Vec<ModelMetrics> = groups
        .into_iter()
        .map(|(model, tally)| {
            let costs = tally.costs();
            ModelMetrics {
                model: model.to_string(),
                family: classify_family(model),
                calls: tally.calls,
                // Every call is billed; free-call detection does not exist yet.
                paid_calls: tally.calls,
                free_calls: 0,
                tokens: tally.tokens,
                real_api_cost: costs.real_api_cost,
                cursor_charges: costs.cursor_charges,
                your_cost: costs.your_cost,
                savings: costs.savings,
                savings_percentage: costs.savings_percentage,
                badges: classify_badges(model, tally.tokens, costs.real_api_cost),
            }
        })
        .collect();
    models.sort_by(|a, b| b.tokens.cmp(&a.tokens));
    models
}

/// Reduces every event into one account-wide summary.
pub fn aggregate_summary(events: &[UsageEvent]) -> AnalyticsSummary {
    let mut tally = Tally::default();
    let mut anomalies = 0u64;
    let mut bounds: Option<(i64, i64)> = None;
    for event in events {
        tally.record(event);
        if event.prompt_tokens() > ANOMALY_TOKEN_THRESHOLD {
            anomalies += 1;
        }
        if let Some(ts) = event.occurred_at().map(|at| at.timestamp_millis()) {
            bounds = Some(match bounds {
                Some((min, max)) => (min.min(ts), max.max(ts)),
                None => (ts, ts),
            });
        }
    }

    let costs = tally.costs();
    let days = match bounds {
        Some((min, max)) => days_spanned(min, max),
        None => 1,
    };
    let daily_average = ratio(costs.your_cost, days as f64);
    AnalyticsSummary {
        total_tokens: tally.tokens,
        total_calls: tally.calls,
        real_api_cost: costs.real_api_cost,
        cursor_charges: costs.cursor_charges,
        your_cost: costs.your_cost,
        savings: costs.savings,
        savings_percentage: costs.savings_percentage,
        daily_average,
        projected_monthly: daily_average * PROJECTION_DAYS,
        trend: 0.0,
        anomalies,
    }
}

/// Earliest and latest valid event instants; both collapse to `now` when there are none.
pub fn date_range(events: &[UsageEvent], now: DateTime<Utc>) -> DateRange {
    let mut instants = events.iter().filter_map(UsageEvent::occurred_at);
    let (start, end) = match instants.next() {
        Some(first) => instants.fold((first, first), |(min, max), at| (min.min(at), max.max(at))),
        None => (now, now),
    };
    DateRange {
        start: to_iso(start),
        end: to_iso(end),
    }
}

/// Runs both aggregators over `events` and stamps the result with the current time.
pub fn build_analytics(events: Vec<UsageEvent>) -> UsageAnalyticsBundle {
    build_analytics_at(events, Utc::now())
}

pub fn build_analytics_at(events: Vec<UsageEvent>, now: DateTime<Utc>) -> UsageAnalyticsBundle {
    let models = aggregate_by_model(&events);
    let summary = aggregate_summary(&events);
    let date_range = date_range(&events, now);
    UsageAnalyticsBundle {
        summary,
        models,
        requests: events,
        last_updated: to_iso(now),
        date_range,
    }
}

pub fn to_iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
