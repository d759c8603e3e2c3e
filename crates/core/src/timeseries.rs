use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::ParseVariantError;
use crate::analytics::cents_to_dollars;
use crate::events::UsageEvent;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePeriod {
    Hourly,
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl TimePeriod {
    /// Bucket key for an instant. Keys sort lexicographically in time order.
    pub fn bucket_key(self, at: DateTime<Utc>) -> String {
        match self {
            Self::Hourly => at.format("%Y-%m-%d %H:00").to_string(),
            Self::Daily => at.format("%Y-%m-%d").to_string(),
            Self::Weekly => {
                let week = at.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Self::Monthly => at.format("%Y-%m").to_string(),
        }
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        };
        f.write_str(value)
    }
}

impl FromStr for TimePeriod {
    type Err = ParseVariantError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "hourly" | "hour" => Ok(Self::Hourly),
            "daily" | "day" => Ok(Self::Daily),
            "weekly" | "week" => Ok(Self::Weekly),
            "monthly" | "month" => Ok(Self::Monthly),
            other => Err(ParseVariantError::new("period", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageBucket {
    pub time: String,
    pub total_tokens: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub requests: u64,
    pub cursor_charges: f64,
}

#[derive(Default)]
struct BucketTally {
    total_tokens: u64,
    input_tokens: u64,
    output_tokens: u64,
    requests: u64,
    charged_cents: f64,
}

/// Token usage over time, one bucket per period key in ascending order.
///
/// Events without token usage or without a valid timestamp are left out.
pub fn bucket_token_usage(events: &[UsageEvent], period: TimePeriod) -> Vec<UsageBucket> {
    let mut buckets: BTreeMap<String, BucketTally> = BTreeMap::new();
    for event in events {
        let Some(usage) = event.token_usage.as_ref() else {
            continue;
        };
        let Some(at) = event.occurred_at() else {
            continue;
        };
        let tally = buckets.entry(period.bucket_key(at)).or_default();
        tally.total_tokens = tally.total_tokens.saturating_add(usage.total_tokens());
        tally.input_tokens = tally.input_tokens.saturating_add(usage.input_tokens);
        tally.output_tokens = tally.output_tokens.saturating_add(usage.output_tokens);
        tally.requests += 1;
        tally.charged_cents += event.charged_cents();
    }
    buckets
        .into_iter()
        .map(|(time, tally)| UsageBucket {
            time,
            total_tokens: tally.total_tokens,
            input_tokens: tally.input_tokens,
            output_tokens: tally.output_tokens,
            requests: tally.requests,
            cursor_charges: cents_to_dollars(tally.charged_cents),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TokenUsage;

    fn event(ts: &str, input: u64, output: u64, cache: u64) -> UsageEvent {
        UsageEvent {
            timestamp: ts.to_string(),
            model: "claude-4-sonnet".to_string(),
            token_usage: Some(TokenUsage {
                input_tokens: input,
                output_tokens: output,
                cache_read_tokens: cache,
                ..TokenUsage::default()
            }),
            requests_costs: 4.0,
            ..UsageEvent::default()
        }
    }

    #[test]
    fn daily_buckets_are_sorted_and_summed() {
        // 2025-01-02T10:00Z, 2025-01-01T23:30Z, 2025-01-01T01:00Z
        let events = vec![
            event("1735812000000", 5, 5, 0),
            event("1735774200000", 10, 1, 100),
            event("1735693200000", 1, 1, 0),
        ];
        let buckets = bucket_token_usage(&events, TimePeriod::Daily);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].time, "2025-01-01");
        assert_eq!(buckets[0].total_tokens, 113);
        assert_eq!(buckets[0].input_tokens, 11);
        assert_eq!(buckets[0].requests, 2);
        assert!((buckets[0].cursor_charges - 0.08).abs() < 1e-9);
        assert_eq!(buckets[1].time, "2025-01-02");
        assert_eq!(buckets[1].total_tokens, 10);
    }

    #[test]
    fn skips_events_without_usage_or_time() {
        let mut no_usage = event("1735693200000", 1, 1, 0);
        no_usage.token_usage = None;
        let events = vec![no_usage, event("soon", 1, 1, 0)];
        assert!(bucket_token_usage(&events, TimePeriod::Hourly).is_empty());
    }

    #[test]
    fn period_keys() {
        let at = DateTime::from_timestamp_millis(1_735_693_200_000).expect("instant");
        assert_eq!(TimePeriod::Hourly.bucket_key(at), "2025-01-01 01:00");
        assert_eq!(TimePeriod::Daily.bucket_key(at), "2025-01-01");
        assert_eq!(TimePeriod::Weekly.bucket_key(at), "2025-W01");
        assert_eq!(TimePeriod::Monthly.bucket_key(at), "2025-01");
    }

    #[test]
    fn parses_period_names() {
        assert_eq!("weekly".parse::<TimePeriod>(), Ok(TimePeriod::Weekly));
        assert_eq!("day".parse::<TimePeriod>(), Ok(TimePeriod::Daily));
        assert!("yearly".parse::<TimePeriod>().is_err());
    }
}
