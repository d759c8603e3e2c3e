use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::de::{lenient_f64, lenient_string, lenient_u64};

/// Token counts and direct-provider cost attached to a single call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub input_tokens: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub output_tokens: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub cache_read_tokens: u64,
    /// Carried for detail views only; never part of any total.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub cache_write_tokens: u64,
    /// Fractional cents are common and kept as sent.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_cents: f64,
}

impl TokenUsage {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens
            .saturating_add(self.output_tokens)
            .saturating_add(self.cache_read_tokens)
    }

    /// Input plus output, the figure the anomaly rule looks at.
    pub fn prompt_tokens(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// One usage record as returned by the dashboard API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageEvent {
    /// Milliseconds since the epoch, kept in its transport form.
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub model: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cursor_token_fee: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub requests_costs: f64,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub usage_based_costs: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_token_based_call: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub owning_user: String,
}

impl UsageEvent {
    /// Timestamp in epoch milliseconds, or `None` when the field is not an integer.
    pub fn timestamp_ms(&self) -> Option<i64> {
        self.timestamp.trim().parse::<i64>().ok()
    }

    /// Timestamp as an instant; out-of-range values count as missing.
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp_ms().and_then(DateTime::from_timestamp_millis)
    }

    pub fn total_tokens(&self) -> u64 {
        self.token_usage
            .as_ref()
            .map(TokenUsage::total_tokens)
            .unwrap_or(0)
    }

    pub fn prompt_tokens(&self) -> u64 {
        self.token_usage
            .as_ref()
            .map(TokenUsage::prompt_tokens)
            .unwrap_or(0)
    }

    /// What the model provider would have billed directly, in cents.
    pub fn real_api_cost_cents(&self) -> f64 {
        self.token_usage
            .as_ref()
            .map(|usage| usage.total_cents)
            .unwrap_or(0.0)
    }

    /// What the intermediary actually charged, in cents.
    pub fn charged_cents(&self) -> f64 {
        self.cursor_token_fee + self.requests_costs
    }
}
