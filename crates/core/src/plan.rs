use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ParseVariantError;
use crate::analytics::{AnalyticsSummary, MS_PER_DAY, percentage_of, ratio};

/// Fallback when no billing anchor or spend rate is known.
pub const DEFAULT_CYCLE_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Plan {
    #[default]
    Pro,
    ProPlus,
    Ultra,
}

/// Monthly dollar amounts for a plan tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanLimits {
    pub paid: f64,
    pub included: f64,
}

impl Plan {
    pub fn limits(self) -> PlanLimits {
        match self {
            Self::Pro => PlanLimits {
                paid: 20.0,
                included: 20.0,
            },
            Self::ProPlus => PlanLimits {
                paid: 60.0,
                included: 70.0,
            },
            Self::Ultra => PlanLimits {
                paid: 200.0,
                included: 400.0,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pro => "pro",
            Self::ProPlus => "pro-plus",
            Self::Ultra => "ultra",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = ParseVariantError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pro" => Ok(Self::Pro),
            "pro-plus" | "pro_plus" | "proplus" => Ok(Self::ProPlus),
            "ultra" => Ok(Self::Ultra),
            _ => Err(ParseVariantError::new("plan", value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanUsage {
    pub plan: Plan,
    pub total_usage: f64,
    pub limit: f64,
    pub percentage: f64,
    pub remaining: f64,
    pub days_remaining: i64,
    pub days_until_limit: i64,
    pub daily_usage: f64,
}

/// Spend against the plan's included amount for the current billing cycle.
///
/// The cycle renews on the day of month of `range_start`.
pub fn plan_usage(
    summary: &AnalyticsSummary,
    plan: Plan,
    range_start: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> PlanUsage {
    let limits = plan.limits();
    let total_usage = summary.your_cost;
    let remaining = (limits.included - total_usage).max(0.0);
    let daily_usage = summary.daily_average;
    let days_remaining = range_start
        .and_then(|start| next_billing_date(start.day(), now))
        .map(|next| {
            let ms = (next - now).num_milliseconds().max(0);
            ms / MS_PER_DAY + i64::from(ms % MS_PER_DAY != 0)
        })
        .unwrap_or(DEFAULT_CYCLE_DAYS);
    let days_until_limit = if daily_usage > 0.0 {
        ratio(remaining, daily_usage).ceil() as i64
    } else {
        DEFAULT_CYCLE_DAYS
    };
    PlanUsage {
        plan,
        total_usage,
        limit: limits.included,
        percentage: percentage_of(total_usage, limits.included),
        remaining,
        days_remaining,
        days_until_limit,
        daily_usage,
    }
}

/// Midnight UTC on `billing_day` this month, or next month once that has passed.
fn next_billing_date(billing_day: u32, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let this_month = billing_date_in(now.year(), now.month(), billing_day)?;
    if now <= this_month {
        return Some(this_month);
    }
    let next = NaiveDate::from_ymd_opt(now.year(), now.month(), 1)? + Months::new(1);
    billing_date_in(next.year(), next.month(), billing_day)
}

fn billing_date_in(year: i32, month: u32, billing_day: u32) -> Option<DateTime<Utc>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last_day = (first + Months::new(1)).pred_opt()?.day();
    let date = NaiveDate::from_ymd_opt(year, month, billing_day.min(last_day))?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}
