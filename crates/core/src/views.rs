use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseVariantError;
use crate::analytics::{ModelMetrics, cents_to_dollars, percentage_of};
use crate::events::UsageEvent;

pub const DEFAULT_SHARE_TOP: usize = 8;
pub const DEFAULT_COST_LIMIT: usize = 10;
pub const OTHERS_LABEL: &str = "Others";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortDirection {
    type Err = ParseVariantError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(ParseVariantError::new("direction", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModelSortField {
    Model,
    Family,
    Calls,
    #[default]
    Tokens,
    RealApiCost,
    CursorCharges,
    YourCost,
    Savings,
    SavingsPercentage,
}

impl FromStr for ModelSortField {
    type Err = ParseVariantError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "model" => Ok(Self::Model),
            "family" => Ok(Self::Family),
            "calls" | "paidCalls" => Ok(Self::Calls),
            "tokens" => Ok(Self::Tokens),
            "realApiCost" => Ok(Self::RealApiCost),
            "cursorCharges" => Ok(Self::CursorCharges),
            "yourCost" => Ok(Self::YourCost),
            "savings" => Ok(Self::Savings),
            "savingsPercentage" => Ok(Self::SavingsPercentage),
            other => Err(ParseVariantError::new("sort field", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestSortField {
    #[default]
    Timestamp,
    Model,
    Kind,
    TotalTokens,
    Cost,
}

impl FromStr for RequestSortField {
    type Err = ParseVariantError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "timestamp" => Ok(Self::Timestamp),
            "model" => Ok(Self::Model),
            "kind" => Ok(Self::Kind),
            "totalTokens" => Ok(Self::TotalTokens),
            "cost" => Ok(Self::Cost),
            other => Err(ParseVariantError::new("sort field", other)),
        }
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

pub fn sort_models(models: &mut [ModelMetrics], field: ModelSortField, direction: SortDirection) {
    models.sort_by(|a, b| {
        let ordering = match field {
            ModelSortField::Model => compare_text(&a.model, &b.model),
            ModelSortField::Family => compare_text(a.family.label(), b.family.label()),
            ModelSortField::Calls => a.calls.cmp(&b.calls),
            ModelSortField::Tokens => a.tokens.cmp(&b.tokens),
            ModelSortField::RealApiCost => a.real_api_cost.total_cmp(&b.real_api_cost),
            ModelSortField::CursorCharges => a.cursor_charges.total_cmp(&b.cursor_charges),
            ModelSortField::YourCost => a.your_cost.total_cmp(&b.your_cost),
            ModelSortField::Savings => a.savings.total_cmp(&b.savings),
            ModelSortField::SavingsPercentage => {
                a.savings_percentage.total_cmp(&b.savings_percentage)
            }
        };
        direction.apply(ordering)
    });
}

/// Dollar cost shown per request: the real API cost when known, else the request fee.
pub fn request_cost(event: &UsageEvent) -> f64 {
    let cents = event.real_api_cost_cents();
    if cents > 0.0 {
        cents_to_dollars(cents)
    } else {
        cents_to_dollars(event.requests_costs)
    }
}

/// Sorts requests in place. Unparseable timestamps always sort last.
pub fn sort_requests(events: &mut [UsageEvent], field: RequestSortField, direction: SortDirection) {
    events.sort_by(|a, b| match field {
        RequestSortField::Timestamp => match (a.timestamp_ms(), b.timestamp_ms()) {
            (Some(a), Some(b)) => direction.apply(a.cmp(&b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        RequestSortField::Model => direction.apply(compare_text(&a.model, &b.model)),
        RequestSortField::Kind => direction.apply(compare_text(&a.kind, &b.kind)),
        RequestSortField::TotalTokens => direction.apply(a.total_tokens().cmp(&b.total_tokens())),
        RequestSortField::Cost => direction.apply(request_cost(a).total_cmp(&request_cost(b))),
    });
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelShare {
    pub name: String,
    pub tokens: u64,
    pub calls: u64,
    pub cost: f64,
    pub percentage: f64,
}

/// Token share of the `top` largest models, with the remainder folded into one row.
pub fn model_share(models: &[ModelMetrics], top: usize) -> Vec<ModelShare> {
    let mut ranked: Vec<&ModelMetrics> = models.iter().collect();
    ranked.sort_by(|a, b| b.tokens.cmp(&a.tokens));
    let total: u64 = ranked.iter().map(|model| model.tokens).sum();
    let split = top.min(ranked.len());
    let (head, tail) = ranked.split_at(split);

    let mut rows: Vec<ModelShare> = head
        .iter()
        .map(|model| ModelShare {
            name: model.model.clone(),
            tokens: model.tokens,
            calls: model.calls,
            cost: model.your_cost,
            percentage: percentage_of(model.tokens as f64, total as f64),
        })
        .collect();
    if !tail.is_empty() {
        let tokens: u64 = tail.iter().map(|model| model.tokens).sum();
        rows.push(ModelShare {
            name: OTHERS_LABEL.to_string(),
            tokens,
            calls: tail.iter().map(|model| model.calls).sum(),
            cost: tail.iter().map(|model| model.your_cost).sum(),
            percentage: percentage_of(tokens as f64, total as f64),
        });
    }
    rows
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelCostRow {
    pub model: String,
    pub your_cost: f64,
    pub real_api_cost: f64,
    pub savings: f64,
}

pub fn top_models_by_cost(models: &[ModelMetrics], limit: usize) -> Vec<ModelCostRow> {
    let mut ranked: Vec<&ModelMetrics> = models.iter().collect();
    ranked.sort_by(|a, b| b.your_cost.total_cmp(&a.your_cost));
    ranked
        .into_iter()
        .take(limit)
        .map(|model| ModelCostRow {
            model: model.model.clone(),
            your_cost: model.your_cost,
            real_api_cost: model.real_api_cost,
            savings: model.savings,
        })
        .collect()
}
