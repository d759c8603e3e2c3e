use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse vendor grouping shown next to each model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelFamily {
    #[serde(rename = "Claude")]
    Claude,
    #[serde(rename = "Cursor Models")]
    CursorModels,
    #[serde(rename = "Grok")]
    Grok,
    #[serde(rename = "GPT")]
    Gpt,
}

impl ModelFamily {
    pub fn label(self) -> &'static str {
        match self {
            Self::Claude => "Claude",
            Self::CursorModels => "Cursor Models",
            Self::Grok => "Grok",
            Self::Gpt => "GPT",
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Descriptive tag attached to aggregated model metrics.
///
/// `Max` and `High` are part of the vocabulary but no rule produces them yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ModelBadge {
    Mixed,
    Max,
    High,
    Free,
}

impl ModelBadge {
    pub fn label(self) -> &'static str {
        match self {
            Self::Mixed => "MIXED",
            Self::Max => "MAX",
            Self::High => "HIGH",
            Self::Free => "FREE",
        }
    }
}

impl fmt::Display for ModelBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Maps a model identifier to its family. First matching rule wins.
pub fn classify_family(model: &str) -> ModelFamily {
    let model = model.to_lowercase();
    if model.contains("claude") {
        return ModelFamily::Claude;
    }
    if model.contains("cursor") || model.contains("gpt-4o-mini") {
        return ModelFamily::CursorModels;
    }
    if model.contains("grok") {
        return ModelFamily::Grok;
    }
    if model.contains("gpt") {
        return ModelFamily::Gpt;
    }
    ModelFamily::CursorModels
}

/// Badges for one model's aggregate. Rules are independent of each other.
pub fn classify_badges(model: &str, tokens: u64, real_api_cost: f64) -> Vec<ModelBadge> {
    let mut badges = Vec::new();
    if tokens > 1 && real_api_cost == 0.0 {
        badges.push(ModelBadge::Free);
    }
    let model = model.to_lowercase();
    if model.contains("gpt") && model.contains("4o") {
        badges.push(ModelBadge::Mixed);
    }
    badges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_rules_follow_priority() {
        assert_eq!(classify_family("claude-via-gpt-proxy"), ModelFamily::Claude);
        assert_eq!(classify_family("gpt-4o-mini"), ModelFamily::CursorModels);
        assert_eq!(classify_family("cursor-small"), ModelFamily::CursorModels);
        assert_eq!(classify_family("grok-3-beta"), ModelFamily::Grok);
        assert_eq!(classify_family("gpt-4.1"), ModelFamily::Gpt);
        assert_eq!(classify_family("o3"), ModelFamily::CursorModels);
        assert_eq!(classify_family(""), ModelFamily::CursorModels);
    }

    #[test]
    fn family_match_ignores_case() {
        assert_eq!(classify_family("Claude-4-Opus"), ModelFamily::Claude);
        assert_eq!(classify_family("GPT-5"), ModelFamily::Gpt);
        assert_eq!(classify_family("GPT-4O-MINI"), ModelFamily::CursorModels);
    }

    #[test]
    fn free_badge_needs_tokens_and_zero_cost() {
        assert_eq!(classify_badges("o3", 2, 0.0), vec![ModelBadge::Free]);
        assert!(classify_badges("o3", 1, 0.0).is_empty());
        assert!(classify_badges("o3", 500, 0.01).is_empty());
    }

    #[test]
    fn mixed_badge_needs_gpt_and_4o() {
        assert_eq!(classify_badges("GPT-4o", 10, 1.0), vec![ModelBadge::Mixed]);
        assert_eq!(
            classify_badges("gpt-4o-mini", 10, 0.0),
            vec![ModelBadge::Free, ModelBadge::Mixed]
        );
        assert!(classify_badges("gpt-4", 10, 1.0).is_empty());
    }

    #[test]
    fn labels_match_wire_names() {
        assert_eq!(
            serde_json::to_string(&ModelFamily::CursorModels).expect("json"),
            "\"Cursor Models\""
        );
        assert_eq!(
            serde_json::to_string(&ModelBadge::Free).expect("json"),
            "\"FREE\""
        );
        assert_eq!(ModelFamily::Gpt.to_string(), "GPT");
    }
}
