use usage_app::{RequestsQuery, Result, SettingsUpdate};
use usage_core::{
    AnalyticsSummary, ModelCostRow, ModelMetrics, ModelShare, PlanUsage, UsageAnalyticsBundle,
    UsageBucket, UsageEvent,
};

use crate::{
    AnalyzeRequest, AppContext, CostBreakdownRequest, ModelShareRequest, ModelsRequest,
    OkResponse, PlanUsageRequest, RequestsRequest, SettingsPutRequest, SettingsResponse,
    TimeseriesRequest,
};

pub async fn usage(ctx: &AppContext, token: Option<&str>) -> Result<UsageAnalyticsBundle> {
    ctx.app_state.services.analytics.usage(token).await
}

pub async fn summary(ctx: &AppContext, token: Option<&str>) -> Result<AnalyticsSummary> {
    ctx.app_state.services.analytics.summary(token).await
}

pub async fn models(
    ctx: &AppContext,
    token: Option<&str>,
    req: ModelsRequest,
) -> Result<Vec<ModelMetrics>> {
    ctx.app_state
        .services
        .analytics
        .models(token, req.sort.as_deref(), req.direction.as_deref())
        .await
}

pub async fn requests(
    ctx: &AppContext,
    token: Option<&str>,
    req: RequestsRequest,
) -> Result<Vec<UsageEvent>> {
    let query = RequestsQuery {
        sort: req.sort,
        direction: req.direction,
        limit: req.limit,
        offset: req.offset,
    };
    ctx.app_state.services.analytics.requests(token, &query).await
}

pub async fn timeseries(
    ctx: &AppContext,
    token: Option<&str>,
    req: TimeseriesRequest,
) -> Result<Vec<UsageBucket>> {
    ctx.app_state
        .services
        .analytics
        .timeseries(token, req.period.as_deref())
        .await
}

pub async fn model_share(
    ctx: &AppContext,
    token: Option<&str>,
    req: ModelShareRequest,
) -> Result<Vec<ModelShare>> {
    ctx.app_state
        .services
        .analytics
        .model_share(token, req.top)
        .await
}

pub async fn cost_breakdown(
    ctx: &AppContext,
    token: Option<&str>,
    req: CostBreakdownRequest,
) -> Result<Vec<ModelCostRow>> {
    ctx.app_state
        .services
        .analytics
        .cost_breakdown(token, req.limit)
        .await
}

pub async fn plan_usage(
    ctx: &AppContext,
    token: Option<&str>,
    req: PlanUsageRequest,
) -> Result<PlanUsage> {
    ctx.app_state
        .services
        .analytics
        .plan_usage(token, req.plan.as_deref(), req.billing_start.as_deref())
        .await
}

pub fn analyze(ctx: &AppContext, req: AnalyzeRequest) -> UsageAnalyticsBundle {
    ctx.app_state.services.analytics.analyze(req.events)
}

pub fn settings_get(ctx: &AppContext) -> Result<SettingsResponse> {
    let settings = ctx.app_state.services.settings.get()?;
    Ok(settings_response(ctx, settings))
}

pub fn settings_put(ctx: &AppContext, req: SettingsPutRequest) -> Result<SettingsResponse> {
    let settings = ctx.app_state.services.settings.update(SettingsUpdate {
        token: req.token,
        plan: req.plan,
        refresh_interval_secs: req.refresh_interval_secs,
        base_url: None,
        timeout_secs: req.timeout_secs,
    })?;
    Ok(settings_response(ctx, settings))
}

fn settings_response(ctx: &AppContext, settings: usage_app::SettingsSnapshot) -> SettingsResponse {
    SettingsResponse {
        settings,
        settings_path: ctx
            .app_state
            .config
            .settings_path
            .to_string_lossy()
            .to_string(),
        app_data_dir: ctx.app_data_dir.to_string_lossy().to_string(),
    }
}

pub fn ok() -> OkResponse {
    OkResponse { ok: true }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usage_app::AppState;

    fn context(dir: &tempfile::TempDir) -> AppContext {
        AppContext {
            app_state: AppState::new(dir.path().join("settings.toml")),
            app_data_dir: dir.path().to_path_buf(),
        }
    }

    #[test]
    fn settings_put_then_get() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = context(&dir);
        let before = settings_get(&ctx).expect("get");
        assert!(!before.settings.has_token);

        let after = settings_put(
            &ctx,
            SettingsPutRequest {
                token: Some("abc".to_string()),
                plan: Some("pro-plus".to_string()),
                ..SettingsPutRequest::default()
            },
        )
        .expect("put");
        assert!(after.settings.has_token);
        let json = serde_json::to_value(&after).expect("json");
        assert_eq!(json["plan"], "pro-plus");
        assert_eq!(json["hasToken"], true);
        assert!(json.get("token").is_none());
        assert!(json["settingsPath"].as_str().expect("path").ends_with("settings.toml"));
    }

    #[test]
    fn settings_put_ignores_base_url() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = context(&dir);
        let before = settings_get(&ctx).expect("get").settings.base_url;

        let req: SettingsPutRequest = serde_json::from_value(serde_json::json!({
            "token": "abc",
            "baseUrl": "https://collector.invalid"
        }))
        .expect("request");
        let after = settings_put(&ctx, req).expect("put");

        assert_eq!(after.settings.base_url, before);
        assert!(after.settings.has_token);
    }

    #[test]
    fn analyze_accepts_lenient_events() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = context(&dir);
        let req: AnalyzeRequest = serde_json::from_value(serde_json::json!({
            "events": [
                {"timestamp": 1735689600000u64, "model": "o3", "kind": "k",
                 "tokenUsage": {"inputTokens": "12", "outputTokens": 3.0},
                 "cursorTokenFee": null, "requestsCosts": 5}
            ]
        }))
        .expect("request");
        let bundle = analyze(&ctx, req);
        assert_eq!(bundle.summary.total_tokens, 15);
        assert!((bundle.summary.your_cost - 0.05).abs() < 1e-9);
    }

    #[tokio::test]
    async fn bad_plan_is_rejected_before_fetching() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = context(&dir);
        let err = plan_usage(
            &ctx,
            Some("tok"),
            PlanUsageRequest {
                plan: Some("gold".to_string()),
                billing_start: None,
            },
        )
        .await
        .expect_err("bad plan");
        assert!(matches!(err, usage_app::AppError::InvalidInput(_)));
    }
}
