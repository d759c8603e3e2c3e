use axum::{
    Extension,
    extract::{Json, State},
    http::{StatusCode, Uri},
    response::IntoResponse,
};

use app_api::{
    AnalyzeRequest, CostBreakdownRequest, EmptyRequest, ModelShareRequest, ModelsRequest,
    PlanUsageRequest, RequestsRequest, SettingsPutRequest, TimeseriesRequest,
};

use crate::{errors::HttpError, middleware::Credential, state::HttpState};

pub async fn health() -> impl IntoResponse {
    Json(app_api::ok())
}

pub async fn usage(
    State(state): State<HttpState>,
    Extension(credential): Extension<Credential>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::usage(&state.context, credential.as_deref()).await?;
    Ok(Json(response))
}

pub async fn summary(
    State(state): State<HttpState>,
    Extension(credential): Extension<Credential>,
    Json(_): Json<EmptyRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::summary(&state.context, credential.as_deref()).await?;
    Ok(Json(response))
}

pub async fn models(
    State(state): State<HttpState>,
    Extension(credential): Extension<Credential>,
    Json(req): Json<ModelsRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::models(&state.context, credential.as_deref(), req).await?;
    Ok(Json(response))
}

pub async fn requests(
    State(state): State<HttpState>,
    Extension(credential): Extension<Credential>,
    Json(req): Json<RequestsRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::requests(&state.context, credential.as_deref(), req).await?;
    Ok(Json(response))
}

pub async fn timeseries(
    State(state): State<HttpState>,
    Extension(credential): Extension<Credential>,
    Json(req): Json<TimeseriesRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::timeseries(&state.context, credential.as_deref(), req).await?;
    Ok(Json(response))
}

pub async fn model_share(
    State(state): State<HttpState>,
    Extension(credential): Extension<Credential>,
    Json(req): Json<ModelShareRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::model_share(&state.context, credential.as_deref(), req).await?;
    Ok(Json(response))
}

pub async fn cost_breakdown(
    State(state): State<HttpState>,
    Extension(credential): Extension<Credential>,
    Json(req): Json<CostBreakdownRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::cost_breakdown(&state.context, credential.as_deref(), req).await?;
    Ok(Json(response))
}

pub async fn plan_usage(
    State(state): State<HttpState>,
    Extension(credential): Extension<Credential>,
    Json(req): Json<PlanUsageRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::plan_usage(&state.context, credential.as_deref(), req).await?;
    Ok(Json(response))
}

pub async fn analyze(
    State(state): State<HttpState>,
    Json(req): Json<AnalyzeRequest>,
) -> impl IntoResponse {
    Json(app_api::analyze(&state.context, req))
}

pub async fn settings_get(
    State(state): State<HttpState>,
    Json(_): Json<EmptyRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::settings_get(&state.context)?;
    Ok(Json(response))
}

pub async fn settings_put(
    State(state): State<HttpState>,
    Json(req): Json<SettingsPutRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::settings_put(&state.context, req)?;
    Ok(Json(response))
}

pub async fn not_found(uri: Uri) -> HttpError {
    HttpError::new(
        StatusCode::NOT_FOUND,
        format!("no route for {}", uri.path()),
        Some("not_found".to_string()),
    )
}
