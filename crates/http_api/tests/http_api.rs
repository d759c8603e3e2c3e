use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::util::ServiceExt;
use wiremock::matchers::{header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use app_api::AppContext;
use usage_app::{AppPaths, AppState, Settings, TOKEN_ENV, ensure_app_data_dir};

use http_api::{CSRF_HEADER, HttpState, TOKEN_HEADER};

const RUN_KEY: &str = "run-key";

struct TestApp {
    _temp_dir: tempfile::TempDir,
    router: axum::Router,
}

fn build_app(base_url: Option<String>) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let paths = AppPaths::new(temp_dir.path().to_path_buf());
    ensure_app_data_dir(&paths).expect("ensure app data dir");
    let app_state = AppState::new(paths.settings_path);
    if let Some(base_url) = base_url {
        let settings = Settings {
            base_url,
            timeout_secs: 5,
            ..Settings::default()
        };
        app_state.services.settings.save(&settings).expect("save settings");
    }

    let context = AppContext {
        app_state,
        app_data_dir: paths.app_data_dir,
    };
    let router = http_api::router(HttpState::new(context, RUN_KEY.to_string()));

    TestApp {
        _temp_dir: temp_dir,
        router,
    }
}

async fn mock_events(body: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/dashboard/get-filtered-usage-events"))
        .and(header_regex("cookie", "WorkosCursorSessionToken=session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    server
}

fn sample_events() -> Value {
    json!({
        "totalUsageEventsCount": 2,
        "usageEventsDisplay": [
            {
                "timestamp": "1735689600000",
                "model": "claude-4-opus",
                "kind": "USAGE_EVENT_KIND_USAGE_BASED",
                "tokenUsage": {"inputTokens": 100, "outputTokens": 50, "totalCents": 30},
                "cursorTokenFee": 10,
                "requestsCosts": 0
            },
            {
                "timestamp": "1735693200000",
                "model": "cursor-small",
                "kind": "USAGE_EVENT_KIND_INCLUDED_IN_PRO",
                "tokenUsage": {"inputTokens": 10, "outputTokens": 5, "totalCents": 0},
                "cursorTokenFee": 0,
                "requestsCosts": 0
            }
        ]
    })
}

async fn send(router: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("response");
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let payload = serde_json::from_slice(&body).expect("json body");
    (status, payload)
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(CSRF_HEADER, RUN_KEY);
    if let Some(token) = token {
        builder = builder.header(TOKEN_HEADER, token);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

#[tokio::test]
async fn usage_returns_bundle() {
    let server = mock_events(sample_events()).await;
    let app = build_app(Some(server.uri()));

    let request = Request::builder()
        .uri("/api/usage")
        .header(CSRF_HEADER, RUN_KEY)
        .header(TOKEN_HEADER, "session")
        .body(Body::empty())
        .expect("request");
    let (status, payload) = send(app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["summary"]["totalCalls"], 2);
    assert_eq!(payload["models"][0]["model"], "claude-4-opus");
    assert_eq!(payload["models"][0]["family"], "Claude");
    assert_eq!(payload["models"][1]["badges"][0], "FREE");
    assert_eq!(payload["dateRange"]["start"], "2025-01-01T00:00:00.000Z");
    assert_eq!(payload["requests"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn bearer_token_is_accepted() {
    let server = mock_events(sample_events()).await;
    let app = build_app(Some(server.uri()));

    let request = Request::builder()
        .method("POST")
        .uri("/api/timeseries")
        .header(header::CONTENT_TYPE, "application/json")
        .header(CSRF_HEADER, RUN_KEY)
        .header(header::AUTHORIZATION, "Bearer session")
        .body(Body::from(r#"{"period":"hourly"}"#))
        .expect("request");
    let (status, payload) = send(app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    let buckets = payload.as_array().expect("buckets");
    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets[0]["time"], "2025-01-01 00:00");
    assert_eq!(buckets[1]["time"], "2025-01-01 01:00");
}

#[tokio::test]
async fn usage_without_credential_is_unauthorized() {
    if std::env::var(TOKEN_ENV).is_ok() {
        return;
    }
    let app = build_app(None);
    let request = Request::builder()
        .uri("/api/usage")
        .header(CSRF_HEADER, RUN_KEY)
        .body(Body::empty())
        .expect("request");
    let (status, payload) = send(app.router, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(payload["code"], "unauthorized");
    assert_eq!(payload["status"], 401);
}

#[tokio::test]
async fn empty_account_is_not_found() {
    let server = mock_events(json!({"totalUsageEventsCount": 0, "usageEventsDisplay": []})).await;
    let app = build_app(Some(server.uri()));

    let (status, payload) =
        send(app.router, post_json("/api/summary", Some("session"), json!({}))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(payload["message"], "No usage events found");
}

#[tokio::test]
async fn upstream_rate_limit_is_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;
    let app = build_app(Some(server.uri()));

    let (status, payload) =
        send(app.router, post_json("/api/models", Some("session"), json!({}))).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(payload["code"], "rate_limited");
}

#[tokio::test]
async fn invalid_sort_field_is_bad_request() {
    let server = mock_events(sample_events()).await;
    let app = build_app(Some(server.uri()));

    let (status, payload) = send(
        app.router,
        post_json("/api/requests", Some("session"), json!({"sort": "colour"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["code"], "invalid_input");
}

#[tokio::test]
async fn plan_usage_and_cost_breakdown() {
    let server = mock_events(sample_events()).await;
    let app = build_app(Some(server.uri()));

    let (status, plan) = send(
        app.router.clone(),
        post_json("/api/plan_usage", Some("session"), json!({"plan": "pro-plus"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["plan"], "pro-plus");
    assert_eq!(plan["limit"], 70.0);

    let (status, rows) = send(
        app.router,
        post_json("/api/cost_breakdown", Some("session"), json!({"limit": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = rows.as_array().expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["model"], "claude-4-opus");
}

#[tokio::test]
async fn analyze_needs_no_credential() {
    let app = build_app(None);
    let body = json!({
        "events": [
            {"timestamp": "1735689600000", "model": "grok-4", "kind": "k",
             "tokenUsage": {"inputTokens": 9000, "outputTokens": 2000, "totalCents": 12},
             "cursorTokenFee": 3, "requestsCosts": 0}
        ]
    });
    let (status, payload) = send(app.router, post_json("/api/analyze", None, body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["summary"]["anomalies"], 1);
    assert_eq!(payload["models"][0]["family"], "Grok");
}

#[tokio::test]
async fn settings_round_trip_hides_token() {
    let app = build_app(None);

    let (status, payload) = send(
        app.router.clone(),
        post_json("/api/settings_put", None, json!({"token": "abc", "plan": "ultra"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["hasToken"], true);
    assert!(payload.get("token").is_none());

    let (status, payload) =
        send(app.router, post_json("/api/settings_get", None, json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["plan"], "ultra");
    assert!(payload.get("appDataDir").is_some());
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let app = build_app(None);
    let request = Request::builder()
        .uri("/nowhere")
        .body(Body::empty())
        .expect("request");
    let (status, payload) = send(app.router, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(payload["code"], "not_found");
}

#[tokio::test]
async fn foreign_origin_cannot_write_settings() {
    let app = build_app(None);
    let mut request = post_json(
        "/api/settings_put",
        None,
        json!({"token": "attacker", "baseUrl": "https://collector.invalid"}),
    );
    request
        .headers_mut()
        .insert(header::ORIGIN, header::HeaderValue::from_static("https://evil.example"));
    let (status, payload) = send(app.router.clone(), request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(payload["code"], "invalid_origin");

    let (_, settings) = send(app.router, post_json("/api/settings_get", None, json!({}))).await;
    assert_eq!(settings["hasToken"], false);
}

#[tokio::test]
async fn missing_run_key_is_rejected() {
    let server = mock_events(sample_events()).await;
    let app = build_app(Some(server.uri()));

    let request = Request::builder()
        .uri("/api/usage")
        .header(header::ORIGIN, "http://127.0.0.1:5173")
        .header(TOKEN_HEADER, "session")
        .body(Body::empty())
        .expect("request");
    let (status, payload) = send(app.router, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(payload["code"], "csrf_invalid");
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn settings_put_keeps_configured_base_url() {
    let app = build_app(Some("http://127.0.0.1:9".to_string()));

    let (status, payload) = send(
        app.router,
        post_json(
            "/api/settings_put",
            None,
            json!({"plan": "ultra", "baseUrl": "https://collector.invalid"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["plan"], "ultra");
    assert_eq!(payload["baseUrl"], "http://127.0.0.1:9");
}
