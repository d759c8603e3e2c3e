mod errors;
mod handlers;
mod middleware;
mod state;

use axum::{
    Router,
    http::{HeaderName, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, CorsLayer};

pub use middleware::{CSRF_HEADER, Credential, TOKEN_HEADER};
pub use state::{HttpState, generate_csrf_token};

pub fn router(state: HttpState) -> Router<()> {
    let api = Router::new()
        .route("/health", get(handlers::health))
        .route("/usage", get(handlers::usage))
        .route("/summary", post(handlers::summary))
        .route("/models", post(handlers::models))
        .route("/requests", post(handlers::requests))
        .route("/timeseries", post(handlers::timeseries))
        .route("/model_share", post(handlers::model_share))
        .route("/cost_breakdown", post(handlers::cost_breakdown))
        .route("/plan_usage", post(handlers::plan_usage))
        .route("/analyze", post(handlers::analyze))
        .route("/settings_get", post(handlers::settings_get))
        .route("/settings_put", post(handlers::settings_put))
        .route_layer(axum_middleware::from_fn(middleware::extract_credential))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_csrf,
        ));

    Router::new()
        .nest("/api", api)
        .fallback(handlers::not_found)
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin, _| {
            origin
                .to_str()
                .is_ok_and(middleware::is_loopback_origin)
        }))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(TOKEN_HEADER),
            HeaderName::from_static(CSRF_HEADER),
        ])
}
