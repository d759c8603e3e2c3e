use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode, header::AUTHORIZATION, header::ORIGIN},
    middleware::Next,
    response::Response,
};

use crate::{errors::HttpError, state::HttpState};

/// Per-request Cursor session token.
pub const TOKEN_HEADER: &str = "x-cursor-token";
/// Per-run secret printed at startup; every API call must echo it.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Per-request session token supplied by the caller, if any.
#[derive(Clone, Debug, Default)]
pub struct Credential(pub Option<String>);

impl Credential {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

pub async fn require_csrf(
    State(state): State<HttpState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, HttpError> {
    if let Some(origin) = req.headers().get(ORIGIN) {
        let origin = origin.to_str().map_err(|_| {
            HttpError::new(
                StatusCode::BAD_REQUEST,
                "invalid Origin header",
                Some("invalid_origin".to_string()),
            )
        })?;
        if !is_loopback_origin(origin) {
            tracing::warn!(origin, path = %req.uri().path(), "rejected cross-origin request");
            return Err(HttpError::new(
                StatusCode::FORBIDDEN,
                "invalid origin",
                Some("invalid_origin".to_string()),
            ));
        }
    }

    let token = req
        .headers()
        .get(CSRF_HEADER)
        .and_then(|value| value.to_str().ok());
    if token != Some(state.csrf_token.as_str()) {
        return Err(HttpError::new(
            StatusCode::UNAUTHORIZED,
            "missing or invalid CSRF token",
            Some("csrf_invalid".to_string()),
        ));
    }

    Ok(next.run(req).await)
}

pub(crate) fn is_loopback_origin(origin: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        origin.strip_prefix(scheme).is_some_and(|host| {
            ["127.0.0.1", "localhost", "[::1]"].iter().any(|loopback| {
                host.strip_prefix(loopback)
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with(':'))
            })
        })
    })
}

pub async fn extract_credential(mut req: Request<Body>, next: Next) -> Response {
    let credential = Credential(credential_from_headers(req.headers()));
    tracing::debug!(
        method = %req.method(),
        path = %req.uri().path(),
        has_credential = credential.0.is_some(),
        "api request"
    );
    req.extensions_mut().insert(credential);
    next.run(req).await
}

fn credential_from_headers(headers: &HeaderMap) -> Option<String> {
    let explicit = headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim);
    let bearer = || {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().strip_prefix("Bearer "))
            .map(str::trim)
    };
    explicit
        .filter(|value| !value.is_empty())
        .or_else(|| bearer().filter(|value| !value.is_empty()))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn header_beats_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, HeaderValue::from_static("from-header"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-bearer"));
        assert_eq!(credential_from_headers(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn bearer_and_blank_values() {
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, HeaderValue::from_static("  "));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(credential_from_headers(&headers).as_deref(), Some("abc"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(credential_from_headers(&headers), None);
    }

    #[test]
    fn only_loopback_origins_pass() {
        assert!(is_loopback_origin("http://127.0.0.1:3846"));
        assert!(is_loopback_origin("http://localhost:5173"));
        assert!(is_loopback_origin("https://[::1]:8443"));
        assert!(is_loopback_origin("http://localhost"));
        assert!(!is_loopback_origin("https://evil.example"));
        assert!(!is_loopback_origin("http://localhost.evil.example"));
        assert!(!is_loopback_origin("http://127.0.0.1.nip.io:80"));
        assert!(!is_loopback_origin("null"));
    }
}
