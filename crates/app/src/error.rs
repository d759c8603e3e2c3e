use serde::Serialize;
use thiserror::Error;
use usage_client::ClientError;
use usage_core::ParseVariantError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("client error: {0}")]
    Client(#[from] ClientError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings parse error: {0}")]
    SettingsParse(#[from] toml::de::Error),
    #[error("settings write error: {0}")]
    SettingsWrite(#[from] toml::ser::Error),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
}

impl From<ParseVariantError> for AppError {
    fn from(err: ParseVariantError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ApiError {
    fn new(status: u16, message: impl Into<String>, code: &str) -> Self {
        Self {
            status,
            message: message.into(),
            code: Some(code.to_string()),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::InvalidInput(message) => Self::new(400, message, "invalid_input"),
            AppError::Unauthorized(message) => Self::new(401, message, "unauthorized"),
            AppError::NotFound(message) => Self::new(404, message, "not_found"),
            AppError::Client(ClientError::MissingToken) => {
                Self::new(401, "API token not configured", "unauthorized")
            }
            AppError::Client(client) => match client.status() {
                Some(401 | 403) => Self::new(401, "Invalid or expired API token", "auth_failed"),
                Some(429) => Self::new(429, "Too many requests to the usage API", "rate_limited"),
                _ => Self::new(500, client.to_string(), "api_error"),
            },
            AppError::Io(_) | AppError::SettingsParse(_) | AppError::SettingsWrite(_) => Self {
                status: 500,
                message: err.to_string(),
                code: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream(status: u16) -> AppError {
        AppError::Client(ClientError::Api {
            status,
            message: "upstream".to_string(),
        })
    }

    #[test]
    fn maps_upstream_statuses() {
        let forbidden = ApiError::from(upstream(403));
        assert_eq!(forbidden.status, 401);
        assert_eq!(forbidden.code.as_deref(), Some("auth_failed"));

        let limited = ApiError::from(upstream(429));
        assert_eq!(limited.status, 429);
        assert_eq!(limited.code.as_deref(), Some("rate_limited"));

        let broken = ApiError::from(upstream(502));
        assert_eq!(broken.status, 500);
        assert!(broken.message.contains("502"));
    }

    #[test]
    fn maps_local_failures() {
        assert_eq!(
            ApiError::from(AppError::Client(ClientError::MissingToken)).status,
            401
        );
        assert_eq!(
            ApiError::from(AppError::NotFound("No usage events found".to_string())).status,
            404
        );
        let invalid = ApiError::from(AppError::from(ParseVariantError::new("plan", "gold")));
        assert_eq!(invalid.status, 400);
        assert_eq!(invalid.message, "unsupported plan gold");
        let io = ApiError::from(AppError::Io(std::io::Error::other("disk")));
        assert_eq!(io.status, 500);
        assert!(io.code.is_none());
    }
}
