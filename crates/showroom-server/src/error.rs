use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use showroom::errors::AgentError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },
    #[error(transparent)]
    Other(#[from] config::ConfigError),
}

/// Map a config field path like `provider.api_key` to the environment
/// variable that supplies it.
pub fn to_env_var(field: &str) -> String {
    format!("SHOWROOM_{}", field.replace('.', "__").to_uppercase())
}

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - malformed body, unknown role, or empty content.
    BadRequest(String),
    /// 502 Bad Gateway - the LLM or the vector service failed.
    UpstreamUnavailable(String),
    /// 500 Internal Server Error - schema violation, tool failure.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::UpstreamUnavailable(msg) => {
                (StatusCode::BAD_GATEWAY, "upstream_error", msg)
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Upstream(_) => ApiError::UpstreamUnavailable(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}
