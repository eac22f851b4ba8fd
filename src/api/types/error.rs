//! `{error: {message}}` error responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::config::Environment;
use crate::domain::DomainError;

pub const GENERIC_SERVER_ERROR: &str = "Internal Server Error";
pub const GENERIC_AUTH_ERROR: &str = "Unable to obtain an access token";

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Error detail structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    /// Error chain, only populated in development
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    stack: None,
                },
            },
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.response.error.stack = Some(stack.into());
        self
    }

    /// Bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Authentication error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// Not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status_for(err: &DomainError) -> StatusCode {
        match err {
            DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
            DomainError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            DomainError::Upstream { .. }
            | DomainError::TranslationFailed { .. }
            | DomainError::Timeout { .. }
            | DomainError::Configuration { .. }
            | DomainError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Shape a domain error for clients; production hides server-side detail
    pub fn from_domain(err: DomainError, environment: Environment) -> Self {
        let status = Self::status_for(&err);
        let development = environment.is_development();

        let message = match &err {
            DomainError::Validation { message } => message.clone(),
            _ if development => err.to_string(),
            DomainError::Authentication { .. } => GENERIC_AUTH_ERROR.to_string(),
            _ => GENERIC_SERVER_ERROR.to_string(),
        };

        let api_error = Self::new(status, message);

        if development {
            api_error.with_stack(format!("{:?}", err))
        } else {
            api_error
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.response.error.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_creation() {
        let err = ApiError::bad_request("Invalid URN parameter");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error.message, "Invalid URN parameter");
        assert!(err.response.error.stack.is_none());
    }

    #[test]
    fn test_error_serialization_shape() {
        let err = ApiError::not_found("API endpoint not found");
        let json = serde_json::to_value(&err.response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"error": {"message": "API endpoint not found"}})
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::status_for(&DomainError::validation("x")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::status_for(&DomainError::authentication("x")),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::status_for(&DomainError::upstream("oss", "x")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::status_for(&DomainError::timeout("u", 30)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_production_hides_server_detail() {
        let err = ApiError::from_domain(
            DomainError::upstream("oss", "HTTP 503: secret internals"),
            Environment::Production,
        );
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.response.error.message, GENERIC_SERVER_ERROR);
        assert!(err.response.error.stack.is_none());
    }

    #[test]
    fn test_production_keeps_validation_message() {
        let err = ApiError::from_domain(
            DomainError::validation("File size exceeds 100MB limit."),
            Environment::Production,
        );
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error.message, "File size exceeds 100MB limit.");
    }

    #[test]
    fn test_development_exposes_message_and_stack() {
        let err = ApiError::from_domain(
            DomainError::upstream("oss", "HTTP 503"),
            Environment::Development,
        );
        assert_eq!(err.response.error.message, "Upstream error: oss - HTTP 503");
        assert!(err.response.error.stack.unwrap().contains("Upstream"));
    }
}
