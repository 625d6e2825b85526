//! Shared response envelopes and error handling for API endpoints.
//!
//! Every endpoint answers with one of two JSON shapes:
//! - success: `{"success": true, "message": ..., "data": ...}` with `data`
//!   omitted when there is nothing to return;
//! - failure: `{"success": false, "message": ..., "timestamp": ...,
//!   "path": ...}` where `path` echoes the requested route.
//!
//! `service_error_to_http` performs the `ServiceError` to status-code
//! mapping. Authentication failures (credentials, tokens, revoked sessions)
//! are 401; authorization failures are 403 and never conflated with 401.
//! Internal errors are logged and masked.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// Standard API response wrapper for successful requests
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Indicates if the request was successful
    pub success: bool,
    /// Human-readable message
    pub message: String,
    /// Response data (omitted when there is none)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response carrying data
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Create a successful response with a message only
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Error envelope for failed requests
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// Human-readable message
    pub message: String,
    /// RFC 3339 timestamp of the failure
    pub timestamp: String,
    /// Path of the request that failed
    pub path: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            path: path.into(),
        }
    }
}

/// Converts a ServiceError into the HTTP status and serialized error
/// envelope for the given request path.
pub fn service_error_to_http(error: ServiceError, path: &str) -> (StatusCode, String) {
    let (status, message) = match &error {
        ServiceError::InvalidCredentials
        | ServiceError::TokenExpired
        | ServiceError::TokenMalformed
        | ServiceError::TokenInvalidSignature
        | ServiceError::SessionRevoked
        | ServiceError::Unauthenticated => (StatusCode::UNAUTHORIZED, error.to_string()),

        ServiceError::AccountBlocked | ServiceError::Forbidden => {
            (StatusCode::FORBIDDEN, error.to_string())
        }

        ServiceError::NotFound { .. } => (StatusCode::NOT_FOUND, error.to_string()),

        ServiceError::Validation { .. } => (StatusCode::BAD_REQUEST, error.to_string()),

        ServiceError::AlreadyExists { .. } => (StatusCode::CONFLICT, error.to_string()),

        ServiceError::Database { source } => {
            tracing::error!("Database error on {}: {}", path, source);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
        ServiceError::InternalError { message } => {
            tracing::error!("Internal error on {}: {}", path, message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    };

    let error_response = ErrorResponse::new(message, path);
    (status, serde_json::to_string(&error_response).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let response = ApiResponse::success(42, "Request successful");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Request successful");
        assert_eq!(json["data"], 42);
    }

    #[test]
    fn test_message_only_envelope_omits_data() {
        let response = ApiResponse::message("Logged out");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], true);
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_error_envelope_carries_path_and_timestamp() {
        let (status, body) =
            service_error_to_http(ServiceError::InvalidCredentials, "/auth/login");
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Invalid login or password");
        assert_eq!(json["path"], "/auth/login");
        assert!(json["timestamp"].as_str().is_some());
    }

    #[test]
    fn test_authorization_failures_are_403_not_401() {
        let (forbidden, _) = service_error_to_http(ServiceError::Forbidden, "/users/u1/roles");
        assert_eq!(forbidden, StatusCode::FORBIDDEN);

        let (blocked, _) = service_error_to_http(ServiceError::AccountBlocked, "/auth/login");
        assert_eq!(blocked, StatusCode::FORBIDDEN);

        let (unauthenticated, _) = service_error_to_http(ServiceError::Unauthenticated, "/auth/me");
        assert_eq!(unauthenticated, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_token_failures_map_to_401() {
        for error in [
            ServiceError::TokenExpired,
            ServiceError::TokenMalformed,
            ServiceError::TokenInvalidSignature,
            ServiceError::SessionRevoked,
        ] {
            let (status, _) = service_error_to_http(error, "/auth/refresh");
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_internal_errors_are_masked() {
        let (status, body) = service_error_to_http(
            ServiceError::internal_error("secret pool state leaked"),
            "/auth/login",
        );
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["message"], "Internal server error");
        assert!(!body.contains("secret pool state"));
    }

    #[test]
    fn test_not_found_and_conflict_mappings() {
        let (status, _) =
            service_error_to_http(ServiceError::not_found("User", "u404"), "/auth/logout/u404");
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = service_error_to_http(
            ServiceError::already_exists("User", "taken"),
            "/auth/register",
        );
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
