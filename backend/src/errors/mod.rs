//! Global application error types and handlers.
//!
//! This module defines custom error types that are used across the entire
//! backend application and provides mechanisms for consistent error handling
//! and response formatting.

use thiserror::Error;

/// Generic service error that can be used across all entities.
///
/// Authentication failures deliberately collapse into a small set of
/// variants: a missing user and a wrong password both surface as
/// `InvalidCredentials` with the same message, so responses never reveal
/// which logins exist.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid login or password")]
    InvalidCredentials,

    #[error("Account is blocked")]
    AccountBlocked,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token is malformed")]
    TokenMalformed,

    #[error("Token signature is invalid")]
    TokenInvalidSignature,

    #[error("Session has been revoked")]
    SessionRevoked,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Permission denied")]
    Forbidden,

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    #[error("{entity} already exists: {identifier}")]
    AlreadyExists { entity: String, identifier: String },

    #[error("Database error: {source}")]
    Database {
        #[from]
        source: anyhow::Error,
    },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    // Helper constructors for common patterns

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    pub fn already_exists(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// Flattens `validator` errors into a single `Validation` variant.
    pub fn from_validation(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    format!(
                        "{}: {}",
                        field,
                        error.message.as_ref().unwrap_or(&"Invalid value".into())
                    )
                })
            })
            .collect();

        Self::Validation {
            message: messages.join(", "),
        }
    }
}
