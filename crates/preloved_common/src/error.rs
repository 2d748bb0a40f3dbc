use std::fmt;
use thiserror::Error;

/// The base error type shared by all Preloved crates.
///
/// Crate-specific errors convert into this type via `From` so handlers can
/// return `Result<_, PrelovedError>` and rely on its `IntoResponse` impl.
#[derive(Error, Debug)]
pub enum PrelovedError {
    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The caller could not be identified
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// The request was understood but a field failed validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The request cannot be served in the caller's current state
    #[error("Bad request: {0}")]
    BadRequestError(String),

    /// Error occurred during a database operation
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Error occurred during an external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for PrelovedError {
    fn status_code(&self) -> u16 {
        match self {
            PrelovedError::ConfigError(_) => 500,
            PrelovedError::AuthError(_) => 401,
            PrelovedError::ValidationError(_) => 422,
            PrelovedError::BadRequestError(_) => 400,
            PrelovedError::DatabaseError(_) => 500,
            PrelovedError::ExternalServiceError { .. } => 502,
            PrelovedError::NotFoundError(_) => 404,
            PrelovedError::InternalError(_) => 500,
        }
    }
}

pub fn config_error<T: fmt::Display>(message: T) -> PrelovedError {
    PrelovedError::ConfigError(message.to_string())
}

pub fn auth_error<T: fmt::Display>(message: T) -> PrelovedError {
    PrelovedError::AuthError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> PrelovedError {
    PrelovedError::ValidationError(message.to_string())
}

pub fn bad_request<T: fmt::Display>(message: T) -> PrelovedError {
    PrelovedError::BadRequestError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> PrelovedError {
    PrelovedError::NotFoundError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> PrelovedError {
    PrelovedError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> PrelovedError {
    PrelovedError::InternalError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_category() {
        assert_eq!(validation_error("too long").status_code(), 422);
        assert_eq!(bad_request("no token").status_code(), 400);
        assert_eq!(not_found("product").status_code(), 404);
        assert_eq!(auth_error("missing user").status_code(), 401);
        assert_eq!(external_service_error("fcm", "down").status_code(), 502);
        assert_eq!(config_error("push disabled").status_code(), 500);
        assert_eq!(internal_error("poisoned").status_code(), 500);
        assert_eq!(
            PrelovedError::DatabaseError("locked".into()).status_code(),
            500
        );
    }

    #[test]
    fn external_service_error_names_the_service() {
        let err = external_service_error("fcm", "legacy returned 401");
        assert_eq!(
            err.to_string(),
            "External service error: fcm - legacy returned 401"
        );
    }
}
