//! RBAC Error Types
//!
//! Crate-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.
//!
//! Authentication failures collapse into one outward message. The precise
//! reason is only written to the log.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// RBAC result type alias
pub type RbacResult<T> = Result<T, RbacError>;

const AUTHENTICATION_FAILED: &str = "Authentication failed";
const FORBIDDEN: &str = "You do not have permission to perform this action";

#[derive(Debug, Error)]
pub enum RbacError {
    /// Unknown email or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No bearer token on the request
    #[error("Bearer token missing")]
    TokenMissing,

    #[error("Bearer token malformed")]
    TokenMalformed,

    #[error("Bearer token expired")]
    TokenExpired,

    #[error("Bearer token signature invalid")]
    TokenSignatureInvalid,

    /// Authenticated, but the role does not grant the capability
    #[error("Forbidden")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    /// Every violated rule, in evaluation order
    #[error("Validation failed")]
    ValidationFailed(Vec<String>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RbacError {
    /// Single-message validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        RbacError::ValidationFailed(vec![message.into()])
    }

    /// Errors rejected during token authentication
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            RbacError::TokenMissing
                | RbacError::TokenMalformed
                | RbacError::TokenExpired
                | RbacError::TokenSignatureInvalid
        )
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            RbacError::InvalidCredentials
            | RbacError::TokenMissing
            | RbacError::TokenMalformed
            | RbacError::TokenExpired
            | RbacError::TokenSignatureInvalid => StatusCode::UNAUTHORIZED,
            RbacError::Forbidden => StatusCode::FORBIDDEN,
            RbacError::NotFound(_) => StatusCode::NOT_FOUND,
            RbacError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            RbacError::Conflict(_) => StatusCode::CONFLICT,
            RbacError::Database(_) | RbacError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RbacError::InvalidCredentials
            | RbacError::TokenMissing
            | RbacError::TokenMalformed
            | RbacError::TokenExpired
            | RbacError::TokenSignatureInvalid => ErrorKind::Unauthorized,
            RbacError::Forbidden => ErrorKind::Forbidden,
            RbacError::NotFound(_) => ErrorKind::NotFound,
            RbacError::ValidationFailed(_) => ErrorKind::BadRequest,
            RbacError::Conflict(_) => ErrorKind::Conflict,
            RbacError::Database(_) | RbacError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to the client-facing AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            RbacError::InvalidCredentials => {
                AppError::unauthorized("Invalid email or password")
            }
            e if e.is_token_error() => AppError::unauthorized(AUTHENTICATION_FAILED),
            RbacError::Forbidden => AppError::forbidden(FORBIDDEN),
            RbacError::ValidationFailed(errors) => {
                AppError::bad_request("Validation failed").with_details(errors.clone())
            }
            RbacError::Database(_) | RbacError::Internal(_) => {
                AppError::internal("An internal error occurred")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Whether the response boundary writes the log line
    ///
    /// Login failures are logged by the login use case, which knows the reason.
    fn logged_at_boundary(&self) -> bool {
        !matches!(self, RbacError::InvalidCredentials)
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            RbacError::Database(e) => {
                tracing::error!(error = %e, "RBAC database error");
            }
            RbacError::Internal(msg) => {
                tracing::error!(message = %msg, "RBAC internal error");
            }
            RbacError::TokenMalformed | RbacError::TokenSignatureInvalid => {
                tracing::warn!(reason = %self, "Rejected bearer token");
            }
            RbacError::Forbidden => {
                tracing::info!("Authorization denied");
            }
            _ => {
                tracing::debug!(error = %self, "RBAC error");
            }
        }
    }
}

impl IntoResponse for RbacError {
    fn into_response(self) -> Response {
        if self.logged_at_boundary() {
            self.log();
        }
        let challenge = self.is_token_error();
        let mut response = self.to_app_error().into_response();
        if challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<AppError> for RbacError {
    fn from(err: AppError) -> Self {
        RbacError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            RbacError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(RbacError::TokenExpired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(RbacError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(RbacError::NotFound("User").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            RbacError::validation("Name is required").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RbacError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            RbacError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_kind_matches_status() {
        let errors = [
            RbacError::InvalidCredentials,
            RbacError::TokenMissing,
            RbacError::Forbidden,
            RbacError::NotFound("Role"),
            RbacError::validation("x"),
            RbacError::Conflict("x".into()),
            RbacError::Internal("x".into()),
        ];
        for err in errors {
            assert_eq!(err.kind().status_code(), err.status_code().as_u16());
        }
    }

    #[test]
    fn test_token_errors_are_uniform() {
        let messages: Vec<String> = [
            RbacError::TokenMissing,
            RbacError::TokenMalformed,
            RbacError::TokenExpired,
            RbacError::TokenSignatureInvalid,
        ]
        .iter()
        .map(|e| e.to_app_error().message().to_string())
        .collect();

        assert!(messages.iter().all(|m| m == AUTHENTICATION_FAILED));
    }

    #[test]
    fn test_token_error_sets_challenge_header() {
        let response = RbacError::TokenExpired.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );

        let response = RbacError::InvalidCredentials.into_response();
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn test_validation_details_survive_conversion() {
        let err = RbacError::ValidationFailed(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_app_error().details().len(), 2);
    }

    #[test]
    fn test_internal_message_is_generic() {
        let err = RbacError::Internal("pool exploded".into());
        assert!(!err.to_app_error().message().contains("pool"));
    }

    #[test]
    fn test_login_failure_is_not_logged_twice() {
        assert!(!RbacError::InvalidCredentials.logged_at_boundary());
        assert!(RbacError::TokenExpired.logged_at_boundary());
        assert!(RbacError::Forbidden.logged_at_boundary());
        assert!(RbacError::Internal("x".into()).logged_at_boundary());
    }
}
