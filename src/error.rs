/// Application Error Handling
///
/// This module provides a unified error handling system for the service.
/// It covers:
/// 1. Domain-specific error types (validation, storage, tokens, auth, config)
/// 2. A unified `AppError` used for control flow in handlers
/// 3. HTTP response mapping with structured, logged error responses
/// 4. Error context for request-scoped logging

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// 1. DOMAIN-SPECIFIC ERROR TYPES
// ============================================================================

/// Validation errors for input data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is empty")]
    EmptyField(String),
    #[error("{0} is too short (minimum {1} characters)")]
    TooShort(String, usize),
    #[error("{0} is too long (maximum {1} characters)")]
    TooLong(String, usize),
    #[error("{0} has invalid format")]
    InvalidFormat(String),
    #[error("{0} contains suspicious content")]
    SuspiciousContent(String),
}

/// User store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatabaseError {
    #[error("Duplicate entry: {0}")]
    UniqueConstraintViolation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Query error: {0}")]
    QueryExecution(String),
    #[error("Database connection error: {0}")]
    ConnectionPool(String),
    #[error("Database error: {0}")]
    UnexpectedError(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                DatabaseError::UniqueConstraintViolation("Email already registered".to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::ConnectionPool(err.to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                DatabaseError::QueryExecution(err.to_string())
            }
            _ => DatabaseError::UnexpectedError(err.to_string()),
        }
    }
}

/// Configuration errors, raised at startup only
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required config: {0}")]
    MissingRequired(String),
    #[error("Invalid config value: {0}")]
    InvalidValue(String),
    #[error("Config load error: {0}")]
    Load(#[from] config::ConfigError),
}

/// Authentication and authorization errors as seen by HTTP clients
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Token has expired")]
    TokenExpired,
    #[error("Invalid token")]
    TokenInvalid,
    #[error("Missing authentication token")]
    MissingToken,
    #[error("Insufficient permissions")]
    Forbidden,
    #[error("Refresh token rejected")]
    RefreshRejected,
}

/// Why a signed token failed verification.
///
/// Callers treat both kinds as "unauthenticated"; the distinction exists for
/// logging and for clients that want to refresh proactively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("token is malformed or its signature is invalid")]
    Malformed,
    #[error("token has expired")]
    Expired,
}

impl From<jsonwebtoken::errors::Error> for VerificationError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => VerificationError::Expired,
            _ => VerificationError::Malformed,
        }
    }
}

/// Failures while minting a token pair
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error(transparent)]
    Store(#[from] DatabaseError),
}

/// Outcome of a refresh-token rotation that did not issue a new pair
#[derive(Debug, Error)]
pub enum RotationError {
    #[error("refresh token failed verification: {0}")]
    InvalidToken(#[from] VerificationError),
    #[error("user lookup failed during rotation: {0}")]
    LookupFailed(#[source] DatabaseError),
    #[error("refresh token references unknown user {0}")]
    UnknownUser(Uuid),
    #[error("refresh token does not match the stored token")]
    Revoked,
    #[error(transparent)]
    Token(#[from] TokenError),
}

// ============================================================================
// 2. UNIFIED APPLICATION ERROR TYPE
// ============================================================================

/// Central error type that handler errors map to
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.into())
    }
}

impl From<VerificationError> for AppError {
    fn from(err: VerificationError) -> Self {
        match err {
            VerificationError::Expired => AppError::Auth(AuthError::TokenExpired),
            VerificationError::Malformed => AppError::Auth(AuthError::TokenInvalid),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(e) => AppError::Internal(format!("Token generation failed: {}", e)),
            TokenError::Store(e) => AppError::Database(e),
        }
    }
}

impl From<RotationError> for AppError {
    fn from(err: RotationError) -> Self {
        match err {
            RotationError::Token(e) => e.into(),
            // every rejection looks the same from the outside, a failed
            // lookup included
            _ => AppError::Auth(AuthError::RefreshRejected),
        }
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// Error response structure for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    /// HTTP status code
    pub status: u16,
    /// Timestamp when error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait ErrorHandler {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, request_id: &str);
}

impl AppError {
    /// Status, client-facing code and client-facing message.
    ///
    /// Messages for storage and internal faults are generic so nothing
    /// internal leaks to the client.
    fn classify(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),

            AppError::Database(e) => match e {
                DatabaseError::UniqueConstraintViolation(_) => {
                    (StatusCode::CONFLICT, "DUPLICATE_ENTRY", e.to_string())
                }
                DatabaseError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string()),
                DatabaseError::ConnectionPool(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "Database service temporarily unavailable".to_string(),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error occurred".to_string(),
                ),
            },

            AppError::Auth(e) => match e {
                AuthError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    "INVALID_CREDENTIALS",
                    "Invalid email or password".to_string(),
                ),
                AuthError::TokenExpired | AuthError::TokenInvalid => (
                    StatusCode::UNAUTHORIZED,
                    "TOKEN_INVALID",
                    "Invalid or expired token".to_string(),
                ),
                AuthError::MissingToken => (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    "Missing authentication token".to_string(),
                ),
                AuthError::Forbidden => (
                    StatusCode::FORBIDDEN,
                    "FORBIDDEN",
                    "Insufficient permissions".to_string(),
                ),
                AuthError::RefreshRejected => (
                    StatusCode::UNAUTHORIZED,
                    "REFRESH_REJECTED",
                    "Invalid or expired refresh token".to_string(),
                ),
            },

            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error".to_string(),
            ),
        }
    }
}

impl ErrorHandler for AppError {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse) {
        let (status, code, message) = self.classify();
        let body = ErrorResponse::new(
            request_id.to_string(),
            message,
            code.to_string(),
            status.as_u16(),
        );
        (status, body)
    }

    fn log_error(&self, request_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Validation error");
            }
            AppError::Database(DatabaseError::UniqueConstraintViolation(_)) => {
                tracing::warn!(request_id = request_id, error = %self, "Duplicate entry attempt");
            }
            AppError::Database(DatabaseError::NotFound(_)) => {
                tracing::info!(request_id = request_id, error = %self, "Resource not found");
            }
            AppError::Database(e) => {
                tracing::error!(request_id = request_id, error = %e, "Database error");
            }
            AppError::Auth(AuthError::InvalidCredentials) => {
                tracing::warn!(request_id = request_id, "Invalid credentials attempt");
            }
            AppError::Auth(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Authentication error");
            }
            AppError::Internal(msg) => {
                tracing::error!(request_id = request_id, error = %msg, "Internal error");
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let request_id = Uuid::new_v4().to_string();
        self.log_error(&request_id);

        let (status, body) = <Self as ErrorHandler>::error_response(self, &request_id);
        HttpResponse::build(status).json(body)
    }

    fn status_code(&self) -> StatusCode {
        self.classify().0
    }
}

// ============================================================================
// 4. ERROR CONTEXT ENRICHMENT
// ============================================================================

/// Request-scoped context carried through a handler for log correlation
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub request_id: String,
    pub user_id: Option<Uuid>,
    pub operation: String,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            user_id: None,
            operation: operation.into(),
        }
    }

    pub fn with_user_id(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::EmptyField("email".to_string());
        assert_eq!(err.to_string(), "email is empty");
    }

    #[test]
    fn test_app_error_conversion() {
        let app_err: AppError = ValidationError::InvalidFormat("test".to_string()).into();
        assert!(matches!(app_err, AppError::Validation(_)));
    }

    #[test]
    fn test_verification_errors_map_to_unauthorized() {
        let expired: AppError = VerificationError::Expired.into();
        let malformed: AppError = VerificationError::Malformed.into();

        assert_eq!(expired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(malformed.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_every_rotation_rejection_looks_identical() {
        let rejections = vec![
            RotationError::InvalidToken(VerificationError::Malformed),
            RotationError::InvalidToken(VerificationError::Expired),
            RotationError::UnknownUser(Uuid::new_v4()),
            RotationError::Revoked,
            RotationError::LookupFailed(DatabaseError::ConnectionPool("pool closed".to_string())),
        ];

        for rejection in rejections {
            let app_err: AppError = rejection.into();
            let (status, body) = ErrorHandler::error_response(&app_err, "req-1");
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body.code, "REFRESH_REJECTED");
            assert_eq!(body.message, "Invalid or expired refresh token");
        }
    }

    #[test]
    fn test_store_failure_while_minting_is_a_server_error() {
        let err = RotationError::Token(TokenError::Store(DatabaseError::ConnectionPool(
            "pool closed".to_string(),
        )));

        let app_err: AppError = err.into();
        assert_eq!(app_err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_forbidden_maps_to_403() {
        let err = AppError::Auth(AuthError::Forbidden);
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = AppError::Internal("secret stack trace".to_string());
        let (status, body) = ErrorHandler::error_response(&err, "req-2");

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error_id, "req-2");
        assert!(!body.message.contains("secret"));
    }

    #[test]
    fn test_row_not_found_becomes_not_found() {
        let err: DatabaseError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DatabaseError::NotFound(_)));
    }

    #[test]
    fn test_error_context_creation() {
        let ctx = ErrorContext::new("test_operation");
        assert_eq!(ctx.operation, "test_operation");
        assert!(ctx.user_id.is_none());

        let user_id = Uuid::new_v4();
        let ctx = ctx.with_user_id(user_id);
        assert_eq!(ctx.user_id, Some(user_id));
    }
}
