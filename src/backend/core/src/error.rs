//! Error handling for Bazaar Core.
//!
//! This module provides:
//! - Error codes with stable HTTP status mapping
//! - User-facing messages vs detailed internal messages
//! - The API failure envelope (`success`, `statusCode`, `message`, `errors`)
//! - Development/production response translation
//! - Error logging with tracing integration and metrics

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{error, warn};

// ═══════════════════════════════════════════════════════════════════════════════
// Result Type Alias
// ═══════════════════════════════════════════════════════════════════════════════

/// A specialized Result type for Bazaar operations.
pub type Result<T> = std::result::Result<T, BazaarError>;

// ═══════════════════════════════════════════════════════════════════════════════
// Error Codes
// ═══════════════════════════════════════════════════════════════════════════════

/// Machine-readable error codes.
///
/// These codes are stable and can be used by clients for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Authentication (401)
    Unauthenticated,
    InvalidToken,
    TokenExpired,
    TokenRevoked,
    AccountDeactivated,

    // Authorization (403)
    Forbidden,
    ApprovalPending,

    // Lookup (404)
    NotFound,

    // Client input (400)
    Validation,
    Conflict,

    // Infrastructure (5xx)
    DatabaseError,
    DatabaseConnectionFailed,
    SerializationError,
    Internal,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    pub const fn http_status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated
            | Self::InvalidToken
            | Self::TokenExpired
            | Self::TokenRevoked
            | Self::AccountDeactivated => StatusCode::UNAUTHORIZED,

            Self::Forbidden | Self::ApprovalPending => StatusCode::FORBIDDEN,

            Self::NotFound => StatusCode::NOT_FOUND,

            Self::Validation | Self::Conflict => StatusCode::BAD_REQUEST,

            Self::DatabaseConnectionFailed => StatusCode::SERVICE_UNAVAILABLE,

            Self::DatabaseError | Self::SerializationError | Self::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether the user-facing message is safe to expose in production.
    ///
    /// Server-side failures get a generic message outside development mode.
    pub const fn is_operational(&self) -> bool {
        !matches!(
            self,
            Self::DatabaseError
                | Self::DatabaseConnectionFailed
                | Self::SerializationError
                | Self::Internal
        )
    }

    /// Get the error category for grouping.
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Unauthenticated
            | Self::InvalidToken
            | Self::TokenExpired
            | Self::TokenRevoked
            | Self::AccountDeactivated => "authentication",
            Self::Forbidden | Self::ApprovalPending => "authorization",
            Self::NotFound => "lookup",
            Self::Validation | Self::Conflict => "validation",
            Self::DatabaseError | Self::DatabaseConnectionFailed => "database",
            Self::SerializationError => "serialization",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Response Mode
// ═══════════════════════════════════════════════════════════════════════════════

/// How much detail error responses carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Full detail: internal messages included in response bodies.
    Development,
    /// Operational messages only; internals are logged server-side.
    Production,
}

static ERROR_MODE: OnceLock<ErrorMode> = OnceLock::new();

/// Set the global error response mode. First call wins.
pub fn set_error_mode(mode: ErrorMode) {
    let _ = ERROR_MODE.set(mode);
}

fn error_mode() -> ErrorMode {
    *ERROR_MODE.get().unwrap_or(&ErrorMode::Production)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Main Error Type
// ═══════════════════════════════════════════════════════════════════════════════

/// The main error type for Bazaar Core.
///
/// Carries a machine-readable code, a user-facing message that is safe to
/// return to clients, and an optional internal message for logging.
#[derive(Error, Debug)]
pub struct BazaarError {
    /// Machine-readable error code
    code: ErrorCode,

    /// User-facing error message (safe to expose to clients)
    user_message: Cow<'static, str>,

    /// Detailed internal message (for logging only)
    internal_message: Option<String>,

    /// Per-field validation messages, first violation first
    field_errors: Vec<String>,

    /// The source error that caused this error
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl fmt::Display for BazaarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.user_message)?;
        if let Some(ref internal) = self.internal_message {
            write!(f, " (internal: {})", internal)?;
        }
        Ok(())
    }
}

impl BazaarError {
    // ─────────────────────────────────────────────────────────────────────────
    // Constructors
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a new error with code and user message.
    pub fn new(code: ErrorCode, user_message: impl Into<Cow<'static, str>>) -> Self {
        let error = Self {
            code,
            user_message: user_message.into(),
            internal_message: None,
            field_errors: Vec::new(),
            source: None,
        };
        error.record_metrics();
        error
    }

    /// Create an error with both user and internal messages.
    pub fn with_internal(
        code: ErrorCode,
        user_message: impl Into<Cow<'static, str>>,
        internal_message: impl Into<String>,
    ) -> Self {
        let mut error = Self::new(code, user_message);
        error.internal_message = Some(internal_message.into());
        error
    }

    /// Create an internal error (500).
    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_internal(ErrorCode::Internal, "An internal error occurred", message)
    }

    /// Create a not found error, e.g. "Seller not found".
    pub fn not_found(entity: impl fmt::Display) -> Self {
        Self::new(ErrorCode::NotFound, format!("{} not found", entity))
    }

    /// Create a validation error (400).
    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCode::Validation, message)
    }

    /// Create a conflict error (400), e.g. duplicate email.
    pub fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Create an unauthenticated error (401).
    pub fn unauthenticated(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCode::Unauthenticated, message)
    }

    /// Create a forbidden error (403).
    pub fn forbidden(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Builder Methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Add per-field validation messages.
    pub fn with_field_errors(mut self, errors: Vec<String>) -> Self {
        self.field_errors = errors;
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Get the user-facing message.
    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    /// Get the internal message (if any).
    pub fn internal_message(&self) -> Option<&str> {
        self.internal_message.as_deref()
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Logging
    // ─────────────────────────────────────────────────────────────────────────

    /// Log this error at a level matching its status class.
    pub fn log(&self) {
        let code = self.code.to_string();
        let category = self.code.category();
        let status = self.http_status().as_u16();

        if status >= 500 {
            error!(
                error_code = %code,
                category = category,
                http_status = status,
                user_message = %self.user_message,
                internal_message = ?self.internal_message,
                source = ?self.source,
                "Request failed"
            );
        } else {
            warn!(
                error_code = %code,
                category = category,
                http_status = status,
                user_message = %self.user_message,
                "Request rejected"
            );
        }
    }

    fn record_metrics(&self) {
        counter!(
            "bazaar_errors_total",
            "code" => self.code.to_string(),
            "category" => self.code.category().to_string(),
        )
        .increment(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// API Response
// ═══════════════════════════════════════════════════════════════════════════════

/// Failure envelope returned to API clients.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always false for errors
    pub success: bool,

    /// HTTP status code, repeated in the body
    #[serde(rename = "statusCode")]
    pub status_code: u16,

    /// User-facing error message
    pub message: String,

    /// Per-field validation messages, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,

    /// Internal diagnostics, development mode only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<&BazaarError> for ErrorResponse {
    fn from(error: &BazaarError) -> Self {
        let status = error.http_status();
        let development = error_mode() == ErrorMode::Development;

        // Outside development, non-operational messages stay server-side.
        let message = if development || error.code.is_operational() {
            error.user_message.to_string()
        } else {
            "Something went wrong. Please try again later.".to_string()
        };

        Self {
            success: false,
            status_code: status.as_u16(),
            message,
            errors: if error.field_errors.is_empty() {
                None
            } else {
                Some(error.field_errors.clone())
            },
            detail: if development {
                error.internal_message.clone()
            } else {
                None
            },
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Axum Integration
// ═══════════════════════════════════════════════════════════════════════════════

impl IntoResponse for BazaarError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.http_status();
        let response = ErrorResponse::from(&self);

        (status, Json(response)).into_response()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// From Implementations for Common Error Types
// ═══════════════════════════════════════════════════════════════════════════════

impl From<sqlx::Error> for BazaarError {
    fn from(error: sqlx::Error) -> Self {
        let (code, user_msg) = match &error {
            sqlx::Error::RowNotFound => (ErrorCode::NotFound, "Record not found"),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return Self::with_internal(
                            ErrorCode::Conflict,
                            "Email already registered",
                            format!("Constraint violation: {}", constraint),
                        )
                        .with_source(error);
                    }
                    if constraint.contains("unique") || constraint.contains("pkey") {
                        return Self::with_internal(
                            ErrorCode::Conflict,
                            "A record with this identifier already exists",
                            format!("Constraint violation: {}", constraint),
                        )
                        .with_source(error);
                    }
                }
                (ErrorCode::DatabaseError, "A database error occurred")
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => (
                ErrorCode::DatabaseConnectionFailed,
                "Unable to connect to the database",
            ),
            _ => (ErrorCode::DatabaseError, "A database error occurred"),
        };

        Self::with_internal(code, user_msg, error.to_string()).with_source(error)
    }
}

impl From<serde_json::Error> for BazaarError {
    fn from(error: serde_json::Error) -> Self {
        Self::with_internal(
            ErrorCode::SerializationError,
            "Failed to process JSON data",
            error.to_string(),
        )
        .with_source(error)
    }
}

impl From<std::io::Error> for BazaarError {
    fn from(error: std::io::Error) -> Self {
        Self::with_internal(
            ErrorCode::Internal,
            "An I/O error occurred",
            error.to_string(),
        )
        .with_source(error)
    }
}

impl From<anyhow::Error> for BazaarError {
    fn from(error: anyhow::Error) -> Self {
        match error.downcast::<BazaarError>() {
            Ok(bazaar_error) => bazaar_error,
            Err(error) => Self::with_internal(
                ErrorCode::Internal,
                "An internal error occurred",
                error.to_string(),
            ),
        }
    }
}

impl From<config::ConfigError> for BazaarError {
    fn from(error: config::ConfigError) -> Self {
        Self::with_internal(
            ErrorCode::Internal,
            "Configuration error occurred",
            error.to_string(),
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Convenience Constructors for Domain Errors
// ═══════════════════════════════════════════════════════════════════════════════

impl BazaarError {
    /// Credential was revoked via logout.
    pub fn token_revoked() -> Self {
        Self::new(
            ErrorCode::TokenRevoked,
            "Token has been invalidated. Please login again.",
        )
    }

    /// Account exists but is deactivated.
    pub fn account_deactivated() -> Self {
        Self::new(ErrorCode::AccountDeactivated, "Account is deactivated")
    }

    /// Seller or deliverer account has not been approved yet.
    pub fn approval_pending(role: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ApprovalPending,
            format!(
                "Your {} account is pending approval. Please wait for admin approval.",
                role
            ),
        )
    }

    /// Role is outside the route's allowed set.
    pub fn role_not_allowed(actual: impl fmt::Display, required: &[impl fmt::Display]) -> Self {
        let required = required
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Self::new(
            ErrorCode::Forbidden,
            format!(
                "User role '{}' is not authorized to access this route. Required roles: {}",
                actual, required
            ),
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(
            ErrorCode::Unauthenticated.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::TokenRevoked.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::AccountDeactivated.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ErrorCode::Forbidden.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ErrorCode::ApprovalPending.http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ErrorCode::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::Validation.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::Conflict.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::Internal.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_operational_classification() {
        assert!(ErrorCode::Validation.is_operational());
        assert!(ErrorCode::Forbidden.is_operational());
        assert!(!ErrorCode::DatabaseError.is_operational());
        assert!(!ErrorCode::Internal.is_operational());
    }

    #[test]
    fn test_role_not_allowed_message() {
        let error = BazaarError::role_not_allowed("customer", &["admin", "seller"]);
        assert_eq!(error.code(), ErrorCode::Forbidden);
        assert_eq!(
            error.user_message(),
            "User role 'customer' is not authorized to access this route. Required roles: admin, seller"
        );
    }

    #[test]
    fn test_approval_pending_message() {
        let error = BazaarError::approval_pending("seller");
        assert_eq!(
            error.user_message(),
            "Your seller account is pending approval. Please wait for admin approval."
        );
        assert_eq!(error.http_status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_error_response_envelope() {
        let error = BazaarError::validation("Name is required")
            .with_field_errors(vec!["Name is required".to_string()]);
        let response = ErrorResponse::from(&error);

        assert!(!response.success);
        assert_eq!(response.status_code, 400);
        assert_eq!(response.message, "Name is required");
        assert_eq!(response.errors, Some(vec!["Name is required".to_string()]));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["statusCode"], 400);
        assert_eq!(json["success"], false);
    }

    #[test]
    fn test_internal_message_hidden_by_default() {
        // Default mode is production; internals must not leak.
        let error = BazaarError::internal("connection refused at 10.0.0.3");
        let response = ErrorResponse::from(&error);
        assert_eq!(response.message, "Something went wrong. Please try again later.");
        assert!(response.detail.is_none());
    }

    #[test]
    fn test_error_display() {
        let error = BazaarError::with_internal(
            ErrorCode::DatabaseError,
            "A database error occurred",
            "Connection refused: localhost:5432",
        );

        let display = format!("{}", error);
        assert!(display.contains("DatabaseError"));
        assert!(display.contains("A database error occurred"));
        assert!(display.contains("Connection refused"));
    }
}
