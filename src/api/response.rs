//! Response types for the leave and payroll API.
//!
//! This module defines the error response structures and the mapping from
//! engine errors to HTTP statuses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::Role;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates a forbidden error for an actor lacking the required role.
    pub fn forbidden(role: Role, action: &str) -> Self {
        Self::with_details(
            "FORBIDDEN",
            format!("Role {:?} may not {}", role, action),
            "This operation requires the HR, Admin or MD role",
        )
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Pairs an error body with a status.
    pub fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        let (status, code, details) = match &error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
                Some("The engine configuration is missing or invalid".to_string()),
            ),
            EngineError::InvalidInput { field, .. } => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                Some(format!("field: {}", field)),
            ),
            EngineError::NotEligible { .. } => (
                StatusCode::FORBIDDEN,
                "NOT_ELIGIBLE",
                Some("The employee category carries no paid leave".to_string()),
            ),
            EngineError::BackdatedNotAllowed { .. } => (
                StatusCode::BAD_REQUEST,
                "BACKDATED_NOT_ALLOWED",
                Some("Only Admin or MD may apply for past dates".to_string()),
            ),
            EngineError::MonthlyCapExceeded { .. } => {
                (StatusCode::BAD_REQUEST, "MONTHLY_CAP_EXCEEDED", None)
            }
            EngineError::InsufficientBalance { .. } => {
                (StatusCode::BAD_REQUEST, "INSUFFICIENT_BALANCE", None)
            }
            EngineError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", None),
            EngineError::InvalidTransition { .. } => (
                StatusCode::CONFLICT,
                "INVALID_TRANSITION",
                Some("Only pending applications can change state".to_string()),
            ),
            EngineError::BalanceCorruption { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "BALANCE_CORRUPTION",
                Some("The operation was rolled back".to_string()),
            ),
            EngineError::EmployeeNotFound { .. } => {
                (StatusCode::NOT_FOUND, "EMPLOYEE_NOT_FOUND", None)
            }
            EngineError::EmployeeInactive { .. } => {
                (StatusCode::CONFLICT, "EMPLOYEE_INACTIVE", None)
            }
            EngineError::InvalidMonth { .. } => (StatusCode::BAD_REQUEST, "INVALID_MONTH", None),
            EngineError::CalculationError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CALCULATION_ERROR",
                Some("Calculation failed".to_string()),
            ),
            EngineError::StaleBalance { .. } => (StatusCode::CONFLICT, "STALE_BALANCE", None),
            EngineError::StorageError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                Some("The request was not saved".to_string()),
            ),
        };

        let error = match details {
            Some(details) => ApiError::with_details(code, message, details),
            None => ApiError::new(code, message),
        };
        ApiErrorResponse { status, error }
    }
}
