//! Error types for the leave and payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the engine reports. Each variant carries enough detail
//! for a caller to render a precise message (limits, balances, requested
//! amounts, states).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{BalanceCategory, EmployeeCategory, LeaveStatus, LeaveTypeCode};

/// The main error type for the engine.
///
/// # Example
///
/// ```
/// use leave_payroll_engine::error::EngineError;
///
/// let error = EngineError::InvalidMonth {
///     value: "2026-13".to_string(),
/// };
/// assert_eq!(error.to_string(), "Invalid month '2026-13': expected YYYY-MM");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed or is incomplete.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A request field was missing, malformed or inconsistent.
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// The offending field.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// The employee's category carries no paid leave entitlement.
    #[error("Employee '{employee_id}' in category {category} is not eligible for paid leave")]
    NotEligible {
        /// The employee that submitted the request.
        employee_id: String,
        /// The employee's category.
        category: EmployeeCategory,
    },

    /// The request starts in the past and the submitter may not backdate.
    #[error("Cannot apply for past dates: start date {start_date} is before {today}")]
    BackdatedNotAllowed {
        /// Requested start date.
        start_date: NaiveDate,
        /// The current date at submission time.
        today: NaiveDate,
    },

    /// The request would push the month's usage of a leave type over its cap.
    #[error(
        "Monthly limit exceeded for {leave_type}: max {max_per_month}, already used {already_used}, requested {requested}"
    )]
    MonthlyCapExceeded {
        /// The leave type requested.
        leave_type: LeaveTypeCode,
        /// The monthly cap for the leave type.
        max_per_month: Decimal,
        /// Days already recorded in the month (pending or approved).
        already_used: Decimal,
        /// Days in the new request.
        requested: Decimal,
    },

    /// The request exceeds the available balance for its category.
    #[error("Insufficient {leave_type} balance: available {available}, requested {requested}")]
    InsufficientBalance {
        /// The leave type requested.
        leave_type: LeaveTypeCode,
        /// Days still available for the year.
        available: Decimal,
        /// Days in the new request.
        requested: Decimal,
    },

    /// A referenced record does not exist (or is not visible to the caller).
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record ("leave application", "payroll record").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// A state machine transition was attempted from a state that forbids it.
    #[error("Cannot {action} leave application {application_id} in state {from}")]
    InvalidTransition {
        /// The application concerned.
        application_id: u64,
        /// The current state.
        from: LeaveStatus,
        /// The attempted action ("approve", "reject", "cancel").
        action: String,
    },

    /// A debit would push used leave above the entitlement.
    #[error(
        "Balance corruption for employee '{employee_id}' {year} {category}: used {used} + {amount} exceeds total {total}"
    )]
    BalanceCorruption {
        /// The employee whose ledger would be corrupted.
        employee_id: String,
        /// The ledger year.
        year: i32,
        /// The category being debited.
        category: BalanceCategory,
        /// The entitlement total.
        total: Decimal,
        /// The amount used before the debit.
        used: Decimal,
        /// The debit amount.
        amount: Decimal,
    },

    /// The employee directory has no such employee.
    #[error("Employee not found: {employee_id}")]
    EmployeeNotFound {
        /// The identifier that was looked up.
        employee_id: String,
    },

    /// The employee exists but is blocked or inactive.
    #[error("Employee '{employee_id}' is inactive")]
    EmployeeInactive {
        /// The inactive employee.
        employee_id: String,
    },

    /// A payroll month argument was malformed.
    #[error("Invalid month '{value}': expected YYYY-MM")]
    InvalidMonth {
        /// The rejected value.
        value: String,
    },

    /// A payroll amount fell outside the representable decimal range.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// Description of the failed step.
        message: String,
    },

    /// A balance row changed in the database since it was read.
    #[error("Leave balance for employee '{employee_id}' {year} was modified concurrently (expected version {expected_version})")]
    StaleBalance {
        /// The employee whose balance row was stale.
        employee_id: String,
        /// The ledger year.
        year: i32,
        /// The version this write was based on.
        expected_version: u64,
    },

    /// The persistent store failed to read or write.
    #[error("Storage error: {message}")]
    StorageError {
        /// The underlying database error.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for an [`EngineError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`EngineError::CalculationError`] raised when a
    /// checked decimal operation overflows.
    pub fn overflow(step: &str) -> Self {
        Self::CalculationError {
            message: format!("{} is out of range", step),
        }
    }

    /// Shorthand for an [`EngineError::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
