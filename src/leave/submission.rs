//! Leave request validation and submission.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Actor, Employee, HalfDaySession, LeaveApplication, LeaveStatus, LeaveTypeCode,
};
use crate::store::Transaction;

use super::ledger;

/// A leave request as submitted by an employee.
///
/// The leave type arrives as a raw code and is checked against the catalog
/// during submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Leave type code (e.g. "CL").
    pub leave_type: String,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Free-text reason.
    pub reason: String,
    /// Whether this is a half-day request.
    #[serde(default)]
    pub is_half_day: bool,
    /// The half-day session; defaults to the first half.
    #[serde(default)]
    pub half_day_session: Option<HalfDaySession>,
}

/// Validates `request` for `employee` and stages a pending application.
///
/// Checks, in order:
/// 1. The leave type exists (`InvalidInput`)
/// 2. The employee's category is leave-eligible (`NotEligible`), whatever the
///    dates or reason
/// 3. The dates are ordered, the reason is not blank, and a half-day covers
///    exactly one day (`InvalidInput`)
/// 4. A past start date requires a backdating role (`BackdatedNotAllowed`)
/// 5. The month's pending and approved days of this type stay within the
///    monthly cap (`MonthlyCapExceeded`)
/// 6. Balance-tracked types have enough available days for the year of the
///    start date (`InsufficientBalance`)
///
/// The `Half-Day` leave type is always treated as a half-day request.
pub fn submit(
    tx: &mut Transaction<'_>,
    config: &EngineConfig,
    employee: &Employee,
    actor: &Actor,
    request: &LeaveRequest,
    now: DateTime<Utc>,
) -> EngineResult<LeaveApplication> {
    let leave_type: LeaveTypeCode = request
        .leave_type
        .parse()
        .map_err(|message: String| EngineError::invalid_input("leave_type", message))?;
    let definition = config.leave_type(leave_type)?;

    if !config.category(employee.category)?.leave_eligible {
        return Err(EngineError::NotEligible {
            employee_id: employee.id.clone(),
            category: employee.category,
        });
    }

    if request.end_date < request.start_date {
        return Err(EngineError::invalid_input(
            "end_date",
            format!(
                "end date {} is before start date {}",
                request.end_date, request.start_date
            ),
        ));
    }
    let reason = request.reason.trim();
    if reason.is_empty() {
        return Err(EngineError::invalid_input("reason", "must not be blank"));
    }
    let is_half_day = request.is_half_day || leave_type == LeaveTypeCode::HalfDay;
    if is_half_day && request.end_date != request.start_date {
        return Err(EngineError::invalid_input(
            "end_date",
            "a half-day request must start and end on the same day",
        ));
    }

    let today = now.date_naive();
    if request.start_date < today && !config.can_backdate(actor.role) {
        return Err(EngineError::BackdatedNotAllowed {
            start_date: request.start_date,
            today,
        });
    }

    let days_requested = if is_half_day {
        Decimal::new(5, 1)
    } else {
        Decimal::from((request.end_date - request.start_date).num_days() + 1)
    };

    let already_used = month_usage(tx, &employee.id, leave_type, request.start_date);
    if already_used + days_requested > definition.max_per_month {
        return Err(EngineError::MonthlyCapExceeded {
            leave_type,
            max_per_month: definition.max_per_month,
            already_used,
            requested: days_requested,
        });
    }

    if let Some(category) = definition.balance_category {
        let balance =
            ledger::get_or_initialize(tx, config, employee, request.start_date.year())?;
        let available = balance.available(category);
        if days_requested > available {
            return Err(EngineError::InsufficientBalance {
                leave_type,
                available,
                requested: days_requested,
            });
        }
    }

    let application = LeaveApplication {
        id: tx.next_application_id(),
        employee_id: employee.id.clone(),
        leave_type,
        start_date: request.start_date,
        end_date: request.end_date,
        days_requested,
        is_half_day,
        half_day_session: is_half_day.then(|| request.half_day_session.unwrap_or_default()),
        reason: reason.to_string(),
        status: LeaveStatus::Pending,
        approved_by: None,
        approved_on: None,
        rejection_reason: None,
        applied_on: now,
    };
    tx.put_application(application.clone());
    Ok(application)
}

/// Days of `leave_type` the employee has pending or approved with a start
/// date in the same calendar month as `start_date`.
fn month_usage(
    tx: &Transaction<'_>,
    employee_id: &str,
    leave_type: LeaveTypeCode,
    start_date: NaiveDate,
) -> Decimal {
    tx.applications_of(employee_id)
        .iter()
        .filter(|a| {
            a.leave_type == leave_type
                && a.status.counts_toward_cap()
                && a.start_date.year() == start_date.year()
                && a.start_date.month() == start_date.month()
        })
        .map(|a| a.days_requested)
        .sum()
}
