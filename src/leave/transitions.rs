//! Leave application state transitions.
//!
//! ```text
//! Pending ──approve──▶ Approved
//!    │ ───reject───▶ Rejected
//!    └───cancel───▶ Cancelled
//! ```
//!
//! Every target state is terminal.

use chrono::{DateTime, Utc};

use crate::config::EngineConfig;
use crate::directory::EmployeeDirectory;
use crate::error::{EngineError, EngineResult};
use crate::models::{LeaveApplication, LeaveStatus};
use crate::store::Transaction;

use super::ledger;

/// Rejection reason recorded when the approver gives none.
pub const DEFAULT_REJECTION_REASON: &str = "No reason provided";

fn load(tx: &Transaction<'_>, application_id: u64) -> EngineResult<LeaveApplication> {
    tx.application(application_id)
        .ok_or_else(|| EngineError::not_found("leave application", application_id))
}

fn ensure_pending(application: &LeaveApplication, action: &str) -> EngineResult<()> {
    if application.status == LeaveStatus::Pending {
        Ok(())
    } else {
        Err(EngineError::InvalidTransition {
            application_id: application.id,
            from: application.status,
            action: action.to_string(),
        })
    }
}

/// Withdraws a pending application on behalf of its owner.
///
/// Applications owned by someone else are reported as `NotFound`.
pub fn cancel(
    tx: &mut Transaction<'_>,
    application_id: u64,
    requester_id: &str,
) -> EngineResult<LeaveApplication> {
    let mut application = load(tx, application_id)?;
    if application.employee_id != requester_id {
        return Err(EngineError::not_found("leave application", application_id));
    }
    ensure_pending(&application, "cancel")?;

    application.status = LeaveStatus::Cancelled;
    tx.put_application(application.clone());
    Ok(application)
}

/// Approves a pending application and debits the balance ledger.
///
/// Balance-tracked types debit the row for the year of the start date by
/// `days_requested`. A debit past the entitlement fails with
/// `BalanceCorruption`, and the status change is discarded with it.
pub fn approve(
    tx: &mut Transaction<'_>,
    config: &EngineConfig,
    directory: &dyn EmployeeDirectory,
    application_id: u64,
    approver_id: &str,
    now: DateTime<Utc>,
) -> EngineResult<LeaveApplication> {
    let mut application = load(tx, application_id)?;
    ensure_pending(&application, "approve")?;

    let definition = config.leave_type(application.leave_type)?;
    if let Some(category) = definition.balance_category {
        let employee = directory.employee(&application.employee_id).ok_or_else(|| {
            EngineError::EmployeeNotFound {
                employee_id: application.employee_id.clone(),
            }
        })?;
        let balance =
            ledger::get_or_initialize(tx, config, &employee, application.balance_year())?;
        ledger::debit(tx, balance, category, application.days_requested)?;
    }

    application.status = LeaveStatus::Approved;
    application.approved_by = Some(approver_id.to_string());
    application.approved_on = Some(now);
    tx.put_application(application.clone());
    Ok(application)
}

/// Rejects a pending application.
///
/// A blank or missing reason is recorded as [`DEFAULT_REJECTION_REASON`].
pub fn reject(
    tx: &mut Transaction<'_>,
    application_id: u64,
    approver_id: &str,
    reason: Option<&str>,
    now: DateTime<Utc>,
) -> EngineResult<LeaveApplication> {
    let mut application = load(tx, application_id)?;
    ensure_pending(&application, "reject")?;

    let reason = reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_REJECTION_REASON);

    application.status = LeaveStatus::Rejected;
    application.approved_by = Some(approver_id.to_string());
    application.approved_on = Some(now);
    application.rejection_reason = Some(reason.to_string());
    tx.put_application(application.clone());
    Ok(application)
}
