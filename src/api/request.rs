//! Request types for the leave and payroll API.
//!
//! Every mutating request carries the acting identity in an `actor` field.
//! Credentials are verified before a request reaches this service.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::leave::LeaveRequest;
use crate::models::{Actor, LeaveStatus, LeaveTypeCode, Role};

/// Roles allowed to approve or reject leave and to run payroll.
pub const BACK_OFFICE_ROLES: [Role; 3] = [Role::Hr, Role::Admin, Role::Md];

/// Request body for `POST /leaves`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitLeaveBody {
    /// The submitting employee.
    pub actor: Actor,
    /// The requested leave.
    pub leave: LeaveRequest,
}

/// Request body for cancel and approve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorBody {
    /// The acting employee.
    pub actor: Actor,
}

/// Request body for `POST /leaves/:id/reject`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectLeaveBody {
    /// The approver.
    pub actor: Actor,
    /// Optional rejection reason.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Request body for `POST /payroll/run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunPayrollBody {
    /// The back-office user running payroll.
    pub actor: Actor,
    /// The payroll month as `YYYY-MM`.
    pub month: String,
    /// Restricts the run to one employee.
    #[serde(default)]
    pub employee_id: Option<String>,
}

/// Query string for `GET /employees/:id/leaves`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListLeavesQuery {
    /// Calendar year of the start date; defaults to the current year.
    pub year: Option<i32>,
    /// Restricts the list to one state.
    pub status: Option<LeaveStatus>,
}

/// Query string for `GET /leaves`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusQuery {
    /// The state to list; defaults to pending.
    pub status: Option<LeaveStatus>,
}

/// Query string for `GET /employees/:id/balance`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YearQuery {
    /// The balance year; defaults to the current year.
    pub year: Option<i32>,
}

/// Query string for `GET /reports/leaves`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveReportQuery {
    /// First day of the range (inclusive).
    pub from: NaiveDate,
    /// Last day of the range (inclusive).
    pub to: NaiveDate,
    /// Restricts the report to one leave type.
    pub leave_type: Option<LeaveTypeCode>,
    /// Restricts the report to one state.
    pub status: Option<LeaveStatus>,
}

/// Query string for `GET /payroll/:month`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeQuery {
    /// Restricts the result to one employee.
    pub employee_id: Option<String>,
}
