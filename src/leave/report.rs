//! Leave application queries and the leave report.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{LeaveApplication, LeaveStatus, LeaveTypeCode};
use crate::store::Tables;

/// Per leave type totals of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveTypeSummary {
    /// The leave type.
    pub leave_type: LeaveTypeCode,
    /// Number of applications.
    pub count: usize,
    /// Days requested across all applications.
    pub total_days: Decimal,
    /// Approved applications.
    pub approved: usize,
    /// Rejected applications.
    pub rejected: usize,
    /// Pending applications.
    pub pending: usize,
    /// Cancelled applications.
    pub cancelled: usize,
}

impl LeaveTypeSummary {
    fn new(leave_type: LeaveTypeCode) -> Self {
        Self {
            leave_type,
            count: 0,
            total_days: Decimal::ZERO,
            approved: 0,
            rejected: 0,
            pending: 0,
            cancelled: 0,
        }
    }

    fn add(&mut self, application: &LeaveApplication) {
        self.count += 1;
        self.total_days += application.days_requested;
        match application.status {
            LeaveStatus::Approved => self.approved += 1,
            LeaveStatus::Rejected => self.rejected += 1,
            LeaveStatus::Pending => self.pending += 1,
            LeaveStatus::Cancelled => self.cancelled += 1,
        }
    }
}

/// Applications within a date range plus per-type totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveReport {
    /// First day of the range (inclusive).
    pub from: NaiveDate,
    /// Last day of the range (inclusive).
    pub to: NaiveDate,
    /// Matching applications, earliest start first.
    pub applications: Vec<LeaveApplication>,
    /// One line per leave type present, in code order.
    pub summary: Vec<LeaveTypeSummary>,
}

fn newest_first(applications: &mut [LeaveApplication]) {
    applications.sort_by(|a, b| b.applied_on.cmp(&a.applied_on).then(b.id.cmp(&a.id)));
}

/// One employee's applications starting in `year`, newest submission first.
pub fn employee_leaves(
    tables: &Tables,
    employee_id: &str,
    year: i32,
    status: Option<LeaveStatus>,
) -> Vec<LeaveApplication> {
    let mut leaves: Vec<LeaveApplication> = tables
        .applications()
        .filter(|a| a.employee_id == employee_id && a.start_date.year() == year)
        .filter(|a| status.is_none_or(|s| a.status == s))
        .cloned()
        .collect();
    newest_first(&mut leaves);
    leaves
}

/// Every employee's applications in one state, newest submission first.
pub fn leaves_by_status(tables: &Tables, status: LeaveStatus) -> Vec<LeaveApplication> {
    let mut leaves: Vec<LeaveApplication> = tables
        .applications()
        .filter(|a| a.status == status)
        .cloned()
        .collect();
    newest_first(&mut leaves);
    leaves
}

/// Applications lying entirely within `[from, to]`, optionally filtered by
/// type and state.
pub fn leave_report(
    tables: &Tables,
    from: NaiveDate,
    to: NaiveDate,
    leave_type: Option<LeaveTypeCode>,
    status: Option<LeaveStatus>,
) -> LeaveReport {
    let mut applications: Vec<LeaveApplication> = tables
        .applications()
        .filter(|a| a.start_date >= from && a.end_date <= to)
        .filter(|a| leave_type.is_none_or(|t| a.leave_type == t))
        .filter(|a| status.is_none_or(|s| a.status == s))
        .cloned()
        .collect();
    applications.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));

    let mut by_type: BTreeMap<LeaveTypeCode, LeaveTypeSummary> = BTreeMap::new();
    for application in &applications {
        by_type
            .entry(application.leave_type)
            .or_insert_with(|| LeaveTypeSummary::new(application.leave_type))
            .add(application);
    }

    LeaveReport {
        from,
        to,
        applications,
        summary: by_type.into_values().collect(),
    }
}
