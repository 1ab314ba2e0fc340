//! Attendance models.
//!
//! The attendance ledger belongs to a collaborator; the engine only consumes
//! the monthly [`AttendanceSummary`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The derived status of an attendance day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Checked in and worked.
    Present,
    /// No check-in.
    Absent,
    /// Worked part of the day.
    HalfDay,
    /// On leave.
    Leave,
}

/// One day of attendance for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// The employee.
    pub employee_id: String,
    /// The attendance date.
    pub date: NaiveDate,
    /// Derived status.
    pub status: AttendanceStatus,
    /// Hours between check-in and check-out.
    pub hours_worked: Decimal,
}

/// Monthly aggregate consumed by the payroll calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttendanceSummary {
    /// Days with a present-status check-in.
    pub present_days: u32,
    /// Hours worked across those days.
    pub total_hours: Decimal,
}
