//! Collaborators the engine reads from.
//!
//! The employee directory and the attendance ledger are owned by other parts
//! of the back office. The engine sees them only through the
//! [`EmployeeDirectory`] and [`AttendanceLedger`] traits, and reads the time
//! through a [`Clock`] so that tests and replays are reproducible.

mod clock;
mod memory;

use crate::models::{AttendanceSummary, Employee, PayrollMonth};

pub use clock::{Clock, FixedClock, SystemClock};
pub use memory::{InMemoryAttendance, InMemoryDirectory};

/// Read access to employee records.
pub trait EmployeeDirectory: Send + Sync {
    /// Looks up one employee.
    fn employee(&self, employee_id: &str) -> Option<Employee>;

    /// Every employee with an active status, ordered by id.
    fn active_employees(&self) -> Vec<Employee>;
}

/// Monthly attendance aggregates.
pub trait AttendanceLedger: Send + Sync {
    /// Present days and hours worked by one employee in one month.
    fn monthly_summary(&self, employee_id: &str, month: PayrollMonth) -> AttendanceSummary;
}
