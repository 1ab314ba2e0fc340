//! In-memory collaborators for the binary, tests and benchmarks.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, AttendanceStatus, AttendanceSummary, Employee, PayrollMonth,
};

use super::{AttendanceLedger, EmployeeDirectory};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An employee directory held in memory.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    employees: Mutex<BTreeMap<String, Employee>>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory holding `employees`.
    pub fn with_employees(employees: impl IntoIterator<Item = Employee>) -> Self {
        let directory = Self::new();
        for employee in employees {
            directory.upsert(employee);
        }
        directory
    }

    /// Adds or replaces an employee.
    pub fn upsert(&self, employee: Employee) {
        lock(&self.employees).insert(employee.id.clone(), employee);
    }
}

impl EmployeeDirectory for InMemoryDirectory {
    fn employee(&self, employee_id: &str) -> Option<Employee> {
        lock(&self.employees).get(employee_id).cloned()
    }

    fn active_employees(&self) -> Vec<Employee> {
        lock(&self.employees)
            .values()
            .filter(|e| e.is_active())
            .cloned()
            .collect()
    }
}

/// An append-only attendance ledger held in memory.
///
/// # Example
///
/// ```
/// use leave_payroll_engine::directory::{AttendanceLedger, InMemoryAttendance};
/// use leave_payroll_engine::models::{AttendanceStatus, PayrollMonth};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let ledger = InMemoryAttendance::new();
/// let day = NaiveDate::from_ymd_opt(2026, 4, 6).unwrap();
/// ledger.record("E001", day, AttendanceStatus::Present, Decimal::from(9)).unwrap();
///
/// let summary = ledger.monthly_summary("E001", PayrollMonth::containing(day));
/// assert_eq!(summary.present_days, 1);
/// assert_eq!(summary.total_hours, Decimal::from(9));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryAttendance {
    records: Mutex<BTreeMap<(String, NaiveDate), AttendanceRecord>>,
}

impl InMemoryAttendance {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one day of attendance.
    ///
    /// Returns `InvalidInput` if the day is already recorded for the employee
    /// or if the hours are outside 0 to 24.
    pub fn record(
        &self,
        employee_id: &str,
        date: NaiveDate,
        status: AttendanceStatus,
        hours_worked: Decimal,
    ) -> EngineResult<()> {
        if hours_worked.is_sign_negative() {
            return Err(EngineError::invalid_input(
                "hours_worked",
                "must not be negative",
            ));
        }
        if hours_worked > Decimal::from(24) {
            return Err(EngineError::invalid_input(
                "hours_worked",
                "must not exceed 24 hours in a day",
            ));
        }

        let mut records = lock(&self.records);
        let key = (employee_id.to_string(), date);
        if records.contains_key(&key) {
            return Err(EngineError::invalid_input(
                "date",
                format!("attendance for {} on {} is already recorded", employee_id, date),
            ));
        }
        records.insert(
            key,
            AttendanceRecord {
                employee_id: employee_id.to_string(),
                date,
                status,
                hours_worked,
            },
        );
        Ok(())
    }

    /// Every record of one employee in one month, by date.
    pub fn records_for(&self, employee_id: &str, month: PayrollMonth) -> Vec<AttendanceRecord> {
        let from = (employee_id.to_string(), month.first_day());
        let to = (employee_id.to_string(), month.last_day());
        lock(&self.records)
            .range(from..=to)
            .map(|(_, r)| r.clone())
            .collect()
    }
}

impl AttendanceLedger for InMemoryAttendance {
    fn monthly_summary(&self, employee_id: &str, month: PayrollMonth) -> AttendanceSummary {
        self.records_for(employee_id, month)
            .iter()
            .filter(|r| r.status == AttendanceStatus::Present)
            .fold(AttendanceSummary::default(), |mut summary, r| {
                summary.present_days += 1;
                summary.total_hours += r.hours_worked;
                summary
            })
    }
}
