//! Core data models for the leave and payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod attendance;
mod balance;
mod employee;
mod leave;
mod payroll;

pub use attendance::{AttendanceRecord, AttendanceStatus, AttendanceSummary};
pub use balance::{
    BalanceCategory, BalanceEntry, BalanceView, CategoryBalanceView, Entitlement, LeaveBalance,
};
pub use employee::{Actor, Employee, EmployeeCategory, EmployeeStatus, MAX_BASE_SALARY, Role};
pub use leave::{
    HalfDaySession, LeaveApplication, LeaveStatus, LeaveTypeCode, LeaveTypeDefinition,
};
pub use payroll::{
    AuditStep, DayCounts, Deductions, Earnings, PayrollFailure, PayrollMonth, PayrollRecord,
    PayrollRun, PayrollSummary,
};
