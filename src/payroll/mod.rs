//! Payroll runs and payroll record queries.
//!
//! At most one record exists per (employee, month). Running payroll again
//! replaces the stored record; identical inputs give an identical record.

mod runner;
mod summary;

pub use runner::PayrollRunner;
pub use summary::{PAYSLIP_HISTORY_LIMIT, payroll_records, payroll_summary, payslip_history};
