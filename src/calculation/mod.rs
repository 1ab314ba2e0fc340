//! Calculation logic for the leave and payroll engine.
//!
//! This module contains the payroll rule functions: working day counting,
//! approved leave aggregation, absent days, daily and hourly rates, overtime,
//! earnings, deductions, and the calculator that chains them into a
//! payroll record with an audit trace.

mod absence;
mod deductions;
mod earnings;
mod leave_days;
mod overtime;
mod payroll;
mod rates;
mod working_days;

pub use absence::{AbsenceResult, calculate_absent_days};
pub use deductions::{DeductionsResult, calculate_deductions};
pub use earnings::{EarningsResult, calculate_earnings};
pub use leave_days::{LeaveDaysResult, partition_leave_days};
pub use overtime::{OvertimeResult, calculate_overtime};
pub use payroll::{PayrollInput, calculate_payroll, round_money};
pub use rates::{DailyRatesResult, calculate_daily_rates};
pub use working_days::{WorkingDaysResult, count_working_days};
