//! Payroll models.
//!
//! This module contains the [`PayrollMonth`] period type, the stored
//! [`PayrollRecord`] with its itemized earnings, deductions and audit trace,
//! and the report types returned by payroll runs.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::EngineError;

/// A calendar month, written `YYYY-MM`.
///
/// # Example
///
/// ```
/// use leave_payroll_engine::models::PayrollMonth;
///
/// let month: PayrollMonth = "2026-02".parse().unwrap();
/// assert_eq!(month.last_day().to_string(), "2026-02-28");
/// assert!("2026-2".parse::<PayrollMonth>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PayrollMonth {
    year: i32,
    month: u32,
}

impl PayrollMonth {
    /// Creates a month, returning `InvalidMonth` for an out-of-range month.
    pub fn new(year: i32, month: u32) -> Result<Self, EngineError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|_| Self { year, month })
            .ok_or_else(|| EngineError::InvalidMonth {
                value: format!("{:04}-{:02}", year, month),
            })
    }

    /// The month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month number, 1 to 12.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The first day of the month.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// The last day of the month.
    pub fn last_day(&self) -> NaiveDate {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Iterates every date of the month.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let last = self.last_day();
        self.first_day().iter_days().take_while(move |d| *d <= last)
    }

    /// Returns true if `date` falls within the month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for PayrollMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PayrollMonth {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidMonth {
            value: s.to_string(),
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let digits = |part: &str, len: usize| {
            part.len() == len && part.bytes().all(|b| b.is_ascii_digit())
        };
        if !digits(year, 4) || !digits(month, 2) {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl Serialize for PayrollMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PayrollMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// A single step in the audit trace recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// Itemized earnings of a payroll record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Earnings {
    /// Pay for present days.
    pub basic: Decimal,
    /// Pay for approved paid leave days.
    pub leave_pay: Decimal,
    /// Overtime pay.
    pub overtime: Decimal,
    /// Housing allowance.
    pub housing: Decimal,
    /// Conveyance allowance.
    pub conveyance: Decimal,
    /// Medical allowance.
    pub medical: Decimal,
}

impl Earnings {
    /// Sum of the fixed allowances, or `None` on overflow.
    pub fn allowances(&self) -> Option<Decimal> {
        self.housing
            .checked_add(self.conveyance)?
            .checked_add(self.medical)
    }

    /// Sum of every earning component, or `None` on overflow.
    pub fn gross(&self) -> Option<Decimal> {
        self.basic
            .checked_add(self.leave_pay)?
            .checked_add(self.overtime)?
            .checked_add(self.allowances()?)
    }
}

/// Itemized deductions of a payroll record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Deductions {
    /// Loss-of-pay leave deduction.
    pub unpaid_leave: Decimal,
    /// Deduction for unaccounted working days.
    pub absence: Decimal,
    /// Retirement fund contribution.
    pub retirement_fund: Decimal,
    /// Flat professional tax.
    pub professional_tax: Decimal,
}

impl Deductions {
    /// Sum of every deduction, or `None` on overflow.
    pub fn total(&self) -> Option<Decimal> {
        self.unpaid_leave
            .checked_add(self.absence)?
            .checked_add(self.retirement_fund)?
            .checked_add(self.professional_tax)
    }
}

/// Day and hour counts behind a payroll record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DayCounts {
    /// Working days in the month.
    pub working_days: u32,
    /// Days present.
    pub present_days: u32,
    /// Approved paid leave days falling in the month.
    pub paid_leave_days: Decimal,
    /// Approved loss-of-pay days falling in the month.
    pub unpaid_leave_days: Decimal,
    /// Working days neither worked nor covered by leave.
    pub absent_days: Decimal,
    /// Hours worked.
    pub hours_worked: Decimal,
    /// Hours beyond the standard day.
    pub overtime_hours: Decimal,
}

/// The stored payroll result for one (employee, month).
///
/// At most one record exists per key; recomputation replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    /// The employee.
    pub employee_id: String,
    /// The payroll month.
    pub month: PayrollMonth,
    /// Base monthly salary at computation time.
    pub basic_salary: Decimal,
    /// Total fixed allowances.
    pub allowances: Decimal,
    /// Overtime pay.
    pub overtime_pay: Decimal,
    /// Gross earnings.
    pub gross_pay: Decimal,
    /// Total deductions.
    pub deductions: Decimal,
    /// `max(0, gross - deductions)`.
    pub net_pay: Decimal,
    /// Days present.
    pub worked_days: u32,
    /// Paid and unpaid leave days.
    pub leave_days: Decimal,
    /// Itemized earnings.
    pub earnings: Earnings,
    /// Itemized deductions.
    pub deduction_breakdown: Deductions,
    /// Day and hour counts.
    pub days: DayCounts,
    /// Who triggered the computation.
    pub processed_by: String,
    /// When the computation ran.
    pub processed_at: DateTime<Utc>,
    /// Calculation steps, in order.
    pub audit_steps: Vec<AuditStep>,
}

/// A per-employee failure inside a bulk payroll run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollFailure {
    /// The employee whose computation failed.
    pub employee_id: String,
    /// The error message.
    pub error: String,
}

/// The outcome of a payroll run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollRun {
    /// The payroll month.
    pub month: PayrollMonth,
    /// Records written by the run.
    pub records: Vec<PayrollRecord>,
    /// Employees whose computation failed.
    pub failures: Vec<PayrollFailure>,
}

/// Month totals across stored payroll records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollSummary {
    /// The payroll month.
    pub month: PayrollMonth,
    /// Number of records.
    pub total_employees: usize,
    /// Sum of basic salaries.
    pub total_basic: Decimal,
    /// Sum of allowances.
    pub total_allowances: Decimal,
    /// Sum of overtime pay.
    pub total_overtime: Decimal,
    /// Sum of deductions.
    pub total_deductions: Decimal,
    /// Sum of net pay.
    pub total_net_pay: Decimal,
}
