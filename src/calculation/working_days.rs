//! Working day counting.

use chrono::{Datelike, Weekday};

use crate::models::{AuditStep, PayrollMonth};

/// The result of counting working days in a month.
#[derive(Debug, Clone)]
pub struct WorkingDaysResult {
    /// Calendar days in the month except the rest day.
    pub working_days: u32,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Counts the working days in a month.
///
/// Every calendar day counts except the weekly rest day.
///
/// # Examples
///
/// ```
/// use leave_payroll_engine::calculation::count_working_days;
/// use leave_payroll_engine::models::PayrollMonth;
/// use chrono::Weekday;
///
/// // April 2026 has 30 days and 4 Sundays.
/// let month: PayrollMonth = "2026-04".parse().unwrap();
/// let result = count_working_days(month, Weekday::Sun, 1);
/// assert_eq!(result.working_days, 26);
/// ```
pub fn count_working_days(
    month: PayrollMonth,
    rest_day: Weekday,
    step_number: u32,
) -> WorkingDaysResult {
    let calendar_days = month.days().count();
    let rest_days = month.days().filter(|d| d.weekday() == rest_day).count();
    let working_days = (calendar_days - rest_days) as u32;

    let audit_step = AuditStep {
        step_number,
        rule_id: "working_days".to_string(),
        rule_name: "Working Days".to_string(),
        input: serde_json::json!({
            "month": month.to_string(),
            "rest_day": rest_day.to_string(),
        }),
        output: serde_json::json!({
            "calendar_days": calendar_days,
            "rest_days": rest_days,
            "working_days": working_days,
        }),
        reasoning: format!(
            "{} has {} calendar days, {} of them {}: {} working days",
            month, calendar_days, rest_days, rest_day, working_days
        ),
    };

    WorkingDaysResult {
        working_days,
        audit_step,
    }
}
