//! Overtime detection and pay.
//!
//! Overtime is measured over the whole month: hours worked beyond
//! `present_days × standard_hours_per_day` are paid at the overtime
//! multiple of the hourly rate.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceSummary, AuditStep};

/// The result of calculating monthly overtime.
#[derive(Debug, Clone)]
pub struct OvertimeResult {
    /// Expected hours for the days present.
    pub expected_hours: Decimal,
    /// Hours beyond the expected hours.
    pub overtime_hours: Decimal,
    /// `per_hour_rate × multiplier × overtime_hours`.
    pub overtime_pay: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates overtime hours and pay for a month of attendance.
///
/// # Arguments
///
/// * `attendance` - The month's attendance aggregate
/// * `per_hour_rate` - The hourly rate derived from base salary
/// * `standard_hours_per_day` - Hours in a standard working day
/// * `multiplier` - The overtime multiplier (e.g., 1.5)
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use leave_payroll_engine::calculation::calculate_overtime;
/// use leave_payroll_engine::models::AttendanceSummary;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let attendance = AttendanceSummary {
///     present_days: 20,
///     total_hours: Decimal::from(164),
/// };
/// let result = calculate_overtime(
///     &attendance,
///     Decimal::from(100),
///     Decimal::from(8),
///     Decimal::from_str("1.5").unwrap(),
///     1,
/// )
/// .unwrap();
/// assert_eq!(result.overtime_hours, Decimal::from(4));
/// assert_eq!(result.overtime_pay, Decimal::from(600));
/// ```
pub fn calculate_overtime(
    attendance: &AttendanceSummary,
    per_hour_rate: Decimal,
    standard_hours_per_day: Decimal,
    multiplier: Decimal,
    step_number: u32,
) -> EngineResult<OvertimeResult> {
    let overflow = || EngineError::overflow("overtime pay");
    let expected_hours = Decimal::from(attendance.present_days)
        .checked_mul(standard_hours_per_day)
        .ok_or_else(overflow)?;
    let overtime_hours = attendance
        .total_hours
        .checked_sub(expected_hours)
        .ok_or_else(overflow)?
        .max(Decimal::ZERO);
    let overtime_pay = per_hour_rate
        .checked_mul(multiplier)
        .and_then(|rate| rate.checked_mul(overtime_hours))
        .ok_or_else(overflow)?;

    let reasoning = if overtime_hours.is_zero() {
        format!(
            "{} hours worked within {} expected hours: no overtime",
            attendance.total_hours.normalize(),
            expected_hours.normalize()
        )
    } else {
        format!(
            "{} hours beyond {} expected × ${} × {} = ${}",
            overtime_hours.normalize(),
            expected_hours.normalize(),
            per_hour_rate.round_dp(4).normalize(),
            multiplier.normalize(),
            overtime_pay.round_dp(4).normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "monthly_overtime".to_string(),
        rule_name: "Monthly Overtime".to_string(),
        input: serde_json::json!({
            "present_days": attendance.present_days,
            "total_hours": attendance.total_hours.normalize().to_string(),
            "standard_hours_per_day": standard_hours_per_day.normalize().to_string(),
            "per_hour_rate": per_hour_rate.normalize().to_string(),
            "multiplier": multiplier.normalize().to_string(),
        }),
        output: serde_json::json!({
            "expected_hours": expected_hours.normalize().to_string(),
            "overtime_hours": overtime_hours.normalize().to_string(),
            "overtime_pay": overtime_pay.normalize().to_string(),
        }),
        reasoning,
    };

    Ok(OvertimeResult {
        expected_hours,
        overtime_hours,
        overtime_pay,
        audit_step,
    })
}
