//! Earnings calculation.

use rust_decimal::Decimal;

use crate::config::AllowanceRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, Earnings};

/// The result of calculating earnings, including the audit step.
#[derive(Debug, Clone)]
pub struct EarningsResult {
    /// Itemized, unrounded earnings.
    pub earnings: Earnings,
    /// Sum of the fixed allowances.
    pub allowances: Decimal,
    /// Sum of every earning component.
    pub gross: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates the month's earnings.
///
/// - basic: `per_day_rate × present_days`
/// - leave pay: `per_day_rate × paid_leave_days`
/// - overtime: passed through from the overtime step
/// - housing: `housing_rate × base_salary`
/// - conveyance and medical: flat amounts
///
/// # Examples
///
/// ```
/// use leave_payroll_engine::calculation::calculate_earnings;
/// use leave_payroll_engine::config::EngineConfig;
/// use rust_decimal::Decimal;
///
/// let config = EngineConfig::builtin();
/// let result = calculate_earnings(
///     Decimal::from(26000),
///     Decimal::from(1000),
///     20,
///     Decimal::from(2),
///     Decimal::ZERO,
///     &config.payroll().allowances,
///     1,
/// )
/// .unwrap();
/// assert_eq!(result.earnings.basic, Decimal::from(20000));
/// assert_eq!(result.earnings.leave_pay, Decimal::from(2000));
/// assert_eq!(result.allowances, Decimal::from(5450));
/// ```
pub fn calculate_earnings(
    base_salary: Decimal,
    per_day_rate: Decimal,
    present_days: u32,
    paid_leave_days: Decimal,
    overtime_pay: Decimal,
    allowances: &AllowanceRules,
    step_number: u32,
) -> EngineResult<EarningsResult> {
    let earnings = Earnings {
        basic: per_day_rate
            .checked_mul(Decimal::from(present_days))
            .ok_or_else(|| EngineError::overflow("basic pay"))?,
        leave_pay: per_day_rate
            .checked_mul(paid_leave_days)
            .ok_or_else(|| EngineError::overflow("leave pay"))?,
        overtime: overtime_pay,
        housing: base_salary
            .checked_mul(allowances.housing_rate)
            .ok_or_else(|| EngineError::overflow("housing allowance"))?,
        conveyance: allowances.conveyance,
        medical: allowances.medical,
    };
    let allowance_total = earnings
        .allowances()
        .ok_or_else(|| EngineError::overflow("allowances"))?;
    let gross = earnings
        .gross()
        .ok_or_else(|| EngineError::overflow("gross pay"))?;

    let audit_step = AuditStep {
        step_number,
        rule_id: "earnings".to_string(),
        rule_name: "Earnings".to_string(),
        input: serde_json::json!({
            "base_salary": base_salary.normalize().to_string(),
            "per_day_rate": per_day_rate.normalize().to_string(),
            "present_days": present_days,
            "paid_leave_days": paid_leave_days.normalize().to_string(),
            "housing_rate": allowances.housing_rate.normalize().to_string(),
        }),
        output: serde_json::json!({
            "basic": earnings.basic.normalize().to_string(),
            "leave_pay": earnings.leave_pay.normalize().to_string(),
            "overtime": earnings.overtime.normalize().to_string(),
            "housing": earnings.housing.normalize().to_string(),
            "conveyance": earnings.conveyance.normalize().to_string(),
            "medical": earnings.medical.normalize().to_string(),
            "gross": gross.normalize().to_string(),
        }),
        reasoning: format!(
            "Basic {} days, leave pay {} days, overtime ${}, allowances ${}: gross ${}",
            present_days,
            paid_leave_days.normalize(),
            earnings.overtime.round_dp(2).normalize(),
            allowance_total.round_dp(2).normalize(),
            gross.round_dp(2).normalize()
        ),
    };

    Ok(EarningsResult {
        earnings,
        allowances: allowance_total,
        gross,
        audit_step,
    })
}
