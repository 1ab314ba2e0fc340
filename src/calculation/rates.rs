//! Daily and hourly rate derivation.
//!
//! The monthly base salary is spread over the month's working days, and the
//! daily rate over a standard working day.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::AuditStep;

/// The result of deriving the per-day and per-hour rates.
#[derive(Debug, Clone)]
pub struct DailyRatesResult {
    /// `base_salary / working_days`, or zero when the month has no working days.
    pub per_day_rate: Decimal,
    /// `per_day_rate / standard_hours_per_day`.
    pub per_hour_rate: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Derives the per-day and per-hour rates from a monthly base salary.
///
/// Rates are left unrounded; rounding happens once the record is stored.
///
/// # Arguments
///
/// * `base_salary` - The monthly base salary
/// * `working_days` - Working days in the month
/// * `standard_hours_per_day` - Hours in a standard working day
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use leave_payroll_engine::calculation::calculate_daily_rates;
/// use rust_decimal::Decimal;
///
/// let result = calculate_daily_rates(Decimal::from(26000), 26, Decimal::from(8), 1).unwrap();
/// assert_eq!(result.per_day_rate, Decimal::from(1000));
/// assert_eq!(result.per_hour_rate, Decimal::from(125));
/// ```
pub fn calculate_daily_rates(
    base_salary: Decimal,
    working_days: u32,
    standard_hours_per_day: Decimal,
    step_number: u32,
) -> EngineResult<DailyRatesResult> {
    let per_day_rate = if working_days == 0 {
        Decimal::ZERO
    } else {
        base_salary
            .checked_div(Decimal::from(working_days))
            .ok_or_else(|| EngineError::overflow("per-day rate"))?
    };
    let per_hour_rate = if standard_hours_per_day.is_zero() {
        Decimal::ZERO
    } else {
        per_day_rate
            .checked_div(standard_hours_per_day)
            .ok_or_else(|| EngineError::overflow("per-hour rate"))?
    };

    let reasoning = if working_days == 0 {
        "No working days in the month: per-day and per-hour rates are zero".to_string()
    } else {
        format!(
            "${} / {} working days = ${} per day; / {} hours = ${} per hour",
            base_salary.normalize(),
            working_days,
            per_day_rate.round_dp(4).normalize(),
            standard_hours_per_day.normalize(),
            per_hour_rate.round_dp(4).normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "daily_rates".to_string(),
        rule_name: "Daily and Hourly Rates".to_string(),
        input: serde_json::json!({
            "base_salary": base_salary.normalize().to_string(),
            "working_days": working_days,
            "standard_hours_per_day": standard_hours_per_day.normalize().to_string(),
        }),
        output: serde_json::json!({
            "per_day_rate": per_day_rate.normalize().to_string(),
            "per_hour_rate": per_hour_rate.normalize().to_string(),
        }),
        reasoning,
    };

    Ok(DailyRatesResult {
        per_day_rate,
        per_hour_rate,
        audit_step,
    })
}
