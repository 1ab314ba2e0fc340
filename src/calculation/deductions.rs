//! Deductions calculation.
//!
//! Statutory amounts are fixed-rate approximations: a retirement fund
//! contribution on salary up to a ceiling and a flat professional tax above
//! a salary threshold.

use rust_decimal::Decimal;

use crate::config::PayrollRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, Deductions};

/// The result of calculating deductions, including the audit step.
#[derive(Debug, Clone)]
pub struct DeductionsResult {
    /// Itemized, unrounded deductions.
    pub deductions: Deductions,
    /// Sum of every deduction.
    pub total: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates the month's deductions.
///
/// # Arguments
///
/// * `base_salary` - The monthly base salary
/// * `per_day_rate` - The per-day rate derived from base salary
/// * `unpaid_leave_days` - Approved loss-of-pay days in the month
/// * `absent_days` - Working days not accounted for
/// * `rules` - The payroll rules holding rates, ceilings and thresholds
/// * `step_number` - The step number for audit trail sequencing
pub fn calculate_deductions(
    base_salary: Decimal,
    per_day_rate: Decimal,
    unpaid_leave_days: Decimal,
    absent_days: Decimal,
    rules: &PayrollRules,
    step_number: u32,
) -> EngineResult<DeductionsResult> {
    let fund_base = base_salary.min(rules.retirement_fund.salary_ceiling);
    let professional_tax = if base_salary > rules.professional_tax.threshold {
        rules.professional_tax.amount
    } else {
        Decimal::ZERO
    };

    let deductions = Deductions {
        unpaid_leave: per_day_rate
            .checked_mul(unpaid_leave_days)
            .ok_or_else(|| EngineError::overflow("unpaid leave deduction"))?,
        absence: per_day_rate
            .checked_mul(absent_days)
            .ok_or_else(|| EngineError::overflow("absence deduction"))?,
        retirement_fund: fund_base
            .checked_mul(rules.retirement_fund.rate)
            .ok_or_else(|| EngineError::overflow("retirement fund"))?,
        professional_tax,
    };
    let total = deductions
        .total()
        .ok_or_else(|| EngineError::overflow("total deductions"))?;

    let audit_step = AuditStep {
        step_number,
        rule_id: "deductions".to_string(),
        rule_name: "Deductions".to_string(),
        input: serde_json::json!({
            "base_salary": base_salary.normalize().to_string(),
            "per_day_rate": per_day_rate.normalize().to_string(),
            "unpaid_leave_days": unpaid_leave_days.normalize().to_string(),
            "absent_days": absent_days.normalize().to_string(),
            "retirement_fund_rate": rules.retirement_fund.rate.normalize().to_string(),
            "retirement_fund_ceiling": rules.retirement_fund.salary_ceiling.normalize().to_string(),
            "professional_tax_threshold": rules.professional_tax.threshold.normalize().to_string(),
        }),
        output: serde_json::json!({
            "unpaid_leave": deductions.unpaid_leave.normalize().to_string(),
            "absence": deductions.absence.normalize().to_string(),
            "retirement_fund": deductions.retirement_fund.normalize().to_string(),
            "professional_tax": deductions.professional_tax.normalize().to_string(),
            "total": total.normalize().to_string(),
        }),
        reasoning: format!(
            "Retirement fund {} of ${}; professional tax {}; {} unpaid and {} absent day(s) deducted",
            rules.retirement_fund.rate.normalize(),
            fund_base.normalize(),
            if professional_tax.is_zero() {
                format!("not due at or below ${}", rules.professional_tax.threshold.normalize())
            } else {
                format!("${}", professional_tax.normalize())
            },
            unpaid_leave_days.normalize(),
            absent_days.normalize()
        ),
    };

    Ok(DeductionsResult {
        deductions,
        total,
        audit_step,
    })
}
