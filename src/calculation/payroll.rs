//! Monthly payroll calculation.
//!
//! Chains the individual rules into one [`PayrollRecord`] with an ordered
//! audit trace. The calculation is pure: identical inputs give an identical
//! record.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceSummary, AuditStep, DayCounts, Deductions, Earnings, Employee, LeaveApplication,
    PayrollMonth, PayrollRecord,
};

use super::absence::calculate_absent_days;
use super::deductions::calculate_deductions;
use super::earnings::calculate_earnings;
use super::leave_days::partition_leave_days;
use super::overtime::calculate_overtime;
use super::rates::calculate_daily_rates;
use super::working_days::count_working_days;

/// Everything the calculator reads for one (employee, month).
#[derive(Debug, Clone)]
pub struct PayrollInput<'a> {
    /// The employee being paid.
    pub employee: &'a Employee,
    /// The payroll month.
    pub month: PayrollMonth,
    /// The month's attendance aggregate.
    pub attendance: AttendanceSummary,
    /// The employee's leave applications; only approved ones overlapping the
    /// month are counted.
    pub applications: &'a [LeaveApplication],
}

/// Rounds a monetary amount to two decimal places, midpoint away from zero.
///
/// # Examples
///
/// ```
/// use leave_payroll_engine::calculation::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_money(Decimal::from_str("2.345").unwrap()), Decimal::from_str("2.35").unwrap());
/// assert_eq!(round_money(Decimal::from_str("-2.345").unwrap()), Decimal::from_str("-2.35").unwrap());
/// ```
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Calculates the payroll record for one employee and month.
///
/// Steps, in audit order:
/// 1. Working days in the month
/// 2. Approved leave days, split paid / unpaid
/// 3. Absent days
/// 4. Per-day and per-hour rates
/// 5. Overtime
/// 6. Earnings
/// 7. Deductions
/// 8. Net pay
///
/// Amounts are carried unrounded through every step and rounded once when
/// the record is built.
///
/// # Errors
///
/// - `InvalidInput` if the base salary is not positive, exceeds
///   [`MAX_BASE_SALARY`](crate::models::MAX_BASE_SALARY), or an application
///   references a leave type missing from the catalog
/// - `CalculationError` if an amount leaves the decimal range
pub fn calculate_payroll(
    input: &PayrollInput<'_>,
    config: &EngineConfig,
    processed_by: &str,
    processed_at: DateTime<Utc>,
) -> EngineResult<PayrollRecord> {
    input.employee.validate_base_salary()?;
    let rules = config.payroll();
    let base_salary = input.employee.base_salary;
    let mut audit_steps = Vec::with_capacity(8);

    let working = count_working_days(input.month, rules.rest_day, 1);
    audit_steps.push(working.audit_step);

    let leave = partition_leave_days(input.applications, input.month, config, 2)?;
    audit_steps.push(leave.audit_step);

    let absence = calculate_absent_days(
        working.working_days,
        input.attendance.present_days,
        leave.paid_leave_days,
        leave.unpaid_leave_days,
        3,
    );
    audit_steps.push(absence.audit_step);

    let rates = calculate_daily_rates(
        base_salary,
        working.working_days,
        rules.standard_hours_per_day,
        4,
    )?;
    audit_steps.push(rates.audit_step);

    let overtime = calculate_overtime(
        &input.attendance,
        rates.per_hour_rate,
        rules.standard_hours_per_day,
        rules.overtime_multiplier,
        5,
    )?;
    audit_steps.push(overtime.audit_step);

    let earnings = calculate_earnings(
        base_salary,
        rates.per_day_rate,
        input.attendance.present_days,
        leave.paid_leave_days,
        overtime.overtime_pay,
        &rules.allowances,
        6,
    )?;
    audit_steps.push(earnings.audit_step);

    let deductions = calculate_deductions(
        base_salary,
        rates.per_day_rate,
        leave.unpaid_leave_days,
        absence.absent_days,
        rules,
        7,
    )?;
    audit_steps.push(deductions.audit_step);

    let gross = earnings.gross;
    let total_deductions = deductions.total;
    let net_pay = gross
        .checked_sub(total_deductions)
        .ok_or_else(|| EngineError::overflow("net pay"))?
        .max(Decimal::ZERO);
    audit_steps.push(net_pay_step(gross, total_deductions, net_pay, 8));

    let earned = round_earnings(&earnings.earnings);
    let deducted = round_deductions(&deductions.deductions);

    Ok(PayrollRecord {
        employee_id: input.employee.id.clone(),
        month: input.month,
        basic_salary: round_money(base_salary),
        allowances: round_money(earnings.allowances),
        overtime_pay: earned.overtime,
        gross_pay: round_money(gross),
        deductions: round_money(total_deductions),
        net_pay: round_money(net_pay),
        worked_days: input.attendance.present_days,
        leave_days: leave.paid_leave_days + leave.unpaid_leave_days,
        earnings: earned,
        deduction_breakdown: deducted,
        days: DayCounts {
            working_days: working.working_days,
            present_days: input.attendance.present_days,
            paid_leave_days: leave.paid_leave_days,
            unpaid_leave_days: leave.unpaid_leave_days,
            absent_days: absence.absent_days,
            hours_worked: input.attendance.total_hours,
            overtime_hours: overtime.overtime_hours,
        },
        processed_by: processed_by.to_string(),
        processed_at,
        audit_steps,
    })
}

fn net_pay_step(gross: Decimal, deductions: Decimal, net_pay: Decimal, step_number: u32) -> AuditStep {
    let reasoning = if net_pay.is_zero() && deductions > gross {
        format!(
            "Deductions ${} exceed gross ${}: net pay floored at $0",
            round_money(deductions),
            round_money(gross)
        )
    } else {
        format!(
            "${} gross - ${} deductions = ${} net",
            round_money(gross),
            round_money(deductions),
            round_money(net_pay)
        )
    };

    AuditStep {
        step_number,
        rule_id: "net_pay".to_string(),
        rule_name: "Net Pay".to_string(),
        input: serde_json::json!({
            "gross": gross.normalize().to_string(),
            "deductions": deductions.normalize().to_string(),
        }),
        output: serde_json::json!({
            "net_pay": round_money(net_pay).to_string(),
        }),
        reasoning,
    }
}

fn round_earnings(earnings: &Earnings) -> Earnings {
    Earnings {
        basic: round_money(earnings.basic),
        leave_pay: round_money(earnings.leave_pay),
        overtime: round_money(earnings.overtime),
        housing: round_money(earnings.housing),
        conveyance: round_money(earnings.conveyance),
        medical: round_money(earnings.medical),
    }
}

fn round_deductions(deductions: &Deductions) -> Deductions {
    Deductions {
        unpaid_leave: round_money(deductions.unpaid_leave),
        absence: round_money(deductions.absence),
        retirement_fund: round_money(deductions.retirement_fund),
        professional_tax: round_money(deductions.professional_tax),
    }
}
