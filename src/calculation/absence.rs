//! Absent day derivation.

use rust_decimal::Decimal;

use crate::models::AuditStep;

/// The result of deriving absent days.
#[derive(Debug, Clone)]
pub struct AbsenceResult {
    /// Working days neither worked nor covered by approved leave.
    pub absent_days: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Computes `max(0, working_days - present_days - paid - unpaid)`.
///
/// # Examples
///
/// ```
/// use leave_payroll_engine::calculation::calculate_absent_days;
/// use rust_decimal::Decimal;
///
/// let result = calculate_absent_days(26, 20, Decimal::from(2), Decimal::ONE, 1);
/// assert_eq!(result.absent_days, Decimal::from(3));
/// ```
pub fn calculate_absent_days(
    working_days: u32,
    present_days: u32,
    paid_leave_days: Decimal,
    unpaid_leave_days: Decimal,
    step_number: u32,
) -> AbsenceResult {
    let unaccounted = Decimal::from(working_days)
        - Decimal::from(present_days)
        - paid_leave_days
        - unpaid_leave_days;
    let absent_days = unaccounted.max(Decimal::ZERO);

    let audit_step = AuditStep {
        step_number,
        rule_id: "absent_days".to_string(),
        rule_name: "Absent Days".to_string(),
        input: serde_json::json!({
            "working_days": working_days,
            "present_days": present_days,
            "paid_leave_days": paid_leave_days.normalize().to_string(),
            "unpaid_leave_days": unpaid_leave_days.normalize().to_string(),
        }),
        output: serde_json::json!({
            "absent_days": absent_days.normalize().to_string(),
        }),
        reasoning: format!(
            "{} working - {} present - {} paid leave - {} unpaid leave = {} absent",
            working_days,
            present_days,
            paid_leave_days.normalize(),
            unpaid_leave_days.normalize(),
            absent_days.normalize()
        ),
    };

    AbsenceResult {
        absent_days,
        audit_step,
    }
}
