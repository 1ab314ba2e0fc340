//! Approved leave aggregation for a payroll month.

use rust_decimal::Decimal;

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::models::{AuditStep, LeaveApplication, LeaveStatus, PayrollMonth};

/// Approved leave days falling inside a month, split by pay treatment.
#[derive(Debug, Clone)]
pub struct LeaveDaysResult {
    /// Days of paid leave types.
    pub paid_leave_days: Decimal,
    /// Days of unpaid leave types.
    pub unpaid_leave_days: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Sums the approved leave days of `applications` that fall inside `month`.
///
/// Applications in any other state are ignored. Only the days of an
/// application inside the month count, the configured rest day never counts,
/// and a half-day counts 0.5. The catalog's `paid` flag decides the
/// partition.
pub fn partition_leave_days(
    applications: &[LeaveApplication],
    month: PayrollMonth,
    config: &EngineConfig,
    step_number: u32,
) -> EngineResult<LeaveDaysResult> {
    let from = month.first_day();
    let to = month.last_day();
    let rest_day = config.payroll().rest_day;

    let mut paid_leave_days = Decimal::ZERO;
    let mut unpaid_leave_days = Decimal::ZERO;
    let mut counted = Vec::new();

    for application in applications
        .iter()
        .filter(|a| a.status == LeaveStatus::Approved && a.overlaps(from, to))
    {
        let days = application.days_within(from, to, rest_day);
        let paid = config.leave_type(application.leave_type)?.paid;
        if paid {
            paid_leave_days += days;
        } else {
            unpaid_leave_days += days;
        }
        counted.push(serde_json::json!({
            "application_id": application.id,
            "leave_type": application.leave_type.code(),
            "days_in_month": days.normalize().to_string(),
            "paid": paid,
        }));
    }

    let audit_step = AuditStep {
        step_number,
        rule_id: "approved_leave_days".to_string(),
        rule_name: "Approved Leave Days".to_string(),
        input: serde_json::json!({
            "month": month.to_string(),
            "applications": counted,
        }),
        output: serde_json::json!({
            "paid_leave_days": paid_leave_days.normalize().to_string(),
            "unpaid_leave_days": unpaid_leave_days.normalize().to_string(),
        }),
        reasoning: format!(
            "{} approved application(s) overlap {}: {} paid, {} unpaid day(s)",
            counted.len(),
            month,
            paid_leave_days.normalize(),
            unpaid_leave_days.normalize()
        ),
    };

    Ok(LeaveDaysResult {
        paid_leave_days,
        unpaid_leave_days,
        audit_step,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HalfDaySession, LeaveTypeCode};
    use chrono::{DateTime, NaiveDate, Utc};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn application(
        id: u64,
        leave_type: LeaveTypeCode,
        start: &str,
        end: &str,
        status: LeaveStatus,
    ) -> LeaveApplication {
        let start_date = make_date(start);
        let end_date = make_date(end);
        let is_half_day = leave_type == LeaveTypeCode::HalfDay;
        LeaveApplication {
            id,
            employee_id: "E001".to_string(),
            leave_type,
            start_date,
            end_date,
            days_requested: if is_half_day {
                dec("0.5")
            } else {
                Decimal::from((end_date - start_date).num_days() + 1)
            },
            is_half_day,
            half_day_session: is_half_day.then_some(HalfDaySession::FirstHalf),
            reason: "Personal".to_string(),
            status,
            approved_by: None,
            approved_on: None,
            rejection_reason: None,
            applied_on: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    fn april() -> PayrollMonth {
        "2026-04".parse().unwrap()
    }

    #[test]
    fn test_partitions_paid_and_unpaid() {
        let config = EngineConfig::builtin();
        let applications = vec![
            application(1, LeaveTypeCode::Casual, "2026-04-06", "2026-04-06", LeaveStatus::Approved),
            application(2, LeaveTypeCode::LossOfPay, "2026-04-07", "2026-04-08", LeaveStatus::Approved),
            application(3, LeaveTypeCode::HalfDay, "2026-04-09", "2026-04-09", LeaveStatus::Approved),
        ];

        let result = partition_leave_days(&applications, april(), &config, 2).unwrap();
        assert_eq!(result.paid_leave_days, dec("1.5"));
        assert_eq!(result.unpaid_leave_days, dec("2"));
        assert_eq!(result.audit_step.step_number, 2);
    }

    #[test]
    fn test_ignores_non_approved_applications() {
        let config = EngineConfig::builtin();
        let applications = vec![
            application(1, LeaveTypeCode::Sick, "2026-04-06", "2026-04-07", LeaveStatus::Pending),
            application(2, LeaveTypeCode::Sick, "2026-04-08", "2026-04-08", LeaveStatus::Rejected),
            application(3, LeaveTypeCode::Sick, "2026-04-09", "2026-04-09", LeaveStatus::Cancelled),
        ];

        let result = partition_leave_days(&applications, april(), &config, 1).unwrap();
        assert_eq!(result.paid_leave_days, Decimal::ZERO);
        assert_eq!(result.unpaid_leave_days, Decimal::ZERO);
    }

    #[test]
    fn test_clips_applications_spanning_month_boundary() {
        let config = EngineConfig::builtin();
        let applications = vec![application(
            1,
            LeaveTypeCode::Earned,
            "2026-03-30",
            "2026-04-02",
            LeaveStatus::Approved,
        )];

        let result = partition_leave_days(&applications, april(), &config, 1).unwrap();
        assert_eq!(result.paid_leave_days, dec("2"));
    }

    #[test]
    fn test_rest_day_inside_leave_is_not_paid() {
        let config = EngineConfig::builtin();
        // Saturday 2026-04-04 to Monday 2026-04-06
        let applications = vec![application(
            1,
            LeaveTypeCode::Casual,
            "2026-04-04",
            "2026-04-06",
            LeaveStatus::Approved,
        )];

        let result = partition_leave_days(&applications, april(), &config, 2).unwrap();
        assert_eq!(result.paid_leave_days, dec("2"));
        assert_eq!(result.audit_step.input["applications"][0]["days_in_month"], "2");
    }
}
