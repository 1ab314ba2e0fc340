//! Property tests for the balance ledger and the payroll calculator.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use leave_payroll_engine::calculation::{PayrollInput, calculate_payroll};
use leave_payroll_engine::config::EngineConfig;
use leave_payroll_engine::directory::{FixedClock, InMemoryAttendance, InMemoryDirectory};
use leave_payroll_engine::engine::HrEngine;
use leave_payroll_engine::leave::LeaveRequest;
use leave_payroll_engine::models::{
    Actor, AttendanceSummary, BalanceCategory, Employee, EmployeeCategory, EmployeeStatus,
    LeaveStatus, PayrollMonth, Role,
};

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

fn processed_at() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-05-01T06:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn staff(base_salary: Decimal) -> Employee {
    Employee {
        id: "E001".to_string(),
        name: "Asha Rao".to_string(),
        category: EmployeeCategory::Staff,
        base_salary,
        status: EmployeeStatus::Active,
        role: Role::Employee,
    }
}

/// Monthly salary in whole currency units.
fn arb_salary() -> impl Strategy<Value = Decimal> {
    (1_000u32..250_000).prop_map(Decimal::from)
}

/// Present days and hours for April 2026 (26 working days).
fn arb_attendance() -> impl Strategy<Value = AttendanceSummary> {
    (0u32..=26, 0u32..=4).prop_map(|(present_days, extra_hours)| AttendanceSummary {
        present_days,
        total_hours: Decimal::from(present_days * (8 + extra_hours)),
    })
}

/// A casual leave step: month, first day, length, and whether to approve.
fn arb_leave_step() -> impl Strategy<Value = (u32, u32, i64, bool)> {
    (4u32..=12, 2u32..=20, 1i64..=4, any::<bool>())
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// Net pay is never negative, whatever the attendance.
    #[test]
    fn net_pay_never_negative(base_salary in arb_salary(), attendance in arb_attendance()) {
        let employee = staff(base_salary);
        let input = PayrollInput {
            employee: &employee,
            month: PayrollMonth::new(2026, 4).unwrap(),
            attendance,
            applications: &[],
        };
        let record = calculate_payroll(&input, &EngineConfig::builtin(), "HR01", processed_at())
            .unwrap();

        prop_assert!(record.net_pay >= Decimal::ZERO);
        prop_assert!(record.net_pay <= record.gross_pay);
        prop_assert_eq!(record.audit_steps.len(), 8);
    }

    /// Identical inputs give an identical record.
    #[test]
    fn payroll_is_deterministic(base_salary in arb_salary(), attendance in arb_attendance()) {
        let employee = staff(base_salary);
        let config = EngineConfig::builtin();
        let input = PayrollInput {
            employee: &employee,
            month: PayrollMonth::new(2026, 4).unwrap(),
            attendance,
            applications: &[],
        };

        let first = calculate_payroll(&input, &config, "HR01", processed_at()).unwrap();
        let second = calculate_payroll(&input, &config, "HR01", processed_at()).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Used casual leave always equals the approved days and never exceeds
    /// the entitlement.
    #[test]
    fn used_equals_approved_sum(steps in prop::collection::vec(arb_leave_step(), 1..12)) {
        let engine = HrEngine::new(
            EngineConfig::builtin(),
            Arc::new(InMemoryDirectory::with_employees(vec![staff(Decimal::from(30000))])),
            Arc::new(InMemoryAttendance::new()),
            Arc::new(FixedClock::at_date(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap())),
        );
        let actor = Actor::new("E001", Role::Employee);

        for (month, day, length, approve) in steps {
            let start_date = NaiveDate::from_ymd_opt(2026, month, day).unwrap();
            let request = LeaveRequest {
                leave_type: "CL".to_string(),
                start_date,
                end_date: start_date + Duration::days(length - 1),
                reason: "Personal work".to_string(),
                is_half_day: false,
                half_day_session: None,
            };
            // Cap, balance and corruption failures are all part of the run
            if let Ok(application) = engine.submit_leave(&actor, &request) {
                let _ = if approve {
                    engine.approve_leave(application.id, "HR01")
                } else {
                    engine.reject_leave(application.id, "HR01", None)
                };
            }
        }

        let approved: Decimal = engine
            .list_leaves("E001", Some(2026), Some(LeaveStatus::Approved))
            .iter()
            .map(|a| a.days_requested)
            .sum();
        let balance = engine.get_leave_balance("E001", Some(2026)).unwrap();
        let casual = balance
            .balances
            .iter()
            .find(|line| line.category == BalanceCategory::Casual)
            .unwrap();

        prop_assert_eq!(casual.used, approved);
        prop_assert!(casual.used <= casual.total);
    }
}
